pub use decode::*;

// Reader for encoded data
//------------------------------------------------------------------------------

mod reader {
    use std::cmp::min;

    use crate::common::bit_utils::BitStream;
    use crate::common::charset::Charset;
    use crate::common::codec::Mode;
    use crate::common::error::{QRError, QRResult};
    use crate::common::metadata::Version;

    // Decoded text plus the bytes of the current run, which are decoded together once the
    // run ends so multi-byte chars split across segments survive
    pub struct Output {
        text: String,
        pending: Vec<u8>,
        charset: Charset,
    }

    impl Output {
        pub fn new(charset: Charset, capacity: usize) -> Self {
            Self { text: String::with_capacity(capacity), pending: Vec::new(), charset }
        }

        fn flush(&mut self) -> QRResult<()> {
            if !self.pending.is_empty() {
                let decoded = self.charset.decode(&self.pending)?;
                self.text.push_str(&decoded);
                self.pending.clear();
            }
            Ok(())
        }

        pub fn finish(mut self) -> QRResult<String> {
            self.flush()?;
            Ok(self.text)
        }
    }

    // Returns false once the terminator or the end of the stream is reached
    pub fn write_segment(inp: &mut BitStream, ver: Version, out: &mut Output) -> QRResult<bool> {
        if inp.remaining() < ver.mode_bits() {
            return Ok(false);
        }
        let mode = take_mode(inp)?;
        match mode {
            Mode::Terminator => return Ok(false),
            Mode::Eci => {
                let designator = take_eci_designator(inp)?;
                let charset =
                    Charset::from_eci_designator(designator).ok_or(QRError::CharsetDecodingFailed)?;
                out.flush()?;
                out.charset = charset;
                return Ok(true);
            }
            _ => (),
        }

        let len_bits = ver.char_cnt_bits(mode);
        let char_cnt = inp.take_bits(len_bits).ok_or(QRError::CorruptDataSegment)? as usize;
        match mode {
            Mode::Numeric => write_numeric(inp, char_cnt, &mut out.pending)?,
            Mode::Alphanumeric => write_alphanumeric(inp, char_cnt, &mut out.pending)?,
            Mode::Byte => write_byte(inp, char_cnt, &mut out.pending)?,
            Mode::Kanji => write_kanji(inp, char_cnt, out)?,
            Mode::Eci | Mode::Terminator => unreachable!(),
        };

        Ok(true)
    }

    fn take_mode(inp: &mut BitStream) -> QRResult<Mode> {
        let mode_bits = inp.take_bits(4).ok_or(QRError::CorruptDataSegment)? as u8;
        Mode::from_bits(mode_bits).ok_or(QRError::InvalidMode(mode_bits))
    }

    // 1, 2 or 3 byte designator, length flagged by the leading bits
    fn take_eci_designator(inp: &mut BitStream) -> QRResult<u32> {
        let first = inp.take_bits(8).ok_or(QRError::CorruptDataSegment)? as u32;
        let more = |inp: &mut BitStream, n| {
            inp.take_bits(n).map(u32::from).ok_or(QRError::CorruptDataSegment)
        };
        match first {
            0x00..=0x7F => Ok(first),
            0x80..=0xBF => Ok(((first & 0x3F) << 8) | more(inp, 8)?),
            0xC0..=0xDF => Ok(((first & 0x1F) << 16) | more(inp, 16)?),
            _ => Err(QRError::CorruptDataSegment),
        }
    }

    fn write_numeric(inp: &mut BitStream, mut char_cnt: usize, out: &mut Vec<u8>) -> QRResult<()> {
        while char_cnt > 0 {
            let n = min(3, char_cnt);
            let bit_len = Mode::Numeric.encoded_len(n);
            let chunk = inp.take_bits(bit_len).ok_or(QRError::CorruptDataSegment)?;
            if chunk >= [10, 100, 1000][n - 1] {
                return Err(QRError::CorruptDataSegment);
            }
            out.extend(Mode::Numeric.decode_chunk(chunk, bit_len));
            char_cnt -= n;
        }

        Ok(())
    }

    fn write_alphanumeric(
        inp: &mut BitStream,
        mut char_cnt: usize,
        out: &mut Vec<u8>,
    ) -> QRResult<()> {
        while char_cnt > 0 {
            let n = min(2, char_cnt);
            let bit_len = Mode::Alphanumeric.encoded_len(n);
            let chunk = inp.take_bits(bit_len).ok_or(QRError::CorruptDataSegment)?;
            if chunk >= [45, 45 * 45][n - 1] {
                return Err(QRError::CorruptDataSegment);
            }
            out.extend(Mode::Alphanumeric.decode_chunk(chunk, bit_len));
            char_cnt -= n;
        }

        Ok(())
    }

    fn write_byte(inp: &mut BitStream, char_cnt: usize, out: &mut Vec<u8>) -> QRResult<()> {
        for _ in 0..char_cnt {
            let chunk = inp.take_bits(8).ok_or(QRError::CorruptDataSegment)?;
            out.extend(Mode::Byte.decode_chunk(chunk, 8));
        }

        Ok(())
    }

    fn write_kanji(inp: &mut BitStream, char_cnt: usize, out: &mut Output) -> QRResult<()> {
        let mut sjis = Vec::with_capacity(char_cnt * 2);
        for _ in 0..char_cnt {
            let chunk = inp.take_bits(13).ok_or(QRError::CorruptDataSegment)?;
            sjis.extend(Mode::Kanji.decode_chunk(chunk, 13));
        }

        if out.charset == Charset::ShiftJis {
            out.pending.extend(sjis);
        } else {
            out.flush()?;
            out.text.push_str(&Charset::ShiftJis.decode(&sjis)?);
        }

        Ok(())
    }

}

// Decoder
//------------------------------------------------------------------------------

pub mod decode {
    use super::reader::{write_segment, Output};
    use crate::common::bit_utils::BitStream;
    use crate::common::charset::Charset;
    use crate::common::error::QRResult;
    use crate::common::metadata::Version;

    // Parses segments from data codewords. `charset` applies until an ECI designator says
    // otherwise.
    pub fn decode(encoded: &mut BitStream, ver: Version, charset: Charset) -> QRResult<String> {
        let mut out = Output::new(charset, encoded.len() >> 3);
        while write_segment(encoded, ver, &mut out)? {}
        out.finish()
    }

    #[cfg(test)]
    mod decode_tests {
        use test_case::test_case;

        use super::decode;
        use crate::common::charset::Charset;
        use crate::common::codec::encoder::{encode, EncodeHints};
        use crate::common::metadata::ECLevel;

        #[test_case("abcABCDEF1234567890123ABCDEFabc", Charset::Utf8, false)]
        #[test_case("Grüße, 世界! 12345678", Charset::Utf8, true)]
        #[test_case("Ñandú 2024", Charset::Iso8859_1, false)]
        #[test_case("日本語テキスト abc 123", Charset::ShiftJis, false)]
        #[test_case("漢字ABC", Charset::ShiftJis, true)]
        fn test_decode(data: &str, charset: Charset, eci: bool) {
            let text = charset.encode(data).unwrap();
            let hints = EncodeHints { charset, eci, ..Default::default() };
            let (mut bs, ver) = encode(&text, ECLevel::M, &hints).unwrap();
            assert_eq!(decode(&mut bs, ver, charset).unwrap(), data);
        }

        #[test]
        fn test_decode_follows_eci() {
            let data = "Ñandú";
            let text = Charset::Iso8859_1.encode(data).unwrap();
            let hints = EncodeHints { charset: Charset::Iso8859_1, eci: true, ..Default::default() };
            let (mut bs, ver) = encode(&text, ECLevel::L, &hints).unwrap();
            assert_eq!(decode(&mut bs, ver, Charset::Utf8).unwrap(), data);
        }
    }
}
