use std::fmt::{Display, Formatter};
use std::str::FromStr;

use encoding_rs::SHIFT_JIS;

use super::error::{QRError, QRResult};

// Charset
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, Default, Hash)]
pub enum Charset {
    #[default]
    Utf8,
    Iso8859_1,
    ShiftJis,
}

impl Display for Charset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Utf8 => "UTF-8",
            Self::Iso8859_1 => "ISO-8859-1",
            Self::ShiftJis => "Shift_JIS",
        };
        f.write_str(name)
    }
}

impl FromStr for Charset {
    type Err = QRError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase().replace(['-', '_'], "");
        match norm.as_str() {
            "utf8" => Ok(Self::Utf8),
            "iso88591" | "latin1" => Ok(Self::Iso8859_1),
            "shiftjis" | "sjis" => Ok(Self::ShiftJis),
            _ => Err(QRError::InvalidParameter(format!("unknown charset {s:?}"))),
        }
    }
}

impl Charset {
    // ECI assignment number, always below 128 so it fits the single byte form
    pub fn eci_designator(self) -> u8 {
        match self {
            Self::Iso8859_1 => 3,
            Self::ShiftJis => 20,
            Self::Utf8 => 26,
        }
    }

    pub fn from_eci_designator(designator: u32) -> Option<Self> {
        match designator {
            1 | 3 => Some(Self::Iso8859_1),
            20 => Some(Self::ShiftJis),
            26 => Some(Self::Utf8),
            _ => None,
        }
    }

    // Transcodes char by char so every char keeps its own byte run
    pub fn encode(self, text: &str) -> QRResult<EncodedText> {
        let mut res = EncodedText::with_capacity(text.len());
        let mut buf = [0u8; 4];
        for (index, ch) in text.chars().enumerate() {
            let failed = || QRError::CharsetEncodingFailed { index, charset: self };
            match self {
                Self::Utf8 => res.push(ch.encode_utf8(&mut buf).as_bytes()),
                Self::Iso8859_1 => {
                    let byte = u8::try_from(u32::from(ch)).map_err(|_| failed())?;
                    res.push(&[byte]);
                }
                Self::ShiftJis => {
                    let (bytes, _, had_errors) = SHIFT_JIS.encode(ch.encode_utf8(&mut buf));
                    if had_errors {
                        return Err(failed());
                    }
                    res.push(&bytes);
                }
            }
        }
        Ok(res)
    }

    pub fn decode(self, bytes: &[u8]) -> QRResult<String> {
        match self {
            Self::Utf8 => String::from_utf8(bytes.to_vec()).map_err(|_| QRError::CharsetDecodingFailed),
            Self::Iso8859_1 => Ok(bytes.iter().map(|&b| b as char).collect()),
            Self::ShiftJis => SHIFT_JIS
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|s| s.into_owned())
                .ok_or(QRError::CharsetDecodingFailed),
        }
    }
}

// Encoded text
//------------------------------------------------------------------------------

// Payload bytes in the declared charset, with the byte offset of every char
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedText {
    bytes: Vec<u8>,
    offsets: Vec<usize>,
}

impl EncodedText {
    fn with_capacity(capacity: usize) -> Self {
        Self { bytes: Vec::with_capacity(capacity), offsets: vec![0] }
    }

    fn push(&mut self, unit: &[u8]) {
        self.bytes.extend_from_slice(unit);
        self.offsets.push(self.bytes.len());
    }

    // Number of chars
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn unit(&self, index: usize) -> &[u8] {
        &self.bytes[self.offsets[index]..self.offsets[index + 1]]
    }

    // Bytes of the chars in [start, end)
    pub fn slice(&self, start: usize, end: usize) -> &[u8] {
        &self.bytes[self.offsets[start]..self.offsets[end]]
    }
}

#[cfg(test)]
mod charset_tests {
    use test_case::test_case;

    use super::Charset;
    use crate::common::error::QRError;

    #[test_case("UTF-8", Charset::Utf8)]
    #[test_case("utf8", Charset::Utf8)]
    #[test_case("ISO-8859-1", Charset::Iso8859_1)]
    #[test_case("ISO8859_1", Charset::Iso8859_1)]
    #[test_case("Shift_JIS", Charset::ShiftJis)]
    #[test_case("SJIS", Charset::ShiftJis)]
    fn test_from_str(name: &str, exp: Charset) {
        assert_eq!(name.parse::<Charset>().unwrap(), exp);
    }

    #[test]
    fn test_from_str_unknown() {
        assert!(matches!("EBCDIC".parse::<Charset>(), Err(QRError::InvalidParameter(_))));
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for cs in [Charset::Utf8, Charset::Iso8859_1, Charset::ShiftJis] {
            assert_eq!(cs.to_string().parse::<Charset>().unwrap(), cs);
        }
    }

    #[test]
    fn test_encode_utf8_keeps_char_boundaries() {
        let enc = Charset::Utf8.encode("aé日").unwrap();
        assert_eq!(enc.len(), 3);
        assert_eq!(enc.unit(0), b"a");
        assert_eq!(enc.unit(1), "é".as_bytes());
        assert_eq!(enc.unit(2), "日".as_bytes());
        assert_eq!(enc.slice(1, 3), "é日".as_bytes());
    }

    #[test]
    fn test_encode_iso8859_1() {
        let enc = Charset::Iso8859_1.encode("Ñandú").unwrap();
        assert_eq!(enc.bytes(), &[0xD1, b'a', b'n', b'd', 0xFA]);
    }

    #[test]
    fn test_encode_iso8859_1_rejects_wide_char() {
        let err = Charset::Iso8859_1.encode("abc€").unwrap_err();
        assert_eq!(err, QRError::CharsetEncodingFailed { index: 3, charset: Charset::Iso8859_1 });
    }

    #[test]
    fn test_encode_shift_jis() {
        let enc = Charset::ShiftJis.encode("日本a").unwrap();
        assert_eq!(enc.len(), 3);
        assert_eq!(enc.unit(0), &[0x93, 0xFA]);
        assert_eq!(enc.unit(1), &[0x96, 0x7B]);
        assert_eq!(enc.unit(2), b"a");
    }

    #[test]
    fn test_encode_shift_jis_rejects_unmapped_char() {
        let err = Charset::ShiftJis.encode("a😀").unwrap_err();
        assert_eq!(err, QRError::CharsetEncodingFailed { index: 1, charset: Charset::ShiftJis });
    }

    #[test]
    fn test_decode() {
        assert_eq!(Charset::Iso8859_1.decode(&[0xD1, b'a']).unwrap(), "Ña");
        assert_eq!(Charset::ShiftJis.decode(&[0x93, 0xFA, 0x96, 0x7B]).unwrap(), "日本");
        assert_eq!(Charset::Utf8.decode(&[0xFF]), Err(QRError::CharsetDecodingFailed));
    }

    #[test]
    fn test_eci_designator() {
        for cs in [Charset::Utf8, Charset::Iso8859_1, Charset::ShiftJis] {
            assert_eq!(Charset::from_eci_designator(cs.eci_designator() as u32), Some(cs));
        }
        assert_eq!(Charset::from_eci_designator(899), None);
    }
}
