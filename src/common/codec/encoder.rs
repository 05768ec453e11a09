pub use encode::*;

// Encoder
//------------------------------------------------------------------------------

pub mod encode {
    use std::mem::swap;

    use tracing::{debug, trace};

    use crate::common::bit_utils::BitStream;
    use crate::common::charset::{Charset, EncodedText};
    use crate::common::codec::{Mode, Segment, MODES};
    use crate::common::error::{QRError, QRResult};
    use crate::common::metadata::{ECLevel, Version};

    use super::writer::{pad_remaining_capacity, push_eci, push_segment, push_terminator};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct EncodeHints {
        pub charset: Charset,
        pub version: Option<Version>,
        pub mode: Option<Mode>,
        pub eci: bool,
    }

    impl EncodeHints {
        fn header_bits(&self) -> usize {
            if self.eci {
                4 + 8
            } else {
                0
            }
        }

        // Kanji mode is only meaningful when the payload is Shift_JIS bytes
        fn modes(&self) -> &'static [Mode] {
            match self.charset {
                Charset::ShiftJis => &MODES,
                _ => &MODES[..3],
            }
        }
    }

    pub fn encode(
        text: &EncodedText,
        ecl: ECLevel,
        hints: &EncodeHints,
    ) -> QRResult<(BitStream, Version)> {
        if text.is_empty() {
            return Err(QRError::EmptyPayload);
        }
        if let Some(mode) = hints.mode {
            check_forced_mode(text, mode, hints)?;
        }

        let (ver, segs) = match hints.version {
            Some(ver) => (ver, segments_for_version(text, ver, ecl, hints)?),
            None => find_optimal_version_and_segments(text, ecl, hints)?,
        };

        debug!(
            version = *ver,
            segments = segs.len(),
            modes = ?segs.iter().map(|s| s.mode).collect::<Vec<_>>(),
            "Segmented payload"
        );

        let bcap = ver.data_bit_capacity(ecl);
        let mut bs = BitStream::new(bcap);
        if hints.eci {
            push_eci(hints.charset, &mut bs);
        }
        for seg in segs {
            push_segment(seg, &mut bs);
        }

        push_terminator(&mut bs);
        pad_remaining_capacity(&mut bs);
        Ok((bs, ver))
    }

    fn check_forced_mode(text: &EncodedText, mode: Mode, hints: &EncodeHints) -> QRResult<()> {
        if !hints.modes().contains(&mode) {
            return Err(QRError::InvalidParameter(format!(
                "{mode:?} mode cannot encode {} payloads",
                hints.charset
            )));
        }
        match (0..text.len()).find(|&i| !mode.contains(text.unit(i))) {
            Some(index) => Err(QRError::CharacterNotInForcedMode { index, mode }),
            None => Ok(()),
        }
    }

    fn segments_for_version<'a>(
        text: &'a EncodedText,
        ver: Version,
        ecl: ECLevel,
        hints: &EncodeHints,
    ) -> QRResult<Vec<Segment<'a>>> {
        let bcap = ver.data_bit_capacity(ecl);
        let segs = compute_segments(text, ver, hints);
        let sz = hints.header_bits() + segs.iter().map(|s| s.bit_len()).sum::<usize>();
        if sz > bcap {
            return Err(QRError::PayloadTooLarge { version: ver, required: sz, available: bcap });
        }
        Ok(segs)
    }

    pub(crate) fn find_optimal_version_and_segments<'a>(
        text: &'a EncodedText,
        ecl: ECLevel,
        hints: &EncodeHints,
    ) -> QRResult<(Version, Vec<Segment<'a>>)> {
        let mut segs = vec![];
        let mut sz = 0;
        for ver in Version::all() {
            let bcap = ver.data_bit_capacity(ecl);
            if matches!(*ver, 1 | 10 | 27) {
                segs = compute_segments(text, ver, hints);
                sz = hints.header_bits() + segs.iter().map(|s| s.bit_len()).sum::<usize>();
                trace!(version = *ver, bits = sz, "Segmented for version range");
            }
            if sz <= bcap {
                return Ok((ver, segs));
            }
        }
        Err(QRError::PayloadTooLarge {
            version: Version::MAX,
            required: sz,
            available: Version::MAX.data_bit_capacity(ecl),
        })
    }

    fn compute_segments<'a>(
        text: &'a EncodedText,
        ver: Version,
        hints: &EncodeHints,
    ) -> Vec<Segment<'a>> {
        let char_modes = match hints.mode {
            Some(mode) => vec![mode; text.len()],
            None => compute_optimal_modes(text, ver, hints.modes()),
        };
        build_segments(ver, char_modes, text)
    }

    // Dynamic programming over chars to find the cheapest mode for each. Costs are bits
    // scaled by 6 so numeric (10/3) and alphanumeric (11/2) widths stay integral.
    pub(crate) fn compute_optimal_modes(
        text: &EncodedText,
        ver: Version,
        modes: &[Mode],
    ) -> Vec<Mode> {
        debug_assert!(!text.is_empty(), "Empty data");

        let n = modes.len();
        let header_cost = |m: Mode| (ver.mode_bits() + ver.char_cnt_bits(m)) * 6;
        let mut prev_cost: Vec<usize> = modes.iter().map(|&m| header_cost(m)).collect();
        let mut cur_cost = vec![usize::MAX; n];
        let mut min_path = vec![vec![usize::MAX; n]; text.len()];
        for i in 0..text.len() {
            let unit = text.unit(i);
            for (j, to_mode) in modes.iter().enumerate() {
                if !to_mode.contains(unit) {
                    continue;
                }
                let char_cost = to_mode.scaled_char_cost(unit);
                // Staying in the same mode is tried first so that ties keep fewer segments
                let from = std::iter::once(j).chain((0..n).filter(|&k| k != j));
                for k in from {
                    if prev_cost[k] == usize::MAX {
                        continue;
                    }
                    let base = if k == j {
                        prev_cost[k]
                    } else {
                        prev_cost[k].div_ceil(6) * 6 + header_cost(*to_mode)
                    };
                    let cost = base + char_cost;
                    if cost < cur_cost[j] {
                        cur_cost[j] = cost;
                        min_path[i][j] = k;
                    }
                }
            }
            swap(&mut prev_cost, &mut cur_cost);
            cur_cost.fill(usize::MAX);
        }

        trace_optimal_modes(&min_path, &prev_cost, modes)
    }

    // Backtrack min_path from the cheapest final mode
    fn trace_optimal_modes(min_path: &[Vec<usize>], cost: &[usize], modes: &[Mode]) -> Vec<Mode> {
        let final_cost = |i: usize| cost[i].checked_next_multiple_of(6).unwrap_or(usize::MAX);
        let mut mode_index = 0;
        for i in 1..modes.len() {
            if final_cost(i) < final_cost(mode_index) {
                mode_index = i;
            }
        }
        let mut res = vec![modes[0]; min_path.len()];
        for (i, path) in min_path.iter().enumerate().rev() {
            res[i] = modes[mode_index];
            mode_index = path[mode_index];
        }
        res
    }

    // Groups runs of equal modes into segments, splitting runs whose char count would
    // overflow the count indicator
    pub(crate) fn build_segments(
        ver: Version,
        char_modes: Vec<Mode>,
        text: &EncodedText,
    ) -> Vec<Segment<'_>> {
        let mut segs: Vec<Segment> = vec![];
        let mut seg_start = 0;
        for i in 1..=char_modes.len() {
            if i < char_modes.len() && char_modes[i] == char_modes[seg_start] {
                continue;
            }
            let mode = char_modes[seg_start];
            let len_bits = ver.char_cnt_bits(mode);
            let max_cnt = (1 << len_bits) - 1;
            let mut start = seg_start;
            let mut cnt = 0;
            for j in seg_start..i {
                let unit_cnt = if mode == Mode::Byte { text.unit(j).len() } else { 1 };
                if cnt + unit_cnt > max_cnt {
                    segs.push(Segment::new(mode, ver.mode_bits(), len_bits, text.slice(start, j)));
                    start = j;
                    cnt = 0;
                }
                cnt += unit_cnt;
            }
            segs.push(Segment::new(mode, ver.mode_bits(), len_bits, text.slice(start, i)));
            seg_start = i;
        }
        segs
    }

}

// Writer for encoded data
//------------------------------------------------------------------------------

pub(super) mod writer {
    use crate::common::bit_utils::BitStream;
    use crate::common::charset::Charset;
    use crate::common::codec::{Mode, Segment, PADDING_CODEWORDS};

    pub fn push_eci(charset: Charset, out: &mut BitStream) {
        out.push_bits(Mode::Eci as u8, 4);
        out.push_bits(charset.eci_designator(), 8);
    }

    pub fn push_segment(seg: Segment, out: &mut BitStream) {
        push_header(&seg, out);
        match seg.mode {
            Mode::Numeric => push_numeric_data(seg.data, out),
            Mode::Alphanumeric => push_alphanumeric_data(seg.data, out),
            Mode::Byte => push_byte_data(seg.data, out),
            Mode::Kanji => push_kanji_data(seg.data, out),
            Mode::Eci | Mode::Terminator => unreachable!("{:?} segments carry no data", seg.mode),
        }
    }

    fn push_header(seg: &Segment, out: &mut BitStream) {
        out.push_bits(seg.mode as u8, seg.mode_bits);
        let char_cnt = seg.char_count();
        debug_assert!(
            char_cnt < (1 << seg.len_bits),
            "Char count exceeds bit length: Char count {char_cnt}, Char count bits {}",
            seg.len_bits
        );
        out.push_bits(char_cnt as u16, seg.len_bits);
    }

    fn push_numeric_data(data: &[u8], out: &mut BitStream) {
        for chunk in data.chunks(3) {
            let len = Mode::Numeric.encoded_len(chunk.len());
            let data = Mode::Numeric.encode_chunk(chunk);
            out.push_bits(data, len);
        }
    }

    fn push_alphanumeric_data(data: &[u8], out: &mut BitStream) {
        for chunk in data.chunks(2) {
            let len = Mode::Alphanumeric.encoded_len(chunk.len());
            let data = Mode::Alphanumeric.encode_chunk(chunk);
            out.push_bits(data, len);
        }
    }

    fn push_byte_data(data: &[u8], out: &mut BitStream) {
        for &b in data {
            out.push_bits(b, 8);
        }
    }

    fn push_kanji_data(data: &[u8], out: &mut BitStream) {
        for chunk in data.chunks(2) {
            out.push_bits(Mode::Kanji.encode_chunk(chunk), 13);
        }
    }

    pub fn push_terminator(out: &mut BitStream) {
        let bit_len = out.len();
        let bit_capacity = out.capacity();
        if bit_len < bit_capacity {
            let term_len = std::cmp::min(4, bit_capacity - bit_len);
            out.push_bits(0u8, term_len);
        }
    }

    pub fn pad_remaining_capacity(out: &mut BitStream) {
        push_padding_bits(out);
        push_padding_codewords(out);
    }

    fn push_padding_bits(out: &mut BitStream) {
        let offset = out.len() & 7;
        if offset > 0 {
            let padding_bits_len = 8 - offset;
            out.push_bits(0u8, padding_bits_len);
        }
    }

    fn push_padding_codewords(out: &mut BitStream) {
        let offset = out.len() & 7;
        debug_assert!(
            offset == 0,
            "Bit offset should be zero before padding codewords: {}",
            offset
        );

        let remain_byte_capacity = (out.capacity() - out.len()) >> 3;
        PADDING_CODEWORDS.iter().copied().cycle().take(remain_byte_capacity).for_each(|pc| {
            out.push_bits(pc, 8);
        });
    }

}
