use std::cmp::Ordering;

// Mode
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum Mode {
    Numeric = 0b0001,
    Alphanumeric = 0b0010,
    Byte = 0b0100,
    Kanji = 0b1000,
    Eci = 0b0111,
    Terminator = 0b0000,
}

impl PartialOrd for Mode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Preference order when two segmentations cost the same
impl Ord for Mode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl Mode {
    fn rank(self) -> u8 {
        match self {
            Self::Numeric => 0,
            Self::Alphanumeric => 1,
            Self::Byte => 2,
            Self::Kanji => 3,
            Self::Eci => 4,
            Self::Terminator => 5,
        }
    }

    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0b0000 => Some(Self::Terminator),
            0b0001 => Some(Self::Numeric),
            0b0010 => Some(Self::Alphanumeric),
            0b0100 => Some(Self::Byte),
            0b1000 => Some(Self::Kanji),
            0b0111 => Some(Self::Eci),
            _ => None,
        }
    }

    #[inline]
    fn numeric_digit(char: u8) -> u16 {
        debug_assert!(char.is_ascii_digit(), "Invalid numeric data: {char}");
        (char - b'0') as u16
    }

    #[inline]
    fn alphanumeric_digit(char: u8) -> u16 {
        debug_assert!(is_alphanumeric(char), "Invalid alphanumeric data: {char}");
        match char {
            b'0'..=b'9' => (char - b'0') as u16,
            b'A'..=b'Z' => (char - b'A' + 10) as u16,
            b' ' => 36,
            b'$' => 37,
            b'%' => 38,
            b'*' => 39,
            b'+' => 40,
            b'-' => 41,
            b'.' => 42,
            b'/' => 43,
            b':' => 44,
            _ => unreachable!("Invalid alphanumeric {char}"),
        }
    }

    #[inline]
    fn alphanumeric_byte(mode_digit: u8) -> u8 {
        match mode_digit {
            md @ 0..=9 => md + b'0',
            md @ 10..=35 => md - 10 + b'A',
            36 => b' ',
            37 => b'$',
            38 => b'%',
            39 => b'*',
            40 => b'+',
            41 => b'-',
            42 => b'.',
            43 => b'/',
            _ => b':',
        }
    }

    // Whether one char, given as its bytes in the declared charset, is in the mode's alphabet
    pub fn contains(&self, unit: &[u8]) -> bool {
        match (self, unit) {
            (Self::Numeric, [b]) => b.is_ascii_digit(),
            (Self::Alphanumeric, [b]) => is_alphanumeric(*b),
            (Self::Byte, _) => !unit.is_empty(),
            (Self::Kanji, [hi, lo]) => {
                let sjis = u16::from_be_bytes([*hi, *lo]);
                matches!(sjis, 0x8140..=0x9FFC | 0xE040..=0xEBBF) && matches!(lo, 0x40..=0xFC)
            }
            _ => false,
        }
    }

    pub fn encode_chunk(&self, data: &[u8]) -> u16 {
        let len = data.len();
        match self {
            Self::Numeric => {
                debug_assert!(len <= 3, "Data is too long for numeric conversion: {len}");
                data.iter().fold(0_u16, |n, b| n * 10 + Self::numeric_digit(*b))
            }
            Self::Alphanumeric => {
                debug_assert!(len <= 2, "Data is too long for alphanumeric conversion: {len}");
                data.iter().fold(0_u16, |n, b| n * 45 + Self::alphanumeric_digit(*b))
            }
            Self::Byte => {
                debug_assert!(len == 1, "Data is too long for byte conversion: {len}");
                data[0] as u16
            }
            Self::Kanji => {
                debug_assert!(len == 2, "Kanji chars are double byte: {len}");
                let sjis = u16::from_be_bytes([data[0], data[1]]);
                let diff = if sjis <= 0x9FFC { sjis - 0x8140 } else { sjis - 0xC140 };
                (diff >> 8) * 0xC0 + (diff & 0xFF)
            }
            Self::Eci => unreachable!("Cannot encode in ECI mode"),
            Self::Terminator => unreachable!("Cannot encode in terminator mode"),
        }
    }

    pub fn decode_chunk(&self, data: u16, bit_len: usize) -> Vec<u8> {
        match self {
            Self::Numeric => Self::decode_numeric_chunk(data, bit_len),
            Self::Alphanumeric => Self::decode_alphanumeric_chunk(data, bit_len),
            Self::Byte => {
                debug_assert!(bit_len == 8, "Invalid byte encoded length: {bit_len}");

                vec![data as u8]
            }
            Self::Kanji => Self::decode_kanji_chunk(data),
            Self::Eci => unreachable!("Cannot decode in ECI mode"),
            Self::Terminator => unreachable!("Cannot decode in terminator mode"),
        }
    }

    fn decode_numeric_chunk(mut data: u16, bit_len: usize) -> Vec<u8> {
        debug_assert!(
            bit_len == 10 || bit_len == 7 || bit_len == 4,
            "Invalid numeric encoded length: {bit_len}"
        );

        let len = bit_len / 3;
        let mut res = vec![0; len];
        for i in 0..len {
            res[len - 1 - i] = (data % 10) as u8 + b'0';
            data /= 10;
        }
        res
    }

    fn decode_alphanumeric_chunk(mut data: u16, bit_len: usize) -> Vec<u8> {
        debug_assert!(
            bit_len == 11 || bit_len == 6,
            "Invalid alphanumeric encoded length: {bit_len}"
        );

        let len = bit_len / 5;
        let mut res = vec![0; len];
        for i in 0..len {
            res[len - 1 - i] = Self::alphanumeric_byte((data % 45) as u8);
            data /= 45;
        }
        res
    }

    fn decode_kanji_chunk(data: u16) -> Vec<u8> {
        let msbyte = data / 0xC0;
        let lsbyte = data % 0xC0;
        let temp = ((msbyte << 8) | lsbyte) + 0x8140;
        let sjw = if temp <= 0x9FFC { temp } else { temp + 0x4000 };

        sjw.to_be_bytes().to_vec()
    }

    // Payload bits for `len` chars
    pub fn encoded_len(&self, len: usize) -> usize {
        match *self {
            Self::Numeric => (len * 10).div_ceil(3),
            Self::Alphanumeric => (len * 11).div_ceil(2),
            Self::Byte => len * 8,
            Self::Kanji => len * 13,
            Self::Eci => 8,
            Self::Terminator => 0,
        }
    }

    // Payload bits of one char scaled by 6, so fractional widths stay integral
    pub(crate) fn scaled_char_cost(&self, unit: &[u8]) -> usize {
        match self {
            Self::Numeric => 20,
            Self::Alphanumeric => 33,
            Self::Byte => unit.len() * 48,
            Self::Kanji => 78,
            Self::Eci | Self::Terminator => unreachable!("{self:?} has no chars"),
        }
    }
}

#[inline]
fn is_alphanumeric(byte: u8) -> bool {
    matches!(byte, b'0'..=b'9' | b'A'..=b'Z' | b' ' | b'$' | b'%' | b'*' | b'+' | b'-' | b'.' | b'/' | b':')
}


// Segment
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Segment<'a> {
    pub mode: Mode,
    pub mode_bits: usize, // Bit len of mode
    pub len_bits: usize,  // Bit len of char count
    pub data: &'a [u8],   // Bytes in the declared charset
}

impl<'a> Segment<'a> {
    pub fn new(mode: Mode, mode_bits: usize, len_bits: usize, data: &'a [u8]) -> Self {
        Self { mode, mode_bits, len_bits, data }
    }

    // Value of the char count indicator
    pub fn char_count(&self) -> usize {
        match self.mode {
            Mode::Kanji => self.data.len() / 2,
            _ => self.data.len(),
        }
    }

    pub fn bit_len(&self) -> usize {
        let encoded_bits = self.mode.encoded_len(self.char_count());
        self.mode_bits + self.len_bits + encoded_bits
    }
}

#[cfg(test)]
mod segment_tests {
    use test_case::test_case;

    use super::{Mode, Segment};
    use crate::common::metadata::Version;

    #[test_case(1, Mode::Numeric, "123", 24)]
    #[test_case(1, Mode::Numeric, "45", 21)]
    #[test_case(1, Mode::Numeric, "6", 18)]
    #[test_case(10, Mode::Numeric, "123", 26)]
    #[test_case(27, Mode::Numeric, "6", 22)]
    #[test_case(1, Mode::Alphanumeric, "AZ", 24)]
    #[test_case(10, Mode::Alphanumeric, "-", 21)]
    #[test_case(27, Mode::Alphanumeric, "AZ", 28)]
    #[test_case(1, Mode::Byte, "a", 20)]
    #[test_case(10, Mode::Byte, "ab", 36)]
    #[test_case(27, Mode::Byte, "abc", 44)]
    fn test_bit_len(v: usize, mode: Mode, data: &str, exp: usize) {
        let ver = Version::new(v).unwrap();
        let seg = Segment::new(mode, ver.mode_bits(), ver.char_cnt_bits(mode), data.as_bytes());
        assert_eq!(seg.bit_len(), exp);
    }

    #[test]
    fn test_kanji_char_count() {
        let ver = Version::new(1).unwrap();
        let data = [0x93, 0xFA, 0x96, 0x7B];
        let seg = Segment::new(Mode::Kanji, 4, ver.char_cnt_bits(Mode::Kanji), &data);
        assert_eq!(seg.char_count(), 2);
        assert_eq!(seg.bit_len(), 4 + 8 + 26);
    }
}

// Global constants
//------------------------------------------------------------------------------

pub static PADDING_CODEWORDS: [u8; 2] = [0b1110_1100, 0b0001_0001];

pub static MODES: [Mode; 4] = [Mode::Numeric, Mode::Alphanumeric, Mode::Byte, Mode::Kanji];
