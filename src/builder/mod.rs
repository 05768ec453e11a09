mod qr;

pub use qr::{Module, QR};

use tracing::debug;

use crate::common::{
    bit_utils::BitStream,
    charset::Charset,
    codec::{encode as encode_text, EncodeHints, Mode},
    ec::{compute_ecc, error_correction_capacity, interleave},
    error::{QRError, QRResult},
    mask::{apply_best_mask, MaskPattern},
    metadata::{ECLevel, Version},
};

// Read-only access to a finished module matrix, quiet zone excluded
pub trait MatrixView {
    fn size(&self) -> usize;

    // True for dark modules. Both indices are 0 based from the top left corner.
    fn module(&self, row: usize, col: usize) -> bool;
}

// Config
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QRConfig {
    pub charset: Charset,
    pub ec_level: ECLevel,
    // Quiet zone in modules, carried along for renderers
    pub margin: i32,
    // Smallest fitting version when unset
    pub version: Option<usize>,
    // Lowest penalty mask when unset
    pub mask: Option<u8>,
    // Optimal segmentation when unset
    pub mode: Option<Mode>,
    // Declares the charset with an ECI designator ahead of the data
    pub eci: bool,
}

impl Default for QRConfig {
    fn default() -> Self {
        Self {
            charset: Charset::Utf8,
            ec_level: ECLevel::L,
            margin: 2,
            version: None,
            mask: None,
            mode: None,
            eci: false,
        }
    }
}

impl QRConfig {
    fn validate(&self) -> QRResult<(usize, Option<Version>, Option<MaskPattern>)> {
        let margin = usize::try_from(self.margin).map_err(|_| {
            QRError::InvalidParameter(format!("margin {} is negative", self.margin))
        })?;
        let version = self.version.map(Version::new).transpose()?;
        let mask = match self.mask {
            Some(m) if m >= 8 => {
                return Err(QRError::InvalidParameter(format!("mask {m} is outside 0..=7")))
            }
            m => m.map(MaskPattern::new),
        };
        if matches!(self.mode, Some(Mode::Eci | Mode::Terminator)) {
            return Err(QRError::InvalidParameter(format!(
                "{:?} cannot carry payload data",
                self.mode
            )));
        }
        Ok((margin, version, mask))
    }
}


// Encode
//------------------------------------------------------------------------------

pub fn encode(payload: &str, config: QRConfig) -> QRResult<QR> {
    let (margin, version, mask) = config.validate()?;
    let ecl = config.ec_level;

    if payload.is_empty() {
        return Err(QRError::EmptyPayload);
    }

    // Transcode and segment
    let text = config.charset.encode(payload)?;
    let hints = EncodeHints { charset: config.charset, version, mode: config.mode, eci: config.eci };
    let (encoded, ver) = encode_text(&text, ecl, &hints)?;

    debug!(
        version = *ver,
        ec_level = ?ecl,
        chars = text.len(),
        data_codewords = ver.data_codewords(ecl),
        error_capacity = error_correction_capacity(ver, ecl),
        "Encoded payload"
    );

    // Compute error correction codewords and interleave
    let (data_blocks, ecc_blocks) = compute_ecc(encoded.data(), ver, ecl);
    let mut codewords = interleave(&data_blocks);
    codewords.extend(interleave(&ecc_blocks));
    debug_assert_eq!(codewords.len(), ver.total_codewords(), "Codeword count mismatch");

    debug!(blocks = data_blocks.len(), codewords = codewords.len(), "Interleaved codewords");

    // Construct QR
    let mut qr = QR::new(ver, ecl, config.charset, margin);
    qr.draw_all_function_patterns();
    qr.draw_encoding_region(BitStream::from(&codewords));

    let mask = match mask {
        Some(m) => {
            qr.apply_mask(m);
            m
        }
        None => apply_best_mask(&mut qr),
    };

    debug!(
        mask = *mask,
        dark_modules = qr.count_dark_modules(),
        width = qr.width(),
        "Generated QR"
    );

    Ok(qr)
}

#[cfg(test)]
mod builder_tests {
    use test_case::test_case;

    use super::{encode, MatrixView, Module, QRConfig};
    use crate::common::charset::Charset;
    use crate::common::codec::Mode;
    use crate::common::error::QRError;
    use crate::common::mask::{penalty_scores, MaskPattern};
    use crate::common::metadata::{ECLevel, Version};

    #[test]
    fn test_hello_labs() {
        let cfg = QRConfig { ec_level: ECLevel::H, margin: 1, ..Default::default() };
        let qr = encode("Hello Labs64!", cfg).unwrap();
        assert_eq!(qr.version(), Version::new(2).unwrap());
        assert_eq!(qr.size(), 25);
        assert_eq!(qr.margin(), 1);
    }

    #[test]
    fn test_numeric_version_1() {
        let cfg = QRConfig { ec_level: ECLevel::M, margin: 4, ..Default::default() };
        let qr = encode("01234567", cfg).unwrap();
        assert_eq!(*qr.version(), 1);
        assert_eq!(qr.size(), 21);
    }

    #[test]
    fn test_empty_payload() {
        assert_eq!(encode("", QRConfig::default()), Err(QRError::EmptyPayload));
    }

    #[test]
    fn test_payload_too_large() {
        let cfg = QRConfig { ec_level: ECLevel::H, ..Default::default() };
        let err = encode(&"A".repeat(10000), cfg).unwrap_err();
        assert!(matches!(err, QRError::PayloadTooLarge { .. }));
    }

    #[test]
    fn test_forced_version_too_small() {
        let cfg = QRConfig { version: Some(1), ..Default::default() };
        let err = encode(&"a".repeat(40), cfg).unwrap_err();
        assert!(matches!(err, QRError::PayloadTooLarge { .. }));
    }

    #[test]
    fn test_charset_failure() {
        let cfg = QRConfig { charset: Charset::Iso8859_1, ..Default::default() };
        assert_eq!(
            encode("ab日", cfg),
            Err(QRError::CharsetEncodingFailed { index: 2, charset: Charset::Iso8859_1 })
        );
    }

    #[test]
    fn test_forced_mode_failure() {
        let cfg = QRConfig { mode: Some(Mode::Numeric), ..Default::default() };
        assert_eq!(
            encode("12a4", cfg),
            Err(QRError::CharacterNotInForcedMode { index: 2, mode: Mode::Numeric })
        );
    }

    #[test_case(0)]
    #[test_case(3)]
    #[test_case(7)]
    fn test_forced_mask(m: u8) {
        let cfg = QRConfig { mask: Some(m), ..Default::default() };
        let qr = encode("forced mask", cfg).unwrap();
        assert_eq!(qr.mask(), Some(MaskPattern::new(m)));
    }

    #[test_case("HELLO WORLD", ECLevel::Q)]
    #[test_case("https://example.com/a?b=c", ECLevel::L)]
    #[test_case(&"0123456789".repeat(40), ECLevel::M)]
    fn test_best_mask_is_minimal(data: &str, ecl: ECLevel) {
        let cfg = QRConfig { ec_level: ecl, ..Default::default() };
        let qr = encode(data, cfg).unwrap();
        let scores = penalty_scores(&qr);
        let min = *scores.iter().min().unwrap();
        let first_min = scores.iter().position(|&s| s == min).unwrap();
        assert_eq!(qr.mask(), Some(MaskPattern::new(first_min as u8)));
    }

    #[test]
    fn test_all_modules_set() {
        let qr = encode("Every module gets a value", QRConfig::default()).unwrap();
        assert!(!qr.grid().contains(&Module::Empty));
        let w = qr.size();
        assert!(qr.module(w - 8, 8));
    }
}
