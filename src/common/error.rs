use super::{charset::Charset, codec::Mode, metadata::Version};

// Error
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Clone, thiserror::Error)]
pub enum QRError {
    // Encoder
    #[error("Empty payload")]
    EmptyPayload,
    #[error("Character at index {index} cannot be encoded in {charset}")]
    CharsetEncodingFailed { index: usize, charset: Charset },
    #[error("Character at index {index} is not in the {mode:?} alphabet")]
    CharacterNotInForcedMode { index: usize, mode: Mode },
    #[error("Payload too large: {required} bits required, {available} bits available in version {version}")]
    PayloadTooLarge { version: Version, required: usize, available: usize },
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    // Renderer
    #[error("Unsupported image format: {0}")]
    UnsupportedImageFormat(String),
    #[error("Failed to render image: {0}")]
    RenderFailed(String),

    // Reader
    #[error("Invalid format info detected")]
    InvalidFormatInfo,
    #[error("Invalid version info detected")]
    InvalidVersionInfo,
    #[error("Too many errors to correct successfully")]
    TooManyErrors,
    #[error("Corrupt data segment")]
    CorruptDataSegment,
    #[error("Invalid mode indicator {0:#06b}")]
    InvalidMode(u8),
    #[error("Decoded bytes are not valid in the declared charset")]
    CharsetDecodingFailed,
}

pub type QRResult<T> = Result<T, QRError>;

#[cfg(test)]
mod error_tests {
    use super::QRError;
    use crate::common::{charset::Charset, codec::Mode, metadata::Version};

    #[test]
    fn test_display_carries_context() {
        let err = QRError::PayloadTooLarge {
            version: Version::new(40).unwrap(),
            required: 55012,
            available: 10208,
        };
        assert_eq!(
            err.to_string(),
            "Payload too large: 55012 bits required, 10208 bits available in version 40"
        );

        let err = QRError::CharsetEncodingFailed { index: 3, charset: Charset::Iso8859_1 };
        assert_eq!(err.to_string(), "Character at index 3 cannot be encoded in ISO-8859-1");

        let err = QRError::CharacterNotInForcedMode { index: 0, mode: Mode::Numeric };
        assert_eq!(err.to_string(), "Character at index 0 is not in the Numeric alphabet");
    }
}
