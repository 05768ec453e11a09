//! # qrkit
//!
//! A self-contained QR Code encoder following ISO/IEC 18004, with a renderer for common
//! image formats and a matrix reader.
//!
//! ## Features
//!
//! - **Segmentation**: Optimal mix of numeric, alphanumeric, byte and kanji segments
//! - **Versions 1-40**: Smallest fitting version is picked unless one is forced
//! - **Reed-Solomon Error Correction**: Levels L, M, Q and H over GF(256)
//! - **Charsets**: UTF-8, ISO-8859-1 and Shift_JIS, optionally declared with ECI
//! - **Rendering**: PNG, JPEG, BMP and GIF output through the `image` crate
//! - **Reading**: Decodes a module matrix back to its payload, correcting errors
//!
//! ## Quick Start
//!
//! ```rust
//! use qrkit::{encode, MatrixView, QRConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Smallest version, EC level L, 2 module margin
//! let qr = encode("Hello, World!", QRConfig::default())?;
//! assert_eq!(qr.size(), 21);
//! println!("{}", qr.to_str(1));
//! # Ok(())
//! # }
//! ```
//!
//! ### Full Configuration
//!
//! ```rust
//! use qrkit::{encode, Charset, ECLevel, QRConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = QRConfig {
//!     charset: Charset::ShiftJis, // Byte segments are transcoded, kanji mode is enabled
//!     ec_level: ECLevel::Q,       // Defaults to ECLevel::L
//!     margin: 4,                  // Quiet zone used by renderers, defaults to 2
//!     version: Some(3),           // Smallest fitting version if not provided
//!     mask: Some(5),              // Lowest penalty mask if not provided
//!     ..Default::default()
//! };
//! let qr = encode("日本語のテキスト", config)?;
//! assert_eq!(*qr.version(), 3);
//! # Ok(())
//! # }
//! ```
//!
//! ### Rendering
//!
//! ```rust
//! use std::io::Cursor;
//!
//! use qrkit::{encode, write_image, QRConfig, RenderConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let qr = encode("https://example.com", QRConfig::default())?;
//! let cfg = RenderConfig { width: 200, height: 200, format: "png".to_string() };
//! let mut png = Cursor::new(Vec::new());
//! write_image(&qr, qr.margin(), &cfg, &mut png)?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Reading a QR Code
//!
//! ```rust
//! use qrkit::{encode, reader, Charset, QRConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let qr = encode("HELLO WORLD", QRConfig::default())?;
//! let (metadata, message) = reader::read(&qr, Charset::Utf8)?;
//! assert_eq!(message, "HELLO WORLD");
//! println!("{metadata}");
//! # Ok(())
//! # }
//! ```
//!
//! ## QR Code Components
//!
//! ### Versions
//! Versions 1-40, with sizes from 21x21 to 177x177 modules
//!
//! ### Error Correction Levels
//! - **L (Low)**: ~7% error correction
//! - **M (Medium)**: ~15% error correction
//! - **Q (Quartile)**: ~25% error correction
//! - **H (High)**: ~30% error correction

#![allow(clippy::items_after_test_module, clippy::suspicious_arithmetic_impl)]

pub mod builder;
pub(crate) mod common;
pub mod reader;
pub mod render;

pub use builder::{encode, MatrixView, Module, QRConfig, QR};
pub use common::charset::Charset;
pub use common::codec::Mode;
pub use common::error::{QRError, QRResult};
pub use common::mask::{penalty_scores, MaskPattern};
pub use common::metadata::{Color, ECLevel, Metadata, Version};
pub use render::{render, write_image, ImageFormat, RenderConfig};
