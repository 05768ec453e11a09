use std::io::{Seek, Write};
use std::str::FromStr;

use image::{DynamicImage, GrayImage, Luma};
use tracing::debug;

use crate::builder::MatrixView;
use crate::common::error::{QRError, QRResult};

// Render config
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    // Requested pixel box. Grown to fit the symbol at one pixel per module if smaller.
    pub width: u32,
    pub height: u32,
    pub format: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { width: 300, height: 300, format: "png".to_string() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Bmp,
    Gif,
}

impl FromStr for ImageFormat {
    type Err = QRError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "bmp" => Ok(Self::Bmp),
            "gif" => Ok(Self::Gif),
            _ => Err(QRError::UnsupportedImageFormat(s.to_string())),
        }
    }
}

impl From<ImageFormat> for image::ImageFormat {
    fn from(fmt: ImageFormat) -> Self {
        match fmt {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Bmp => image::ImageFormat::Bmp,
            ImageFormat::Gif => image::ImageFormat::Gif,
        }
    }
}

// Render
//------------------------------------------------------------------------------

// Draws the symbol with `margin` light modules around it, scaled by the largest
// whole factor that fits the requested box and centred in it
pub fn render(view: &impl MatrixView, margin: usize, cfg: &RenderConfig) -> QRResult<GrayImage> {
    let full = margin
        .checked_mul(2)
        .and_then(|m| m.checked_add(view.size()))
        .and_then(|f| u32::try_from(f).ok())
        .ok_or_else(|| QRError::InvalidParameter(format!("Margin {margin} too large to render")))?;
    let out_w = cfg.width.max(full);
    let out_h = cfg.height.max(full);
    let module_sz = (out_w / full).min(out_h / full).max(1);
    let qr_sz = full * module_sz;
    let margin_px = (full - view.size() as u32) / 2 * module_sz;
    let off_x = (out_w - qr_sz) / 2 + margin_px;
    let off_y = (out_h - qr_sz) / 2 + margin_px;

    debug!(width = out_w, height = out_h, module_sz, "Rendering QR");

    let mut canvas = GrayImage::from_pixel(out_w, out_h, Luma([255]));
    let n = view.size();
    for r in 0..n {
        for c in 0..n {
            if !view.module(r, c) {
                continue;
            }
            let x = off_x + c as u32 * module_sz;
            let y = off_y + r as u32 * module_sz;
            for i in 0..module_sz {
                for j in 0..module_sz {
                    canvas.put_pixel(x + j, y + i, Luma([0]));
                }
            }
        }
    }
    Ok(canvas)
}

// Renders and encodes the image in the configured format into `writer`
pub fn write_image<W: Write + Seek>(
    view: &impl MatrixView,
    margin: usize,
    cfg: &RenderConfig,
    writer: &mut W,
) -> QRResult<()> {
    let fmt = cfg.format.parse::<ImageFormat>()?;
    let img = DynamicImage::ImageLuma8(render(view, margin, cfg)?).into_rgb8();
    img.write_to(writer, fmt.into()).map_err(|e| QRError::RenderFailed(e.to_string()))
}
