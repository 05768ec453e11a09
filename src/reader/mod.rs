//! Reads the payload back out of a module matrix.
//!
//! The reader expects an axis-aligned matrix without quiet zone, as produced by
//! [`crate::encode`] or sampled by a detector. It tolerates bit errors in format and
//! version info and codeword errors up to the Reed-Solomon capacity of each block.

use tracing::debug;

use crate::builder::{MatrixView, Module, QR};
use crate::common::bit_utils::BitStream;
use crate::common::charset::Charset;
use crate::common::codec::decode;
use crate::common::ec::{rectify_info, Block};
use crate::common::error::{QRError, QRResult};
use crate::common::iter::EncRegionIter;
use crate::common::mask::MaskPattern;
use crate::common::metadata::*;

// Reads metadata and payload. `charset` decodes byte segments unless the symbol
// declares its own with an ECI designator.
pub fn read(view: &impl MatrixView, charset: Charset) -> QRResult<(Metadata, String)> {
    let deqr = DeQR::from_view(view)?;
    let (ecl, mask) = deqr.read_format_info()?;
    let ver = deqr.read_version_info()?;
    debug!(version = *ver, ec_level = ?ecl, mask = *mask, "Read symbol info");

    let payload = deqr.extract_payload(ver, ecl, mask);
    let mut data = Vec::with_capacity(ver.data_codewords(ecl));
    for mut blk in deinterleave(&payload, ver, ecl) {
        data.extend_from_slice(blk.rectify()?);
    }

    let mut encoded = BitStream::from(&data);
    let text = decode(&mut encoded, ver, charset)?;
    Ok((Metadata::new(ver, ecl, mask), text))
}

// Dequantized QR
//------------------------------------------------------------------------------

struct DeQR {
    grid: Vec<bool>,
    w: usize,
    ver: Version,
}

impl DeQR {
    fn from_view(view: &impl MatrixView) -> QRResult<Self> {
        let w = view.size();
        let ver = Version::from_width(w)?;
        let grid = (0..w * w).map(|i| view.module(i / w, i % w)).collect();
        Ok(Self { grid, w, ver })
    }

    fn get(&self, r: i16, c: i16) -> bool {
        let w = self.w as i16;
        let r = if r < 0 { r + w } else { r };
        let c = if c < 0 { c + w } else { c };
        self.grid[(r * w + c) as usize]
    }

    fn get_number(&self, coords: &[(i16, i16)]) -> u32 {
        coords.iter().fold(0, |num, &(r, c)| (num << 1) | self.get(r, c) as u32)
    }
}

// Format & version info
//------------------------------------------------------------------------------

impl DeQR {
    fn read_format_info(&self) -> QRResult<(ECLevel, MaskPattern)> {
        for coords in [&FORMAT_INFO_COORDS_MAIN, &FORMAT_INFO_COORDS_SIDE] {
            let info = self.get_number(coords);
            if let Some(format) = rectify_info(info, all_format_infos(), FORMAT_ERROR_CAPACITY) {
                return Ok(parse_format_info(format));
            }
        }
        Err(QRError::InvalidFormatInfo)
    }

    // Below version 7 the size alone decides. Above, a readable version info
    // copy must agree with the size.
    fn read_version_info(&self) -> QRResult<Version> {
        if *self.ver < 7 {
            return Ok(self.ver);
        }
        for coords in [&VERSION_INFO_COORDS_BL, &VERSION_INFO_COORDS_TR] {
            let info = self.get_number(coords);
            if let Some(v) = rectify_info(info, all_version_infos(), VERSION_ERROR_CAPACITY) {
                let v = (v >> VERSION_ERROR_BIT_LEN) as usize;
                if v != *self.ver {
                    return Err(QRError::InvalidVersionInfo);
                }
                return Ok(self.ver);
            }
        }
        Err(QRError::InvalidVersionInfo)
    }
}

// Payload
//------------------------------------------------------------------------------

impl DeQR {
    // Unmasked codewords in placement order, remainder bits dropped
    fn extract_payload(&self, ver: Version, ecl: ECLevel, mask: MaskPattern) -> Vec<u8> {
        let mut template = QR::new(ver, ecl, Charset::default(), 0);
        template.draw_all_function_patterns();
        template.draw_version_info();
        template.reserve_format_area();

        let mask_fn = mask.mask_functions();
        let bit_len = ver.total_codewords() << 3;
        let mut payload = BitStream::new(bit_len);
        for (r, c) in EncRegionIter::new(ver) {
            if payload.len() == bit_len {
                break;
            }
            if matches!(template.get(r, c), Module::Empty) {
                payload.push(self.get(r, c) ^ mask_fn(r, c));
            }
        }
        payload.data().to_vec()
    }
}

// Splits interleaved codewords back into blocks of data followed by ecc
fn deinterleave(payload: &[u8], ver: Version, ecl: ECLevel) -> Vec<Block> {
    let (size1, count1, size2, count2) = ver.data_codewords_per_block(ecl);
    let ec_len = ver.ecc_per_block(ecl);
    let sizes = std::iter::repeat(size1).take(count1).chain(std::iter::repeat(size2).take(count2));
    let mut blocks = sizes.map(|s| (Vec::with_capacity(s + ec_len), s)).collect::<Vec<_>>();

    let mut cws = payload.iter().copied();
    let max_size = size1.max(size2);
    for i in 0..max_size {
        for (blk, size) in blocks.iter_mut() {
            if i < *size {
                blk.extend(cws.next());
            }
        }
    }
    for _ in 0..ec_len {
        for (blk, _) in blocks.iter_mut() {
            blk.extend(cws.next());
        }
    }

    blocks.iter().map(|(blk, size)| Block::with_encoded(blk, *size)).collect()
}
