use qrkit::*;
use test_case::test_case;

// Decodes the rendered symbol with an independent reader
fn scan(qr: &QR) -> (usize, String) {
    let cfg = RenderConfig { width: 0, height: 0, ..Default::default() };
    let img = render(qr, 4, &cfg).unwrap();
    let img = image::imageops::resize(
        &img,
        img.width() * 4,
        img.height() * 4,
        image::imageops::FilterType::Nearest,
    );

    let mut prepared = rqrr::PreparedImage::prepare(img);
    let grids = prepared.detect_grids();
    assert_eq!(grids.len(), 1, "Expected exactly one symbol");
    let (meta, content) = grids[0].decode().expect("rqrr failed to decode");
    (meta.version.0, content)
}

#[test_case("Hello Labs64!", ECLevel::H)]
#[test_case("01234567", ECLevel::M)]
#[test_case("HELLO WORLD", ECLevel::Q)]
#[test_case("Hello, world!🌎", ECLevel::L)]
#[test_case(&"A11111111111111".repeat(11), ECLevel::M)]
#[test_case(&"aAAAAAAAAA1111111111111111AAAAAAAAAAa".repeat(4), ECLevel::Q)]
#[test_case(&"1234567890".repeat(28), ECLevel::H)]
#[test_case(&"B3@j#Z%8vK!3zC^8&rF9*b6".repeat(22), ECLevel::L)]
#[test_case(&"A111111111111111".repeat(97), ECLevel::M)]
#[test_case(&"1234567890".repeat(305), ECLevel::H)]
fn test_rqrr_round_trip(data: &str, ecl: ECLevel) {
    let qr = encode(data, QRConfig { ec_level: ecl, ..Default::default() }).unwrap();
    let (version, content) = scan(&qr);
    assert_eq!(version, *qr.version());
    assert_eq!(content, data);
}

#[test_case(0)]
#[test_case(4)]
#[test_case(7)]
fn test_rqrr_forced_mask(mask: u8) {
    let cfg = QRConfig { mask: Some(mask), version: Some(8), ..Default::default() };
    let qr = encode("forced mask and version", cfg).unwrap();
    assert_eq!(scan(&qr), (8, "forced mask and version".to_string()));
}
