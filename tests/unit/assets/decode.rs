use std::io::Cursor;

use super::*;

#[test]
fn decode_image_png_dimensions_and_premul() {
    let src_rgba = vec![100u8, 50u8, 200u8, 128u8];
    let img = image::RgbaImage::from_raw(1, 1, src_rgba).unwrap();

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();

    let decoded = decode_image(&buf).unwrap();
    assert_eq!(decoded.width, 1);
    assert_eq!(decoded.height, 1);
    assert_eq!(
        decoded.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_rejects_garbage() {
    assert!(decode_image(b"<html>404</html>").is_err());
}

#[test]
fn from_rgba8_validates_shape() {
    assert!(DecodedImage::from_rgba8(0, 1, vec![]).is_err());
    assert!(DecodedImage::from_rgba8(2, 2, vec![0; 15]).is_err());

    let img = DecodedImage::from_rgba8(4, 2, vec![255; 32]).unwrap();
    assert_eq!(img.aspect(), 2.0);
}

#[test]
fn fully_transparent_pixels_zero_their_color() {
    let img = DecodedImage::from_rgba8(1, 1, vec![200, 100, 50, 0]).unwrap();
    assert_eq!(img.rgba8_premul.as_slice(), &[0, 0, 0, 0]);
}
