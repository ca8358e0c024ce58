use super::*;

fn tiny_png() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(2, 1, image::Rgba([1, 2, 3, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn parse_remote_urls() {
    let r = AssetReference::parse("https://i.imgflip.com/1bij.jpg").unwrap();
    assert!(matches!(r, AssetReference::Remote(ref u) if u.host_str() == Some("i.imgflip.com")));
    assert!(AssetReference::parse("ftp://example.com/a.png").is_err());
    assert!(AssetReference::parse("not a url").is_err());
}

#[test]
fn data_url_roundtrips_through_reference_string() {
    let png = tiny_png();
    let upload = AssetReference::from_upload(png.clone()).unwrap();
    let s = upload.to_reference_string();
    assert!(s.starts_with("data:image/png;base64,"));

    let parsed = AssetReference::parse(&s).unwrap();
    assert_eq!(parsed, upload);
    let AssetReference::Embedded { mime, bytes } = parsed else {
        panic!("expected embedded reference");
    };
    assert_eq!(mime, "image/png");
    assert_eq!(&bytes[..], &png[..]);
}

#[test]
fn data_url_edge_cases() {
    let plain = AssetReference::parse("data:,hello").unwrap();
    let AssetReference::Embedded { mime, bytes } = plain else {
        panic!("expected embedded reference");
    };
    assert_eq!(mime, "application/octet-stream");
    assert_eq!(&bytes[..], b"hello");

    assert!(AssetReference::parse("data:image/png;base64").is_err());
    assert!(AssetReference::parse("data:image/png;base64,@@@").is_err());
    assert!(AssetReference::parse("data:text/plain,a%20b").is_err());
}

#[test]
fn upload_rejects_non_images_and_names_blank_files() {
    assert!(AssetReference::from_upload(b"definitely not an image".to_vec()).is_err());

    let a = SourceAsset::upload("  ", tiny_png()).unwrap();
    assert_eq!(a.display_name, DEFAULT_UPLOAD_NAME);
    assert!(a.is_custom());

    let b = SourceAsset::upload("cat.png", tiny_png()).unwrap();
    assert_eq!(b.display_name, "cat.png");
}

#[test]
fn describe_never_dumps_payload() {
    let r = AssetReference::from_upload(tiny_png()).unwrap();
    let d = format!("{r:?}");
    assert!(d.starts_with("data:image/png ("));
    assert!(!d.contains("base64"));
    assert_eq!(AssetId::Custom.to_string(), "custom");
    assert_eq!(AssetId::Template(3).to_string(), "3");
}
