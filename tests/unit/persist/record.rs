use crate::assets::reference::AssetReference;

use super::*;

#[test]
fn template_draft_uses_camel_case_wire_names() {
    let asset =
        SourceAsset::template(2, "Two Buttons", "https://i.imgflip.com/1g8my4.jpg").unwrap();
    let draft = NewComposition::new(&asset, &Captions::new("a", "b"));
    let json = serde_json::to_value(&draft).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "topText": "a",
            "bottomText": "b",
            "imageUrl": "https://i.imgflip.com/1g8my4.jpg",
            "templateName": "Two Buttons",
            "uploadOption": "template",
        })
    );
}

#[test]
fn upload_draft_embeds_data_url() {
    let reference = AssetReference::parse("data:image/png;base64,AAEC").unwrap();
    let asset = SourceAsset::custom("", reference);
    let draft = NewComposition::new(&asset, &Captions::default());
    assert_eq!(draft.upload_option, UploadOption::Upload);
    assert_eq!(draft.template_name, DEFAULT_TEMPLATE_NAME);
    assert_eq!(draft.image_url, "data:image/png;base64,AAEC");
}

#[test]
fn record_accepts_mongo_style_id() {
    let record: CompositionRecord = serde_json::from_str(
        r#"{"_id":"65f0","topText":"hi","imageUrl":"https://x.test/a.png","createdAt":"2024-03-01T00:00:00Z"}"#,
    )
    .unwrap();
    assert_eq!(record.id, "65f0");
    assert_eq!(record.top_text, "hi");
    assert_eq!(record.bottom_text, "");
    assert_eq!(record.template_name, None);
    assert_eq!(record.created_at.as_deref(), Some("2024-03-01T00:00:00Z"));
}
