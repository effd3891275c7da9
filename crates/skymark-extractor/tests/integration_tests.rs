//! Integration tests for skymark-extractor
//!
//! These tests drive the public API end to end with mock providers.

use skymark_domain::traits::MetadataExtractor;
use skymark_domain::{BoundingBox, TextFragment};
use skymark_extractor::normalize::{clean_location_text, normalize_time};
use skymark_extractor::{
    parse_structured_reply, reply_to_result, ExtractorConfig, LayoutConfig, OcrExtractor,
    Pipeline, SpatialBands, VlmExtractor,
};
use skymark_ocr::MockRecognizer;
use skymark_vlm::MockVisionModel;
use std::io::Write;
use std::time::Duration;

#[test]
fn test_normalizer_table() {
    let cases = [
        ("2024-01-15 14:30:45", "2024-01-15 14:30:45"),
        ("2024年01月15日 14:30:45", "2024-01-15 14:30:45"),
        ("20240115143045", "2024-01-15 14:30:45"),
        ("20240115 143045", "2024-01-15 14:30:45"),
        ("2023-07-2015:47", "2023-07-20 15:47:00"),
        ("2023-07-915:47", "2023-07-09 15:47:00"),
        ("2023-7-20 15:47", "2023-07-20 15:47:00"),
        ("2023-07-20 9:47", "2023-07-20 09:47:00"),
        ("2023-7-20", "2023-07-20 00:00:00"),
        ("2023/7/9 9:30", "2023-07-09 09:30:00"),
    ];
    for (input, expected) in cases {
        assert_eq!(normalize_time(input), expected, "normalize_time({:?})", input);
    }
}

#[test]
fn test_location_cleaner_table() {
    assert_eq!(clean_location_text("北京市朝阳区"), "北京市朝阳区");
    assert_eq!(clean_location_text("北京市  朝阳区  "), "北京市 朝阳区");
    assert_eq!(clean_location_text("  西城区德胜门监测站  "), "西城区德胜门监测站");
}

#[test]
fn test_reply_to_result() {
    let reply = parse_structured_reply(
        r#"{"time":"2024年01月15日 14:30","location":" 北京市 朝阳区 ","confidence":0.92}"#,
    )
    .unwrap();
    let result = reply_to_result(&reply);
    assert_eq!(result.time(), "2024-01-15 14:30:00");
    assert_eq!(result.location(), "北京市 朝阳区");
    assert!(result.is_standard());
}

#[test]
fn test_bands_with_configured_divisor() {
    let fragments: Vec<TextFragment> = (0..=10)
        .map(|i| TextFragment::new(format!("row{}", i), BoundingBox::new(0, i * 10, 50, 10)))
        .collect();

    // range 100, half 50
    let bands = SpatialBands::partition(&fragments, 2);
    assert_eq!(bands.top.len(), 6);
    assert_eq!(bands.bottom.len(), 6);

    // range 100, tenth 10
    let bands = SpatialBands::partition(&fragments, 10);
    assert_eq!(bands.top.len(), 2);
    assert_eq!(bands.bottom.len(), 2);
}

#[tokio::test]
async fn test_custom_keywords_change_location_pick() {
    let image = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
    let fragments = vec![
        TextFragment::new("2024-01-15 14:30:45", BoundingBox::new(0, 0, 100, 20)),
        TextFragment::new("Station Alpha", BoundingBox::new(0, 400, 100, 20)),
    ];

    let extractor = OcrExtractor::new(
        MockRecognizer::new(fragments.clone()),
        LayoutConfig::default(),
        Duration::from_secs(5),
    );
    let result = extractor.extract(image.path()).await.unwrap();
    assert_eq!(result.location(), "");

    let layout = LayoutConfig {
        band_divisor: 3,
        location_keywords: vec!["Station".to_string()],
    };
    let extractor = OcrExtractor::new(MockRecognizer::new(fragments), layout, Duration::from_secs(5));
    let result = extractor.extract(image.path()).await.unwrap();
    assert_eq!(result.location(), "Station Alpha");
    assert!(result.is_standard());
}

#[tokio::test]
async fn test_vlm_extractor_through_trait() {
    let mut image = tempfile::Builder::new().suffix(".webp").tempfile().unwrap();
    image.write_all(b"RIFF0000WEBP").unwrap();

    let model = MockVisionModel::new(r#"{"time":"20240115 1430","location":"广州市天河区","confidence":0.7}"#);
    let extractor = VlmExtractor::new(model.clone(), Duration::from_secs(5));

    let result = extractor.extract(image.path()).await.unwrap();
    assert_eq!(result.time(), "2024-01-15 14:30:00");
    assert!(result.is_standard());
    assert!(model
        .last_request()
        .unwrap()
        .image_data_url
        .starts_with("data:image/webp;base64,"));
}

#[tokio::test]
async fn test_pipeline_from_toml_file_without_keys() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "provider = \"ocr\"\n\n[layout]\nband_divisor = 4").unwrap();

    let config = ExtractorConfig::from_file(file.path()).unwrap();
    assert_eq!(config.layout.band_divisor, 4);

    let pipeline = Pipeline::from_config(&config).unwrap();
    assert!(!pipeline.is_enabled());

    let result = pipeline.process_image(file.path()).await.unwrap();
    assert!(!result.is_standard());
}
