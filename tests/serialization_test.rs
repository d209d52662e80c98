//! Integration tests for the per-format serializers

use folio::core::format::{serialize, ExportFormat};
use folio::core::processor::ProcessedContent;
use folio::domain::ItemId;
use test_case::test_case;

const BODY: &str = "# Virtue\n\n\
[QUICK_GLANCE]\n\
- Live according to nature\n\
- Time is the only possession\n\
[/QUICK_GLANCE]\n\n\
Most of life slips away while we are doing ill.\n\n\
[QUOTE]\n\
Luck is what happens when preparation meets opportunity.\n\
[/QUOTE]\n";

fn content() -> ProcessedContent {
    ProcessedContent {
        item_id: ItemId::new("seneca-1").unwrap(),
        title: "On the Shortness of Life".to_string(),
        author: "Seneca".to_string(),
        summary_type: Some("full".to_string()),
        reader_profile: Some("student".to_string()),
        body: BODY.to_string(),
    }
}

#[test_case(ExportFormat::PlainText ; "plain text")]
#[test_case(ExportFormat::Markdown ; "markdown")]
#[test_case(ExportFormat::Json ; "json")]
#[test_case(ExportFormat::Html ; "html")]
#[test_case(ExportFormat::Pdf ; "pdf")]
fn test_serialization_is_deterministic(format: ExportFormat) {
    let first = serialize(&content(), format).unwrap();
    let second = serialize(&content(), format).unwrap();
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test_case(ExportFormat::PlainText ; "plain text")]
#[test_case(ExportFormat::Markdown ; "markdown")]
#[test_case(ExportFormat::Html ; "html")]
fn test_text_formats_carry_title_and_content(format: ExportFormat) {
    let bytes = serialize(&content(), format).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains("On the Shortness of Life"));
    assert!(text.contains("Seneca"));
    assert!(text.contains("Time is the only possession"));
    assert!(!text.contains("[QUICK_GLANCE]"));
}

#[test]
fn test_json_is_structured() {
    let bytes = serialize(&content(), ExportFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value["id"], "seneca-1");
    assert_eq!(value["title"], "On the Shortness of Life");
    assert_eq!(value["author"], "Seneca");
    assert!(value["blocks"].as_array().unwrap().len() >= 3);
}

#[test]
fn test_html_escapes_markup() {
    let mut content = content();
    content.title = "Ends <and> Means".to_string();
    let html = String::from_utf8(serialize(&content, ExportFormat::Html).unwrap()).unwrap();
    assert!(html.contains("Ends &lt;and&gt; Means"));
    assert!(!html.contains("<and>"));
}

#[test]
fn test_pdf_is_well_formed() {
    let bytes = serialize(&content(), ExportFormat::Pdf).unwrap();
    assert!(bytes.starts_with(b"%PDF-1."));
    assert!(bytes.ends_with(b"%%EOF\n"));
}

#[test]
fn test_pdf_rejects_unencodable_text() {
    let mut content = content();
    content.body = "\u{5b66}\u{7fd2}".to_string();
    assert!(serialize(&content, ExportFormat::Pdf).is_err());
}
