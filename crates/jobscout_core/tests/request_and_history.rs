use jobscout_core::{
    paginate, Platform, RequestField, ScrapeHistoryEntry, ScrapeRequest, HISTORY_PAGE_SIZE,
};
use pretty_assertions::assert_eq;

#[test]
fn valid_request_passes() {
    let request = ScrapeRequest::new("p1", "Engineer", "Toronto", 50).with_keyword(" rust ");
    assert_eq!(request.validate(), Ok(()));
    assert_eq!(request.profile_keywords, vec!["rust"]);
}

#[test]
fn every_bad_field_is_reported() {
    let request = ScrapeRequest::new("", "  ", "", 51).with_keyword("   ");
    let err = request.validate().unwrap_err();

    let fields: Vec<_> = err.fields.iter().map(|f| f.field).collect();
    assert_eq!(
        fields,
        vec![
            RequestField::PlatformId,
            RequestField::Query,
            RequestField::Location,
            RequestField::MaxPages,
        ]
    );
    assert!(request.profile_keywords.is_empty());
    assert!(err.to_string().contains("Platform is required"));
}

#[test]
fn request_serializes_camel_case() {
    let request = ScrapeRequest::new("p1", "Engineer", "Toronto", 5).with_keyword("remote");
    let value = serde_json::to_value(&request).unwrap();

    assert_eq!(
        value,
        serde_json::json!({
            "platformId": "p1",
            "query": "Engineer",
            "location": "Toronto",
            "maxPages": 5,
            "profileKeywords": ["remote"],
        })
    );
}

#[test]
fn pagination_clamps_page_numbers() {
    let entries: Vec<u32> = (1..=12).collect();

    let first = paginate(&entries, 0, HISTORY_PAGE_SIZE);
    assert_eq!(first.page, 1);
    assert_eq!(first.total_pages, 3);
    assert_eq!(first.entries, &[1, 2, 3, 4, 5]);
    assert!(!first.has_previous());

    let last = paginate(&entries, 9, HISTORY_PAGE_SIZE);
    assert_eq!(last.page, 3);
    assert_eq!(last.entries, &[11, 12]);
    assert!(!last.has_next());

    let empty: Vec<u32> = Vec::new();
    let page = paginate(&empty, 1, HISTORY_PAGE_SIZE);
    assert_eq!(page.total_pages, 1);
    assert!(page.entries.is_empty());
}

#[test]
fn history_entry_tolerates_sparse_payloads() {
    let entry: ScrapeHistoryEntry = serde_json::from_str(
        r#"{"query":"Engineer","customOptions":{"remote":"yes","level":"senior"},"enableAutoLearning":true}"#,
    )
    .unwrap();

    assert_eq!(entry.query.as_deref(), Some("Engineer"));
    assert_eq!(entry.public_id, None);
    assert!(entry.tags.is_empty());
    assert_eq!(
        entry.custom_options_label().as_deref(),
        Some("level: senior, remote: yes")
    );
}

#[test]
fn history_entry_treats_nulls_as_absent() {
    let entry: ScrapeHistoryEntry = serde_json::from_str(
        r#"{"publicId":"h1","query":"Engineer","profileKeywords":null,"tags":null,
            "customOptions":null,"enableAutoLearning":null,"maxPages":null}"#,
    )
    .unwrap();

    assert_eq!(entry.public_id.as_deref(), Some("h1"));
    assert!(entry.profile_keywords.is_empty());
    assert!(entry.tags.is_empty());
    assert!(!entry.enable_auto_learning);
    assert_eq!(entry.max_pages, None);
    assert_eq!(entry.custom_options_label(), None);
}

#[test]
fn custom_options_accept_any_json_value() {
    let entry: ScrapeHistoryEntry = serde_json::from_str(
        r#"{"customOptions":{"depth":3,"remote":true,"region":"CA","skip":["a","b"],"extra":null}}"#,
    )
    .unwrap();

    assert_eq!(
        entry.custom_options_label().as_deref(),
        Some(r#"depth: 3, extra: null, region: CA, remote: true, skip: ["a","b"]"#)
    );
}

#[test]
fn platform_label_matches_picker_format() {
    let platform: Platform = serde_json::from_str(
        r#"{"publicId":"p1","name":"Indeed","type":"html","parserType":"cheerio","notes":"CA only"}"#,
    )
    .unwrap();
    assert_eq!(platform.label(), "Indeed (HTML, cheerio) - CA only");
}
