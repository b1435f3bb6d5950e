use std::collections::HashMap;

use semstore_core::{Document, Value};

#[test]
fn document_roundtrip() {
    let mut metadata = HashMap::new();
    metadata.insert("source".to_string(), Value::String("unit".to_string()));

    let doc = Document {
        id: "doc-1".to_string(),
        content: "hello".to_string(),
        metadata,
        embedding: Some(vec![1.0, 0.0, 0.0]),
    };

    let json = serde_json::to_string(&doc).unwrap();
    let parsed: Document = serde_json::from_str(&json).unwrap();
    assert_eq!(doc, parsed);
}

#[test]
fn document_without_embedding_or_metadata_deserializes() {
    let parsed: Document = serde_json::from_str(r#"{"id":"x","content":"c"}"#).unwrap();
    assert_eq!(parsed.id, "x");
    assert!(parsed.metadata.is_empty());
    assert!(parsed.embedding.is_none());
}

#[test]
fn document_serialization_omits_empty_fields() {
    let json = serde_json::to_value(Document::new("x", "c")).unwrap();
    assert_eq!(json, serde_json::json!({"id": "x", "content": "c"}));
}

#[test]
fn document_builders_fill_fields() {
    let doc = Document::new("a", "body")
        .with_metadata("lang", "en")
        .with_embedding(vec![0.5, 0.5]);
    assert_eq!(doc.metadata.get("lang"), Some(&Value::from("en")));
    assert_eq!(doc.embedding, Some(vec![0.5, 0.5]));
}
