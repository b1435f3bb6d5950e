use semstore_core::Value;
use semstore_retrieval::{chunk_documents, TextSplitter};

#[test]
fn splitter_windows_overlap() {
    let chunks = TextSplitter::split("abcdefghij", 4, 2);
    assert_eq!(chunks, ["abcd", "cdef", "efgh", "ghij"]);
}

#[test]
fn splitter_handles_multibyte_text() {
    let chunks = TextSplitter::split("héllo wörld", 5, 0);
    assert_eq!(chunks, ["héllo", " wörl", "d"]);
}

#[test]
fn splitter_zero_chunk_size_yields_nothing() {
    assert!(TextSplitter::split("abc", 0, 0).is_empty());
}

#[test]
fn splitter_clamps_overlap() {
    let chunks = TextSplitter::split("abc", 2, 10);
    assert_eq!(chunks, ["ab", "bc"]);
}

#[test]
fn chunk_documents_assigns_ids_and_metadata() {
    let docs = chunk_documents("notes.txt", "aaaa    bbbb", 4, 0);

    let ids: Vec<&str> = docs.iter().map(|doc| doc.id.as_str()).collect();
    assert_eq!(ids, ["notes.txt#0", "notes.txt#1"]);
    assert_eq!(docs[1].content, "bbbb");
    assert_eq!(
        docs[1].metadata.get("source"),
        Some(&Value::String("notes.txt".to_string()))
    );
    assert_eq!(docs[1].metadata.get("chunk"), Some(&Value::from(1)));
    assert!(docs.iter().all(|doc| doc.embedding.is_none()));
}
