use semstore_core::{Document, Value};

pub struct TextSplitter;

impl TextSplitter {
    /// Splits `text` into windows of `chunk_size` characters, each starting
    /// `chunk_size - overlap` characters after the previous one.
    pub fn split(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
        if chunk_size == 0 {
            return Vec::new();
        }

        let mut chunks = Vec::new();
        let mut start = 0usize;
        let chars: Vec<char> = text.chars().collect();
        let max_overlap = chunk_size.saturating_sub(1);
        let clamped_overlap = overlap.min(max_overlap);
        let step = (chunk_size - clamped_overlap).max(1);

        while start < chars.len() {
            let end = usize::min(start + chunk_size, chars.len());
            let chunk: String = chars[start..end].iter().collect();
            chunks.push(chunk);

            if end == chars.len() {
                break;
            }

            start = start.saturating_add(step);
        }

        chunks
    }
}

/// Builds un-embedded documents from the chunks of one source.
///
/// Ids are `{source}#{n}`; each chunk records `source` and `chunk` in its
/// metadata. Whitespace-only chunks are dropped.
pub fn chunk_documents(
    source: &str,
    text: &str,
    chunk_size: usize,
    overlap: usize,
) -> Vec<Document> {
    TextSplitter::split(text, chunk_size, overlap)
        .into_iter()
        .filter(|chunk| !chunk.trim().is_empty())
        .enumerate()
        .map(|(idx, chunk)| {
            Document::new(format!("{source}#{idx}"), chunk)
                .with_metadata("source", Value::String(source.to_string()))
                .with_metadata("chunk", idx)
        })
        .collect()
}
