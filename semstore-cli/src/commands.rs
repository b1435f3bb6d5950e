use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use semstore_core::{MetadataFilter, SearchOptions, SearchResult, Value};
use semstore_retrieval::{chunk_documents, load_files_async};
use serde::Serialize;

use crate::cli::{Cli, Command};
use crate::settings::{open_store, save_store};

const PREVIEW_CHARS: usize = 120;

pub async fn run(cli: Cli) -> Result<()> {
    let (settings, store) = open_store(&cli)?;

    match &cli.command {
        Command::Ingest {
            paths,
            chunk_size,
            overlap,
        } => {
            if *chunk_size == 0 {
                bail!("--chunk-size must be greater than 0");
            }
            let docs = load_chunks(paths.clone(), *chunk_size, *overlap).await?;
            let total = docs.len();
            // A failed batch still keeps what was embedded before it, so save either way.
            let outcome = store.upsert_batch(docs).await;
            save_store(&cli, &settings, &store)?;
            let stored = outcome.context("ingest aborted; earlier chunks were saved")?;
            println!(
                "ingested {} of {total} chunks ({} documents in store)",
                stored.len(),
                store.len()
            );
        }
        Command::Search {
            query,
            top_k,
            threshold,
            filters,
            json,
        } => {
            let filter = metadata_filter(filters);
            let mut options = SearchOptions::new().top_k(*top_k).threshold(*threshold);
            if let Some(filter) = filter.as_ref() {
                options = options.filter(filter);
            }
            let results = store.search(query, options).await?;
            if *json {
                let rows: Vec<ResultRow<'_>> = results.iter().map(ResultRow::from).collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else if results.is_empty() {
                println!("no matches");
            } else {
                for (rank, result) in results.iter().enumerate() {
                    println!(
                        "{:>2}. {:.4}  {}  {}",
                        rank + 1,
                        result.score,
                        result.document.id,
                        preview(&result.document.content)
                    );
                }
            }
        }
        Command::Get { id } => match store.get(id) {
            Some(mut doc) => {
                doc.embedding = None;
                println!("{}", serde_json::to_string_pretty(&doc)?);
            }
            None => bail!("no document with id '{id}'"),
        },
        Command::Delete { id } => {
            if !store.delete(id) {
                bail!("no document with id '{id}'");
            }
            save_store(&cli, &settings, &store)?;
            println!("deleted {id}");
        }
        Command::List => {
            for doc in store.get_all() {
                println!("{}  {}", doc.id, preview(&doc.content));
            }
        }
        Command::Stats => {
            println!("snapshot:  {}", cli.snapshot.display());
            println!("provider:  {:?}", settings.provider);
            println!("model:     {}", settings.model);
            println!("dimension: {}", settings.dimension);
            println!("documents: {}", store.len());
        }
        Command::Clear => {
            let removed = store.len();
            store.clear();
            save_store(&cli, &settings, &store)?;
            println!("removed {removed} documents");
        }
    }

    Ok(())
}

async fn load_chunks(
    paths: Vec<PathBuf>,
    chunk_size: usize,
    overlap: usize,
) -> Result<Vec<semstore_core::Document>> {
    let files = load_files_async(paths).await?;
    let mut docs = Vec::new();
    for (path, text) in files {
        let source = path.display().to_string();
        let chunks = chunk_documents(&source, &text, chunk_size, overlap);
        tracing::info!(source = %source, chunks = chunks.len(), "chunked file");
        docs.extend(chunks);
    }
    Ok(docs)
}

/// `key=value` pairs become equality filters; values that parse as JSON
/// (numbers, booleans) compare as such, anything else as a string.
fn metadata_filter(pairs: &[(String, String)]) -> Option<MetadataFilter> {
    if pairs.is_empty() {
        return None;
    }
    let filters = pairs
        .iter()
        .map(|(key, raw)| {
            let value = serde_json::from_str::<Value>(raw)
                .unwrap_or_else(|_| Value::String(raw.clone()));
            MetadataFilter::Eq(key.clone(), value)
        })
        .collect();
    Some(MetadataFilter::All(filters))
}

fn preview(content: &str) -> String {
    let flat = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= PREVIEW_CHARS {
        return flat;
    }
    let mut cut: String = flat.chars().take(PREVIEW_CHARS).collect();
    cut.push('…');
    cut
}

#[derive(Serialize)]
struct ResultRow<'a> {
    id: &'a str,
    score: f32,
    content: &'a str,
    metadata: &'a std::collections::HashMap<String, Value>,
}

impl<'a> From<&'a SearchResult> for ResultRow<'a> {
    fn from(result: &'a SearchResult) -> Self {
        Self {
            id: &result.document.id,
            score: result.score,
            content: &result.document.content,
            metadata: &result.document.metadata,
        }
    }
}
