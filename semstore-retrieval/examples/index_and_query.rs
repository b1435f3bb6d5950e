use semstore_core::{Document, MetadataFilter, SearchOptions, Value};
use semstore_embeddings::HashEmbedder;
use semstore_retrieval::{chunk_documents, InMemoryVectorStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let store = InMemoryVectorStore::builder(HashEmbedder::new(8))
        .embedding_model("hash-8")
        .build()?;

    let content = "Rust is fast and memory efficient.";
    let mut docs = chunk_documents("intro", content, 16, 4);
    docs.push(Document::new("faq", "What is ownership?").with_metadata("kind", "faq"));
    store.upsert_batch(docs).await?;

    let results = store
        .search("memory", SearchOptions::new().top_k(3))
        .await?;
    println!("Retrieved {} docs", results.len());
    for result in results {
        println!(
            "score={:.3} content={}",
            result.score, result.document.content
        );
    }

    let faq_only = MetadataFilter::Eq("kind".to_string(), Value::from("faq"));
    let filtered = store
        .search("ownership", SearchOptions::new().filter(&faq_only))
        .await?;
    println!("faq matches: {}", filtered.len());

    let snapshot = serde_json::to_string_pretty(&store.export())?;
    println!("{snapshot}");
    Ok(())
}
