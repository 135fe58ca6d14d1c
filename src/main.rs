use retrieval_core::config::EngineConfig;
use retrieval_core::domain::DocumentContents;
use retrieval_core::SearchEngine;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let dir = std::env::args().nth(1).unwrap_or_else(|| "index".to_string());
    let mut engine = SearchEngine::open(&dir, EngineConfig::default(), 10)?;
    engine.build_index(
        vec![
            DocumentContents::new("a1", "t1", "token1 token2 token3"),
            DocumentContents::new("a2", "t2", "token4 token5 token6"),
            DocumentContents::new("a3", "t3", "token2 token4 token6"),
        ],
        true,
    )?;

    for result in engine.search("token2 token4")? {
        println!("doc {} score {:.4}", result.doc_id, result.score);
    }
    Ok(())
}
