use std::path::PathBuf;

use qadesk_cli::{init_tracing, rebuild_index, DataPaths};
use qadesk_core::config::Config;

fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let settings = config.settings();
    let paths = DataPaths::from_settings(settings)?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let force = args.iter().any(|a| a == "--force" || a == "-f");
    let docs_dir = args.iter().find(|a| !a.starts_with('-')).map(PathBuf::from).unwrap_or(paths.docs_dir);

    println!("qadesk indexer\n==============");
    println!("Documents:  {}", docs_dir.display());
    println!("Index file: {}", paths.index_path.display());

    let run = rebuild_index(settings, &docs_dir, &paths.index_path, force)?;
    if run.skipped {
        println!("\nCorpus unchanged, generation {} kept.", run.generation);
    } else {
        println!("\n✅ Indexing completed successfully!");
        println!("📊 Generation {}: {} documents, {} chunks", run.generation, run.documents, run.chunks);
    }
    println!("\n💡 To ask a question, use: cargo run --bin qadesk -- ask '<question>'");
    Ok(())
}
