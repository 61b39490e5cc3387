use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use qadesk_arbiter::{JsonlEscalationSink, QaEngine, ReplyBody};
use qadesk_cli::{init_tracing, rebuild_index, DataPaths};
use qadesk_core::config::Config;
use qadesk_core::types::{Query, Strategy};
use qadesk_generate::get_default_generator;
use qadesk_vector::{load_or_empty, LiveIndex};

/// Question desk: index a document folder, then answer, caveat or escalate
/// questions against it.
#[derive(Parser)]
#[command(name = "qadesk", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chunk the document folder, build a new index generation and persist it.
    Index {
        /// Documents directory (defaults to `data.docs_dir`).
        #[arg(long)]
        docs: Option<PathBuf>,

        /// Rebuild even when the corpus is unchanged.
        #[arg(long)]
        force: bool,
    },

    /// Answer one question against the persisted index.
    Ask {
        question: String,

        /// Declared language of the question (defaults to `data.default_language`).
        #[arg(long)]
        lang: Option<String>,

        /// Override `retrieval.top_k`.
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Show the persisted index generation.
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let mut settings = config.settings().clone();
    let paths = DataPaths::from_settings(&settings)?;

    match cli.command {
        Commands::Index { docs, force } => {
            let docs_dir = docs.unwrap_or(paths.docs_dir);
            println!("Indexing {}", docs_dir.display());
            let run = rebuild_index(&settings, &docs_dir, &paths.index_path, force)?;
            if run.skipped {
                println!("Corpus unchanged (fingerprint {}), kept generation {}. Use --force to rebuild.", run.fingerprint, run.generation);
            } else {
                println!(
                    "✅ Generation {}: {} documents, {} chunks → {}",
                    run.generation,
                    run.documents,
                    run.chunks,
                    paths.index_path.display()
                );
            }
        }
        Commands::Ask { question, lang, top_k } => {
            if let Some(k) = top_k {
                settings.retrieval.top_k = k.max(1);
            }
            let index = Arc::new(LiveIndex::new(load_or_empty(&paths.index_path)));
            let generator = get_default_generator(&settings.generation)?;
            let sink = JsonlEscalationSink::new(paths.escalation_log.clone());
            let engine = QaEngine::new(index, &settings, generator, Box::new(sink));

            let mut query = Query::new(question);
            if let Some(lang) = lang {
                query = query.with_language(lang);
            }

            let reply = engine.ask(&query).await?;
            println!("{} (confidence {:.3}, generation {})", reply.decision.strategy, reply.decision.confidence, reply.generation);
            match &reply.body {
                ReplyBody::Generated { text, model_id } => println!("{}\n[{}]", text, model_id),
                ReplyBody::Extracted { text } if reply.decision.strategy == Strategy::Partial => {
                    println!("I may be missing details, but this looks relevant:\n{}", text)
                }
                ReplyBody::Extracted { text } => println!("{}", text),
                ReplyBody::Escalated => println!("Your question has been passed to a member of staff."),
            }
            if reply.ticket.is_some() {
                println!("Escalation logged to {}", paths.escalation_log.display());
            }
            for (rank, r) in reply.retrieval.results.iter().enumerate() {
                println!("  {}. [{:.3}] {}", rank + 1, r.similarity, r.chunk_id);
            }
        }
        Commands::Status => {
            let index = load_or_empty(&paths.index_path);
            let status = index.status();
            println!("Index file:   {}", paths.index_path.display());
            println!("Generation:   {}", status.generation);
            match status.built_at {
                Some(at) => println!("Built at:     {}", at.to_rfc3339()),
                None => println!("Built at:     never"),
            }
            println!("Fingerprint:  {}", status.fingerprint);
            println!("Documents:    {}", status.documents);
            println!("Chunks:       {}", status.chunks);
            println!("Vocabulary:   {}", status.vocabulary_size);
        }
    }
    Ok(())
}
