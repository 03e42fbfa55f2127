//! # Multi-Agent Query Engine CLI
//!
//! ```bash
//! # Load the private documents (PDFs, or text files with pages split on form feeds)
//! cargo run -- ingest project_management.pdf
//!
//! # Ask a question
//! cargo run -- ask "What is a project stakeholder?"
//!
//! # Serve POST /query on LISTEN_ADDR
//! cargo run -- serve
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use multi_agent_qa::documents::ingest_files;
use multi_agent_qa::graph::embedder_from_config;
use multi_agent_qa::{server, AgentGraph, Config};

// =============================================================================
// CLI ARGUMENTS
// =============================================================================
#[derive(Parser, Debug)]
#[command(
    name = "multi-agent-qa",
    version,
    about = "Routes questions to private documents or the web, then synthesizes an answer",
    long_about = r#"
Multi-Agent Query Engine

A router agent decides whether a question is about the private documents
(project management) or needs a web search. The chosen agent gathers raw
material and a synthesizer agent writes the final answer.

PREREQUISITES:
  1. Install Ollama: https://ollama.ai
  2. Pull the models: ollama pull llama3.2 && ollama pull all-minilm
  3. Set TAVILY_API_KEY for web search (optional)
"#
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// The Ollama model to use (overrides OLLAMA_MODEL env var)
    #[arg(short = 'm', long = "model", global = true, env = "OLLAMA_MODEL")]
    model: Option<String>,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long = "verbose", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Answer a single question
    Ask {
        /// The question to answer
        #[arg(value_name = "QUESTION")]
        question: String,

        /// Also print the route taken and the raw agent output
        #[arg(short = 'd', long = "details", default_value = "false")]
        details: bool,
    },

    /// Load PDF or text documents into the document store
    Ingest {
        /// PDF or text files to load
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,
    },

    /// Serve the HTTP API
    Serve {
        /// Address to bind (overrides LISTEN_ADDR env var)
        #[arg(short = 'a', long = "addr")]
        addr: Option<String>,
    },
}

// =============================================================================
// MAIN FUNCTION
// =============================================================================
#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose)?;

    let mut config = Config::from_env()?;
    if let Some(model) = args.model {
        info!(model = %model, "Using model from command line");
        config.model = model;
    }
    config.validate()?;

    info!(
        model = %config.model,
        host = %config.ollama_host,
        store = %config.store_path.display(),
        "Configuration loaded"
    );

    match args.command {
        Command::Ask { question, details } => ask(&config, &question, details).await,
        Command::Ingest { files } => ingest(&config, &files).await,
        Command::Serve { addr } => {
            let addr = addr.unwrap_or_else(|| config.listen_addr.clone());
            let graph = Arc::new(AgentGraph::from_config(&config)?);
            server::serve(graph, &addr).await
        }
    }
}

async fn ask(config: &Config, question: &str, details: bool) -> Result<()> {
    let graph = AgentGraph::from_config(config)?;

    match graph.run_traced(question).await {
        Ok(run) => {
            println!("\n{}", "=".repeat(60));
            println!("ANSWER");
            println!("{}\n", "=".repeat(60));
            println!("{}", run.state.final_answer.as_deref().unwrap_or_default());

            if details {
                println!("\n{}", "-".repeat(60));
                println!("Route taken: {}", run.state.route.as_deref().unwrap_or("-"));
                println!(
                    "Path: {}",
                    run.visited
                        .iter()
                        .map(|n| n.as_str())
                        .collect::<Vec<_>>()
                        .join(" -> ")
                );
                if let Some(doc) = &run.state.doc_answer {
                    println!("\nDocument Agent Output:\n{doc}");
                }
                if let Some(web) = &run.state.web_answer {
                    println!("\nWeb Search Agent Output:\n{web}");
                }
            }
            println!("\n{}", "=".repeat(60));
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Query failed");
            eprintln!("\nQuery failed: {e}");

            if e.to_string().contains("connection refused") {
                eprintln!("\nTip: Make sure Ollama is running:");
                eprintln!("   ollama serve");
            }

            Err(e.into())
        }
    }
}

async fn ingest(config: &Config, files: &[PathBuf]) -> Result<()> {
    info!(count = files.len(), "Starting data loading process");

    let embedder = embedder_from_config(config);
    let report = ingest_files(&config.store_path, files, embedder.as_ref()).await?;

    println!(
        "Added {} chunks ({} already present). The store at {} now has {} chunks.",
        report.added,
        report.skipped,
        config.store_path.display(),
        report.total
    );
    Ok(())
}

// =============================================================================
// LOGGING INITIALIZATION
// =============================================================================
fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))?;

    Ok(())
}
