//! Datachat - chat with your SQL warehouse
//!
//! Main entry point for the CLI application.

use clap::Parser;
use datachat::cli::render::{format_answer, format_sql_log};
use datachat::core::logging::init_logging;
use datachat::{AgentHandle, Config, ConversationTurn, Repl};

/// Datachat - ask questions about your SQL warehouse
#[derive(Parser, Debug)]
#[command(name = "datachat")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Gemini model used by the agent
    #[arg(long, short = 'm')]
    model: Option<String>,

    /// Catalog to query
    #[arg(long)]
    catalog: Option<String>,

    /// Schema to query
    #[arg(long)]
    schema: Option<String>,

    /// Maximum agent iterations per question
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Enable debug output
    #[arg(long, short = 'd')]
    debug: bool,

    /// Print the default config file and exit
    #[arg(long)]
    print_config: bool,

    /// Single prompt mode (non-interactive)
    #[arg(long, short = 'p')]
    prompt: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_config {
        println!("{}", Config::default_config_toml());
        return Ok(());
    }

    // Build configuration
    let mut config = Config::load();

    // Apply CLI overrides
    if let Some(model) = args.model {
        config.gemini.model = model;
    }

    if let Some(catalog) = args.catalog {
        config.warehouse.catalog = catalog;
    }

    if let Some(schema) = args.schema {
        config.warehouse.schema = schema;
    }

    if let Some(max_iterations) = args.max_iterations {
        config.agent.max_iterations = max_iterations;
    }

    if args.debug {
        config.agent.debug = true;
    }

    init_logging(&config.logging, config.agent.debug)?;

    // Single prompt mode
    if let Some(prompt) = args.prompt {
        let history = vec![ConversationTurn::assistant(config.agent.opening_message.clone())];
        let handle = AgentHandle::from_config(config);

        let answer = handle.ask(&prompt, &history).await?;
        println!("{}", format_answer(&answer));
        if !answer.sql_log.is_empty() {
            println!("\n{}", format_sql_log(&answer.sql_log));
        }
        return Ok(());
    }

    // Interactive REPL mode
    let mut repl = Repl::with_config(config);
    repl.run().await?;

    Ok(())
}
