//! Voice command CLI
//!
//! Resolves typed or transcribed text into a validated robot command:
//! Text → Primary Interpreter | Keyword Parser → Validator → Command

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::info;

use command_pipeline::{
    create_pipeline, init as init_command_pipeline, load_config, CommandPipeline, PipelineConfig,
    Resolution,
};

#[derive(Parser, Debug)]
#[command(name = "voice-cmd", version, about = "Resolve spoken text into robot commands")]
struct Cli {
    /// YAML pipeline configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Skip the primary interpreter and use the keyword parser only
    #[arg(long, action = ArgAction::SetTrue, global = true)]
    no_primary: bool,

    /// Print each resolution as JSON
    #[arg(long, action = ArgAction::SetTrue, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve a single command
    Resolve {
        /// Command text, e.g. "move up a little"
        text: String,
    },
    /// Read commands from stdin until an empty line or 'quit'
    Repl,
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_tracing();

    let cli = Cli::parse();

    init_command_pipeline().map_err(|e| anyhow::anyhow!("Failed to init pipeline: {}", e))?;

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => PipelineConfig::default(),
    };
    if cli.no_primary {
        config.enable_primary = false;
    }

    let pipeline = create_pipeline(&config)
        .map_err(|e| anyhow::anyhow!("Failed to create pipeline: {}", e))?;

    match cli.command {
        Commands::Resolve { text } => {
            let resolution = pipeline.resolve(&text).await;
            show(&resolution, cli.json)?;
        }
        Commands::Repl => run_repl(&pipeline, cli.json).await?,
    }

    Ok(())
}

async fn run_repl(pipeline: &CommandPipeline, json: bool) -> Result<()> {
    println!("Text mode: type a command, or 'quit' to exit.");
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        stdout.flush()?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let text = line?;
        let text = text.trim();
        if text.is_empty() || text.eq_ignore_ascii_case("quit") {
            break;
        }

        let resolution = pipeline.resolve(text).await;
        show(&resolution, json)?;
    }

    info!("repl finished");
    Ok(())
}

fn show(resolution: &Resolution, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(resolution)?);
        return Ok(());
    }

    let cmd = &resolution.command;
    println!("  Action:     {}", cmd.action());
    println!("  Magnitude:  {} ({}mm)", cmd.magnitude(), cmd.value_mm());
    println!("  Confidence: {:.2}", cmd.confidence());
    println!("  Source:     {}", cmd.source());
    println!(
        "  Valid:      {} ({})",
        resolution.verdict.is_valid, resolution.verdict.reason
    );
    if let Some(escalation) = &resolution.escalation {
        println!("  Fallback:   {}", escalation);
    }
    println!("  Latency:    {:.1}ms", resolution.latency_ms);
    println!();
    Ok(())
}

fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        // stdout carries resolutions, including `--json` output
        .with_writer(io::stderr)
        .try_init();
}
