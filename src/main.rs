//! sandbox-agent CLI
//!
//! Sends one prompt to the reasoning oracle and lets it work inside the
//! working directory until it produces an answer.

use anyhow::{Context, Result};
use clap::Parser;
use sandbox_agent::config;
use sandbox_agent::llm::create_client;
use sandbox_agent::logging::{self, LogLevel};
use sandbox_agent::prelude::*;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "sandbox-agent")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "AI coding agent confined to a single working directory", long_about = None)]
struct Cli {
    /// What to ask the agent
    prompt: Option<String>,

    /// Print the prompt, each tool result and token usage
    #[arg(short, long)]
    verbose: bool,

    /// Sandbox root (default: from config, else the current directory)
    #[arg(long, env = "SANDBOX_AGENT_WORKING_DIR")]
    working_dir: Option<PathBuf>,

    /// Config file to use instead of the default search paths
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Before parsing so `env` args see .env values.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let Some(prompt) = cli.prompt.clone() else {
        eprintln!("Error: Please provide a prompt.");
        return ExitCode::FAILURE;
    };

    match run(&cli, prompt).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, prompt: String) -> Result<()> {
    let mut settings = match &cli.config {
        Some(path) => config::from_path(path)?,
        None => config::load()?,
    };
    if cli.verbose {
        settings.logging.level = LogLevel::Debug;
    }

    let _log_guard = match logging::init_file_logging(&settings.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Warning: file logging disabled: {e}");
            None
        }
    };

    let root = match cli.working_dir.clone().or_else(|| settings.working_dir.clone()) {
        Some(dir) => dir,
        None => std::env::current_dir().context("failed to determine the current directory")?,
    };
    let guard = PathGuard::new(&root).map_err(AgentError::from)?;
    tracing::info!(root = %guard.root().display(), "Sandbox root resolved");

    let registry = ToolRegistry::new(guard, settings.builtin_tools()?);
    let provider = settings.provider.to_provider_config()?;
    let oracle: Arc<dyn ReasoningOracle> = Arc::from(create_client(&provider)?);

    let verbose = cli.verbose;
    let agent = Agent::new(oracle, registry, settings.agent_config()?)?.with_tool_observer(
        move |call: &ExecutedToolCall| {
            println!("Calling function: {}({})", call.name, call.arguments);
            if verbose {
                println!("-> {}", call.result);
            }
        },
    );

    if verbose {
        println!("User prompt: {prompt}");
    }

    let outcome = agent.run(prompt).await?;
    println!("{}", outcome.text);

    if verbose {
        println!("Prompt tokens: {}", outcome.usage.prompt_tokens);
        println!("Response tokens: {}", outcome.usage.response_tokens);
    }

    Ok(())
}
