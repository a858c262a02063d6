//! Interactive deep-research agent.
//!
//! Runs in two phases: an interactive clarification dialogue that assembles a
//! research brief, then a tool-calling research loop that searches the web
//! and drafts a report. Passing a topic on the command line skips the
//! dialogue and researches the given brief directly.

mod brief;
mod clarify;
mod config;
mod error;
mod prompts;
mod report;
mod researcher;
mod search;
mod session;
mod transcript;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::brief::{DepthLevel, ResearchBrief};
use crate::config::Config;
use crate::error::AgentError;
use crate::report::Report;
use crate::session::Session;

#[derive(Parser, Debug)]
#[command(
    name = "deep-research-agent",
    version,
    about = "An AI research assistant that clarifies your question, searches the web, and writes a report",
    long_about = r#"
Deep Research Agent

Without arguments, starts an interactive session: the assistant asks
clarifying questions, assembles a research brief for your approval, then
researches the web and drafts a markdown report.

With a TOPIC argument, the dialogue is skipped and the brief is built from
the command line.

PREREQUISITES:
  Set ANTHROPIC_API_KEY and TAVILY_API_KEY in the environment or a .env file.

EXAMPLES:
  # Interactive session
  deep-research-agent

  # Batch research, no dialogue
  deep-research-agent "Rust async runtimes" \
      -q "How does tokio's scheduler work?" \
      -q "When is a current-thread runtime preferable?" \
      --depth deep --audience "backend engineers"
"#
)]
struct Args {
    /// Research topic. When given, the clarification dialogue is skipped.
    #[arg(value_name = "TOPIC")]
    topic: Option<String>,

    /// Key question to answer (repeatable). Only used with TOPIC.
    #[arg(short = 'q', long = "question", value_name = "QUESTION")]
    questions: Vec<String>,

    /// Scope and boundaries of the research. Only used with TOPIC.
    #[arg(long)]
    scope: Option<String>,

    /// Research depth. Only used with TOPIC.
    #[arg(long, value_enum)]
    depth: Option<DepthLevel>,

    /// Target audience for the report. Only used with TOPIC.
    #[arg(long)]
    audience: Option<String>,

    /// Model for the research phase (overrides RESEARCH_MODEL).
    #[arg(short, long, env = "RESEARCH_MODEL")]
    model: Option<String>,

    /// Where to save the report (default: research_report.md).
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    output: Option<PathBuf>,

    /// Don't save the report to a file.
    #[arg(long)]
    no_save: bool,

    /// Turn budget for the research loop.
    #[arg(long, value_name = "N")]
    max_turns: Option<usize>,

    /// Enable verbose/debug logging.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose)?;
    info!("deep-research-agent starting up");

    let mut config = Config::from_env()?;

    if let Some(model) = args.model.clone() {
        info!(model = %model, "using model from command line");
        config.model = model;
    }
    if let Some(turns) = args.max_turns {
        config.max_research_turns = turns;
    }
    if args.no_save {
        config.report_path = None;
    } else if let Some(path) = args.output.clone() {
        config.report_path = Some(path);
    }

    match run(args, config).await {
        Ok(Some(report)) => {
            println!("\n{}", "=".repeat(60));
            println!("RESEARCH REPORT");
            println!("{}\n", "=".repeat(60));
            println!("{}", report.to_markdown());
            println!("{}", "=".repeat(60));
            info!("session finished");
            Ok(())
        }
        Ok(None) => {
            info!("session ended before research");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "session failed");
            eprintln!("\nSession failed: {e}");

            if matches!(e, AgentError::MissingEnv(_)) {
                eprintln!("\nTip: copy .env.example to .env and fill in your API keys.");
            }

            Err(e.into())
        }
    }
}

async fn run(args: Args, config: Config) -> Result<Option<Report>, AgentError> {
    let session = Session::new(config)?;

    match args.topic {
        Some(topic) => {
            let brief = batch_brief(topic, args.questions, args.scope, args.depth, args.audience);
            println!("Researching: {}\n", brief.topic);
            session.run_batch(brief).await.map(Some)
        }
        None => session.run_interactive().await,
    }
}

/// Assemble a brief from command-line arguments, filling the gaps the same
/// way the clarifier would: with reasonable assumptions.
fn batch_brief(
    topic: String,
    questions: Vec<String>,
    scope: Option<String>,
    depth: Option<DepthLevel>,
    audience: Option<String>,
) -> ResearchBrief {
    let key_questions = if questions.is_empty() {
        vec![format!("What should a reader know about {topic}?")]
    } else {
        questions
    };

    ResearchBrief {
        scope: scope.unwrap_or_else(|| "Comprehensive coverage within the stated topic".to_string()),
        depth: depth.unwrap_or_default(),
        audience: audience.unwrap_or_else(|| "general readers".to_string()),
        topic,
        key_questions,
        constraints: None,
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to set logging subscriber: {e}"))?;

    Ok(())
}
