//! Command-line driver: runs a research query and prints each render.

mod cli;

use std::io::Write as _;
use std::sync::Arc;

use clap::Parser as _;
use research_stream::observability::init_observability;
use research_stream::prelude::*;
use tracing::info;

use crate::cli::{Cli, Commands, ReplayArgs};

const RENDER_RULE: &str = "────────────────────────────────────────";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv_override().ok();
    init_observability();

    let cli = Cli::parse();
    match cli.command {
        Commands::Replay(args) => replay(args).await?,
    }
    Ok(())
}

async fn replay(args: ReplayArgs) -> Result<(), Box<dyn std::error::Error>> {
    let engine = args.build_engine()?;
    let researcher = Researcher::builder()
        .engine(Arc::new(engine))
        .config(ResearchConfig::from_env()?)
        .build()?;

    let mut run = researcher.run(args.query.clone()).await?;
    let trace_id = run.trace_id().clone();
    let abort = run.abort_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            abort.abort();
        }
    });

    let mut stdout = std::io::stdout();
    let mut latest = None;
    while let Some(render) = run.next_render().await {
        if args.latest_only {
            latest = Some(render);
        } else {
            writeln!(stdout, "{render}\n{RENDER_RULE}")?;
            stdout.flush()?;
        }
    }
    if let Some(render) = latest {
        writeln!(stdout, "{render}")?;
    }

    let outcome = run.finish().await;
    eprintln!("trace: {trace_id}");
    match outcome {
        Ok(summary) => {
            info!(renders = summary.renders, "replay finished");
            Ok(())
        }
        // The failure was already rendered to stdout.
        Err(ResearchError::RunFailed(failure)) => {
            info!(error = %failure, "replay ended with failure");
            std::process::exit(1);
        }
        Err(err) => Err(err.into()),
    }
}
