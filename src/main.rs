//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `seo_analyzer` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use std::io::Write as _;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use seo_analyzer::app::{ProgressPrinter, TurnPrinter};
use seo_analyzer::config::Opt;
use seo_analyzer::initialization::{build_services, init_logger_with};
use seo_analyzer::models::ChatRole;
use seo_analyzer::{AnalysisOrchestrator, AnalysisSnapshot, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Try loading .env from the current directory first, then next to the executable
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let opt = Opt::parse();
    let config = Config::from(&opt);

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    let services = build_services(&config).context("Failed to initialize services")?;
    let orchestrator = Arc::new(AnalysisOrchestrator::new(services));

    let snapshot = run_analysis(&orchestrator, &opt.domain, opt.json).await?;

    if let Some(error) = &snapshot.state.fatal_error {
        if opt.json {
            eprintln!("seo_analyzer error: {}", error);
        }
        process::exit(1);
    }

    if opt.json {
        if let Some(result) = &snapshot.result {
            println!(
                "{}",
                serde_json::to_string_pretty(result).context("Failed to serialize result")?
            );
        }
    }

    if opt.chat {
        match &snapshot.chat_error {
            Some(error) => eprintln!("Chat unavailable: {}", error),
            None => chat_loop(&orchestrator).await?,
        }
    }
    Ok(())
}

/// Runs the analysis, printing each section as its stage concludes.
async fn run_analysis(
    orchestrator: &Arc<AnalysisOrchestrator>,
    domain: &str,
    quiet: bool,
) -> Result<AnalysisSnapshot> {
    let mut rx = orchestrator.subscribe();
    let mut printer = ProgressPrinter::default();

    let mut analysis = {
        let orchestrator = Arc::clone(orchestrator);
        let domain = domain.to_string();
        tokio::spawn(async move { orchestrator.start_analysis(&domain).await })
    };

    let snapshot = loop {
        tokio::select! {
            joined = &mut analysis => break joined.context("Analysis task failed")?,
            Ok(()) = rx.changed() => {
                if !quiet {
                    print!("{}", printer.update(&rx.borrow_and_update()));
                }
            }
        }
    };

    if !quiet {
        print!("{}", printer.update(&snapshot));
        let _ = std::io::stdout().flush();
    }
    Ok(snapshot)
}

/// The newest model turn, once the reply to the question sent after
/// `baseline` turns exists.
fn pending_reply(snapshot: &AnalysisSnapshot, baseline: usize) -> Option<&str> {
    let turns = snapshot.chat_turns();
    if turns.len() < baseline + 2 {
        return None;
    }
    turns
        .last()
        .filter(|turn| turn.role == ChatRole::Model)
        .map(|turn| turn.content.as_str())
}

/// Reads questions from stdin and streams the answers to stdout.
async fn chat_loop(orchestrator: &Arc<AnalysisOrchestrator>) -> Result<()> {
    if let Some(greeting) = orchestrator.snapshot().chat_turns().last() {
        println!("\n{}", greeting.content);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut turn_printer = TurnPrinter::default();

    loop {
        print!("\n> ");
        let _ = std::io::stdout().flush();

        let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
            break;
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }

        let baseline = orchestrator.snapshot().chat_turns().len();
        let mut rx = orchestrator.subscribe();
        turn_printer.reset();

        let send = orchestrator.send_chat_message(question);
        tokio::pin!(send);
        let outcome = loop {
            tokio::select! {
                outcome = &mut send => break outcome,
                Ok(()) = rx.changed() => {
                    let snapshot = rx.borrow_and_update();
                    if let Some(delta) = pending_reply(&snapshot, baseline).and_then(|c| turn_printer.delta(c)) {
                        print!("{}", delta);
                        let _ = std::io::stdout().flush();
                    }
                }
            }
        };

        if let Err(e) = outcome {
            eprintln!("{}", e);
            continue;
        }
        let snapshot = orchestrator.snapshot();
        if let Some(delta) = pending_reply(&snapshot, baseline).and_then(|c| turn_printer.delta(c)) {
            print!("{}", delta);
        }
        println!();
    }
    Ok(())
}
