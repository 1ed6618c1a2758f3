use clap::Parser;
use clue_core::batch;
use clue_core::config::{self, ScoringConfig};
use clue_core::session::{Command, Flow, GameSession, TeamColor};
use clue_core::{ClueBot, DenseEngine, EdgeListEngine, SimilarityEngine};
use crossterm::style::Stylize;
use std::io::{stdin, stdout, BufRead, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "clue_engine", about = "Codenames spymaster clue recommender")]
struct Cli {
    /// Dense embedding file (defaults to $CLUE_EMBEDDINGS, then data.bin)
    #[arg(long)]
    embeddings: Option<PathBuf>,

    /// Bincode edge-list file to use instead of dense embeddings
    #[arg(long, conflicts_with = "embeddings")]
    edge_list: Option<PathBuf>,

    /// JSON file overriding scoring constants
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read one request from stdin and answer in JSON
    #[arg(long)]
    batch: bool,

    /// Directory holding the batch-mode models (defaults to $CLUE_MODEL_DIR)
    #[arg(long)]
    model_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let default_level = if cli.batch { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
    config::init_worker_threads();

    let scoring = match &cli.config {
        Some(path) => match ScoringConfig::from_json_file(path) {
            Ok(scoring) => scoring,
            Err(e) => {
                error!(error = %e, "could not read scoring config");
                return ExitCode::FAILURE;
            }
        },
        None => ScoringConfig::default(),
    };

    if cli.batch {
        return run_batch(&cli, scoring);
    }

    let outcome = match &cli.edge_list {
        Some(path) => EdgeListEngine::load(path).and_then(|e| interactive(ClueBot::new(e, scoring))),
        None => {
            let path = cli.embeddings.clone().unwrap_or_else(config::embeddings_path);
            DenseEngine::load(&path).and_then(|e| interactive(ClueBot::new(e, scoring)))
        }
    };
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "clue engine stopped");
            ExitCode::FAILURE
        }
    }
}

fn run_batch(cli: &Cli, scoring: ScoringConfig) -> ExitCode {
    let mut input = String::new();
    if let Err(e) = stdin().read_to_string(&mut input) {
        error!(error = %e, "could not read batch request");
        return ExitCode::FAILURE;
    }
    let model_dir = cli.model_dir.clone().unwrap_or_else(config::model_dir);
    let reply = batch::run(&input, &model_dir, scoring);
    match reply.to_json() {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "could not encode batch reply");
            ExitCode::FAILURE
        }
    }
}

fn interactive<E: SimilarityEngine>(bot: ClueBot<E>) -> clue_core::Result<()> {
    let stdin = stdin();
    let mut lines = stdin.lock().lines();
    let mut out = stdout();

    println!("{}", "Codenames clue bot. Type 'help' for commands.".bold());
    let color = loop {
        print!("My color (b/r): ");
        out.flush()?;
        let Some(line) = lines.next() else {
            return Ok(());
        };
        if let Some(color) = TeamColor::parse(&line?) {
            break color;
        }
    };

    let mut session = GameSession::new(bot, color);
    loop {
        print!("> ");
        out.flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let Some(command) = Command::parse(&line?, color) else {
            continue;
        };
        if session.execute(command, &mut out)? == Flow::Quit {
            break;
        }
    }
    Ok(())
}
