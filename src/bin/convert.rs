use clap::{Parser, ValueEnum};
use clue_core::persistence::{save_dense, text_to_dense};
use clue_core::similarity::EmbeddingModel;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Model {
    Plain,
    Glove,
    Conceptnet,
}

impl From<Model> for EmbeddingModel {
    fn from(model: Model) -> Self {
        match model {
            Model::Plain => EmbeddingModel::Plain,
            Model::Glove => EmbeddingModel::Glove,
            Model::Conceptnet => EmbeddingModel::ConceptNet,
        }
    }
}

/// Converts textual word vectors (one `word v1 ... vD` per line, most
/// popular first) into the binary embedding format.
#[derive(Parser, Debug)]
#[command(name = "clue_convert")]
struct Cli {
    input: PathBuf,
    output: PathBuf,

    /// Post-processing applied when the file is loaded
    #[arg(long, value_enum, default_value_t = Model::Plain)]
    model: Model,

    /// Keep only the first N words
    #[arg(long)]
    limit: Option<usize>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    match convert(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "conversion failed");
            ExitCode::FAILURE
        }
    }
}

fn convert(cli: &Cli) -> clue_core::Result<()> {
    let start = Instant::now();
    let file = File::open(&cli.input)?;
    let model = EmbeddingModel::from(cli.model);
    let table = text_to_dense(BufReader::new(file), model.id(), cli.limit, &cli.input)?;
    save_dense(&table, &cli.output)?;
    info!(
        words = table.len(),
        dimension = table.dimension,
        model = ?model,
        output = %cli.output.display(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "embeddings converted"
    );
    Ok(())
}
