use clap::Parser;
use gp_perf::{load_dataset, ExperimentConfig, Kernel, Target};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML experiment config; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Dataset CSV file
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Schema name (apim, ballerina, springboot); taken from the file name by default
    #[arg(long)]
    schema: Option<String>,

    /// latency or throughput
    #[arg(long)]
    target: Option<Target>,

    /// Number of cross-validation folds
    #[arg(long)]
    folds: Option<usize>,

    /// Shuffle seed; defaults to the dataset's own seed
    #[arg(long)]
    seed: Option<u64>,

    /// matern52 or exp_quad
    #[arg(long)]
    kernel: Option<Kernel>,
}

impl Args {
    fn into_config(self) -> anyhow::Result<ExperimentConfig> {
        let mut config = match &self.config {
            Some(path) => ExperimentConfig::load(path)?,
            None => ExperimentConfig::default(),
        };
        if let Some(dataset) = self.dataset {
            config.dataset = dataset;
        }
        if self.schema.is_some() {
            config.schema = self.schema;
        }
        if let Some(target) = self.target {
            config.target = target;
        }
        if let Some(folds) = self.folds {
            config.folds = folds;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(kernel) = self.kernel {
            config.model.kernel = kernel;
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    let config = Args::parse().into_config()?;
    let schema = config.resolve_schema()?;
    info!(dataset = %config.dataset.display(), schema = schema.name, "loading");

    let data = load_dataset(&config.dataset, schema, &config.load_options(), None)?;
    let seed = config.seed.unwrap_or(data.seed);
    info!(rows = data.labels.len(), features = data.features.ncols(), seed, "loaded");

    let report = config
        .cross_validation()
        .run(data.features.view(), data.labels.view(), seed)?;
    println!("{}", report);
    Ok(())
}
