use std::error::Error;
use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use geo_suppliers::{DataSpec, Loader, Settings};
use tracing_subscriber::EnvFilter;

/// Generates records of synthetic geographic values from a JSON data spec.
#[derive(Debug, Parser)]
#[command(author, version, about = "Synthetic MGRS, UTM and lat/long generator")]
struct Args {
    /// Path to the JSON data spec.
    #[arg(long)]
    spec: PathBuf,

    /// Number of records to generate.
    #[arg(long, default_value_t = 1)]
    iterations: u64,

    /// Seed for reproducible output. Seeded from the OS when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Directory used to resolve relative geojson paths. Defaults to GEO_DATA_DIR.
    #[arg(long)]
    datadir: Option<PathBuf>,
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let settings = Settings::from_env();
    init_logging(&settings.log_level);

    let spec = DataSpec::from_path(&args.spec)?;
    let mut loader = Loader::new(settings, args.seed);
    if let Some(datadir) = args.datadir {
        loader = loader.with_data_dir(datadir);
    }

    tracing::info!(
        spec = %args.spec.display(),
        iterations = args.iterations,
        fields = spec.fields.len(),
        "generating records"
    );

    let mut out = std::io::stdout().lock();
    loader.for_each_entry(&spec, args.iterations, |record| -> Result<(), Box<dyn Error>> {
        writeln!(out, "{}", serde_json::to_string(&record)?)?;
        Ok(())
    })
}

fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("warning: logging disabled: {err}");
    }
}
