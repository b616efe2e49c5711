//! RNG Comparative Study CLI
//!
//! Draws a sample from each selected source, analyzes it and prints the
//! comparison as a text report or a table.

use clap::{Parser, ValueEnum};
use rng_study::{report, CancelToken, FileConfig, QualityAnalyzer, SourceRegistry, Study};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    /// One block per source
    Text,
    /// One row per source
    Table,
}

/// Compare the statistical quality of randomness sources.
#[derive(Debug, Parser)]
#[command(name = "rng-study", version, about)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bytes drawn from each source
    #[arg(short = 'n', long)]
    size: Option<usize>,

    /// Source to include (repeatable): prng, csprng, urandom, random, or a configured device id
    #[arg(short, long = "source")]
    sources: Vec<String>,

    /// Fixed seed for the deterministic generator
    #[arg(long)]
    seed: Option<u64>,

    /// Sample sources one after another instead of in parallel
    #[arg(long)]
    sequential: bool,

    /// Maximum wait for an entropy device, in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Refuse samples too small for a reliable chi-square test
    #[arg(long)]
    strict: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// List registered sources and exit
    #[arg(long)]
    list: bool,

    /// Serve metrics and the latest report on this port after the run
    #[cfg(feature = "metrics")]
    #[arg(long)]
    metrics_port: Option<u16>,
}

impl Cli {
    fn load_config(&self) -> Result<FileConfig, rng_study::ConfigError> {
        let mut config = match &self.config {
            Some(path) => FileConfig::from_file(path)?,
            None => FileConfig::default(),
        };

        if let Some(size) = self.size {
            config.run.sample_size = size;
        }
        if !self.sources.is_empty() {
            config.run.sources = self.sources.clone();
        }
        if self.seed.is_some() {
            config.sources.prng_seed = self.seed;
        }
        if self.sequential {
            config.run.parallel = false;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.sources.device_timeout_ms = timeout_ms;
        }
        if self.strict {
            config.analysis.strict = true;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("RNG Comparative Study v{}", rng_study::VERSION);

    let config = match cli.load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        warn!("Interrupted; cancelling pending device reads");
        handler_token.cancel();
    }) {
        warn!("Failed to install Ctrl-C handler: {}", e);
    }

    let registry = SourceRegistry::from_config(&config.sources, &cancel);

    if cli.list {
        for id in registry.ids() {
            println!("{:<10} {}", id, registry.label(id).unwrap_or_default());
        }
        return ExitCode::SUCCESS;
    }

    let study = Study::new(registry, QualityAnalyzer::new(config.analysis.clone()));

    let results = match study.run(&config.run.request()) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let output = match cli.format {
        Format::Text => report::render_text(&results),
        Format::Table => report::render_table(&results),
    };
    print!("{}", output);

    info!(
        "Done: {} analyzed, {} unavailable",
        results.bundles().count(),
        results.failures().count()
    );

    #[cfg(feature = "metrics")]
    if let Some(port) = cli.metrics_port {
        return serve_metrics(port, results);
    }

    ExitCode::SUCCESS
}

#[cfg(feature = "metrics")]
fn serve_metrics(port: u16, results: rng_study::ResultSet) -> ExitCode {
    use rng_study::metrics::{MetricsRegistry, MetricsServer, MetricsServerConfig};

    let registry = match MetricsRegistry::new() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Failed to create metrics registry: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(async move {
        let server = MetricsServer::new(MetricsServerConfig::with_port(port), registry);
        server.state().write().await.update(results);

        match server.run().await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Metrics server failed: {}", e);
                ExitCode::FAILURE
            }
        }
    })
}
