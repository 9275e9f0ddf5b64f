use anyhow::{Context, Result};
use clap::Parser;
use speech_ingest::audio::AudioMaterializer;
use speech_ingest::catalog::Catalog;
use speech_ingest::cli::Cli;
use speech_ingest::config::Config;
use speech_ingest::output::{ConsoleObserver, print_banner, print_summary};
use speech_ingest::pipeline::Ingestor;
use speech_ingest::source::hub::{HubDataset, HubSettings};

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .format_timestamp(None)
        .init();

    let config = load_config(cli.config.as_deref())?;
    config.validate()?;

    let layout = config.layout(&cli.root);
    let request = cli.request();
    if !cli.quiet {
        print_banner(&config.dataset.id, &layout, &request);
    }

    layout
        .create_dirs()
        .context("Failed to create working directories")?;

    let mut settings = HubSettings::from_config(&config, &layout);
    settings.progress = !cli.quiet;
    if !cli.quiet {
        eprintln!("Loading dataset '{}'...", settings.dataset);
    }
    let dataset = HubDataset::open(settings)?;

    let catalog = Catalog::open(&layout.catalog_path)?;
    let materializer = AudioMaterializer::new(layout.output_dir.clone());
    let mut ingestor = Ingestor::new(dataset, materializer, catalog);

    let mut observer = ConsoleObserver::new(cli.quiet);
    let summary = ingestor.run(&request, &mut observer)?;

    if cli.quiet {
        println!("{}", speech_ingest::output::format_summary(&summary));
    } else {
        print_summary(&summary);
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/speech-ingest/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(custom_path: Option<&std::path::Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?
    } else {
        match Config::default_path() {
            Some(default_path) => Config::load_or_default(&default_path)?,
            None => Config::default(),
        }
    };

    Ok(config.with_env_overrides())
}
