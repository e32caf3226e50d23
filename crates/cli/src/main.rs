use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use composer_core::{
    load_config, load_config_from_env, validate_config, ComposeRequest, Composer, Config,
    InputSet, OutputFormat, ToolRunner,
};

/// Environment variable naming the configuration file.
const CONFIG_ENV: &str = "COMPOSER_CONFIG";

#[derive(Debug, Parser)]
#[command(
    name = "compose",
    version,
    about = "Compose a video with a replacement audio track and burned-in subtitles"
)]
struct Cli {
    /// Base video file
    #[arg(value_name = "VIDEO")]
    video: PathBuf,

    /// Audio file replacing the video's own audio
    #[arg(short, long)]
    audio: Option<PathBuf>,

    /// Subtitle file to burn into the picture
    #[arg(short, long)]
    subtitle: Option<PathBuf>,

    /// Output container (mp4, mov, avi)
    #[arg(short, long, default_value = "mp4")]
    format: OutputFormat,

    /// Configuration file (falls back to $COMPOSER_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the tool deadline, in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Keep the request's scratch directory
    #[arg(long)]
    keep_temp: bool,

    /// Print the result as JSON instead of the output path
    #[arg(long)]
    json: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    fn inputs(&self) -> InputSet {
        let mut inputs = InputSet::new(&self.video);
        if let Some(audio) = &self.audio {
            inputs = inputs.with_audio(audio);
        }
        if let Some(subtitle) = &self.subtitle {
            inputs = inputs.with_subtitle(subtitle);
        }
        inputs
    }

    fn config_path(&self) -> Option<PathBuf> {
        self.config
            .clone()
            .or_else(|| std::env::var(CONFIG_ENV).ok().map(PathBuf::from))
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    if let Err(e) = run(cli).await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());

    // Logs go to stderr; stdout carries the result
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;
    validate_config(&config).context("Configuration validation failed")?;

    let composer = Composer::from_config(config);
    if let Err(e) = composer.runner().validate().await {
        warn!("Media tool check failed: {}", e);
    }

    let request = ComposeRequest::new(cli.inputs(), cli.format);
    info!(request_id = %request.id, "Starting composition");

    let output = composer.compose(request).await.context("Composition failed")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", output.output_path.display());
    }

    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = match cli.config_path() {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            load_config(&path).with_context(|| format!("Failed to load config from {:?}", path))?
        }
        None => load_config_from_env().context("Failed to load config from environment")?,
    };

    if let Some(timeout) = cli.timeout {
        config.tool.timeout_secs = timeout;
    }
    if cli.keep_temp {
        config.workspace.keep_temp = true;
    }

    Ok(config)
}
