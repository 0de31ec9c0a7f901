use std::path::{Path, PathBuf};
use std::{env, fs};

use anyhow::Context;
use signon::config::TracingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::{Layer as _, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

mod cli;

/// How many parent directories to search for a `.env` file.
const DOTENV_SEARCH_DEPTH: usize = 3;

fn main() -> anyhow::Result<()> {
    load_dotenv();

    let cli_args = cli::args();
    let mut config = if let Some(config_path) = cli_args.config_path.as_deref() {
        read_and_parse_config_file(config_path)?
    } else if fs::exists("./signon.toml")? {
        read_and_parse_config_file(Path::new("./signon.toml"))?
    } else {
        signon::Config::default()
    };

    cli_args.apply_to_config(&mut config);

    config
        .steam_auth
        .override_api_key(env::var("STEAM_API_KEY").ok());

    let _guard = if config.tracing.enable {
        init_tracing(&config.tracing).context("failed to initialize tracing")?
    } else {
        None
    };

    signon::run(config).context("failed to run server")
}

/// Loads the first `.env` file found in the working directory or one of its parents.
fn load_dotenv() {
    let result = match find_dotenv() {
        Some(path) => dotenvy::from_path(&path),
        None => dotenvy::dotenv().map(drop),
    };

    match result {
        Err(error) if !error.not_found() => eprintln!("Failed to load `.env` file: {error}"),
        Ok(()) | Err(_) => {},
    }
}

fn find_dotenv() -> Option<PathBuf> {
    env::current_dir()
        .ok()?
        .ancestors()
        .take(DOTENV_SEARCH_DEPTH + 1)
        .map(|dir| dir.join(".env"))
        .find(|path| path.is_file())
}

fn read_and_parse_config_file(path: &Path) -> anyhow::Result<signon::Config> {
    fs::read_to_string(path)
        .context("failed to read configuration file")
        .and_then(|text| toml::from_str(&text).context("failed to parse configuration file"))
}

fn init_tracing(config: &TracingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let env_filter =
        || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("signon=info,warn"));

    let stderr = config.stderr.enable.then(|| {
        tracing_subscriber::fmt::layer()
            .pretty()
            .with_ansi(config.stderr.ansi)
    });

    let (files, guard) = config
        .files
        .enable
        .then(|| {
            fs::create_dir_all(&config.files.directory).context("create log dir")?;

            let log_dir = config
                .files
                .directory
                .canonicalize()
                .context("canonicalize log dir path")?;

            let (writer, guard) = tracing_appender::rolling::Builder::new()
                .rotation(Rotation::DAILY)
                .filename_prefix("signon")
                .filename_suffix("log")
                .build(&log_dir)
                .map(tracing_appender::non_blocking)
                .context("failed to initialize logger")?;

            let layer = tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
                .with_target(true)
                .with_thread_ids(true)
                .with_writer(writer);

            anyhow::Ok((layer, guard))
        })
        .transpose()?
        .unzip();

    tracing_subscriber::registry()
        .with(tracing_subscriber::Layer::and_then(stderr, files).with_filter(env_filter()))
        .init();

    Ok(guard)
}
