use anyhow::{anyhow, Context, Result};
use clap::Parser;
use covstack::cli::{Cli, Commands, InputArgs};
use covstack::config::{load_config, load_config_from_path, CovstackConfig};
use covstack::driver::LcovDriver;
use covstack::io::FileScanner;
use covstack::parser::RustParser;
use covstack::session::{Session, SessionStack};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Export { input, file } => handle_export(&input, file.as_deref()),
        Commands::Metrics { input, qualified } => handle_metrics(&input, qualified.as_deref()),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_export(input: &InputArgs, file: Option<&Path>) -> Result<()> {
    let mut session = collect(build_session(input)?)?;

    let json = match file {
        Some(file) => {
            let file = absolute(file)?;
            let lines = session
                .export_file(&file)
                .with_context(|| format!("Failed to export {}", file.display()))?;
            let key = session.relative(&file);
            serde_json::to_string_pretty(&BTreeMap::from([(key, lines)]))?
        }
        None => serde_json::to_string_pretty(&session.export()?)?,
    };
    write_output(input.output.as_deref(), &json)
}

fn handle_metrics(input: &InputArgs, qualified: Option<&str>) -> Result<()> {
    let mut session = collect(build_session(input)?)?;
    let metrics = session.metrics().context("Failed to compute metrics")?;

    let node = match qualified {
        Some(name) => metrics
            .get(name)
            .ok_or_else(|| anyhow!("No metrics entry named {}", name))?,
        None => &metrics,
    };
    let json = serde_json::to_string_pretty(&node.report())?;
    write_output(input.output.as_deref(), &json)
}

fn build_session(input: &InputArgs) -> Result<Session> {
    let mut config = match &input.config {
        Some(path) => load_config_from_path(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => load_config(),
    };
    apply_overrides(&mut config, input)?;

    let files = FileScanner::from_config(&config.scan)?
        .scan()
        .context("Failed to scan tracked files")?;
    tracing::info!(files = files.len(), "tracking files");

    let session = Session::builder(
        LcovDriver::new(input.lcov.clone()).include_existing(),
        Arc::new(RustParser::new()),
    )
    .config(&config)
    .files(files)
    .build()?;
    Ok(session)
}

fn apply_overrides(config: &mut CovstackConfig, input: &InputArgs) -> Result<()> {
    if !input.paths.is_empty() {
        config.scan.paths = input.paths.clone();
    }
    if let Some(base) = &input.base {
        config.base = base.clone();
    }
    if input.prefix.is_some() {
        config.prefix = input.prefix.clone();
    }

    // Drivers report absolute paths
    config.base = absolute(&config.base)?;
    config.scan.paths = config
        .scan
        .paths
        .iter()
        .map(|p| absolute(p))
        .collect::<Result<_>>()?;
    config.validate()?;
    Ok(())
}

/// Run one top-level session over the tracefiles
fn collect(session: Session) -> Result<Session> {
    let mut stack = SessionStack::new();
    let id = stack.start(session);
    stack
        .stop(id, true)
        .ok_or_else(|| anyhow!("Coverage session was not active when stopped"))
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    Ok(cwd.join(path))
}

fn write_output(output: Option<&Path>, contents: &str) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, contents)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            println!("{}", contents);
            Ok(())
        }
    }
}
