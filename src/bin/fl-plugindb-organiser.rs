use anyhow::{Context, Result};
use clap::Parser;
use plugindb_organiser::config::{ensure_supported_platform, OrganiserConfig};
use plugindb_organiser::console::{palette, Reporter};
use plugindb_organiser::logging::file_subscriber;
use plugindb_organiser::{DatabaseLocation, OrganiseError, Organiser, RunContext};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "fl-plugindb-organiser")]
#[command(about = "Reads plugin database files (.nfo) created by FL Studio and reorganises them into folders based on plugin vendor names")]
#[command(version)]
struct Args {
    /// Folder to create the 'Generators' and 'Effects' folders in ('.' for the current folder)
    output: PathBuf,

    /// Location of the log file, defaults to ./fl-plugindb-organiser.log
    #[arg(short, long)]
    log: Option<PathBuf>,

    /// Disable coloured output
    #[arg(long)]
    no_color: bool,

    /// Also write a JSON summary of the run to this file
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            let code = e
                .downcast_ref::<OrganiseError>()
                .map(OrganiseError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

fn run(args: Args) -> Result<()> {
    ensure_supported_platform()?;

    let cwd = std::env::current_dir().context("Failed to read the current folder")?;
    let config = OrganiserConfig::resolve(
        &cwd,
        &args.output,
        args.log.as_deref(),
        args.no_color,
        args.report.as_deref(),
    );

    let (subscriber, _guard) = file_subscriber(&config.log_file)
        .context(format!("Failed to open log file: {:?}", config.log_file))?;
    let _default = tracing::subscriber::set_default(subscriber);
    tracing::info!(output = ?config.output_dir, "Starting run");

    let ctx = RunContext::new(Reporter::new(palette(config.color)));
    let organiser = Organiser::new(DatabaseLocation::discover()?, &config.output_dir);

    let report = organiser.run(&ctx).map_err(|e| {
        tracing::error!("{e}");
        e
    })?;

    if let Some(report_file) = &config.report_file {
        let json = report.to_json()?;
        std::fs::write(report_file, json)
            .context(format!("Failed to write report: {:?}", report_file))?;
    }

    Ok(())
}
