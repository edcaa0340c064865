mod cli;
mod config;
mod logging;
mod output;

use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use std::time::Duration;
use vsdiff_compare::{ComparisonPipeline, PipelineOptions};
use vsdiff_package::PackageRef;
use vsdiff_tx_client::TerminologyClient;

use crate::cli::Args;
use crate::config::{expand_home, Config};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let _logging_guard = match logging::init_logging(&config.logging()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: failed to initialize logging: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    match run(args, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = Config::load(&expand_home(&args.config))?;
    if let Some(cutoff) = &args.cutoff {
        config.release_cutoff = Some(cutoff.clone());
    }
    config.validate()?;
    Ok(config)
}

async fn run(args: Args, config: Config) -> anyhow::Result<()> {
    let client = TerminologyClient::with_timeout(
        config.terminology_server.trim(),
        Duration::from_secs(config.request_timeout_secs),
    )
    .context("Failed to create terminology client")?;

    let options = PipelineOptions {
        cache_root: expand_home(&args.cache_dir),
        root: PackageRef::new(args.ig_id, args.ig_version),
        months_back: config.versions_to_compare,
        today: chrono::Local::now().date_naive(),
        cutoff: config.cutoff()?,
        max_concurrent_requests: config.max_concurrent_requests,
    };
    tracing::info!(
        package = %options.root,
        cache = %options.cache_root.display(),
        server = %client.endpoint(),
        months = options.months_back,
        "Starting comparison"
    );

    let report = ComparisonPipeline::new(options, &client).run().await?;

    let output_path = config.output_path();
    output::write_tsv(&output_path, &report)?;
    tracing::info!(path = %output_path.display(), rows = report.rows.len(), "Wrote report");

    if args.json_report {
        let json_path = output::json_report_path(&output_path);
        output::write_json_report(&json_path, &report)?;
        tracing::info!(path = %json_path.display(), "Wrote JSON report");
    }

    Ok(())
}
