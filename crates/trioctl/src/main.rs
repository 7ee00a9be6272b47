//! Trio Control - runs the Planner -> Reviewer -> Finalizer pipeline
//!
//! Title and content come from flags or interactive prompts; the report goes to
//! stdout, logs and diagnostics to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use tracing::{error, info};

use trio_common::{OllamaGenerator, Pipeline, PipelineSettings, TrioConfig};
use trioctl::cli::Cli;
use trioctl::errors::{
    EXIT_CONFIG_ERROR, EXIT_GENERAL_ERROR, EXIT_SERVICE_UNAVAILABLE, EXIT_SUCCESS, EXIT_USAGE,
};
use trioctl::{input, logging, output};

fn main() {
    let cli = Cli::parse();

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_GENERAL_ERROR
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<i32> {
    let mut config = match TrioConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_CONFIG_ERROR);
        }
    };
    config.apply_overrides(cli.endpoint.clone(), cli.model.clone(), cli.timeout);
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return Ok(EXIT_CONFIG_ERROR);
    }

    logging::init(cli.verbose, &config.log.level);
    info!(
        "trioctl v{} using {} ({})",
        env!("TRIO_VERSION"),
        config.generation.endpoint,
        config.generation.model
    );

    let stdin = io::stdin();
    let inputs = input::collect(cli.title, cli.content, stdin.lock(), io::stdout())
        .context("Failed to read title/content")?;
    if let Some(field) = inputs.missing_field() {
        eprintln!("Error: {} must not be empty", field);
        return Ok(EXIT_USAGE);
    }

    let endpoint = config.generation.endpoint.clone();
    let model = config.generation.model.clone();
    let unavailable = |e: &trio_common::GenerationError| -> Result<i32> {
        error!("Generation service unavailable: {}", e);
        output::render_unavailable(&mut io::stderr(), e, &endpoint, &model)
            .context("Failed to write diagnostics")?;
        Ok(EXIT_SERVICE_UNAVAILABLE)
    };

    let generator = match OllamaGenerator::new(&config.generation) {
        Ok(g) => g,
        Err(e) => return unavailable(&e),
    };
    let pipeline = Pipeline::new(generator, PipelineSettings::from(&config));

    // Each stage is printed as soon as it finishes, so a Reviewer failure
    // still leaves the Planner output on screen
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut written: io::Result<()> = Ok(());
    let outcome = pipeline.run_with(&inputs.title, &inputs.content, |stage| {
        if written.is_ok() {
            written = output::render_stage(&mut out, stage).and_then(|()| out.flush());
        }
    });
    written.context("Failed to write report")?;

    let report = match outcome {
        Ok(report) => report,
        Err(e) => return unavailable(&e),
    };

    output::render_final(
        &mut out,
        &report.final_draft,
        report.review.changed,
        &output::run_timestamp(),
    )
    .context("Failed to write report")?;
    out.flush().context("Failed to flush stdout")?;

    Ok(EXIT_SUCCESS)
}
