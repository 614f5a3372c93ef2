mod cli;

use std::process::ExitCode;

use anyhow::{Context, Result};
use citenorm::files::{read_document, write_document};
use citenorm::{Diagnostic, Formatter};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

fn main() -> ExitCode {
    init_tracing();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            error!(error = %err, "command failed");
            for cause in err.chain().skip(1) {
                error!(cause = %cause, "caused by");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let formatter = Formatter::new().with_config(cli.formatter_config());
    let text = read_document(&cli.file)
        .with_context(|| format!("failed to read report: {}", cli.file.display()))?;

    let warnings = formatter.validate(&text);
    report("pre-format", &warnings);

    if cli.check {
        if !warnings.is_empty() {
            return Ok(ExitCode::FAILURE);
        }
        info!("OK — no issues found");
        return Ok(ExitCode::SUCCESS);
    }

    let formatted = formatter.renumber(&text);

    if cli.stdout {
        println!("{formatted}");
    } else {
        write_document(&cli.file, &formatted)
            .with_context(|| format!("failed to write report: {}", cli.file.display()))?;
        info!(path = %cli.file.display(), "formatted");
    }

    report("post-format", &formatter.validate(&formatted));

    if cli.pdf {
        let pdf = cli
            .pdf_exporter()
            .export(&cli.file)
            .with_context(|| format!("failed to export pdf for {}", cli.file.display()))?;
        info!(path = %pdf.display(), "exported");
    }

    Ok(ExitCode::SUCCESS)
}

fn report(stage: &str, warnings: &[Diagnostic]) {
    for warning in warnings {
        warn!(stage = %stage, "{warning}");
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
