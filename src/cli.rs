use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, info};
use std::io::{Read, Write};
use std::path::PathBuf;

use crate::config::{Config, OutputFormat};
use crate::execution::ExecutionDocument;
use crate::extractor::build_error_report;
use crate::output;
use crate::status::build_status_report;

#[derive(Parser)]
#[command(name = "execlens")]
#[command(
    author,
    version,
    about = "Turns CI/CD execution JSON into error and status reports",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Read the execution JSON from a file instead of stdin
    #[arg(short, long, global = true)]
    input: Option<PathBuf>,

    /// Write the report to a file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Report format
    #[arg(short, long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// Pretty-print JSON output
    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,

    /// Configuration file
    #[arg(short, long, global = true, env = "EXECLENS_CONFIG")]
    config: Option<PathBuf>,

    /// Disable coloured output
    #[arg(long, global = true, default_value_t = false)]
    no_color: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Commands {
    /// Summarize categorized errors from the failed actions of an execution
    Errors,
    /// Show an execution's status, timing and per-action results
    Status,
}

/// Resolved output settings: command-line flags layered over the config file.
#[derive(Debug, Clone, Copy)]
struct RenderOptions {
    format: OutputFormat,
    pretty: bool,
    colored: bool,
}

impl Cli {
    fn render_options(&self, config: &Config) -> RenderOptions {
        RenderOptions {
            format: self.format.unwrap_or(config.output.format),
            pretty: self.pretty || config.output.pretty,
            colored: config.output.color && !self.no_color && self.output.is_none(),
        }
    }

    fn read_input(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        if let Some(path) = &self.input {
            std::fs::File::open(path)
                .and_then(|mut file| file.read_to_end(&mut buffer))
                .with_context(|| format!("Failed to read input file: {}", path.display()))?;
        } else {
            std::io::stdin()
                .read_to_end(&mut buffer)
                .context("Failed to read standard input")?;
        }
        Ok(buffer)
    }

    fn write_report(&self, report: &str) -> Result<()> {
        if let Some(output_path) = &self.output {
            std::fs::write(output_path, report)
                .with_context(|| format!("Failed to write report: {}", output_path.display()))?;
            info!("Report written to: {}", output_path.display());
        } else {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(report.as_bytes())?;
            stdout.flush()?;
        }
        Ok(())
    }

    /// Produces the report text for one JSON document.
    fn run(&self, input: &[u8], options: RenderOptions) -> Result<String> {
        let document = ExecutionDocument::parse(input)?;

        let Some(execution) = document.into_first() else {
            let message = match self.command {
                Commands::Errors => output::NO_EXECUTION_DATA,
                Commands::Status => output::NO_EXECUTIONS,
            };
            return Ok(format!("{message}\n"));
        };
        debug!(
            "Execution has {} actions",
            execution.action_executions.len()
        );

        let report = match self.command {
            Commands::Errors => match build_error_report(&execution) {
                Some(report) => output::render_error_report(
                    &report,
                    options.format,
                    options.pretty,
                    options.colored,
                )?,
                None => format!("{}\n", output::NO_FAILED_ACTIONS),
            },
            Commands::Status => output::render_status_report(
                &build_status_report(&execution),
                options.format,
                options.pretty,
                options.colored,
            )?,
        };

        Ok(report)
    }

    pub fn execute(&self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;
        let options = self.render_options(&config);
        debug!("Rendering {:?} report as {:?}", self.command, options.format);

        let input = self.read_input()?;
        let report = self.run(&input, options)?;
        self.write_report(&report)
    }
}
