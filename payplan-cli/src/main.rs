use std::fs;
use std::io::Read as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use payplan_core::{build_plan, PlanRequest};

#[derive(Parser, Debug)]
#[command(name = "payplan", version, about = "BNPL payment-plan engine CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the plan pipeline on a JSON request and print the JSON response
    Plan {
        /// Request JSON file (defaults to stdin)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Reference date (YYYY-MM-DD); defaults to today in the request's timezone
        #[arg(long)]
        as_of: Option<NaiveDate>,

        /// Pretty-print the response
        #[arg(long)]
        pretty: bool,
    },

    /// Run the pipeline and write the decoded .ics calendar to disk
    Ics {
        /// Request JSON file (defaults to stdin)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Reference date (YYYY-MM-DD); defaults to today in the request's timezone
        #[arg(long)]
        as_of: Option<NaiveDate>,

        /// Output path for the calendar file
        #[arg(long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Plan {
            input,
            as_of,
            pretty,
        } => run_plan(input, as_of, pretty),
        Command::Ics {
            input,
            as_of,
            output,
        } => run_ics(input, as_of, output),
    }
}

fn run_plan(input: Option<PathBuf>, as_of: Option<NaiveDate>, pretty: bool) -> Result<()> {
    let req = read_request(input)?;
    let reference = reference_date(&req, as_of)?;

    match build_plan(&req, reference) {
        Ok(resp) => {
            let out = if pretty {
                serde_json::to_string_pretty(&resp)?
            } else {
                serde_json::to_string(&resp)?
            };
            println!("{out}");
            Ok(())
        }
        Err(err) => reject(err),
    }
}

fn run_ics(input: Option<PathBuf>, as_of: Option<NaiveDate>, output: PathBuf) -> Result<()> {
    let req = read_request(input)?;
    let reference = reference_date(&req, as_of)?;

    match build_plan(&req, reference) {
        Ok(resp) => {
            let bytes = BASE64
                .decode(&resp.ics)
                .context("decoding calendar payload")?;
            fs::write(&output, bytes)
                .with_context(|| format!("writing {}", output.display()))?;
            println!(
                "Wrote {} ({} events)",
                output.display(),
                resp.normalized.len()
            );
            Ok(())
        }
        Err(err) => reject(err),
    }
}

/// Render an engine error as an RFC 9457 Problem Details object on stderr.
fn reject(err: payplan_core::PlanError) -> Result<()> {
    let problem = err.to_problem("payplan-cli");
    eprintln!("{}", serde_json::to_string(&problem)?);
    std::process::exit(1);
}

fn read_request(input: Option<PathBuf>) -> Result<PlanRequest> {
    let raw = match input {
        Some(path) => fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            buf
        }
    };
    serde_json::from_str(&raw).context("parsing request JSON")
}

/// The engine takes "today" as a parameter; resolve it here, from the flag or
/// from the current instant in the request's timezone.
fn reference_date(req: &PlanRequest, as_of: Option<NaiveDate>) -> Result<NaiveDate> {
    if let Some(date) = as_of {
        return Ok(date);
    }
    let tz: Tz = req
        .time_zone
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown timezone: {}", req.time_zone))?;
    Ok(Utc::now().with_timezone(&tz).date_naive())
}
