use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::{Parser, Subcommand};
use realize_core::{BonusRule, european_decimal, percentage};
use realize_ingest::{normalize, read_and_decode};
use realize_report::{Report, emit_to_path, output_path_for, write_breakdown_json};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod config;
mod state;

use config::{Config, init_config, load_config, resolve_config_path};

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("REALIZE_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(name = "realize", version = VERSION, about = "Fundraising realization report formatter")]
struct Cli {
    /// Config file (default: ~/.realize/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score a campaign export and write the formatted report CSV
    Format {
        input: PathBuf,

        /// Output path (default: <input stem>_formatted.csv next to the input)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Also write per-fundraiser breakdowns as JSON
        #[arg(long)]
        breakdown_json: Option<PathBuf>,

        /// Year for `KW WW` labels when the file has no WW/YYYY label
        #[arg(long)]
        year: Option<i32>,

        /// Bonus threshold as a fraction, e.g. 0.70
        #[arg(long)]
        threshold: Option<Decimal>,
    },

    /// Validate an export without writing anything
    Check {
        input: PathBuf,

        #[arg(long)]
        year: Option<i32>,
    },

    /// Manage ~/.realize/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
}

fn init_tracing(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = match std::env::var("RUST_LOG") {
        Ok(_) if !verbose => EnvFilter::from_env("RUST_LOG"),
        _ => EnvFilter::new(default_level),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("init tracing: {e}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command {
        Command::Format {
            input,
            output,
            breakdown_json,
            year,
            threshold,
        } => {
            let mut cfg = load_config(cli.config.as_deref())?;
            if let Some(y) = year {
                cfg.input.default_year = Some(y);
            }
            if let Some(t) = threshold {
                cfg.bonus = BonusRule { threshold: t };
            }
            cfg.validate()?;
            let today = Local::now().date_naive();
            let out_path = output.unwrap_or_else(|| output_path_for(&input, &cfg.output.suffix));

            let report = build_report(&cfg, &input)
                .with_context(|| format!("{} could not be processed", input.display()))?;

            emit_to_path(&report, &out_path, &cfg.emit_options(today)?)?;
            if let Some(p) = breakdown_json {
                write_breakdown_json(&p, &report.breakdowns())?;
                println!("Wrote breakdowns to {}", p.display());
            }

            print_outcome(&report);
            println!("Wrote {}\n", out_path.display());
            print_weekly_summary(&report);
        }

        Command::Check { input, year } => {
            let mut cfg = load_config(cli.config.as_deref())?;
            if let Some(y) = year {
                cfg.input.default_year = Some(y);
            }
            cfg.validate()?;
            let report = build_report(&cfg, &input)
                .with_context(|| format!("{} could not be processed", input.display()))?;
            print_outcome(&report);
            if report.rejected_count() > 0 {
                bail!("{} row(s) failed validation", report.rejected_count());
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => init_config(cli.config.as_deref())?,
            ConfigCommand::Show => {
                let cfg = load_config(cli.config.as_deref())?;
                let path = resolve_config_path(cli.config.as_deref())?;
                println!("# {}", path.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

fn build_report(cfg: &Config, input: &Path) -> Result<Report> {
    if !input.exists() {
        bail!("CSV not found: {}", input.display());
    }

    let decoded = read_and_decode(input, &cfg.encoding_chain()?)?;
    info!(encoding = %decoded.encoding, path = %input.display(), "decoded input");

    let opts = cfg.normalize_options()?;
    debug!(?opts, "normalizing");
    let normalized = normalize(&decoded.text, &opts)?;

    Ok(Report::build(normalized, &cfg.scoring, &cfg.bonus))
}

fn print_outcome(report: &Report) {
    println!(
        "Accepted rows: {} | rejected rows: {} | summary rows skipped: {}",
        report.accepted_count(),
        report.rejected_count(),
        report.summary_rows_skipped()
    );
    for err in report.rejected() {
        println!("  - {}", err);
    }
}

fn print_weekly_summary(report: &Report) {
    println!(
        "{:<9} {:>6} {:>8} {:>6} {:>8} {:>8} {:>7}  Bonus",
        "Week", "Groups", "Eligible", "Donors", "Approved", "Rate", "Points"
    );
    for w in report.weekly_summary() {
        println!(
            "{:<9} {:>6} {:>8} {:>6} {:>8} {:>8} {:>7}  {}",
            w.week.to_string(),
            w.groups,
            w.eligible_groups,
            w.donors,
            w.approved_donors,
            percentage(w.realization_ratio),
            european_decimal(w.total_points),
            if w.bonus_eligible { "yes" } else { "no" }
        );
    }
}
