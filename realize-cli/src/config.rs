use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use realize_core::{BonusRule, ScoringPolicy};
use realize_ingest::{NormalizeOptions, SourceEncoding};
use realize_report::EmitOptions;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::{default_config_path, ensure_realize_home};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input: InputSection,
    pub scoring: ScoringPolicy,
    pub bonus: BonusRule,
    pub output: OutputSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSection {
    /// Tried in order until one decodes the file
    pub encodings: Vec<String>,
    /// "auto", ";", ",", or "tab"
    pub delimiter: String,
    /// Year for `KW WW` labels when the file has no `WW/YYYY` label to
    /// infer it from; such rows are rejected when unset
    pub default_year: Option<i32>,
    pub fill_down: bool,
    pub fundraiser_id_width: usize,
    pub header_scan_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub delimiter: String,
    pub title_prefix: String,
    pub write_preamble: bool,
    pub utf8_bom: bool,
    /// Appended to the input stem for the output file name
    pub suffix: String,
}

impl Default for InputSection {
    fn default() -> Self {
        Self {
            encodings: SourceEncoding::DEFAULT_CHAIN
                .iter()
                .map(|e| e.label().to_string())
                .collect(),
            delimiter: "auto".to_string(),
            default_year: None,
            fill_down: true,
            fundraiser_id_width: 5,
            header_scan_limit: 10,
        }
    }
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            delimiter: ";".to_string(),
            title_prefix: "WoVi_CW_Formatted".to_string(),
            write_preamble: true,
            utf8_bom: true,
            suffix: "_formatted".to_string(),
        }
    }
}

/// `None` means sniff from the input.
fn parse_delimiter(s: &str) -> Result<Option<u8>> {
    match s {
        "auto" => Ok(None),
        "tab" | "\t" => Ok(Some(b'\t')),
        _ if s.len() == 1 && s.is_ascii() => Ok(Some(s.as_bytes()[0])),
        _ => bail!("invalid delimiter {s:?} (use \"auto\", \"tab\" or a single ASCII character)"),
    }
}

impl Config {
    pub fn encoding_chain(&self) -> Result<Vec<SourceEncoding>> {
        if self.input.encodings.is_empty() {
            bail!("input.encodings must name at least one encoding");
        }
        self.input
            .encodings
            .iter()
            .map(|label| label.parse::<SourceEncoding>().context("input.encodings"))
            .collect()
    }

    /// Reject settings no run could use.
    pub fn validate(&self) -> Result<()> {
        let t = self.bonus.threshold;
        if t < Decimal::ZERO || t > Decimal::ONE {
            bail!("bonus.threshold must lie between 0 and 1, got {t}");
        }
        Ok(())
    }

    pub fn normalize_options(&self) -> Result<NormalizeOptions> {
        Ok(NormalizeOptions {
            delimiter: parse_delimiter(&self.input.delimiter).context("input.delimiter")?,
            default_year: self.input.default_year,
            fill_down: self.input.fill_down,
            fundraiser_id_width: self.input.fundraiser_id_width,
            header_scan_limit: self.input.header_scan_limit,
        })
    }

    pub fn emit_options(&self, today: NaiveDate) -> Result<EmitOptions> {
        let delimiter = parse_delimiter(&self.output.delimiter)
            .context("output.delimiter")?
            .context("output.delimiter cannot be \"auto\"")?;
        Ok(EmitOptions {
            delimiter,
            title: self
                .output
                .write_preamble
                .then(|| format!("{}_{}", self.output.title_prefix, today.format("%Y-%m-%d"))),
            utf8_bom: self.output.utf8_bom,
        })
    }
}

/// Explicit path, else `~/.realize/config.toml`, else defaults.
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(p) => Ok(p.to_path_buf()),
        None => default_config_path(),
    }
}

pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let p = resolve_config_path(explicit)?;
    if !p.exists() {
        if explicit.is_some() {
            bail!("config not found: {}", p.display());
        }
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(cfg: &Config, path: &Path) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn init_config(explicit: Option<&Path>) -> Result<()> {
    let p = match explicit {
        Some(p) => p.to_path_buf(),
        None => ensure_realize_home()?.join("config.toml"),
    };
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default(), &p)?;
    println!("Wrote {}", p.display());
    Ok(())
}
