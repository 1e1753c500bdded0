use crate::error::{AquaGuardError, Result};
use crate::models::{parse_all, parse_date_bound, FilterState, SignalSource, StressBucket};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "aquaguard",
    version,
    about = "Parcel water-stress monitoring TUI"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config.yaml
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the data directory (log file)
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Re-run interactive setup
    Init,
    /// Validate config and probe the backend
    Check,
    /// Print the parcels matching the given filters
    List(ListArgs),
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct ListArgs {
    /// Province name, or "all"
    #[arg(long, default_value = "all")]
    pub province: String,

    /// Signal source: ndvi_era5, ndvi, manual or "all"
    #[arg(long, default_value = "all")]
    pub source: String,

    /// Stress bucket: low, medium, high or "all"
    #[arg(long, default_value = "all")]
    pub stress: String,

    /// Window start (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// Window end (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,

    /// Rainfall scenario, 1.0 = observed
    #[arg(long)]
    pub rain_factor: Option<f64>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl ListArgs {
    /// Build the filter set. A missing rain factor falls back to `default_rain_factor`.
    pub fn to_filters(&self, default_rain_factor: f64) -> Result<FilterState> {
        let province = parse_all(&self.province, |s| Some(s.to_string()))
            .ok_or_else(|| invalid("province", &self.province))?;
        let source = parse_all(&self.source, SignalSource::from_str)
            .ok_or_else(|| invalid("source", &self.source))?;
        let stress_bucket = parse_all(&self.stress, StressBucket::from_str)
            .ok_or_else(|| invalid("stress", &self.stress))?;

        let from = parse_bound("from", self.from.as_deref())?;
        let to = parse_bound("to", self.to.as_deref())?;

        Ok(FilterState {
            province,
            source,
            stress_bucket,
            from,
            to,
            ..FilterState::default()
        }
        .with_rain_factor(self.rain_factor.unwrap_or(default_rain_factor)))
    }
}

fn parse_bound(name: &str, value: Option<&str>) -> Result<Option<chrono::NaiveDate>> {
    match value {
        None => Ok(None),
        Some(v) => parse_date_bound(v).ok_or_else(|| invalid(name, v)),
    }
}

fn invalid(name: &str, value: &str) -> AquaGuardError {
    AquaGuardError::InvalidData(format!("Invalid --{} value '{}'", name, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    fn list_args(cli: Cli) -> ListArgs {
        match cli.command {
            Some(Commands::List(args)) => args,
            _ => panic!("expected list command"),
        }
    }

    #[test]
    fn no_subcommand_runs_tui() {
        let cli = parse(&["aquaguard", "-vv"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn list_defaults_to_all() {
        let args = list_args(parse(&["aquaguard", "list"]));
        let filters = args.to_filters(1.0).unwrap();
        assert_eq!(filters, FilterState::default());
        assert!(!args.json);
    }

    #[test]
    fn list_parses_every_filter() {
        let args = list_args(parse(&[
            "aquaguard",
            "list",
            "--province",
            "Konya",
            "--source",
            "ndvi_era5",
            "--stress",
            "high",
            "--from",
            "2025-06-01",
            "--to",
            "2025-06-20",
            "--rain-factor",
            "0.75",
            "--json",
        ]));
        let filters = args.to_filters(1.0).unwrap();

        assert_eq!(filters.province.as_deref(), Some("Konya"));
        assert_eq!(filters.source, Some(SignalSource::NdviEra5));
        assert_eq!(filters.stress_bucket, Some(StressBucket::High));
        assert_eq!(filters.from, NaiveDate::from_ymd_opt(2025, 6, 1));
        assert_eq!(filters.to, NaiveDate::from_ymd_opt(2025, 6, 20));
        assert_eq!(filters.rain_factor, 0.8);
        assert!(args.json);
    }

    #[test]
    fn configured_rain_factor_is_the_default() {
        let args = list_args(parse(&["aquaguard", "list"]));
        assert_eq!(args.to_filters(0.6).unwrap().rain_factor, 0.6);
    }

    #[test]
    fn bad_values_are_rejected() {
        let args = list_args(parse(&["aquaguard", "list", "--stress", "extreme"]));
        assert!(matches!(
            args.to_filters(1.0),
            Err(AquaGuardError::InvalidData(_))
        ));

        let args = list_args(parse(&["aquaguard", "list", "--from", "01/06/2025"]));
        assert!(args.to_filters(1.0).is_err());
    }
}
