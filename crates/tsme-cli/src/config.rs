//! Command line and environment configuration.

use clap::{Parser, ValueEnum};
use tsme_client::{ClientOptions, Credentials};
use tsme_core::{Provider, VolumeUnit, YearMonth};

/// Query the toutsurmoneau customer portal.
#[derive(Parser, Debug)]
#[command(name = "tsme", version, about)]
pub struct Args {
    /// Portal username.
    #[arg(short = 'u', long, env = "TSME_USERNAME")]
    pub username: String,

    /// Portal password.
    #[arg(short = 'p', long, env = "TSME_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Water meter id; read from the portal when omitted.
    #[arg(short = 'c', long = "meter-id", env = "TSME_METER_ID")]
    pub meter_id: Option<String>,

    /// Provider name ("Suez", "Eau Olivet") or base URL.
    #[arg(short = 'P', long, env = "TSME_PROVIDER", default_value = "Suez")]
    pub provider: Provider,

    /// What to fetch.
    #[arg(short = 'e', long, value_enum, default_value_t = Command::Attributes)]
    pub execute: Command,

    /// Month for daily-for-month, as YYYYMM (default: current month).
    #[arg(short = 'd', long)]
    pub data: Option<YearMonth>,

    /// Unit volumes are printed in: "litre" or "m3".
    #[arg(long, default_value = "litre")]
    pub unit: VolumeUnit,

    /// Request timeout in seconds.
    #[arg(long, env = "TSME_TIMEOUT", default_value_t = 30)]
    pub timeout: u64,

    /// Log at debug level regardless of RUST_LOG.
    #[arg(long)]
    pub debug: bool,
}

/// Operations exposed on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Full meter summary.
    Attributes,
    /// Account contracts.
    Contracts,
    /// Water meter id.
    MeterId,
    /// Latest meter index.
    LatestMeterReading,
    /// Monthly history and totals.
    MonthlyRecent,
    /// Daily readings for one month.
    DailyForMonth,
    /// Whether the credentials are accepted.
    CheckCredentials,
}

impl Args {
    /// Portal credentials.
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.username, &self.password)
    }

    /// Client options derived from the flags.
    pub fn client_options(&self) -> ClientOptions {
        let mut options = ClientOptions::new()
            .with_provider(self.provider.clone())
            .with_unit(self.unit)
            .with_timeout_seconds(self.timeout);
        if let Some(id) = &self.meter_id {
            options = options.with_meter_id(id.clone());
        }
        options
    }

    /// Default tracing filter when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "warn"
        }
    }
}
