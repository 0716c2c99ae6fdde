//! tsme - water consumption from the toutsurmoneau customer portal.
//!
//! Prints the result of one portal query as JSON on stdout.

use clap::Parser;
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tsme_client::{ClientError, ConsumptionClient};
use tsme_core::{ReadingKind, YearMonth};

mod config;

use config::{Args, Command};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            if args.debug {
                tracing_subscriber::EnvFilter::new(args.log_filter())
            } else {
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| args.log_filter().into())
            },
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!(
        provider = %args.provider,
        command = ?args.execute,
        unit = %args.unit,
        "Configuration loaded"
    );

    let mut client = ConsumptionClient::with_options(args.credentials(), args.client_options())?;
    let output = run(&mut client, &args).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

/// Execute the selected command and return its JSON rendering.
async fn run(client: &mut ConsumptionClient, args: &Args) -> Result<Value, ClientError> {
    let unit = client.unit();
    let value = match args.execute {
        Command::Attributes => serde_json::to_value(client.summary().await?)?,
        Command::Contracts => serde_json::to_value(client.fetch_contracts().await?)?,
        Command::MeterId => Value::String(client.resolve_meter_id().await?),
        Command::LatestMeterReading => {
            serde_json::to_value(client.latest_reading(ReadingKind::Cumulative, None).await?)?
        }
        Command::MonthlyRecent => serde_json::to_value(client.fetch_monthly_summary().await?.view(unit))?,
        Command::DailyForMonth => {
            let month = args
                .data
                .unwrap_or_else(|| YearMonth::of(chrono::Local::now().date_naive()));
            serde_json::to_value(client.fetch_daily_summary(month, true).await?.view(unit))?
        }
        Command::CheckCredentials => Value::Bool(client.check_credentials().await),
    };
    Ok(value)
}
