//! Client for the toutsurmoneau customer portal.
//!
//! The portal has no public API. This crate logs in through the HTML form,
//! keeps the session cookie, and calls the JSON endpoints the portal's own
//! pages use, turning their positional payloads into typed series.
//!
//! # Example
//!
//! ```no_run
//! use tsme_client::{ClientOptions, ConsumptionClient, Credentials};
//! use tsme_core::{ReadingKind, VolumeUnit};
//!
//! # async fn example() -> Result<(), tsme_client::ClientError> {
//! let mut client = ConsumptionClient::with_options(
//!     Credentials::new("me@example.com", "password"),
//!     ClientOptions::new().with_unit(VolumeUnit::Litre),
//! )?;
//!
//! let monthly = client.fetch_monthly_summary().await?;
//! println!("This year: {} m³", monthly.this_year_total());
//!
//! let latest = client.latest_reading(ReadingKind::Cumulative, None).await?;
//! println!("Meter index on {}: {}", latest.date, latest.volume);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod blocking;
mod client;
mod error;
pub mod extract;
pub mod portal;
mod session;
pub mod transport;

pub use client::{ClientOptions, ConsumptionClient, Contract};
pub use error::ClientError;
pub use extract::{Extractor, RegexExtractor};
pub use portal::PortalLayout;
pub use session::{Credentials, Session, SessionAuthenticator};
pub use transport::Transport;
