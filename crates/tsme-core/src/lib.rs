//! Core types and utilities for toutsurmoneau consumption data.
//!
//! This crate holds everything that does not touch the network:
//!
//! - **Providers**: `Provider` (which customer portal to talk to)
//! - **Units**: `VolumeUnit`, `Volume`
//! - **Calendar**: `YearMonth`, the French month table
//! - **Series**: `MonthlySeries`, `DailySeries`, `Reading`
//! - **Readings**: `LatestReading`, `ReadingKind`, `MeterSummary`
//!
//! # Volume unit
//!
//! The portal reports volumes in cubic meters with three decimals. Series keep
//! that native value and only convert when a caller asks for a view:
//!
//! - `VolumeUnit::CubicMeter` → the native `f64`
//! - `VolumeUnit::Litre` → `m³ × 1000`, truncated toward zero

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod calendar;
pub mod error;
pub mod provider;
pub mod reading;
pub mod series;
pub mod units;

pub use calendar::{month_from_french, parse_day_label, parse_month_label, YearMonth, FRENCH_MONTHS};
pub use error::{CoreError, Result};
pub use provider::Provider;
pub use reading::{LatestReading, MeterSummary, ReadingKind, LOOK_BACK_DAYS};
pub use series::{DailySeries, DailyView, MonthlySeries, MonthlyView, Reading};
pub use units::{Volume, VolumeUnit};
