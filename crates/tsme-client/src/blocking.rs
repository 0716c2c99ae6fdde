//! Blocking facade over [`ConsumptionClient`](crate::ConsumptionClient).
//!
//! Each call runs the async implementation to completion on a runtime owned
//! by the client. Do not use it from inside another tokio runtime.

use chrono::NaiveDate;
use serde_json::Value;
use tokio::runtime::{Builder, Runtime};

use tsme_core::{DailySeries, LatestReading, MeterSummary, MonthlySeries, ReadingKind, YearMonth};

use crate::client::{ClientOptions, Contract, ConsumptionClient};
use crate::error::ClientError;
use crate::session::Credentials;

/// Synchronous portal client.
#[derive(Debug)]
pub struct Client {
    runtime: Runtime,
    inner: ConsumptionClient,
}

impl Client {
    /// Create a blocking client.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime or the HTTP client cannot be built.
    pub fn new(credentials: Credentials, options: ClientOptions) -> Result<Self, ClientError> {
        Self::from_async(ConsumptionClient::with_options(credentials, options)?)
    }

    /// Wrap an existing async client.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime cannot be built.
    pub fn from_async(inner: ConsumptionClient) -> Result<Self, ClientError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ClientError::Configuration(format!("cannot start runtime: {e}")))?;
        Ok(Self { runtime, inner })
    }

    /// The wrapped async client.
    #[must_use]
    pub const fn inner(&self) -> &ConsumptionClient {
        &self.inner
    }

    /// See [`ConsumptionClient::call_api`].
    ///
    /// # Errors
    ///
    /// As the async method.
    pub fn call_api(&mut self, path: &str) -> Result<Value, ClientError> {
        self.runtime.block_on(self.inner.call_api(path))
    }

    /// See [`ConsumptionClient::resolve_meter_id`].
    ///
    /// # Errors
    ///
    /// As the async method.
    pub fn resolve_meter_id(&mut self) -> Result<String, ClientError> {
        self.runtime.block_on(self.inner.resolve_meter_id())
    }

    /// See [`ConsumptionClient::fetch_contracts`].
    ///
    /// # Errors
    ///
    /// As the async method.
    pub fn fetch_contracts(&mut self) -> Result<Vec<Contract>, ClientError> {
        self.runtime.block_on(self.inner.fetch_contracts())
    }

    /// See [`ConsumptionClient::fetch_monthly_summary`].
    ///
    /// # Errors
    ///
    /// As the async method.
    pub fn fetch_monthly_summary(&mut self) -> Result<MonthlySeries, ClientError> {
        self.runtime.block_on(self.inner.fetch_monthly_summary())
    }

    /// See [`ConsumptionClient::fetch_daily_summary`].
    ///
    /// # Errors
    ///
    /// As the async method.
    pub fn fetch_daily_summary(
        &mut self,
        month: YearMonth,
        strict: bool,
    ) -> Result<DailySeries, ClientError> {
        self.runtime
            .block_on(self.inner.fetch_daily_summary(month, strict))
    }

    /// See [`ConsumptionClient::latest_reading`].
    ///
    /// # Errors
    ///
    /// As the async method.
    pub fn latest_reading(
        &mut self,
        kind: ReadingKind,
        seed: Option<DailySeries>,
    ) -> Result<LatestReading, ClientError> {
        self.runtime.block_on(self.inner.latest_reading(kind, seed))
    }

    /// See [`ConsumptionClient::latest_reading_on`].
    ///
    /// # Errors
    ///
    /// As the async method.
    pub fn latest_reading_on(
        &mut self,
        today: NaiveDate,
        kind: ReadingKind,
        seed: Option<DailySeries>,
    ) -> Result<LatestReading, ClientError> {
        self.runtime
            .block_on(self.inner.latest_reading_on(today, kind, seed))
    }

    /// See [`ConsumptionClient::check_credentials`].
    pub fn check_credentials(&mut self) -> bool {
        self.runtime.block_on(self.inner.check_credentials())
    }

    /// See [`ConsumptionClient::summary`].
    ///
    /// # Errors
    ///
    /// As the async method.
    pub fn summary(&mut self) -> Result<MeterSummary, ClientError> {
        self.runtime.block_on(self.inner.summary())
    }
}
