//! Portal consumption client.

use chrono::{Datelike, Local, NaiveDate};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;

use tsme_core::{
    DailySeries, LatestReading, MeterSummary, MonthlySeries, Provider, ReadingKind, VolumeUnit,
    YearMonth, LOOK_BACK_DAYS,
};

use crate::error::ClientError;
use crate::extract::{Extractor, RegexExtractor};
use crate::portal::PortalLayout;
use crate::session::{Credentials, SessionAuthenticator};
use crate::transport::Transport;

/// A contract record as returned by the portal, minus UI-only fields.
pub type Contract = Map<String, Value>;

/// Marker the portal puts first in a two-element error payload.
const API_ERROR_MARKER: &str = "ERR";

/// Client for the portal's consumption endpoints.
///
/// Every call logs in first if needed. When a resource answers with something
/// other than JSON (the portal serves its login page once the session has
/// expired), the session is dropped and the call is retried once after a
/// fresh login; a second non-JSON answer is a `ClientError::Protocol`.
///
/// Methods take `&mut self`: the session and the resolved meter id are plain
/// state with no locking, so one client serves one flow of calls at a time.
#[derive(Debug)]
pub struct ConsumptionClient {
    transport: Transport,
    auth: SessionAuthenticator,
    layout: PortalLayout,
    extractor: Arc<dyn Extractor>,
    meter_id: Option<String>,
    unit: VolumeUnit,
}

impl ConsumptionClient {
    /// Create a client for the default provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(credentials: Credentials) -> Result<Self, ClientError> {
        Self::with_options(credentials, ClientOptions::default())
    }

    /// Create a client with custom options.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_options(credentials: Credentials, options: ClientOptions) -> Result<Self, ClientError> {
        Self::with_parts(
            credentials,
            options,
            PortalLayout::default(),
            Arc::new(RegexExtractor),
        )
    }

    /// Create a client with a custom portal layout and extractor.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_parts(
        credentials: Credentials,
        options: ClientOptions,
        layout: PortalLayout,
        extractor: Arc<dyn Extractor>,
    ) -> Result<Self, ClientError> {
        let transport = Transport::new(
            options.provider.base_url(),
            Duration::from_secs(options.timeout_seconds),
        )?;
        let auth = SessionAuthenticator::new(credentials, layout.clone(), Arc::clone(&extractor));

        Ok(Self {
            transport,
            auth,
            layout,
            extractor,
            meter_id: options.meter_id.filter(|id| !id.is_empty()),
            unit: options.unit,
        })
    }

    /// Unit volumes are reported in.
    #[must_use]
    pub const fn unit(&self) -> VolumeUnit {
        self.unit
    }

    /// Base URL of the portal.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    /// Whether a session is currently held.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    /// Call a JSON resource, logging in and re-authenticating once as needed.
    ///
    /// # Errors
    ///
    /// - Login errors from the authenticator.
    /// - `ClientError::Protocol` if the resource is still not JSON after re-authenticating.
    /// - `ClientError::Api` if the portal answers `["ERR", message]`.
    pub async fn call_api(&mut self, path: &str) -> Result<Value, ClientError> {
        let mut retried = false;
        loop {
            self.auth.ensure_authenticated(&self.transport).await?;
            tracing::debug!(endpoint = %path, retried, "Calling portal API");

            let page = self
                .transport
                .get(path, self.auth.cookie_header().as_deref())
                .await?;

            if !page.is_json() {
                self.auth.invalidate();
                if retried {
                    return Err(ClientError::Protocol(format!(
                        "{path} still not JSON after logging in again"
                    )));
                }
                tracing::debug!(
                    endpoint = %path,
                    content_type = ?page.content_type,
                    "Portal did not return JSON, logging in again"
                );
                retried = true;
                continue;
            }

            let value: Value = serde_json::from_str(&page.body)?;
            if let Some(message) = api_error_message(&value) {
                return Err(ClientError::Api(message));
            }
            tracing::debug!(endpoint = %path, "Portal API call succeeded");
            return Ok(value);
        }
    }

    /// The water meter id, scraped once from the consumption page unless
    /// it was given in the options.
    ///
    /// # Errors
    ///
    /// Returns an error if login fails or the page does not carry a meter id.
    pub async fn resolve_meter_id(&mut self) -> Result<String, ClientError> {
        if let Some(id) = &self.meter_id {
            return Ok(id.clone());
        }
        self.auth.ensure_authenticated(&self.transport).await?;

        let page = self
            .transport
            .get(self.layout.consumption_page, self.auth.cookie_header().as_deref())
            .await?;
        let id = self.extractor.extract(
            self.layout.meter_id_pattern,
            &page.body,
            self.layout.consumption_page,
        )?;
        tracing::debug!(meter_id = %id, "Resolved meter id");
        self.meter_id = Some(id.clone());
        Ok(id)
    }

    /// Contracts of the account.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or the payload is not a list of records.
    pub async fn fetch_contracts(&mut self) -> Result<Vec<Contract>, ClientError> {
        let value = self.call_api(self.layout.contracts_endpoint).await?;
        let mut contracts: Vec<Contract> = serde_json::from_value(value)?;
        for contract in &mut contracts {
            for field in self.layout.contract_fields_to_strip {
                contract.remove(*field);
            }
        }
        Ok(contracts)
    }

    /// Monthly history and yearly totals.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or the payload cannot be decoded.
    pub async fn fetch_monthly_summary(&mut self) -> Result<MonthlySeries, ClientError> {
        let meter_id = self.resolve_meter_id().await?;
        let path = self.layout.monthly_path(&meter_id);
        let value = self.call_api(&path).await?;
        Ok(MonthlySeries::from_payload(&value)?)
    }

    /// Daily readings for one month.
    ///
    /// With `strict` unset, any failure is logged and an empty series is
    /// returned; use that for lookups where missing data is expected.
    ///
    /// # Errors
    ///
    /// Only when `strict` is set: any error of the underlying calls.
    pub async fn fetch_daily_summary(
        &mut self,
        month: YearMonth,
        strict: bool,
    ) -> Result<DailySeries, ClientError> {
        match self.try_fetch_daily(month).await {
            Ok(series) => Ok(series),
            Err(e) if !strict => {
                tracing::warn!(month = %month, error = %e, "No daily data, returning empty series");
                Ok(DailySeries::empty(month))
            }
            Err(e) => Err(e),
        }
    }

    /// Daily readings for a month given as plain numbers.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Argument` if `year`/`month` is not a calendar month,
    /// otherwise as [`fetch_daily_summary`](Self::fetch_daily_summary).
    pub async fn fetch_daily_summary_for(
        &mut self,
        year: i32,
        month: u32,
        strict: bool,
    ) -> Result<DailySeries, ClientError> {
        let month = YearMonth::new(year, month).map_err(|e| ClientError::Argument(e.to_string()))?;
        self.fetch_daily_summary(month, strict).await
    }

    async fn try_fetch_daily(&mut self, month: YearMonth) -> Result<DailySeries, ClientError> {
        let meter_id = self.resolve_meter_id().await?;
        let path = self.layout.daily_path(month.year(), month.month(), &meter_id);
        let value = self.call_api(&path).await?;
        Ok(DailySeries::from_payload(month, &value)?)
    }

    /// Most recent daily reading, looking back from today.
    ///
    /// # Errors
    ///
    /// See [`latest_reading_on`](Self::latest_reading_on).
    pub async fn latest_reading(
        &mut self,
        kind: ReadingKind,
        seed: Option<DailySeries>,
    ) -> Result<LatestReading, ClientError> {
        self.latest_reading_on(Local::now().date_naive(), kind, seed)
            .await
    }

    /// Most recent daily reading on or before `today`, at most
    /// [`LOOK_BACK_DAYS`] days back.
    ///
    /// `seed` is used as the data for `today`'s month when it covers that
    /// month. Stepping back across a month boundary fetches the earlier month.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` if no day in the window has a reading.
    pub async fn latest_reading_on(
        &mut self,
        today: NaiveDate,
        kind: ReadingKind,
        seed: Option<DailySeries>,
    ) -> Result<LatestReading, ClientError> {
        let mut date = today;
        let mut month_data = seed.filter(|s| s.month().contains(today));

        for _ in 0..LOOK_BACK_DAYS {
            let day = date.day();
            tracing::debug!(day, "Looking for a meter reading");
            let series = match month_data.take() {
                Some(series) => series,
                None => self.fetch_daily_summary(YearMonth::of(date), false).await?,
            };
            if let Some(reading) = LatestReading::from_series(&series, date, kind, self.unit) {
                return Ok(reading);
            }

            let Some(previous) = date.pred_opt() else {
                break;
            };
            // Day number going up means the previous day is in another month.
            if previous.day() < day {
                month_data = Some(series);
            }
            date = previous;
        }

        Err(ClientError::Api(format!(
            "cannot get latest meter value in last {LOOK_BACK_DAYS} days"
        )))
    }

    /// Whether the credentials give access to the account.
    ///
    /// Any failure, whatever its cause, is reported as `false`.
    pub async fn check_credentials(&mut self) -> bool {
        match self.fetch_contracts().await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(error = %e, "Credential check failed");
                false
            }
        }
    }

    /// Full meter summary as of today.
    ///
    /// # Errors
    ///
    /// See [`summary_on`](Self::summary_on).
    pub async fn summary(&mut self) -> Result<MeterSummary, ClientError> {
        self.summary_on(Local::now().date_naive()).await
    }

    /// Monthly totals and history, daily data for `today`'s month and the one
    /// before, and the latest meter index.
    ///
    /// # Errors
    ///
    /// Returns an error if the monthly call fails or no recent reading exists.
    pub async fn summary_on(&mut self, today: NaiveDate) -> Result<MeterSummary, ClientError> {
        let monthly = self.fetch_monthly_summary().await?;
        let this_month = self.fetch_daily_summary(YearMonth::of(today), false).await?;
        let previous_month = self
            .fetch_daily_summary(YearMonth::of(today).pred(), false)
            .await?;
        let state = self
            .latest_reading_on(today, ReadingKind::Cumulative, Some(this_month.clone()))
            .await?;

        Ok(MeterSummary::new(
            format!("Data provided by {}", self.base_url()),
            state,
            &monthly,
            &this_month,
            &previous_month,
            self.unit,
        ))
    }
}

/// Message of an `["ERR", message]` payload.
fn api_error_message(value: &Value) -> Option<String> {
    match value.as_array()?.as_slice() {
        [Value::String(marker), message] if marker == API_ERROR_MARKER => Some(match message {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }),
        _ => None,
    }
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Portal to connect to (default: Suez).
    pub provider: Provider,
    /// Request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
    /// Unit volumes are reported in (default: litres).
    pub unit: VolumeUnit,
    /// Water meter id; read from the portal when `None`.
    pub meter_id: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            timeout_seconds: 30,
            unit: VolumeUnit::default(),
            meter_id: None,
        }
    }
}

impl ClientOptions {
    /// Create options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the provider.
    #[must_use]
    pub fn with_provider(mut self, provider: Provider) -> Self {
        self.provider = provider;
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Set the volume unit.
    #[must_use]
    pub const fn with_unit(mut self, unit: VolumeUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Set the meter id.
    #[must_use]
    pub fn with_meter_id(mut self, meter_id: impl Into<String>) -> Self {
        self.meter_id = Some(meter_id.into());
        self
    }
}
