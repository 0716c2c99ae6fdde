//! Derived readings: the latest meter value and the overall meter summary.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::series::{DailySeries, DailyView, MonthlySeries};
use crate::units::{Volume, VolumeUnit};

/// How many days back from today to look for the latest reading.
pub const LOOK_BACK_DAYS: u32 = 3;

/// Which value of a reading to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingKind {
    /// Consumption over the period.
    Relative,
    /// Meter index.
    #[default]
    Cumulative,
}

impl FromStr for ReadingKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "relative" | "daily" => Ok(Self::Relative),
            "cumulative" | "absolute" => Ok(Self::Cumulative),
            other => Err(format!("unknown reading kind: {other}")),
        }
    }
}

impl fmt::Display for ReadingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Relative => f.write_str("relative"),
            Self::Cumulative => f.write_str("cumulative"),
        }
    }
}

/// Most recent day with a reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatestReading {
    /// Day of the reading.
    pub date: NaiveDate,
    /// Value on that day.
    pub volume: Volume,
}

impl LatestReading {
    /// Look up `date` in `series` and convert the selected value.
    ///
    /// Returns `None` when the series has no entry for that day of month.
    #[must_use]
    pub fn from_series(
        series: &DailySeries,
        date: NaiveDate,
        kind: ReadingKind,
        unit: VolumeUnit,
    ) -> Option<Self> {
        series.get(date.day()).map(|reading| Self {
            date,
            volume: unit.convert(reading.get(kind)),
        })
    }
}

/// Snapshot of everything known about a meter, in one unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeterSummary {
    /// Where the data comes from.
    pub attribution: String,
    /// Latest meter index.
    pub state: LatestReading,
    /// Consumption over last year.
    pub last_year_over_all: Volume,
    /// Consumption so far this year.
    pub this_year_over_all: Volume,
    /// Highest monthly consumption on record.
    pub highest_monthly_consumption: Volume,
    /// Year → month → consumption that month.
    pub history: BTreeMap<i32, BTreeMap<u32, Volume>>,
    /// Daily data for the current month.
    pub this_month_consumption: DailyView,
    /// Daily data for the previous month.
    pub previous_month_consumption: DailyView,
}

impl MeterSummary {
    /// Assemble a summary from fetched series.
    #[must_use]
    pub fn new(
        attribution: impl Into<String>,
        state: LatestReading,
        monthly: &MonthlySeries,
        this_month: &DailySeries,
        previous_month: &DailySeries,
        unit: VolumeUnit,
    ) -> Self {
        let view = monthly.view(unit);
        Self {
            attribution: attribution.into(),
            state,
            last_year_over_all: view.last_year_volume,
            this_year_over_all: view.this_year_volume,
            highest_monthly_consumption: view.highest_monthly_volume,
            history: view.monthly,
            this_month_consumption: this_month.view(unit),
            previous_month_consumption: previous_month.view(unit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::YearMonth;
    use serde_json::json;

    #[test]
    fn latest_from_series_picks_kind() {
        let month = YearMonth::new(2023, 3).unwrap();
        let series =
            DailySeries::from_payload(month, &json!([["02/03/2023", 0.25, 120.5]])).unwrap();
        let date = NaiveDate::from_ymd_opt(2023, 3, 2).unwrap();

        let relative =
            LatestReading::from_series(&series, date, ReadingKind::Relative, VolumeUnit::Litre)
                .unwrap();
        assert_eq!(relative.volume, Volume::Litres(250));

        let cumulative = LatestReading::from_series(
            &series,
            date,
            ReadingKind::Cumulative,
            VolumeUnit::CubicMeter,
        )
        .unwrap();
        assert_eq!(cumulative.volume, Volume::CubicMeters(120.5));

        let missing = NaiveDate::from_ymd_opt(2023, 3, 3).unwrap();
        assert!(LatestReading::from_series(&series, missing, ReadingKind::Relative, VolumeUnit::Litre)
            .is_none());
    }

    #[test]
    fn reading_kind_aliases() {
        assert_eq!("daily".parse::<ReadingKind>().unwrap(), ReadingKind::Relative);
        assert_eq!("absolute".parse::<ReadingKind>().unwrap(), ReadingKind::Cumulative);
        assert!("weekly".parse::<ReadingKind>().is_err());
    }

    #[test]
    fn summary_uses_monthly_totals() {
        let month = YearMonth::new(2023, 3).unwrap();
        let monthly = MonthlySeries::from_payload(&json!([
            ["févr. 23", 4.0, 110.0, "Février 2023"],
            9.0,
            48.0,
            6.5
        ]))
        .unwrap();
        let this_month = DailySeries::empty(month);
        let previous = DailySeries::empty(month.pred());
        let state = LatestReading {
            date: NaiveDate::from_ymd_opt(2023, 3, 1).unwrap(),
            volume: Volume::Litres(110_000),
        };

        let summary =
            MeterSummary::new("Data provided by x", state, &monthly, &this_month, &previous, VolumeUnit::Litre);
        assert_eq!(summary.this_year_over_all, Volume::Litres(9000));
        assert_eq!(summary.last_year_over_all, Volume::Litres(48000));
        assert_eq!(summary.highest_monthly_consumption, Volume::Litres(6500));
        assert_eq!(summary.history[&2023][&2], Volume::Litres(4000));
        assert!(summary.this_month_consumption.daily.is_empty());
    }
}
