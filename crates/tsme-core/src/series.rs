//! Monthly and daily consumption series.
//!
//! The portal answers with arrays of positional rows. These types decode the
//! rows once, keep the native cubic-meter values keyed by calendar position,
//! and drop rows whose cumulative reading is the zero sentinel (months or
//! days for which the meter has not reported yet).

use chrono::Datelike;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::calendar::{parse_day_label, parse_month_label, YearMonth};
use crate::error::{CoreError, Result};
use crate::reading::ReadingKind;
use crate::units::{Volume, VolumeUnit};

/// One meter reading in native cubic meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reading {
    /// Consumption over the period (day or month).
    pub relative: f64,
    /// Meter index at the end of the period.
    pub cumulative: f64,
}

impl Reading {
    /// The value selected by `kind`.
    #[must_use]
    pub const fn get(&self, kind: ReadingKind) -> f64 {
        match kind {
            ReadingKind::Relative => self.relative,
            ReadingKind::Cumulative => self.cumulative,
        }
    }
}

/// A cumulative value of exactly zero means "no reading yet".
#[allow(clippy::float_cmp)]
fn is_recorded(cumulative: f64) -> bool {
    cumulative != 0.0
}

fn as_rows<'a>(payload: &'a Value, what: &str) -> Result<&'a [Value]> {
    payload
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| CoreError::MalformedPayload(format!("{what} payload is not an array")))
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn row_cells(row: &Value, index: usize, min_len: usize) -> Result<&[Value]> {
    match row.as_array() {
        Some(cells) if cells.len() >= min_len => Ok(cells),
        _ => Err(CoreError::MalformedRow {
            index,
            reason: format!("expected an array of at least {min_len} cells"),
        }),
    }
}

fn number_cell(cells: &[Value], cell: usize, index: usize) -> Result<f64> {
    number(&cells[cell]).ok_or_else(|| CoreError::MalformedRow {
        index,
        reason: format!("cell {cell} is not a number"),
    })
}

fn str_cell(cells: &[Value], cell: usize, index: usize) -> Result<&str> {
    cells[cell].as_str().ok_or_else(|| CoreError::MalformedRow {
        index,
        reason: format!("cell {cell} is not a string"),
    })
}

/// Daily readings for one calendar month, keyed by day of month.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySeries {
    month: YearMonth,
    days: BTreeMap<u32, Reading>,
}

impl DailySeries {
    /// A series with no readings.
    #[must_use]
    pub fn empty(month: YearMonth) -> Self {
        Self {
            month,
            days: BTreeMap::new(),
        }
    }

    /// Decode a daily payload: rows of `["dd/mm/yyyy", relative, cumulative]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not an array or a row is malformed.
    pub fn from_payload(month: YearMonth, payload: &Value) -> Result<Self> {
        let mut series = Self::empty(month);
        for (index, row) in as_rows(payload, "daily")?.iter().enumerate() {
            let cells = row_cells(row, index, 3)?;
            let cumulative = number_cell(cells, 2, index)?;
            if !is_recorded(cumulative) {
                continue;
            }
            let date = parse_day_label(str_cell(cells, 0, index)?)?;
            let relative = number_cell(cells, 1, index)?;
            series.days.insert(
                date.day(),
                Reading {
                    relative,
                    cumulative,
                },
            );
        }
        Ok(series)
    }

    /// The month this series covers.
    #[must_use]
    pub const fn month(&self) -> YearMonth {
        self.month
    }

    /// Reading for a day of month, if one was recorded.
    #[must_use]
    pub fn get(&self, day: u32) -> Option<&Reading> {
        self.days.get(&day)
    }

    /// Whether a reading exists for `day`.
    #[must_use]
    pub fn contains_day(&self, day: u32) -> bool {
        self.days.contains_key(&day)
    }

    /// Readings in day order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Reading)> {
        self.days.iter().map(|(d, r)| (*d, r))
    }

    /// Number of recorded days.
    #[must_use]
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Whether no day was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Unit-converted view for output.
    #[must_use]
    pub fn view(&self, unit: VolumeUnit) -> DailyView {
        DailyView {
            daily: self
                .iter()
                .map(|(d, r)| (d, unit.convert(r.relative)))
                .collect(),
            absolute: self
                .iter()
                .map(|(d, r)| (d, unit.convert(r.cumulative)))
                .collect(),
        }
    }
}

/// Daily series converted to a caller unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyView {
    /// Day of month → consumption that day.
    pub daily: BTreeMap<u32, Volume>,
    /// Day of month → meter index that day.
    pub absolute: BTreeMap<u32, Volume>,
}

/// Monthly history plus the three aggregates the portal appends to it.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySeries {
    months: BTreeMap<i32, BTreeMap<u32, Reading>>,
    latest_cumulative: Option<f64>,
    this_year_total: f64,
    last_year_total: f64,
    highest_monthly_volume: f64,
}

impl MonthlySeries {
    /// Decode a monthly payload.
    ///
    /// The payload is a list of `[short label, relative, cumulative, "Mois Année"]`
    /// rows followed by three bare numbers: this year's total, last year's
    /// total, and the highest monthly volume. Those three are read from the
    /// tail in that fixed order; nothing in the payload tags them, so a change
    /// in the upstream layout would silently shift them. Rows are taken to be
    /// in chronological order already.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is shorter than three values, a row is
    /// malformed, or a month label cannot be parsed.
    pub fn from_payload(payload: &Value) -> Result<Self> {
        let values = as_rows(payload, "monthly")?;
        let Some(split) = values.len().checked_sub(3) else {
            return Err(CoreError::MalformedPayload(format!(
                "monthly payload has {} values, expected at least 3 trailing totals",
                values.len()
            )));
        };
        let (rows, totals) = values.split_at(split);
        let total = |i: usize| {
            number(&totals[i]).ok_or_else(|| {
                CoreError::MalformedPayload(format!("trailing total {i} is not a number"))
            })
        };

        let mut series = Self {
            months: BTreeMap::new(),
            latest_cumulative: None,
            this_year_total: total(0)?,
            last_year_total: total(1)?,
            highest_monthly_volume: total(2)?,
        };

        for (index, row) in rows.iter().enumerate() {
            let cells = row_cells(row, index, 4)?;
            let cumulative = number_cell(cells, 2, index)?;
            if !is_recorded(cumulative) {
                continue;
            }
            let (year, month) = parse_month_label(str_cell(cells, 3, index)?)?;
            let relative = number_cell(cells, 1, index)?;
            series.months.entry(year).or_default().insert(
                month,
                Reading {
                    relative,
                    cumulative,
                },
            );
            series.latest_cumulative = Some(cumulative);
        }
        Ok(series)
    }

    /// Reading for a given year and month.
    #[must_use]
    pub fn get(&self, year: i32, month: u32) -> Option<&Reading> {
        self.months.get(&year).and_then(|m| m.get(&month))
    }

    /// Years present in the history, ascending.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.months.keys().copied()
    }

    /// Readings for one year, keyed by month.
    #[must_use]
    pub fn year(&self, year: i32) -> Option<&BTreeMap<u32, Reading>> {
        self.months.get(&year)
    }

    /// Meter index of the last recorded month, in native units.
    #[must_use]
    pub const fn latest_cumulative(&self) -> Option<f64> {
        self.latest_cumulative
    }

    /// Total for the current year, in native units.
    #[must_use]
    pub const fn this_year_total(&self) -> f64 {
        self.this_year_total
    }

    /// Total for the previous year, in native units.
    #[must_use]
    pub const fn last_year_total(&self) -> f64 {
        self.last_year_total
    }

    /// Highest monthly volume ever recorded, in native units.
    #[must_use]
    pub const fn highest_monthly_volume(&self) -> f64 {
        self.highest_monthly_volume
    }

    fn convert_by(&self, unit: VolumeUnit, kind: ReadingKind) -> BTreeMap<i32, BTreeMap<u32, Volume>> {
        self.months
            .iter()
            .map(|(year, months)| {
                let converted = months
                    .iter()
                    .map(|(m, r)| (*m, unit.convert(r.get(kind))))
                    .collect();
                (*year, converted)
            })
            .collect()
    }

    /// Unit-converted view for output.
    #[must_use]
    pub fn view(&self, unit: VolumeUnit) -> MonthlyView {
        MonthlyView {
            this_year_volume: unit.convert(self.this_year_total),
            last_year_volume: unit.convert(self.last_year_total),
            highest_monthly_volume: unit.convert(self.highest_monthly_volume),
            monthly: self.convert_by(unit, ReadingKind::Relative),
            absolute: self.convert_by(unit, ReadingKind::Cumulative),
        }
    }
}

/// Monthly series converted to a caller unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyView {
    /// Consumption so far this year.
    pub this_year_volume: Volume,
    /// Consumption over last year.
    pub last_year_volume: Volume,
    /// Highest monthly consumption on record.
    pub highest_monthly_volume: Volume,
    /// Year → month → consumption that month.
    pub monthly: BTreeMap<i32, BTreeMap<u32, Volume>>,
    /// Year → month → meter index at month end.
    pub absolute: BTreeMap<i32, BTreeMap<u32, Volume>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn march_2023() -> YearMonth {
        YearMonth::new(2023, 3).unwrap()
    }

    #[test]
    fn monthly_totals_come_from_the_tail_in_order() {
        let payload = json!([
            ["janv. 23", 5.1, 100.2, "Janvier 2023"],
            ["févr. 23", 4.9, 105.1, "Février 2023"],
            ["mars 23", 0, 0, "Mars 2023"],
            61.5,
            58.25,
            9.75
        ]);
        let series = MonthlySeries::from_payload(&payload).unwrap();

        assert_eq!(series.this_year_total(), 61.5);
        assert_eq!(series.last_year_total(), 58.25);
        assert_eq!(series.highest_monthly_volume(), 9.75);
        assert_eq!(
            series.get(2023, 2),
            Some(&Reading {
                relative: 4.9,
                cumulative: 105.1
            })
        );
        assert_eq!(series.year(2023).unwrap().len(), 2);
        assert_eq!(series.latest_cumulative(), Some(105.1));
    }

    #[test]
    fn monthly_rows_span_years() {
        let payload = json!([
            ["déc. 22", 3.0, 90.0, "Décembre 2022"],
            ["janv. 23", 2.0, 92.0, "Janvier 2023"],
            2.0,
            40.0,
            6.0
        ]);
        let series = MonthlySeries::from_payload(&payload).unwrap();
        assert_eq!(series.years().collect::<Vec<_>>(), vec![2022, 2023]);
        assert!(series.get(2022, 12).is_some());
        assert!(series.get(2023, 1).is_some());
    }

    #[test]
    fn zero_cumulative_rows_are_skipped_whatever_the_relative_value() {
        let payload = json!([
            ["avr. 23", 7.0, 0, "Avril 2023"],
            ["mai 23", 0.0, 0.0, "Mai 2023"],
            0,
            0,
            0
        ]);
        let series = MonthlySeries::from_payload(&payload).unwrap();
        assert_eq!(series.years().count(), 0);
        assert_eq!(series.latest_cumulative(), None);
    }

    #[test]
    fn monthly_payload_needs_three_totals() {
        assert!(MonthlySeries::from_payload(&json!([1.0, 2.0])).is_err());
        assert!(MonthlySeries::from_payload(&json!({"a": 1})).is_err());
        let only_totals = MonthlySeries::from_payload(&json!([1.0, 2.0, 3.0])).unwrap();
        assert_eq!(only_totals.highest_monthly_volume(), 3.0);
    }

    #[test]
    fn monthly_unknown_month_is_an_error() {
        let payload = json!([["x", 1.0, 2.0, "March 2023"], 0, 0, 0]);
        assert!(matches!(
            MonthlySeries::from_payload(&payload),
            Err(CoreError::UnknownMonth(_))
        ));
    }

    #[test]
    fn daily_rows_keyed_by_day() {
        let payload = json!([
            ["01/03/2023", 0.312, 120.5],
            ["02/03/2023", 0.289, 120.789],
            ["03/03/2023", 0.0, 0]
        ]);
        let series = DailySeries::from_payload(march_2023(), &payload).unwrap();

        assert_eq!(series.len(), 2);
        assert!(series.contains_day(1));
        assert!(series.contains_day(2));
        assert!(!series.contains_day(3));
        assert_eq!(series.get(2).unwrap().cumulative, 120.789);
    }

    #[test]
    fn daily_accepts_numeric_strings() {
        let payload = json!([["10/03/2023", "0.5", "130.25"]]);
        let series = DailySeries::from_payload(march_2023(), &payload).unwrap();
        assert_eq!(series.get(10).unwrap().relative, 0.5);
    }

    #[test]
    fn daily_malformed_row() {
        let payload = json!([["10/03/2023", 0.5]]);
        assert!(matches!(
            DailySeries::from_payload(march_2023(), &payload),
            Err(CoreError::MalformedRow { index: 0, .. })
        ));
    }

    #[test]
    fn views_convert_units() {
        let payload = json!([["01/03/2023", 0.312, 120.5]]);
        let series = DailySeries::from_payload(march_2023(), &payload).unwrap();

        let litres = series.view(VolumeUnit::Litre);
        assert_eq!(litres.daily[&1], Volume::Litres(312));
        assert_eq!(litres.absolute[&1], Volume::Litres(120_500));

        let native = series.view(VolumeUnit::CubicMeter);
        assert_eq!(native.daily[&1], Volume::CubicMeters(0.312));
    }

    #[test]
    fn monthly_view_serializes() {
        let payload = json!([["janv. 23", 5.0, 100.0, "Janvier 2023"], 5.0, 50.0, 7.0]);
        let view = MonthlySeries::from_payload(&payload)
            .unwrap()
            .view(VolumeUnit::Litre);
        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["monthly"]["2023"]["1"], json!(5000));
        assert_eq!(value["absolute"]["2023"]["1"], json!(100_000));
        assert_eq!(value["highest_monthly_volume"], json!(7000));
    }
}
