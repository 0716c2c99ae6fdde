//! Calendar helpers: validated year/month pairs and the portal's French labels.

use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// Month names as the portal writes them, January first. Matching is
/// case- and accent-exact.
pub const FRENCH_MONTHS: [&str; 12] = [
    "Janvier",
    "Février",
    "Mars",
    "Avril",
    "Mai",
    "Juin",
    "Juillet",
    "Août",
    "Septembre",
    "Octobre",
    "Novembre",
    "Décembre",
];

/// Format of the date column in daily payloads.
const DAY_LABEL_FORMAT: &str = "%d/%m/%Y";

/// Month number (1..=12) for a French month name.
///
/// # Errors
///
/// Returns `CoreError::UnknownMonth` if the name is not in the table.
pub fn month_from_french(name: &str) -> Result<u32> {
    FRENCH_MONTHS
        .iter()
        .position(|m| *m == name)
        .and_then(|i| u32::try_from(i + 1).ok())
        .ok_or_else(|| CoreError::UnknownMonth(name.to_string()))
}

/// Parse a monthly label such as `"Mars 2023"` into `(2023, 3)`.
///
/// # Errors
///
/// Returns an error if the label is not `"<Month> <Year>"` or the month name is unknown.
pub fn parse_month_label(label: &str) -> Result<(i32, u32)> {
    let mut parts = label.split(' ');
    let (Some(name), Some(year), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(CoreError::InvalidDateLabel(label.to_string()));
    };
    let year: i32 = year
        .parse()
        .map_err(|_| CoreError::InvalidDateLabel(label.to_string()))?;
    Ok((year, month_from_french(name)?))
}

/// Parse a daily label such as `"05/03/2023"`.
///
/// # Errors
///
/// Returns `CoreError::InvalidDateLabel` if the label is not `dd/mm/yyyy`.
pub fn parse_day_label(label: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(label, DAY_LABEL_FORMAT)
        .map_err(|_| CoreError::InvalidDateLabel(label.to_string()))
}

/// A calendar month, validated on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Create a year/month pair.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidYearMonth` if the month is outside 1..=12
    /// or the year is outside what `chrono` can represent.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(CoreError::InvalidYearMonth { year, month });
        }
        Ok(Self { year, month })
    }

    /// The month containing `date`.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Year component.
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// Month component, 1..=12.
    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    /// The previous calendar month, wrapping across years.
    #[must_use]
    pub const fn pred(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Whether `date` falls in this month.
    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

/// Parses `YYYYMM`, e.g. `"202303"`.
impl FromStr for YearMonth {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || CoreError::InvalidDateLabel(s.to_string());
        if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let year = s[..4].parse().map_err(|_| invalid())?;
        let month = s[4..].parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_label_parses() {
        assert_eq!(parse_month_label("Mars 2023").unwrap(), (2023, 3));
        assert_eq!(parse_month_label("Décembre 2021").unwrap(), (2021, 12));
    }

    #[test]
    fn month_table_is_bijective() {
        for (i, name) in FRENCH_MONTHS.iter().enumerate() {
            assert_eq!(month_from_french(name).unwrap() as usize, i + 1);
        }
        let mut sorted = FRENCH_MONTHS.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 12);
    }

    #[test]
    fn month_names_are_case_and_accent_exact() {
        assert!(month_from_french("mars").is_err());
        assert!(month_from_french("Fevrier").is_err());
        assert!(month_from_french("Aout").is_err());
        assert!(parse_month_label("Mars").is_err());
        assert!(parse_month_label("Mars deux").is_err());
    }

    #[test]
    fn day_label_parses() {
        let date = parse_day_label("05/03/2023").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2023, 3, 5).unwrap());
        assert!(parse_day_label("2023-03-05").is_err());
    }

    #[test]
    fn year_month_validation() {
        assert!(YearMonth::new(2023, 0).is_err());
        assert!(YearMonth::new(2023, 13).is_err());
        let ym = YearMonth::new(2023, 12).unwrap();
        assert_eq!(ym.to_string(), "2023-12");
    }

    #[test]
    fn year_month_pred_wraps_january() {
        let jan = YearMonth::new(2024, 1).unwrap();
        assert_eq!(jan.pred(), YearMonth::new(2023, 12).unwrap());
        let may = YearMonth::new(2024, 5).unwrap();
        assert_eq!(may.pred(), YearMonth::new(2024, 4).unwrap());
        assert!(may.contains(NaiveDate::from_ymd_opt(2024, 5, 31).unwrap()));
        assert!(!may.contains(NaiveDate::from_ymd_opt(2023, 5, 1).unwrap()));
    }

    #[test]
    fn year_month_from_compact_string() {
        assert_eq!("202303".parse::<YearMonth>().unwrap(), YearMonth::new(2023, 3).unwrap());
        assert!("2023-03".parse::<YearMonth>().is_err());
        assert!("202313".parse::<YearMonth>().is_err());
    }
}
