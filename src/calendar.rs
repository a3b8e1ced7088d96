//! Day-granularity date handling in a single fixed reference time zone.
//!
//! Every calendar day the engine stores or prices is a `NaiveDate` already
//! expressed in the reference zone. Instants coming from clients or from the
//! system clock are converted here and nowhere else, so server-local time never
//! leaks into range boundaries or day-of-week checks.

use chrono::{DateTime, Datelike, Days, FixedOffset, Months, NaiveDate, Offset, Utc, Weekday};

use crate::error::AppError;

/// Fixed UTC offset used to turn instants into calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceZone {
    offset: FixedOffset,
}

impl ReferenceZone {
    /// Build a zone from an offset east of UTC, in minutes.
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        FixedOffset::east_opt(minutes.checked_mul(60)?).map(|offset| Self { offset })
    }

    /// Asia/Jakarta (UTC+07:00).
    pub fn jakarta() -> Self {
        Self {
            offset: FixedOffset::east_opt(7 * 3600).unwrap_or_else(|| Utc.fix()),
        }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Calendar day of `instant` in this zone.
    pub fn day_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    /// Today's calendar day in this zone.
    pub fn today(&self) -> NaiveDate {
        self.day_of(Utc::now())
    }

    /// Parse an ISO-8601 date (`2025-12-24`) or an RFC 3339 date-time, which is
    /// truncated to its day in this zone.
    pub fn parse_day(&self, raw: &str) -> Result<NaiveDate, AppError> {
        let raw = raw.trim();
        if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Ok(day);
        }
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| self.day_of(dt.with_timezone(&Utc)))
            .map_err(|_| AppError::InvalidRange(format!("malformed date: {raw:?}")))
    }
}

impl Default for ReferenceZone {
    fn default() -> Self {
        Self::jakarta()
    }
}

/// Saturday or Sunday.
pub fn is_weekend(day: NaiveDate) -> bool {
    matches!(day.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Iterate the half-open range `[from, until)` in ascending order.
pub fn nights(from: NaiveDate, until: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    from.iter_days().take_while(move |day| *day < until)
}

/// Number of nights in `[from, until)`; zero when the range is empty or inverted.
pub fn night_count(from: NaiveDate, until: NaiveDate) -> u64 {
    u64::try_from((until - from).num_days()).unwrap_or(0)
}

/// The day before `day`, saturating at the calendar's start.
pub fn previous_day(day: NaiveDate) -> NaiveDate {
    day.checked_sub_days(Days::new(1)).unwrap_or(day)
}

/// Days of an availability horizon: `[start, start + months)`.
pub fn horizon_days(start: NaiveDate, months: u32) -> Result<Vec<NaiveDate>, AppError> {
    let end = start
        .checked_add_months(Months::new(months))
        .ok_or_else(|| AppError::InvalidRange(format!("horizon of {months} months overflows")))?;
    Ok(nights(start, end).collect())
}

/// Validate a half-open stay `[check_in, check_out)`.
pub fn ensure_stay(check_in: NaiveDate, check_out: NaiveDate) -> Result<(), AppError> {
    if check_in >= check_out {
        return Err(AppError::InvalidRange(format!(
            "check_in {check_in} must be before check_out {check_out}"
        )));
    }
    Ok(())
}

/// Validate an inclusive range `[start, end]`.
pub fn ensure_inclusive(start: NaiveDate, end: NaiveDate) -> Result<(), AppError> {
    if start > end {
        return Err(AppError::InvalidRange(format!(
            "start_date {start} must not be after end_date {end}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_day_of_uses_reference_offset() {
        let zone = ReferenceZone::jakarta();
        // 18:30 UTC on the 23rd is 01:30 on the 24th in Jakarta
        let instant = Utc.with_ymd_and_hms(2025, 12, 23, 18, 30, 0).unwrap();
        assert_eq!(zone.day_of(instant), d(2025, 12, 24));

        let utc = ReferenceZone::from_offset_minutes(0).unwrap();
        assert_eq!(utc.day_of(instant), d(2025, 12, 23));
    }

    #[test]
    fn test_parse_day_plain_date() {
        let zone = ReferenceZone::jakarta();
        assert_eq!(zone.parse_day("2025-12-24").unwrap(), d(2025, 12, 24));
        assert_eq!(zone.parse_day(" 2025-12-24 ").unwrap(), d(2025, 12, 24));
    }

    #[test]
    fn test_parse_day_datetime_truncated_in_zone() {
        let zone = ReferenceZone::jakarta();
        assert_eq!(
            zone.parse_day("2025-12-23T20:00:00Z").unwrap(),
            d(2025, 12, 24)
        );
        assert_eq!(
            zone.parse_day("2025-12-24T00:00:00+07:00").unwrap(),
            d(2025, 12, 24)
        );
    }

    #[test]
    fn test_parse_day_rejects_garbage() {
        let zone = ReferenceZone::jakarta();
        assert!(matches!(
            zone.parse_day("24/12/2025"),
            Err(AppError::InvalidRange(_))
        ));
        assert!(zone.parse_day("2025-02-30").is_err());
    }

    #[test]
    fn test_offset_out_of_range() {
        assert!(ReferenceZone::from_offset_minutes(24 * 60).is_none());
        assert!(ReferenceZone::from_offset_minutes(-5 * 60).is_some());
    }

    #[test]
    fn test_weekend_detection() {
        assert!(is_weekend(d(2025, 12, 27))); // Saturday
        assert!(is_weekend(d(2025, 12, 28))); // Sunday
        assert!(!is_weekend(d(2025, 12, 23))); // Tuesday
        assert!(!is_weekend(d(2025, 12, 26))); // Friday
    }

    #[test]
    fn test_nights_excludes_checkout() {
        let days: Vec<_> = nights(d(2025, 12, 23), d(2025, 12, 27)).collect();
        assert_eq!(
            days,
            vec![d(2025, 12, 23), d(2025, 12, 24), d(2025, 12, 25), d(2025, 12, 26)]
        );
        assert_eq!(night_count(d(2025, 12, 23), d(2025, 12, 27)), 4);
        assert_eq!(nights(d(2025, 12, 23), d(2025, 12, 23)).count(), 0);
        assert_eq!(night_count(d(2025, 12, 27), d(2025, 12, 23)), 0);
    }

    #[test]
    fn test_horizon_days_six_months() {
        let days = horizon_days(d(2025, 1, 1), 6).unwrap();
        assert_eq!(days.first(), Some(&d(2025, 1, 1)));
        assert_eq!(days.last(), Some(&d(2025, 6, 30)));
        assert_eq!(days.len(), 181);
    }

    #[test]
    fn test_horizon_days_month_end_clamps() {
        // Aug 31 + 6 months clamps to Feb 28
        let days = horizon_days(d(2025, 8, 31), 6).unwrap();
        assert_eq!(days.last(), Some(&d(2026, 2, 27)));
    }

    #[test]
    fn test_range_validation() {
        assert!(ensure_stay(d(2025, 1, 1), d(2025, 1, 2)).is_ok());
        assert!(ensure_stay(d(2025, 1, 2), d(2025, 1, 2)).is_err());
        assert!(ensure_stay(d(2025, 1, 3), d(2025, 1, 2)).is_err());
        assert!(ensure_inclusive(d(2025, 1, 2), d(2025, 1, 2)).is_ok());
        assert!(ensure_inclusive(d(2025, 1, 3), d(2025, 1, 2)).is_err());
    }

    #[test]
    fn test_previous_day() {
        assert_eq!(previous_day(d(2026, 1, 1)), d(2025, 12, 31));
    }
}
