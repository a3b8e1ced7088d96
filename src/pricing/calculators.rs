//! Core pricing calculation functions.
//!
//! Pure functions for nightly room pricing - no database access.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::prelude::*;

use crate::calendar::{is_weekend, nights};

use super::models::{AvailabilityDay, PeakSeasonRate, PriceChangeType, WeekendPeakRule};

/// Round to specified decimal places using banker's rounding (ROUND_HALF_EVEN).
///
/// Banker's rounding rounds to the nearest even number when the value is exactly
/// halfway between two possibilities. This reduces cumulative rounding bias.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use roomrate::pricing::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(2));   // rounds to even
/// assert_eq!(round_money(dec!(3.5), 0), dec!(4));   // rounds to even
/// assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven)
}

/// Apply a percentage or nominal change to a base price.
///
/// * percentage: `base + base * value / 100`
/// * nominal: `base + value`
pub fn apply_price_change(base: Decimal, change: PriceChangeType, value: Decimal) -> Decimal {
    match change {
        PriceChangeType::Percentage => base + base * value / Decimal::ONE_HUNDRED,
        PriceChangeType::Nominal => base + value,
    }
}

/// Order peak rates so that "first match wins" is deterministic:
/// earliest `start_date`, then oldest `created_at`, then submission `position`,
/// then `id`. Rates stored in one batch share `created_at`.
pub fn sort_by_precedence(rates: &mut [PeakSeasonRate]) {
    rates.sort_by(|a, b| {
        a.start_date
            .cmp(&b.start_date)
            .then(a.created_at.cmp(&b.created_at))
            .then(a.position.cmp(&b.position))
            .then(a.id.cmp(&b.id))
    });
}

/// Which rule produced a nightly price
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppliedRule {
    Base,
    WeekendPeak,
    PeakSeason(uuid::Uuid),
}

/// Resolve the nightly price for one day.
///
/// Precedence, highest first:
/// 1. the first peak season rate covering `day` (inclusive range)
/// 2. the weekend rule, on Saturday and Sunday
/// 3. the base price
///
/// `peak_rates` must already be in precedence order (see [`sort_by_precedence`]).
pub fn resolve_daily_price(
    base_price: Decimal,
    peak_rates: &[PeakSeasonRate],
    day: NaiveDate,
    weekend_peak: Option<&WeekendPeakRule>,
) -> (Decimal, AppliedRule) {
    if let Some(rate) = peak_rates.iter().find(|rate| rate.covers(day)) {
        let price = apply_price_change(base_price, rate.price_change_type, rate.price_change_value);
        return (price, AppliedRule::PeakSeason(rate.id));
    }

    if let Some(rule) = weekend_peak.filter(|_| is_weekend(day)) {
        let price = apply_price_change(base_price, rule.price_change_type, rule.price_change_value);
        return (price, AppliedRule::WeekendPeak);
    }

    (base_price, AppliedRule::Base)
}

/// One priced night of a stay or calendar
#[derive(Debug, Clone, PartialEq)]
pub struct PricedDay {
    pub date: NaiveDate,
    pub is_available: bool,
    pub price: Decimal,
    pub rule: AppliedRule,
}

/// Result of pricing a sequence of days
#[derive(Debug, Clone, PartialEq)]
pub struct RangePriceResult {
    pub dates: Vec<PricedDay>,
    pub total: Decimal,
}

impl RangePriceResult {
    pub fn nights(&self) -> usize {
        self.dates.len()
    }

    pub fn all_available(&self) -> bool {
        self.dates.iter().all(|day| day.is_available)
    }

    /// Mean nightly price, banker's-rounded to 2 places; zero for no nights.
    pub fn average_nightly(&self) -> Decimal {
        if self.dates.is_empty() {
            return Decimal::ZERO;
        }
        round_money(self.total / Decimal::from(self.dates.len()), 2)
    }
}

/// Price every night of `[check_in, check_out)`.
///
/// `calendar` holds the stored availability rows for the range, in any order.
/// A night with no stored row is reported as unavailable: it lies outside the
/// generated horizon and cannot be booked. Output is ascending by date.
pub fn resolve_range_price(
    base_price: Decimal,
    peak_rates: &[PeakSeasonRate],
    calendar: &[AvailabilityDay],
    check_in: NaiveDate,
    check_out: NaiveDate,
    weekend_peak: Option<&WeekendPeakRule>,
) -> RangePriceResult {
    let stored: HashMap<NaiveDate, bool> = calendar
        .iter()
        .map(|row| (row.date, row.is_available))
        .collect();
    let days = nights(check_in, check_out)
        .map(|date| (date, stored.get(&date).copied().unwrap_or(false)));
    price_days(base_price, peak_rates, days, weekend_peak)
}

/// Price an ordered sequence of `(date, is_available)` days and total them.
pub fn price_days(
    base_price: Decimal,
    peak_rates: &[PeakSeasonRate],
    days: impl IntoIterator<Item = (NaiveDate, bool)>,
    weekend_peak: Option<&WeekendPeakRule>,
) -> RangePriceResult {
    let mut total = Decimal::ZERO;
    let dates: Vec<PricedDay> = days
        .into_iter()
        .map(|(date, is_available)| {
            let (price, rule) = resolve_daily_price(base_price, peak_rates, date, weekend_peak);
            total += price;
            PricedDay {
                date,
                is_available,
                price,
                rule,
            }
        })
        .collect();

    RangePriceResult { dates, total }
}

/// Decimal places a stored rule value keeps
pub const RULE_VALUE_SCALE: u32 = 2;

/// Reject rules that would lower the price below base, or that carry more
/// precision than the rule columns store.
pub fn validate_change_value(value: Decimal) -> Result<(), String> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(format!("price_change_value must be non-negative, got {value}"));
    }
    if value.normalize().scale() > RULE_VALUE_SCALE {
        return Err(format!(
            "price_change_value allows at most {RULE_VALUE_SCALE} decimal places, got {value}"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn rate(
        start: NaiveDate,
        end: NaiveDate,
        change: PriceChangeType,
        value: Decimal,
    ) -> PeakSeasonRate {
        PeakSeasonRate {
            id: Uuid::new_v4(),
            room_id: Uuid::nil(),
            start_date: start,
            end_date: end,
            price_change_type: change,
            price_change_value: value,
            position: 0,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn available(days: impl Iterator<Item = NaiveDate>) -> Vec<AvailabilityDay> {
        days.map(|date| AvailabilityDay {
            room_id: Uuid::nil(),
            date,
            is_available: true,
        })
        .collect()
    }

    const WEEKEND_TEN_PERCENT: WeekendPeakRule = WeekendPeakRule {
        price_change_type: PriceChangeType::Percentage,
        price_change_value: dec!(10),
    };

    // ==================== round_money tests ====================

    #[test]
    fn test_round_money_bankers_rounding_to_even() {
        assert_eq!(round_money(dec!(2.5), 0), dec!(2));
        assert_eq!(round_money(dec!(3.5), 0), dec!(4));
        assert_eq!(round_money(dec!(2.25), 1), dec!(2.2));
        assert_eq!(round_money(dec!(2.35), 1), dec!(2.4));
    }

    #[test]
    fn test_round_money_normal_rounding() {
        assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
        assert_eq!(round_money(dec!(1.236), 2), dec!(1.24));
        assert_eq!(round_money(dec!(999999.995), 2), dec!(1000000.00));
    }

    // ==================== apply_price_change tests ====================

    #[test]
    fn test_apply_percentage() {
        assert_eq!(
            apply_price_change(dec!(500000), PriceChangeType::Percentage, dec!(10)),
            dec!(550000)
        );
        // fractional results are kept exactly
        assert_eq!(
            apply_price_change(dec!(333), PriceChangeType::Percentage, dec!(12.5)),
            dec!(374.625)
        );
    }

    #[test]
    fn test_apply_nominal() {
        assert_eq!(
            apply_price_change(dec!(500000), PriceChangeType::Nominal, dec!(200000)),
            dec!(700000)
        );
    }

    #[test]
    fn test_zero_change_is_identity() {
        assert_eq!(
            apply_price_change(dec!(123.45), PriceChangeType::Percentage, dec!(0)),
            dec!(123.45)
        );
        assert_eq!(
            apply_price_change(dec!(123.45), PriceChangeType::Nominal, dec!(0)),
            dec!(123.45)
        );
    }

    // ==================== resolve_daily_price tests ====================

    #[test]
    fn test_base_price_without_rules() {
        for day in nights(d(2025, 12, 1), d(2026, 1, 1)) {
            let (price, rule) = resolve_daily_price(dec!(500000), &[], day, None);
            assert_eq!(price, dec!(500000));
            assert_eq!(rule, AppliedRule::Base);
        }
    }

    #[test]
    fn test_peak_season_dominates_weekend() {
        let rates = vec![rate(
            d(2025, 12, 26),
            d(2025, 12, 28),
            PriceChangeType::Percentage,
            dec!(20),
        )];
        // Saturday inside the peak season
        let (price, rule) =
            resolve_daily_price(dec!(500000), &rates, d(2025, 12, 27), Some(&WEEKEND_TEN_PERCENT));
        assert_eq!(price, dec!(600000));
        assert_eq!(rule, AppliedRule::PeakSeason(rates[0].id));
    }

    #[test]
    fn test_weekend_nominal_outside_peak() {
        let weekend = WeekendPeakRule {
            price_change_type: PriceChangeType::Nominal,
            price_change_value: dec!(75000),
        };
        let rates = vec![rate(
            d(2025, 12, 24),
            d(2025, 12, 26),
            PriceChangeType::Nominal,
            dec!(200000),
        )];
        let (sat, _) = resolve_daily_price(dec!(500000), &rates, d(2025, 12, 20), Some(&weekend));
        let (sun, _) = resolve_daily_price(dec!(500000), &rates, d(2025, 12, 21), Some(&weekend));
        let (mon, _) = resolve_daily_price(dec!(500000), &rates, d(2025, 12, 22), Some(&weekend));
        assert_eq!(sat, dec!(575000));
        assert_eq!(sun, dec!(575000));
        assert_eq!(mon, dec!(500000));
    }

    #[test]
    fn test_single_day_peak_is_inclusive() {
        let rates = vec![rate(
            d(2025, 8, 17),
            d(2025, 8, 17),
            PriceChangeType::Nominal,
            dec!(50000),
        )];
        let price = |day| resolve_daily_price(dec!(400000), &rates, day, None).0;
        assert_eq!(price(d(2025, 8, 16)), dec!(400000));
        assert_eq!(price(d(2025, 8, 17)), dec!(450000));
        assert_eq!(price(d(2025, 8, 18)), dec!(400000));
    }

    #[test]
    fn test_overlapping_rates_earliest_start_wins() {
        let late = rate(
            d(2025, 12, 25),
            d(2025, 12, 25),
            PriceChangeType::Nominal,
            dec!(999),
        );
        let early = rate(
            d(2025, 12, 20),
            d(2025, 12, 31),
            PriceChangeType::Nominal,
            dec!(100),
        );
        let mut rates = vec![late, early.clone()];
        sort_by_precedence(&mut rates);
        assert_eq!(rates[0].id, early.id);

        let (price, rule) = resolve_daily_price(dec!(1000), &rates, d(2025, 12, 25), None);
        assert_eq!(price, dec!(1100));
        assert_eq!(rule, AppliedRule::PeakSeason(early.id));
    }

    #[test]
    fn test_same_start_older_rate_wins() {
        let mut newer = rate(
            d(2025, 12, 20),
            d(2025, 12, 21),
            PriceChangeType::Nominal,
            dec!(5),
        );
        newer.created_at = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let older = rate(
            d(2025, 12, 20),
            d(2025, 12, 21),
            PriceChangeType::Nominal,
            dec!(7),
        );
        let mut rates = vec![newer, older.clone()];
        sort_by_precedence(&mut rates);
        assert_eq!(rates[0].id, older.id);
    }

    #[test]
    fn test_same_batch_earlier_position_wins() {
        // one batch: identical start and created_at, ids in arbitrary order
        let mut first = rate(
            d(2025, 12, 24),
            d(2025, 12, 26),
            PriceChangeType::Nominal,
            dec!(1),
        );
        let mut second = rate(
            d(2025, 12, 24),
            d(2025, 12, 26),
            PriceChangeType::Nominal,
            dec!(2),
        );
        first.id = Uuid::max();
        second.id = Uuid::nil();
        second.position = 1;

        let mut rates = vec![second, first.clone()];
        sort_by_precedence(&mut rates);
        assert_eq!(rates[0].id, first.id);

        let (price, _) = resolve_daily_price(dec!(100), &rates, d(2025, 12, 24), None);
        assert_eq!(price, dec!(101));
    }

    #[test]
    fn test_price_never_below_base() {
        let rates = vec![
            rate(d(2025, 1, 1), d(2025, 1, 10), PriceChangeType::Percentage, dec!(0)),
            rate(d(2025, 1, 11), d(2025, 1, 20), PriceChangeType::Nominal, dec!(1)),
        ];
        for day in nights(d(2025, 1, 1), d(2025, 2, 1)) {
            let (price, _) =
                resolve_daily_price(dec!(250.50), &rates, day, Some(&WEEKEND_TEN_PERCENT));
            assert!(price >= dec!(250.50));
        }
    }

    // ==================== resolve_range_price tests ====================

    #[test]
    fn test_christmas_scenario() {
        let rates = vec![rate(
            d(2025, 12, 24),
            d(2025, 12, 26),
            PriceChangeType::Nominal,
            dec!(200000),
        )];
        let calendar = available(nights(d(2025, 12, 1), d(2026, 1, 1)));

        let result = resolve_range_price(
            dec!(500000),
            &rates,
            &calendar,
            d(2025, 12, 23),
            d(2025, 12, 27),
            Some(&WEEKEND_TEN_PERCENT),
        );

        let prices: Vec<_> = result.dates.iter().map(|day| day.price).collect();
        // the 23rd is a Tuesday, the 27th (Saturday) is the check-out day
        assert_eq!(
            prices,
            vec![dec!(500000), dec!(700000), dec!(700000), dec!(700000)]
        );
        assert_eq!(result.total, dec!(2600000));
        assert_eq!(result.nights(), 4);
        assert_eq!(result.average_nightly(), dec!(650000));
        assert!(result.all_available());
    }

    #[test]
    fn test_total_is_sum_of_daily_prices() {
        let rates = vec![
            rate(d(2025, 3, 3), d(2025, 3, 5), PriceChangeType::Percentage, dec!(15)),
            rate(d(2025, 3, 14), d(2025, 3, 14), PriceChangeType::Nominal, dec!(33.33)),
        ];
        let (check_in, check_out) = (d(2025, 3, 1), d(2025, 3, 20));
        let calendar = available(nights(check_in, check_out));

        let result = resolve_range_price(
            dec!(410.10),
            &rates,
            &calendar,
            check_in,
            check_out,
            Some(&WEEKEND_TEN_PERCENT),
        );

        let expected: Decimal = nights(check_in, check_out)
            .map(|day| resolve_daily_price(dec!(410.10), &rates, day, Some(&WEEKEND_TEN_PERCENT)).0)
            .sum();
        assert_eq!(result.total, expected);
        assert_eq!(result.nights(), 19);
        assert!(result.dates.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(result.dates.last().map(|day| day.date), Some(d(2025, 3, 19)));
    }

    #[test]
    fn test_missing_and_blocked_days_are_unavailable() {
        let mut calendar = available(nights(d(2025, 5, 1), d(2025, 5, 3)));
        calendar[1].is_available = false;

        let result = resolve_range_price(dec!(100), &[], &calendar, d(2025, 5, 1), d(2025, 5, 4), None);

        let flags: Vec<_> = result.dates.iter().map(|day| day.is_available).collect();
        assert_eq!(flags, vec![true, false, false]);
        assert!(!result.all_available());
        // availability does not change the price
        assert_eq!(result.total, dec!(300));
    }

    #[test]
    fn test_empty_range_prices_nothing() {
        let result = resolve_range_price(dec!(100), &[], &[], d(2025, 5, 4), d(2025, 5, 4), None);
        assert!(result.dates.is_empty());
        assert_eq!(result.total, Decimal::ZERO);
        assert_eq!(result.average_nightly(), Decimal::ZERO);
    }

    #[test]
    fn test_validate_change_value() {
        assert!(validate_change_value(dec!(0)).is_ok());
        assert!(validate_change_value(dec!(10.5)).is_ok());
        assert!(validate_change_value(dec!(-0.01)).is_err());
        assert!(validate_change_value(dec!(12.34)).is_ok());
        assert!(validate_change_value(dec!(12.3400)).is_ok());
        assert!(validate_change_value(dec!(12.345)).is_err());
    }
}
