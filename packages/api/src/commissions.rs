//! Commission math and weekly bucketing.
//!
//! Commissions are accrued per ISO week: Monday 00:00:00.000 through the
//! following Sunday 23:59:59.999. The same percentage drives both the
//! storefront discount and the marketer's cut.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::entity::commission;

/// `round(amount × rate / 100)`, half away from zero like the storefront
/// expects. `rate` is a percentage in `0..=100`.
pub fn rate_share(amount: i64, rate: f64) -> i64 {
    ((amount as f64) * rate / 100.0).round() as i64
}

/// Discount a coupon grants on a pre-discount total, clamped so the payable
/// total never goes negative.
pub fn coupon_discount(pre_discount_total: i64, rate: f64) -> i64 {
    rate_share(pre_discount_total, rate).clamp(0, pre_discount_total)
}

/// Bounds of the ISO week containing `at`.
pub fn week_bounds(at: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    let date = at.date();
    let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
    let week_start = monday.and_time(NaiveTime::MIN);
    let week_end = week_start + Duration::days(7) - Duration::milliseconds(1);
    (week_start, week_end)
}

/// One `(week, paid-state)` bucket of a marketer's commissions.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySummary {
    pub week_start: NaiveDateTime,
    pub week_end: NaiveDateTime,
    pub total_orders: i64,
    pub total_commission: i64,
    pub is_paid: bool,
    pub paid_at: Option<NaiveDateTime>,
}

/// Group commission rows by `(week_start, week_end, is_paid)`, summing count
/// and amount, sorted by week descending.
pub fn aggregate_weeks(rows: &[commission::Model]) -> Vec<WeeklySummary> {
    let mut buckets: BTreeMap<(NaiveDateTime, NaiveDateTime, bool), WeeklySummary> =
        BTreeMap::new();

    for row in rows {
        let entry = buckets
            .entry((row.week_start, row.week_end, row.is_paid))
            .or_insert_with(|| WeeklySummary {
                week_start: row.week_start,
                week_end: row.week_end,
                total_orders: 0,
                total_commission: 0,
                is_paid: row.is_paid,
                paid_at: None,
            });
        entry.total_orders += 1;
        entry.total_commission += row.commission_amount;
        if entry.paid_at.is_none() {
            entry.paid_at = row.paid_at;
        }
    }

    buckets.into_values().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn rounding_matches_storefront() {
        assert_eq!(rate_share(1000, 10.0), 100);
        assert_eq!(rate_share(999, 5.0), 50); // 49.95 rounds up
        assert_eq!(rate_share(990, 5.0), 50); // 49.5 rounds half up
        assert_eq!(rate_share(989, 5.0), 49);
        assert_eq!(rate_share(0, 50.0), 0);
    }

    #[test]
    fn discount_clamped_to_total() {
        assert_eq!(coupon_discount(1000, 10.0), 100);
        assert_eq!(coupon_discount(10, 100.0), 10);
        assert_eq!(coupon_discount(0, 10.0), 0);
    }

    #[test]
    fn week_bounds_midweek() {
        // 2024-05-15 is a Wednesday
        let (start, end) = week_bounds(at(2024, 5, 15, 14));
        assert_eq!(start, at(2024, 5, 13, 0));
        assert_eq!(
            end,
            NaiveDate::from_ymd_opt(2024, 5, 19)
                .unwrap()
                .and_hms_milli_opt(23, 59, 59, 999)
                .unwrap()
        );
    }

    #[test]
    fn week_bounds_on_monday_and_sunday() {
        // Monday maps to itself
        let (start, _) = week_bounds(at(2024, 5, 13, 0));
        assert_eq!(start, at(2024, 5, 13, 0));
        // Sunday still belongs to the week that started the previous Monday
        let (start, end) = week_bounds(at(2024, 5, 19, 23));
        assert_eq!(start, at(2024, 5, 13, 0));
        assert!(end > at(2024, 5, 19, 23));
    }

    fn commission_row(
        week_start: NaiveDateTime,
        week_end: NaiveDateTime,
        amount: i64,
        is_paid: bool,
    ) -> commission::Model {
        let now = at(2024, 5, 15, 12);
        commission::Model {
            id: uuid::Uuid::new_v4().simple().to_string(),
            marketer_id: "m1".to_string(),
            order_id: uuid::Uuid::new_v4().simple().to_string(),
            coupon_code: "SAVE10".to_string(),
            order_amount: amount * 10,
            commission_rate: 10.0,
            commission_amount: amount,
            week_start,
            week_end,
            is_paid,
            paid_at: is_paid.then_some(now),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn weekly_aggregation_groups_and_sorts() {
        let (w1s, w1e) = week_bounds(at(2024, 5, 8, 12));
        let (w2s, w2e) = week_bounds(at(2024, 5, 15, 12));

        let rows = vec![
            commission_row(w1s, w1e, 100, true),
            commission_row(w2s, w2e, 40, false),
            commission_row(w2s, w2e, 60, false),
            commission_row(w1s, w1e, 25, false),
        ];

        let weeks = aggregate_weeks(&rows);
        assert_eq!(weeks.len(), 3);

        // Newest week first
        assert_eq!(weeks[0].week_start, w2s);
        assert_eq!(weeks[0].total_orders, 2);
        assert_eq!(weeks[0].total_commission, 100);
        assert!(!weeks[0].is_paid);

        // Same week splits into paid and unpaid buckets
        let paid: Vec<_> = weeks.iter().filter(|w| w.week_start == w1s).collect();
        assert_eq!(paid.len(), 2);
    }
}
