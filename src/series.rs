//! Cumulative time series from unordered, timestamped records.

use crate::models::{Point, Record};
use chrono::{DateTime, Utc};
use log::warn;

/// Build a sorted cumulative series.
///
/// - Records with `created_at < start_date` are dropped (the bound is inclusive).
/// - Sorting is stable on `created_at`, so same-instant records keep input order.
/// - Negative amounts add nothing to the running sum: `y` never decreases.
///   Signed flows (audit up/down) are totalled in [`crate::stats::audit_summary`].
///
/// An empty result means "no data"; callers must not build scales over it.
pub fn build_cumulative_series(
    records: &[Record],
    start_date: Option<DateTime<Utc>>,
) -> Vec<Point> {
    let mut kept: Vec<&Record> = records
        .iter()
        .filter(|r| start_date.is_none_or(|start| r.created_at >= start))
        .collect();
    kept.sort_by_key(|r| r.created_at);

    let mut total: i64 = 0;
    let mut out = Vec::with_capacity(kept.len());
    for r in kept {
        if r.amount < 0 {
            warn!(
                "negative amount {} at {} ignored in cumulative series",
                r.amount, r.created_at
            );
        }
        total = total.saturating_add(r.amount.max(0));
        out.push(Point {
            x: r.created_at,
            y: total,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TxKind, parse_timestamp};

    fn rec(amount: i64, at: &str) -> Record {
        Record {
            amount,
            kind: TxKind::Xp,
            object_id: None,
            object_name: None,
            created_at: parse_timestamp(at).unwrap(),
            path: None,
        }
    }

    #[test]
    fn two_records_accumulate() {
        let out = build_cumulative_series(&[rec(100, "2024-04-01"), rec(50, "2024-04-03")], None);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].x, parse_timestamp("2024-04-01").unwrap());
        assert_eq!(out[0].y, 100);
        assert_eq!(out[1].x, parse_timestamp("2024-04-03").unwrap());
        assert_eq!(out[1].y, 150);
    }

    #[test]
    fn unordered_input_is_sorted_and_monotonic() {
        let recs = vec![
            rec(10, "2024-05-03"),
            rec(5, "2024-05-01"),
            rec(-20, "2024-05-02"),
            rec(7, "2024-05-02"),
        ];
        let out = build_cumulative_series(&recs, None);
        assert_eq!(out.len(), 4);
        assert!(out.windows(2).all(|w| w[0].x <= w[1].x && w[0].y <= w[1].y));
        assert_eq!(out.last().unwrap().y, 22);
    }

    #[test]
    fn start_date_is_inclusive() {
        let recs = vec![rec(1, "2024-01-01"), rec(2, "2024-02-01"), rec(3, "2024-03-01")];
        let start = parse_timestamp("2024-02-01");
        let out = build_cumulative_series(&recs, start);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].y, 2);
        assert_eq!(out[1].y, 5);
    }

    #[test]
    fn everything_filtered_yields_empty() {
        let recs = vec![rec(1, "2023-01-01")];
        assert!(build_cumulative_series(&recs, parse_timestamp("2024-01-01")).is_empty());
        assert!(build_cumulative_series(&[], None).is_empty());
    }

    #[test]
    fn ties_keep_input_order() {
        let mut a = rec(1, "2024-01-01");
        a.object_id = Some(1);
        let mut b = rec(2, "2024-01-01");
        b.object_id = Some(2);
        let out = build_cumulative_series(&[a, b], None);
        assert_eq!(out[0].y, 1);
        assert_eq!(out[1].y, 3);
    }
}
