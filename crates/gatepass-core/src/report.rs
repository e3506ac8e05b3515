//! Status tallies for the reports screen

use chrono::{DateTime, NaiveDate, Utc};
use gatepass_api::{DailyStat, PassStatus, VisitorPass};
use serde::Serialize;

use crate::classify;

/// How many passes are in each status at one instant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub active: usize,
    pub not_active: usize,
    pub expired: usize,
    pub registered: usize,
    pub total: usize,
}

impl StatusCounts {
    pub fn get(&self, status: PassStatus) -> usize {
        match status {
            PassStatus::Active => self.active,
            PassStatus::NotActive => self.not_active,
            PassStatus::Expired => self.expired,
            PassStatus::Registered => self.registered,
        }
    }

    fn record(&mut self, status: PassStatus) {
        match status {
            PassStatus::Active => self.active += 1,
            PassStatus::NotActive => self.not_active += 1,
            PassStatus::Expired => self.expired += 1,
            PassStatus::Registered => self.registered += 1,
        }
        self.total += 1;
    }

    /// Group into the three chart buckets
    pub fn buckets(&self) -> ReportBuckets {
        ReportBuckets {
            active: self.active,
            not_active: self.not_active + self.registered,
            expired: self.expired,
        }
    }
}

/// Classify every pass at `now` and count the results
pub fn tally(passes: &[VisitorPass], now: DateTime<Utc>) -> StatusCounts {
    passes.iter().fold(StatusCounts::default(), |mut counts, pass| {
        counts.record(classify(pass, now));
        counts
    })
}

/// Chart grouping: anyone not on campus and not lapsed counts as Not Active
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportBuckets {
    pub active: usize,
    pub not_active: usize,
    pub expired: usize,
}

/// One wedge of the status chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSlice {
    pub status: PassStatus,
    pub label: &'static str,
    pub value: usize,
    pub color: &'static str,
}

impl ReportBuckets {
    /// Non-empty slices in chart order
    pub fn chart_slices(&self) -> Vec<ChartSlice> {
        [
            (PassStatus::Active, self.active),
            (PassStatus::NotActive, self.not_active),
            (PassStatus::Expired, self.expired),
        ]
        .into_iter()
        .filter(|(_, value)| *value > 0)
        .map(|(status, value)| ChartSlice {
            status,
            label: status.label(),
            value,
            color: status.style().color,
        })
        .collect()
    }
}

/// Registrations recorded for `today` in the daily stats, 0 when absent
pub fn today_registrations(stats: &[DailyStat], today: NaiveDate) -> u64 {
    stats
        .iter()
        .find(|stat| stat.date == today)
        .map(|stat| stat.visitors)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 20, h, m, 0).unwrap()
    }

    fn roster() -> Vec<VisitorPass> {
        let mut inside = VisitorPass::new("VIS-1", "Inside");
        inside.check_in_time = Some(at(9, 0));

        let mut left = VisitorPass::new("VIS-2", "Left").with_valid_until(at(23, 59));
        left.check_in_time = Some(at(9, 0));
        left.check_out_time = Some(at(11, 0));

        let waiting = VisitorPass::new("VIS-3", "Waiting").with_valid_until(at(23, 59));
        let lapsed = VisitorPass::new("VIS-4", "Lapsed").with_valid_until(at(8, 0));
        let open = VisitorPass::new("VIS-5", "Open");

        vec![inside, left, waiting, lapsed, open]
    }

    #[test]
    fn tally_counts_each_status() {
        let counts = tally(&roster(), at(12, 0));
        assert_eq!(
            counts,
            StatusCounts {
                active: 1,
                not_active: 1,
                expired: 1,
                registered: 2,
                total: 5,
            }
        );
        assert_eq!(counts.get(PassStatus::Registered), 2);
    }

    #[test]
    fn buckets_fold_registered_into_not_active() {
        let buckets = tally(&roster(), at(12, 0)).buckets();
        assert_eq!(buckets.active, 1);
        assert_eq!(buckets.not_active, 3);
        assert_eq!(buckets.expired, 1);
    }

    #[test]
    fn chart_omits_empty_buckets() {
        let buckets = ReportBuckets {
            active: 2,
            not_active: 0,
            expired: 1,
        };
        let slices = buckets.chart_slices();
        let labels: Vec<_> = slices.iter().map(|s| s.label).collect();
        assert_eq!(labels, ["Active", "Expired"]);
        assert_eq!(slices[1].color, "#ef4444");

        assert!(ReportBuckets::default().chart_slices().is_empty());
    }

    #[test]
    fn today_registrations_looks_up_date() {
        let stats = vec![
            DailyStat {
                date: NaiveDate::from_ymd_opt(2025, 1, 19).unwrap(),
                visitors: 4,
            },
            DailyStat {
                date: NaiveDate::from_ymd_opt(2025, 1, 20).unwrap(),
                visitors: 11,
            },
        ];
        assert_eq!(today_registrations(&stats, at(12, 0).date_naive()), 11);
        assert_eq!(
            today_registrations(&stats, NaiveDate::from_ymd_opt(2025, 1, 21).unwrap()),
            0
        );
        assert_eq!(today_registrations(&[], at(12, 0).date_naive()), 0);
    }
}
