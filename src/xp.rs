// 💰 XP Series - Cumulative XP per category, bucketed by calendar date
//
// Transactions are sorted by creation time before accumulation; the stored
// cumulative value of a bucket is only meaningful when buckets are filled in
// chronological order.

use crate::category::{Category, CategoryMap};
use crate::format::format_short_date;
use crate::records::RawTransaction;
use crate::rules::RuleEngine;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateBucket {
    pub formatted_date: String,
    /// Milliseconds since epoch of the first transaction in the bucket
    pub timestamp: i64,
    pub amount_sum: i64,
    /// Running category total after the last transaction of this bucket
    pub cumulative_after_bucket: i64,
    pub member_transactions: Vec<RawTransaction>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct XpSeries {
    /// Serialized inline as `piscineGo` / `piscineJs` / `module`
    #[serde(flatten)]
    pub buckets: CategoryMap<Vec<DateBucket>>,
    pub totals: CategoryMap<i64>,
}

impl XpSeries {
    pub fn buckets(&self, category: Category) -> &[DateBucket] {
        self.buckets.get(category)
    }

    pub fn total(&self, category: Category) -> i64 {
        *self.totals.get(category)
    }

    pub fn grand_total(&self) -> i64 {
        self.totals.iter().map(|(_, t)| *t).sum()
    }
}

/// Classify, accumulate and bucket XP transactions.
pub fn classify_xp_series(transactions: &[RawTransaction], rules: &RuleEngine) -> XpSeries {
    let mut sorted: Vec<&RawTransaction> = transactions.iter().collect();
    // Stable: same-instant transactions keep input order
    sorted.sort_by_key(|tx| tx.created_at);

    let mut series = XpSeries::default();
    let mut bucket_index: CategoryMap<HashMap<String, usize>> = CategoryMap::default();
    let mut skipped = 0usize;

    for tx in sorted {
        let Some(category) = rules.classify(&tx.path) else {
            skipped += 1;
            continue;
        };

        let running = series.totals.get_mut(category);
        *running += tx.amount;
        let cumulative = *running;

        let date_key = format_short_date(&tx.created_at);
        let buckets = series.buckets.get_mut(category);
        let index = bucket_index.get_mut(category);

        match index.get(&date_key).copied() {
            Some(i) => {
                let bucket = &mut buckets[i];
                bucket.amount_sum += tx.amount;
                bucket.cumulative_after_bucket = cumulative;
                bucket.member_transactions.push(tx.clone());
            }
            None => {
                index.insert(date_key.clone(), buckets.len());
                buckets.push(DateBucket {
                    formatted_date: date_key,
                    timestamp: tx.created_at.timestamp_millis(),
                    amount_sum: tx.amount,
                    cumulative_after_bucket: cumulative,
                    member_transactions: vec![tx.clone()],
                });
            }
        }
    }

    for category in Category::ALL {
        series.buckets.get_mut(category).sort_by_key(|b| b.timestamp);
    }

    debug!(
        "xp series: {} transactions, {} unclassified, totals go={} js={} module={}",
        transactions.len(),
        skipped,
        series.totals.piscine_go,
        series.totals.piscine_js,
        series.totals.module
    );
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn tx(path: &str, amount: i64, day: u32, hour: u32) -> RawTransaction {
        RawTransaction {
            path: path.to_string(),
            amount,
            created_at: Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap(),
            kind: "xp".to_string(),
        }
    }

    #[test]
    fn test_two_piscine_go_transactions() {
        let txs = vec![tx("/x/bh-piscine/a", 10, 1, 9), tx("/x/bh-piscine/b", 20, 2, 9)];
        let series = classify_xp_series(&txs, &RuleEngine::xp_defaults());

        assert_eq!(series.total(Category::PiscineGo), 30);
        let buckets = series.buckets(Category::PiscineGo);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[1].cumulative_after_bucket, 30);
        assert!(series.buckets(Category::Module).is_empty());
    }

    #[test]
    fn test_same_day_transactions_share_a_bucket() {
        let txs = vec![
            tx("/x/bh-module/a", 100, 3, 8),
            tx("/x/bh-module/b", 50, 3, 17),
            tx("/x/bh-module/c", 25, 4, 8),
        ];
        let series = classify_xp_series(&txs, &RuleEngine::xp_defaults());

        let buckets = series.buckets(Category::Module);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].amount_sum, 150);
        assert_eq!(buckets[0].member_transactions.len(), 2);
        assert_eq!(buckets[0].cumulative_after_bucket, 150);
        assert_eq!(buckets[1].cumulative_after_bucket, 175);
    }

    #[test]
    fn test_out_of_order_input_is_sorted_before_accumulating() {
        let txs = vec![
            tx("/x/piscine-js/c", 30, 9, 12),
            tx("/x/piscine-js/a", 10, 1, 12),
            tx("/x/piscine-js/b", 20, 5, 12),
        ];
        let series = classify_xp_series(&txs, &RuleEngine::xp_defaults());

        let cumulative: Vec<i64> = series
            .buckets(Category::PiscineJs)
            .iter()
            .map(|b| b.cumulative_after_bucket)
            .collect();
        assert_eq!(cumulative, vec![10, 30, 60]);
    }

    #[test]
    fn test_bucket_sums_equal_totals_and_cumulative_non_decreasing() {
        let txs = vec![
            tx("/x/bh-piscine/a", 5, 2, 1),
            tx("/x/bh-module/a", 700, 2, 2),
            tx("/x/piscine-js/a", 9, 3, 3),
            tx("/x/bh-piscine/b", 15, 3, 4),
            tx("/x/bh-module/b", 300, 7, 5),
            tx("/x/bh-piscine/c", 0, 7, 6),
            tx("/x/piscine-js/b", 41, 8, 7),
        ];
        let series = classify_xp_series(&txs, &RuleEngine::xp_defaults());

        for category in Category::ALL {
            let buckets = series.buckets(category);
            let sum: i64 = buckets.iter().map(|b| b.amount_sum).sum();
            assert_eq!(sum, series.total(category));
            assert!(buckets
                .windows(2)
                .all(|w| w[0].cumulative_after_bucket <= w[1].cumulative_after_bucket));
            assert!(buckets.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        }
        assert_eq!(series.grand_total(), 1070);
    }

    #[test]
    fn test_override_path_counts_as_module() {
        let txs = vec![
            tx(crate::rules::DEFAULT_XP_OVERRIDE_PATH, 70_000, 1, 12),
            tx("/bahrain/bh-module/piscine-js/quest-01", 500, 1, 13),
        ];
        let series = classify_xp_series(&txs, &RuleEngine::xp_defaults());

        assert_eq!(series.total(Category::Module), 70_000);
        assert_eq!(series.total(Category::PiscineJs), 500);
    }

    #[test]
    fn test_unclassified_and_empty_input() {
        let series = classify_xp_series(&[tx("/x/onboarding/a", 10, 1, 1)], &RuleEngine::xp_defaults());
        assert_eq!(series.grand_total(), 0);

        let empty = classify_xp_series(&[], &RuleEngine::xp_defaults());
        for category in Category::ALL {
            assert!(empty.buckets(category).is_empty());
            assert_eq!(empty.total(category), 0);
        }
    }
}
