//! Recency index over the trailing execution history.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::types::ExecutionRecord;

/// Latest-execution lookup tables the router scores against.
///
/// Built once per run from the windowed history. A missing entry means the
/// pair has no execution inside the window, which the gap accessors report
/// as an infinite gap — indistinguishable, by design, from "never used".
#[derive(Debug, Default)]
pub struct RecencyIndex {
    by_account_prompt: HashMap<(i64, i64), DateTime<Utc>>,
    by_account_brand: HashMap<(i64, i64), DateTime<Utc>>,
    by_account: HashMap<i64, DateTime<Utc>>,
}

impl RecencyIndex {
    /// Index a slice of execution records, keeping the latest timestamp per
    /// key. Record order does not matter.
    #[must_use]
    pub fn from_records(records: &[ExecutionRecord]) -> Self {
        let mut index = Self::default();
        for record in records {
            keep_latest(
                &mut index.by_account_prompt,
                (record.account_id, record.prompt_id),
                record.executed_at,
            );
            keep_latest(
                &mut index.by_account_brand,
                (record.account_id, record.brand_id),
                record.executed_at,
            );
            keep_latest(&mut index.by_account, record.account_id, record.executed_at);
        }
        index
    }

    /// Hours since `account_id` last executed this exact prompt.
    #[must_use]
    pub fn prompt_gap_hours(&self, account_id: i64, prompt_id: i64, now: DateTime<Utc>) -> f64 {
        gap_hours(self.by_account_prompt.get(&(account_id, prompt_id)), now)
    }

    /// Hours since `account_id` last executed any prompt for this brand.
    #[must_use]
    pub fn brand_gap_hours(&self, account_id: i64, brand_id: i64, now: DateTime<Utc>) -> f64 {
        gap_hours(self.by_account_brand.get(&(account_id, brand_id)), now)
    }

    /// Hours since `account_id` last executed anything.
    #[must_use]
    pub fn account_gap_hours(&self, account_id: i64, now: DateTime<Utc>) -> f64 {
        gap_hours(self.by_account.get(&account_id), now)
    }
}

fn keep_latest<K: std::hash::Hash + Eq>(
    map: &mut HashMap<K, DateTime<Utc>>,
    key: K,
    at: DateTime<Utc>,
) {
    map.entry(key)
        .and_modify(|existing| {
            if at > *existing {
                *existing = at;
            }
        })
        .or_insert(at);
}

#[allow(clippy::cast_precision_loss)] // gaps are a few hundred hours at most
fn gap_hours(last: Option<&DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    match last {
        Some(at) => ((now - *at).num_minutes().max(0) as f64) / 60.0,
        None => f64::INFINITY,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn record(account_id: i64, prompt_id: i64, brand_id: i64, at: DateTime<Utc>) -> ExecutionRecord {
        ExecutionRecord {
            account_id,
            prompt_id,
            brand_id,
            executed_at: at,
        }
    }

    #[test]
    fn missing_history_is_an_infinite_gap() {
        let index = RecencyIndex::from_records(&[]);
        let now = Utc::now();
        assert!(index.prompt_gap_hours(1, 1, now).is_infinite());
        assert!(index.brand_gap_hours(1, 1, now).is_infinite());
        assert!(index.account_gap_hours(1, now).is_infinite());
    }

    #[test]
    fn gaps_measure_hours_since_latest_execution() {
        let now = Utc::now();
        let records = [
            record(1, 10, 100, now - Duration::hours(48)),
            record(1, 10, 100, now - Duration::hours(6)),
        ];
        let index = RecencyIndex::from_records(&records);

        assert!((index.prompt_gap_hours(1, 10, now) - 6.0).abs() < 0.01);
        assert!((index.brand_gap_hours(1, 100, now) - 6.0).abs() < 0.01);
        assert!((index.account_gap_hours(1, now) - 6.0).abs() < 0.01);
    }

    #[test]
    fn latest_wins_regardless_of_record_order() {
        let now = Utc::now();
        let records = [
            record(1, 10, 100, now - Duration::hours(2)),
            record(1, 10, 100, now - Duration::hours(72)),
        ];
        let index = RecencyIndex::from_records(&records);
        assert!((index.prompt_gap_hours(1, 10, now) - 2.0).abs() < 0.01);
    }

    #[test]
    fn prompt_and_brand_gaps_diverge() {
        let now = Utc::now();
        // Account 1 ran prompt 11 for brand 100 recently, prompt 10 long ago.
        let records = [
            record(1, 10, 100, now - Duration::hours(40)),
            record(1, 11, 100, now - Duration::hours(3)),
        ];
        let index = RecencyIndex::from_records(&records);

        assert!((index.prompt_gap_hours(1, 10, now) - 40.0).abs() < 0.01);
        assert!((index.brand_gap_hours(1, 100, now) - 3.0).abs() < 0.01);
    }

    #[test]
    fn accounts_are_indexed_independently() {
        let now = Utc::now();
        let records = [record(1, 10, 100, now - Duration::hours(5))];
        let index = RecencyIndex::from_records(&records);

        assert!(index.prompt_gap_hours(2, 10, now).is_infinite());
        assert!(index.account_gap_hours(2, now).is_infinite());
    }

    #[test]
    fn future_timestamps_clamp_to_zero_gap() {
        let now = Utc::now();
        let records = [record(1, 10, 100, now + Duration::hours(1))];
        let index = RecencyIndex::from_records(&records);
        assert!(index.account_gap_hours(1, now).abs() < f64::EPSILON);
    }
}
