//! Batch packing.
//!
//! Cuts the interleaved list into randomly sized batches so a night's
//! activity does not look machine-generated: a fixed batch size would be an
//! obvious fingerprint to anyone reviewing an account's usage. A batch is
//! additionally cut where the assigned account changes, so every batch's
//! items share exactly one account.

use std::collections::VecDeque;

use aivis_core::ScheduleParams;
use rand::Rng;

use crate::types::RoutedWorkItem;

/// Split routed items into account-homogeneous batches of random size in
/// `[min_batch_size, max_batch_size]`.
///
/// Sizes are drawn per batch; the draw is capped by the remaining item count
/// and the batch is truncated early if the next item belongs to a different
/// account. Every input item lands in exactly one batch, in order.
#[must_use]
pub fn pack_batches<R: Rng + ?Sized>(
    items: Vec<RoutedWorkItem>,
    params: &ScheduleParams,
    rng: &mut R,
) -> Vec<Vec<RoutedWorkItem>> {
    let mut queue: VecDeque<RoutedWorkItem> = items.into();
    let mut batches = Vec::new();

    while !queue.is_empty() {
        let remaining = u32::try_from(queue.len()).unwrap_or(u32::MAX);
        let upper = params.max_batch_size.min(remaining).max(1);
        let lower = params.min_batch_size.clamp(1, upper);
        let drawn = rng.random_range(lower..=upper) as usize;

        let account_id = queue[0].account_id;
        let mut take = 1;
        while take < drawn && queue[take].account_id == account_id {
            take += 1;
        }

        batches.push(queue.drain(..take).collect());
    }

    batches
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use uuid::Uuid;

    use crate::types::WorkItem;

    use super::*;

    fn routed(account_id: i64, prompt_id: i64) -> RoutedWorkItem {
        RoutedWorkItem {
            item: WorkItem {
                owner_id: Uuid::nil(),
                brand_id: 1,
                brand_name: "brand-1".to_string(),
                prompt_id,
                prompt_text: String::new(),
            },
            account_id,
            account_email: format!("bot{account_id}@example.com"),
            fallback: false,
        }
    }

    #[test]
    fn empty_input_produces_no_batches() {
        let mut rng = StdRng::seed_from_u64(1);
        let batches = pack_batches(Vec::new(), &ScheduleParams::default(), &mut rng);
        assert!(batches.is_empty());
    }

    #[test]
    fn every_item_lands_in_exactly_one_batch() {
        let mut rng = StdRng::seed_from_u64(7);
        let items: Vec<RoutedWorkItem> = (0..97).map(|i| routed(i % 5, i)).collect();
        let batches = pack_batches(items, &ScheduleParams::default(), &mut rng);

        let mut seen: Vec<i64> = batches
            .iter()
            .flatten()
            .map(|r| r.item.prompt_id)
            .collect();
        seen.sort_unstable();
        let expected: Vec<i64> = (0..97).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn batch_sizes_respect_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        let params = ScheduleParams::default();
        let items: Vec<RoutedWorkItem> = (0..200).map(|i| routed(1, i)).collect();
        let batches = pack_batches(items, &params, &mut rng);

        for batch in &batches {
            assert!(!batch.is_empty());
            assert!(batch.len() <= params.max_batch_size as usize);
        }
        let total: usize = batches.iter().map(Vec::len).sum();
        assert_eq!(total, 200);
    }

    #[test]
    fn batches_never_mix_accounts() {
        let mut rng = StdRng::seed_from_u64(3);
        // Alternating accounts force splits well below the drawn size.
        let items: Vec<RoutedWorkItem> = (0..40).map(|i| routed(i % 2, i)).collect();
        let batches = pack_batches(items, &ScheduleParams::default(), &mut rng);

        for batch in &batches {
            let first = batch[0].account_id;
            assert!(batch.iter().all(|r| r.account_id == first));
        }
    }

    #[test]
    fn max_batch_size_one_yields_singletons() {
        let mut rng = StdRng::seed_from_u64(5);
        let params = ScheduleParams {
            max_batch_size: 1,
            ..ScheduleParams::default()
        };
        let items: Vec<RoutedWorkItem> = (0..12).map(|i| routed(1, i)).collect();
        let batches = pack_batches(items, &params, &mut rng);

        assert_eq!(batches.len(), 12);
        assert!(batches.iter().all(|b| b.len() == 1));
    }

    #[test]
    fn same_seed_packs_identically() {
        let params = ScheduleParams::default();
        let items: Vec<RoutedWorkItem> = (0..50).map(|i| routed(i % 3, i)).collect();

        let mut rng_a = StdRng::seed_from_u64(42);
        let mut rng_b = StdRng::seed_from_u64(42);
        let a = pack_batches(items.clone(), &params, &mut rng_a);
        let b = pack_batches(items, &params, &mut rng_b);
        assert_eq!(a, b);
    }

    #[test]
    fn order_within_and_across_batches_is_preserved() {
        let mut rng = StdRng::seed_from_u64(9);
        let items: Vec<RoutedWorkItem> = (0..30).map(|i| routed(1, i)).collect();
        let batches = pack_batches(items, &ScheduleParams::default(), &mut rng);

        let flattened: Vec<i64> = batches
            .iter()
            .flatten()
            .map(|r| r.item.prompt_id)
            .collect();
        let expected: Vec<i64> = (0..30).collect();
        assert_eq!(flattened, expected);
    }
}
