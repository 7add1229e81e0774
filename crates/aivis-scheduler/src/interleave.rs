//! Brand interleaving.
//!
//! Discovery iterates brand by brand, so the routed list arrives clustered.
//! Round-robin across brands spreads the clusters out so consecutive items
//! rarely share a brand. Best-effort only: once every other brand is
//! exhausted, the largest brand's remainder necessarily runs back to back.

use std::collections::VecDeque;

use crate::types::RoutedWorkItem;

/// Reorder a routed list round-robin across brands.
///
/// Partitions by brand in first-seen order, preserving intra-brand order,
/// then pops one item per brand per round until all queues drain. The output
/// is a permutation of the input — nothing is dropped or duplicated.
#[must_use]
pub fn interleave_by_brand(items: Vec<RoutedWorkItem>) -> Vec<RoutedWorkItem> {
    let total = items.len();
    let mut queues: Vec<(i64, VecDeque<RoutedWorkItem>)> = Vec::new();

    for item in items {
        match queues.iter_mut().find(|(brand_id, _)| *brand_id == item.item.brand_id) {
            Some((_, queue)) => queue.push_back(item),
            None => {
                let mut queue = VecDeque::new();
                let brand_id = item.item.brand_id;
                queue.push_back(item);
                queues.push((brand_id, queue));
            }
        }
    }

    let mut out = Vec::with_capacity(total);
    while out.len() < total {
        for (_, queue) in &mut queues {
            if let Some(item) = queue.pop_front() {
                out.push(item);
            }
        }
    }
    out
}
