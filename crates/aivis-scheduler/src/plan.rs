//! Plan assembly: the single-pass pipeline from discovered work items to a
//! persistable [`SchedulePlan`].

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;

use aivis_core::ScheduleParams;

use crate::error::ScheduleError;
use crate::history::RecencyIndex;
use crate::interleave::interleave_by_brand;
use crate::pack::pack_batches;
use crate::router::AccountRouter;
use crate::slots::allocate_slots;
use crate::types::{AccountInfo, ExecutionRecord, PlannedBatch, SchedulePlan, WorkItem};

/// Build the full nightly plan: route every item, interleave by brand, pack
/// into randomized batches, and lay the batches out on the time axis.
///
/// Slot assignment is content-agnostic: slots are sorted ascending and
/// zipped with batches in packing order, so batch `i` simply gets slot `i`.
/// An empty work list yields an empty plan (the caller decides whether that
/// is worth persisting).
///
/// # Errors
///
/// Returns [`ScheduleError::NoAccounts`] if the account pool is empty while
/// work exists, or any slot-allocation error ([`ScheduleError::WindowCapacity`],
/// [`ScheduleError::SlotBudgetExhausted`], [`ScheduleError::InvalidParams`]).
pub fn build_plan<R: Rng + ?Sized>(
    schedule_date: NaiveDate,
    work_items: Vec<WorkItem>,
    accounts: &[AccountInfo],
    history: &[ExecutionRecord],
    params: &ScheduleParams,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<SchedulePlan, ScheduleError> {
    let total_items = work_items.len();
    if total_items == 0 {
        return Ok(SchedulePlan {
            schedule_date,
            batches: Vec::new(),
            work_items: 0,
            fallback_routes: 0,
        });
    }

    let index = RecencyIndex::from_records(history);
    let router = AccountRouter::new(accounts, &index, params.prompt_reuse_hours, now)?;

    let routed = router.route_all(&work_items);
    let fallback_routes = routed.iter().filter(|r| r.fallback).count();

    let interleaved = interleave_by_brand(routed);
    let batches = pack_batches(interleaved, params, rng);
    let slots = allocate_slots(batches.len(), params, rng)?;

    let mut planned = Vec::with_capacity(batches.len());
    for (i, (batch, slot)) in batches.into_iter().zip(slots).enumerate() {
        let first = &batch[0];
        let execution_at = slot.at_date(schedule_date).ok_or_else(|| {
            ScheduleError::InvalidParams(format!("slot {slot} is not a valid time of day"))
        })?;
        planned.push(PlannedBatch {
            batch_number: i32::try_from(i + 1).unwrap_or(i32::MAX),
            owner_id: first.item.owner_id,
            brand_id: first.item.brand_id,
            account_id: first.account_id,
            account_email: first.account_email.clone(),
            slot,
            execution_at,
            prompt_ids: batch.iter().map(|r| r.item.prompt_id).collect(),
        });
    }

    tracing::debug!(
        date = %schedule_date,
        work_items = total_items,
        batches = planned.len(),
        fallback_routes,
        "assembled schedule plan"
    );

    Ok(SchedulePlan {
        schedule_date,
        batches: planned,
        work_items: total_items,
        fallback_routes,
    })
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use uuid::Uuid;

    use super::*;

    fn work_item(brand_id: i64, prompt_id: i64) -> WorkItem {
        WorkItem {
            owner_id: Uuid::nil(),
            brand_id,
            brand_name: format!("brand-{brand_id}"),
            prompt_id,
            prompt_text: format!("prompt {prompt_id}"),
        }
    }

    fn accounts(n: i64) -> Vec<AccountInfo> {
        (1..=n)
            .map(|id| AccountInfo {
                id,
                email: format!("bot{id}@example.com"),
                last_used_at: None,
            })
            .collect()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    #[test]
    fn empty_work_list_yields_empty_plan() {
        let mut rng = StdRng::seed_from_u64(1);
        let plan = build_plan(
            date(),
            Vec::new(),
            &[],
            &[],
            &ScheduleParams::default(),
            Utc::now(),
            &mut rng,
        )
        .unwrap();
        assert!(plan.batches.is_empty());
        assert_eq!(plan.work_items, 0);
    }

    #[test]
    fn work_without_accounts_is_fatal() {
        let mut rng = StdRng::seed_from_u64(2);
        let result = build_plan(
            date(),
            vec![work_item(1, 10)],
            &[],
            &[],
            &ScheduleParams::default(),
            Utc::now(),
            &mut rng,
        );
        assert!(matches!(result, Err(ScheduleError::NoAccounts)));
    }

    #[test]
    fn every_prompt_appears_in_exactly_one_batch() {
        let mut rng = StdRng::seed_from_u64(3);
        let items: Vec<WorkItem> = (0..47).map(|i| work_item(i % 3, i)).collect();
        let plan = build_plan(
            date(),
            items,
            &accounts(5),
            &[],
            &ScheduleParams::default(),
            Utc::now(),
            &mut rng,
        )
        .unwrap();

        let mut seen: Vec<i64> = plan
            .batches
            .iter()
            .flat_map(|b| b.prompt_ids.iter().copied())
            .collect();
        seen.sort_unstable();
        let expected: Vec<i64> = (0..47).collect();
        assert_eq!(seen, expected);
        assert_eq!(plan.work_items, 47);
    }

    #[test]
    fn batch_numbers_match_slot_order() {
        let mut rng = StdRng::seed_from_u64(4);
        let items: Vec<WorkItem> = (0..20).map(|i| work_item(i % 2, i)).collect();
        let plan = build_plan(
            date(),
            items,
            &accounts(3),
            &[],
            &ScheduleParams::default(),
            Utc::now(),
            &mut rng,
        )
        .unwrap();

        for (i, batch) in plan.batches.iter().enumerate() {
            assert_eq!(batch.batch_number, i32::try_from(i + 1).unwrap());
        }
        for pair in plan.batches.windows(2) {
            assert!(pair[0].execution_at < pair[1].execution_at);
        }
    }

    #[test]
    fn execution_times_anchor_to_the_schedule_date() {
        let mut rng = StdRng::seed_from_u64(5);
        let items: Vec<WorkItem> = (0..10).map(|i| work_item(1, i)).collect();
        let plan = build_plan(
            date(),
            items,
            &accounts(2),
            &[],
            &ScheduleParams::default(),
            Utc::now(),
            &mut rng,
        )
        .unwrap();

        for batch in &plan.batches {
            assert_eq!(batch.execution_at.date_naive(), date());
        }
    }

    #[test]
    fn same_seed_builds_identical_plans() {
        let items: Vec<WorkItem> = (0..30).map(|i| work_item(i % 3, i)).collect();
        let now = Utc::now();

        let mut rng_a = StdRng::seed_from_u64(77);
        let mut rng_b = StdRng::seed_from_u64(77);
        let a = build_plan(
            date(),
            items.clone(),
            &accounts(4),
            &[],
            &ScheduleParams::default(),
            now,
            &mut rng_a,
        )
        .unwrap();
        let b = build_plan(
            date(),
            items,
            &accounts(4),
            &[],
            &ScheduleParams::default(),
            now,
            &mut rng_b,
        )
        .unwrap();

        assert_eq!(a.batches, b.batches);
    }
}
