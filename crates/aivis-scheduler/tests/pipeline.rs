//! End-to-end planning scenarios over the pure pipeline.

use aivis_core::ScheduleParams;
use aivis_scheduler::{
    build_plan, AccountInfo, ExecutionRecord, ScheduleError, WorkItem,
};
use chrono::{Duration, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use uuid::Uuid;

fn schedule_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
}

fn account_pool(n: i64) -> Vec<AccountInfo> {
    (1..=n)
        .map(|id| AccountInfo {
            id,
            email: format!("bot{id}@example.com"),
            last_used_at: Some(Utc::now() - Duration::hours(id * 7)),
        })
        .collect()
}

/// 47 work items across 3 brands sized 20/15/12 — the typical nightly shape.
fn typical_inventory() -> Vec<WorkItem> {
    let owner = Uuid::new_v4();
    let mut items = Vec::new();
    let mut prompt_id = 0;
    for (brand_id, count) in [(1_i64, 20), (2, 15), (3, 12)] {
        for _ in 0..count {
            prompt_id += 1;
            items.push(WorkItem {
                owner_id: owner,
                brand_id,
                brand_name: format!("brand-{brand_id}"),
                prompt_id,
                prompt_text: format!("where to buy from brand {brand_id}"),
            });
        }
    }
    items
}

#[test]
fn typical_night_plans_without_errors() {
    let mut rng = StdRng::seed_from_u64(2026);
    let params = ScheduleParams::default();
    let plan = build_plan(
        schedule_date(),
        typical_inventory(),
        &account_pool(5),
        &[],
        &params,
        Utc::now(),
        &mut rng,
    )
    .expect("47 items over 3 brands and 5 accounts must plan cleanly");

    // Coverage: every discovered prompt appears in exactly one batch.
    let mut scheduled: Vec<i64> = plan
        .batches
        .iter()
        .flat_map(|b| b.prompt_ids.iter().copied())
        .collect();
    scheduled.sort_unstable();
    let expected: Vec<i64> = (1..=47).collect();
    assert_eq!(scheduled, expected);

    // Size bounds and total.
    for batch in &plan.batches {
        assert!(!batch.prompt_ids.is_empty());
        assert!(batch.prompt_ids.len() <= 6);
    }
    let total: usize = plan.batches.iter().map(|b| b.prompt_ids.len()).sum();
    assert_eq!(total, 47);

    // Far fewer batches than the window's 60-slot capacity.
    assert!(plan.batches.len() >= 8);
    assert!(plan.batches.len() <= 47);
    assert!(plan.batches.len() < 60);

    // Spacing and window bounds across all batch pairs.
    for (i, a) in plan.batches.iter().enumerate() {
        let minute = a.slot.minute_of_day();
        assert!(minute >= 8 * 60 && minute < 18 * 60, "slot {} outside window", a.slot);
        for b in plan.batches.iter().skip(i + 1) {
            let gap = a.slot.minute_of_day().abs_diff(b.slot.minute_of_day());
            assert!(gap >= 10, "slots {} and {} only {gap} minutes apart", a.slot, b.slot);
        }
    }

    // Fresh accounts with no history: no fallback routing should occur.
    assert_eq!(plan.fallback_routes, 0);
}

#[test]
fn five_hundred_singleton_batches_exceed_window_capacity() {
    let mut rng = StdRng::seed_from_u64(1);
    let params = ScheduleParams {
        max_batch_size: 1,
        ..ScheduleParams::default()
    };
    let owner = Uuid::new_v4();
    let items: Vec<WorkItem> = (0..500)
        .map(|i| WorkItem {
            owner_id: owner,
            brand_id: i % 7,
            brand_name: format!("brand-{}", i % 7),
            prompt_id: i,
            prompt_text: String::new(),
        })
        .collect();

    let err = build_plan(
        schedule_date(),
        items,
        &account_pool(5),
        &[],
        &params,
        Utc::now(),
        &mut rng,
    )
    .expect_err("500 singleton batches cannot fit 60 slots");

    match err {
        ScheduleError::WindowCapacity {
            requested,
            spacing_minutes,
            window_minutes,
            capacity,
        } => {
            assert_eq!(requested, 500);
            assert_eq!(spacing_minutes, 10);
            assert_eq!(window_minutes, 600);
            assert_eq!(capacity, 60);
        }
        other => panic!("expected WindowCapacity, got: {other:?}"),
    }
}

#[test]
fn cooldown_is_respected_when_routing_succeeds_without_fallback() {
    let mut rng = StdRng::seed_from_u64(17);
    let now = Utc::now();
    let accounts = account_pool(5);

    // Account 1 ran prompts 1..=10 three hours ago; the cooldown must push
    // those prompts onto other accounts.
    let history: Vec<ExecutionRecord> = (1..=10)
        .map(|prompt_id| ExecutionRecord {
            account_id: 1,
            prompt_id,
            brand_id: 1,
            executed_at: now - Duration::hours(3),
        })
        .collect();

    let plan = build_plan(
        schedule_date(),
        typical_inventory(),
        &accounts,
        &history,
        &ScheduleParams::default(),
        now,
        &mut rng,
    )
    .unwrap();

    assert_eq!(plan.fallback_routes, 0);
    for batch in &plan.batches {
        if batch.account_id == 1 {
            for prompt_id in &batch.prompt_ids {
                assert!(
                    *prompt_id > 10,
                    "prompt {prompt_id} routed back to account 1 inside the cooldown"
                );
            }
        }
    }
}

#[test]
fn single_account_pool_still_schedules_everything() {
    let mut rng = StdRng::seed_from_u64(5);
    let now = Utc::now();
    let accounts = account_pool(1);

    // The lone account ran every prompt an hour ago: all routing must go
    // through the least-recently-used fallback, but nothing may be dropped.
    let history: Vec<ExecutionRecord> = typical_inventory()
        .iter()
        .map(|item| ExecutionRecord {
            account_id: 1,
            prompt_id: item.prompt_id,
            brand_id: item.brand_id,
            executed_at: now - Duration::hours(1),
        })
        .collect();

    let plan = build_plan(
        schedule_date(),
        typical_inventory(),
        &accounts,
        &history,
        &ScheduleParams::default(),
        now,
        &mut rng,
    )
    .unwrap();

    assert_eq!(plan.fallback_routes, 47);
    let total: usize = plan.batches.iter().map(|b| b.prompt_ids.len()).sum();
    assert_eq!(total, 47);
    assert!(plan.batches.iter().all(|b| b.account_id == 1));
}
