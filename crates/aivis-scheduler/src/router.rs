//! Per-item account routing.
//!
//! Each work item is assigned the account with the best recency profile:
//! prompt freshness dominates, brand freshness breaks ties, and overall
//! idle time is the final tie-breaker. Accounts that ran the same prompt
//! inside the reuse cooldown are excluded outright rather than penalized.

use chrono::{DateTime, Utc};

use crate::error::ScheduleError;
use crate::history::RecencyIndex;
use crate::types::{AccountInfo, RoutedWorkItem, WorkItem};

const PROMPT_GAP_WEIGHT: f64 = 1000.0;
const BRAND_GAP_WEIGHT: f64 = 500.0;
const ACCOUNT_GAP_WEIGHT: f64 = 1.0;

/// Routes work items to automation accounts, one item at a time with no
/// global optimization — each assignment is final once made.
pub struct AccountRouter<'a> {
    accounts: &'a [AccountInfo],
    index: &'a RecencyIndex,
    reuse_cooldown_hours: f64,
    now: DateTime<Utc>,
}

impl<'a> AccountRouter<'a> {
    /// # Errors
    ///
    /// Returns [`ScheduleError::NoAccounts`] when the account pool is empty;
    /// with zero accounts there is no fallback and the run cannot proceed.
    #[allow(clippy::cast_precision_loss)] // cooldown is a small constant
    pub fn new(
        accounts: &'a [AccountInfo],
        index: &'a RecencyIndex,
        reuse_cooldown_hours: i64,
        now: DateTime<Utc>,
    ) -> Result<Self, ScheduleError> {
        if accounts.is_empty() {
            return Err(ScheduleError::NoAccounts);
        }
        Ok(Self {
            accounts,
            index,
            reuse_cooldown_hours: reuse_cooldown_hours as f64,
            now,
        })
    }

    /// Assign an account to one work item.
    ///
    /// Candidates inside the prompt-reuse cooldown are excluded. If that
    /// empties the pool, falls back to the globally least-recently-used
    /// account, bypassing the cooldown, so every item still gets an account.
    #[must_use]
    pub fn route(&self, item: &WorkItem) -> RoutedWorkItem {
        let mut best: Option<(&AccountInfo, f64)> = None;

        for account in self.accounts {
            let prompt_gap = self
                .index
                .prompt_gap_hours(account.id, item.prompt_id, self.now);
            if prompt_gap < self.reuse_cooldown_hours {
                continue;
            }
            let brand_gap = self
                .index
                .brand_gap_hours(account.id, item.brand_id, self.now);
            let account_gap = self.index.account_gap_hours(account.id, self.now);

            let score = prompt_gap * PROMPT_GAP_WEIGHT
                + brand_gap * BRAND_GAP_WEIGHT
                + account_gap * ACCOUNT_GAP_WEIGHT;

            // Strict comparison keeps the first-listed account on ties, so
            // routing is stable for a given pool order.
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((account, score)),
            }
        }

        if let Some((account, _)) = best {
            return RoutedWorkItem {
                item: item.clone(),
                account_id: account.id,
                account_email: account.email.clone(),
                fallback: false,
            };
        }

        // Pool exhausted: every account ran this prompt inside the cooldown.
        // Least-recently-used wins regardless of cooldown; a repeat inside
        // the window beats failing the whole run.
        let account = self.least_recently_used();
        tracing::warn!(
            prompt_id = item.prompt_id,
            brand_id = item.brand_id,
            account = %account.email,
            "all accounts inside reuse cooldown; falling back to least-recently-used"
        );
        RoutedWorkItem {
            item: item.clone(),
            account_id: account.id,
            account_email: account.email.clone(),
            fallback: true,
        }
    }

    /// Route a whole discovery list in order.
    #[must_use]
    pub fn route_all(&self, items: &[WorkItem]) -> Vec<RoutedWorkItem> {
        items.iter().map(|item| self.route(item)).collect()
    }

    /// Never-used accounts sort before all used ones (`None < Some`); among
    /// equals the first-listed account wins.
    fn least_recently_used(&self) -> &AccountInfo {
        self.accounts
            .iter()
            .min_by_key(|account| account.last_used_at)
            .expect("constructor rejects an empty account pool")
    }
}
