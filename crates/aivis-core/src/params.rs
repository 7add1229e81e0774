//! Tunables of the nightly planning algorithm.

use serde::{Deserialize, Serialize};

const DEFAULT_MAX_PROMPTS_PER_BRAND: i64 = 30;
const DEFAULT_HISTORY_WINDOW_DAYS: i64 = 7;
const DEFAULT_PROMPT_REUSE_HOURS: i64 = 24;
const DEFAULT_MIN_BATCH_SIZE: u32 = 1;
const DEFAULT_MAX_BATCH_SIZE: u32 = 6;
const DEFAULT_MIN_HOUR: u32 = 8;
const DEFAULT_MAX_HOUR: u32 = 18;
const DEFAULT_MIN_GAP_MINUTES: u32 = 10;
const DEFAULT_SLOT_ATTEMPT_BUDGET: u32 = 500_000;

/// All tunables of the nightly schedule generator.
///
/// `min_hour`/`max_hour` bound the execution window as `[min_hour, max_hour)`
/// in UTC; `min_gap_minutes` is the minimum spacing between any two batch
/// execution times inside that window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleParams {
    /// Cap on active prompts considered per brand each run.
    pub max_prompts_per_brand: i64,
    /// Trailing window of execution history fed to the router.
    pub history_window_days: i64,
    /// Hard cooldown before the same account may repeat the same prompt.
    pub prompt_reuse_hours: i64,
    pub min_batch_size: u32,
    pub max_batch_size: u32,
    pub min_hour: u32,
    pub max_hour: u32,
    pub min_gap_minutes: u32,
    /// Rejection-sampling budget for slot placement.
    pub slot_attempt_budget: u32,
}

impl Default for ScheduleParams {
    fn default() -> Self {
        Self {
            max_prompts_per_brand: DEFAULT_MAX_PROMPTS_PER_BRAND,
            history_window_days: DEFAULT_HISTORY_WINDOW_DAYS,
            prompt_reuse_hours: DEFAULT_PROMPT_REUSE_HOURS,
            min_batch_size: DEFAULT_MIN_BATCH_SIZE,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            min_hour: DEFAULT_MIN_HOUR,
            max_hour: DEFAULT_MAX_HOUR,
            min_gap_minutes: DEFAULT_MIN_GAP_MINUTES,
            slot_attempt_budget: DEFAULT_SLOT_ATTEMPT_BUDGET,
        }
    }
}

impl ScheduleParams {
    /// Width of the execution window in minutes.
    #[must_use]
    pub fn window_minutes(&self) -> u32 {
        self.max_hour.saturating_sub(self.min_hour) * 60
    }

    /// Maximum number of slots that fit in the window at the configured
    /// spacing. This is the analytic feasibility bound the allocator checks
    /// before sampling.
    #[must_use]
    pub fn slot_capacity(&self) -> u32 {
        if self.min_gap_minutes == 0 {
            return 0;
        }
        self.window_minutes() / self.min_gap_minutes
    }

    /// Check internal consistency of the parameter set.
    ///
    /// # Errors
    ///
    /// Returns a human-readable description of the first violated constraint.
    pub fn validate(&self) -> Result<(), String> {
        if self.min_batch_size < 1 {
            return Err("min_batch_size must be at least 1".to_string());
        }
        if self.max_batch_size < self.min_batch_size {
            return Err(format!(
                "max_batch_size ({}) must be >= min_batch_size ({})",
                self.max_batch_size, self.min_batch_size
            ));
        }
        if self.min_hour >= self.max_hour {
            return Err(format!(
                "min_hour ({}) must be < max_hour ({})",
                self.min_hour, self.max_hour
            ));
        }
        if self.max_hour > 24 {
            return Err(format!("max_hour ({}) must be <= 24", self.max_hour));
        }
        if self.min_gap_minutes == 0 {
            return Err("min_gap_minutes must be at least 1".to_string());
        }
        if self.max_prompts_per_brand < 1 {
            return Err("max_prompts_per_brand must be at least 1".to_string());
        }
        if self.prompt_reuse_hours < 0 {
            return Err("prompt_reuse_hours must not be negative".to_string());
        }
        Ok(())
    }
}
