//! In-memory types flowing through the planning pipeline.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// One unit of work discovered for the night: a single prompt of a single
/// brand. Produced fresh each run; immutable once discovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub owner_id: Uuid,
    pub brand_id: i64,
    pub brand_name: String,
    pub prompt_id: i64,
    pub prompt_text: String,
}

/// A shared automation account as the router sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub id: i64,
    pub email: String,
    pub last_used_at: Option<DateTime<Utc>>,
}

/// One historical execution fact. Append-only input to the recency index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionRecord {
    pub account_id: i64,
    pub prompt_id: i64,
    pub brand_id: i64,
    pub executed_at: DateTime<Utc>,
}

/// A work item with its final account assignment. The assignment is made
/// per item and never rebalanced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedWorkItem {
    pub item: WorkItem,
    pub account_id: i64,
    pub account_email: String,
    /// True when the assignment bypassed the reuse cooldown because every
    /// account was inside the window (least-recently-used escape valve).
    pub fallback: bool,
}

/// A minute-resolution execution time inside the working-hours window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeSlot {
    pub hour: u32,
    pub minute: u32,
}

impl TimeSlot {
    /// Build a slot from an absolute minute of day (0..1440).
    #[must_use]
    pub fn from_minute_of_day(minute_of_day: u32) -> Self {
        Self {
            hour: minute_of_day / 60,
            minute: minute_of_day % 60,
        }
    }

    #[must_use]
    pub fn minute_of_day(&self) -> u32 {
        self.hour * 60 + self.minute
    }

    /// Anchor the slot to a calendar date as a UTC timestamp. `None` if the
    /// slot does not name a valid time of day (hour >= 24).
    #[must_use]
    pub fn at_date(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        date.and_hms_opt(self.hour, self.minute, 0)
            .map(|naive| naive.and_utc())
    }
}

impl std::fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// One batch of the finished plan: a run of consecutive routed items sharing
/// a single account, tagged with its execution slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedBatch {
    pub batch_number: i32,
    /// Owner and brand of the batch's first item. A batch may mix brands
    /// after interleaving; these columns are informational.
    pub owner_id: Uuid,
    pub brand_id: i64,
    pub account_id: i64,
    pub account_email: String,
    pub slot: TimeSlot,
    pub execution_at: DateTime<Utc>,
    pub prompt_ids: Vec<i64>,
}

impl PlannedBatch {
    #[must_use]
    pub fn size(&self) -> usize {
        self.prompt_ids.len()
    }
}

/// The finished nightly plan plus run statistics for the summary log.
#[derive(Debug, Clone)]
pub struct SchedulePlan {
    pub schedule_date: NaiveDate,
    pub batches: Vec<PlannedBatch>,
    pub work_items: usize,
    /// How many items were routed via the cooldown-bypassing fallback.
    pub fallback_routes: usize,
}

impl SchedulePlan {
    #[must_use]
    pub fn min_batch_size(&self) -> usize {
        self.batches.iter().map(PlannedBatch::size).min().unwrap_or(0)
    }

    #[must_use]
    pub fn max_batch_size(&self) -> usize {
        self.batches.iter().map(PlannedBatch::size).max().unwrap_or(0)
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)] // batch counts are tiny
    pub fn average_batch_size(&self) -> f64 {
        if self.batches.is_empty() {
            return 0.0;
        }
        self.work_items as f64 / self.batches.len() as f64
    }
}
