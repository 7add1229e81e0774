//! Nightly batch planning: account routing, brand interleaving, batch
//! packing, and time-slot allocation.
//!
//! Everything in this crate is pure in-memory computation. The caller fetches
//! inventory, accounts, and execution history up front, hands them in along
//! with a clock reading and an RNG, and gets back a [`SchedulePlan`] ready
//! for persistence. Injecting the RNG keeps production runs non-deterministic
//! while letting tests pin a seed and assert exact plans.

mod error;
mod history;
mod interleave;
mod pack;
mod plan;
mod router;
mod slots;
mod types;

pub use error::ScheduleError;
pub use history::RecencyIndex;
pub use interleave::interleave_by_brand;
pub use pack::pack_batches;
pub use plan::build_plan;
pub use router::AccountRouter;
pub use slots::allocate_slots;
pub use types::{
    AccountInfo, ExecutionRecord, PlannedBatch, RoutedWorkItem, SchedulePlan, TimeSlot, WorkItem,
};
