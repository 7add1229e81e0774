//! Time-slot allocation.
//!
//! Places one execution slot per batch inside the working-hours window with
//! a minimum spacing between any two slots. Infeasibility is proven
//! analytically before any sampling: `floor(window / spacing)` is an upper
//! bound on how many spaced slots can exist, so asking for more fails fast
//! with exact numbers instead of timing out.
//!
//! Placement itself is rejection sampling. Realistic batch counts (tens)
//! sit far below the window's capacity (hundreds of minutes), so acceptance
//! probability stays high. Throughput degrades as the requested count
//! approaches capacity; if that ever becomes the operating regime, replace
//! this with deterministic stratified spacing.

use aivis_core::ScheduleParams;
use rand::Rng;

use crate::error::ScheduleError;
use crate::types::TimeSlot;

/// Allocate `num_slots` mutually spaced slots in `[min_hour, max_hour)`,
/// sorted ascending.
///
/// # Errors
///
/// Returns [`ScheduleError::InvalidParams`] if the parameter set is
/// inconsistent, [`ScheduleError::WindowCapacity`] if `num_slots` provably
/// cannot fit, or [`ScheduleError::SlotBudgetExhausted`] if sampling runs
/// out of attempts (possible only close to capacity).
pub fn allocate_slots<R: Rng + ?Sized>(
    num_slots: usize,
    params: &ScheduleParams,
    rng: &mut R,
) -> Result<Vec<TimeSlot>, ScheduleError> {
    params.validate().map_err(ScheduleError::InvalidParams)?;

    let window_minutes = params.window_minutes();
    let capacity = params.slot_capacity();
    if num_slots > capacity as usize {
        return Err(ScheduleError::WindowCapacity {
            requested: num_slots,
            spacing_minutes: params.min_gap_minutes,
            window_minutes,
            capacity,
        });
    }
    if num_slots == 0 {
        return Ok(Vec::new());
    }

    let mut accepted: Vec<u32> = Vec::with_capacity(num_slots);
    let mut attempts: u32 = 0;

    while accepted.len() < num_slots {
        if attempts >= params.slot_attempt_budget {
            return Err(ScheduleError::SlotBudgetExhausted {
                placed: accepted.len(),
                requested: num_slots,
                budget: params.slot_attempt_budget,
            });
        }
        attempts += 1;

        let candidate = rng.random_range(0..window_minutes);
        let spaced = accepted
            .iter()
            .all(|&slot| slot.abs_diff(candidate) >= params.min_gap_minutes);
        if spaced {
            accepted.push(candidate);
        }
    }

    accepted.sort_unstable();
    Ok(accepted
        .into_iter()
        .map(|minute| TimeSlot::from_minute_of_day(params.min_hour * 60 + minute))
        .collect())
}
