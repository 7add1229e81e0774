use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("no routable automation accounts available")]
    NoAccounts,
    #[error(
        "cannot place {requested} execution slots with {spacing_minutes}-minute spacing \
         inside a {window_minutes}-minute window (maximum {capacity} slots)"
    )]
    WindowCapacity {
        requested: usize,
        spacing_minutes: u32,
        window_minutes: u32,
        capacity: u32,
    },
    #[error(
        "slot sampling budget of {budget} attempts exhausted after placing \
         {placed} of {requested} slots"
    )]
    SlotBudgetExhausted {
        placed: usize,
        requested: usize,
        budget: u32,
    },
    #[error("invalid schedule parameters: {0}")]
    InvalidParams(String),
}
