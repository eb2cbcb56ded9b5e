//! Queue business logic: population, player moves, promotion, and position counters.

mod moves;
mod population;
mod promotion;
mod queue_position;

pub use moves::{apply_move, try_move};
pub use population::{advance_population, initialize_snapshot, populate_snapshot};
pub use promotion::{
    consecutive_wins, plan_promotion, promoted_side, resolve_promotion, PromotionOutcome,
    PromotionPlan,
};
pub use queue_position::QueuePositionAllocator;
