//! Pickup game check-in queue: library with models, queue logic, store and service.

pub mod logic;
pub mod models;
pub mod service;
pub mod store;

pub use logic::{
    advance_population, apply_move, consecutive_wins, initialize_snapshot, plan_promotion,
    populate_snapshot, promoted_side, resolve_promotion, try_move, PromotionOutcome,
    PromotionPlan, QueuePositionAllocator,
};
pub use models::{
    AssignmentStrategy, ErrorKind, GameId, GameOutcome, GameRecord, GameStatus, MoveCommand,
    MoveResult, MoveType, Player, PlayerId, PlayerLocation, PlayerStatus, PopulationState,
    QueueCounters, QueueError, Score, Session, SessionConfig, SessionId, Snapshot, Team, TeamKey,
    TeamSide,
};
pub use service::QueueService;
pub use store::{Committed, EntryId, MemoryStore, QueueEntry, Store, StoreError, StoreWrite};
