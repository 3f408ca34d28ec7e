//! cr-core: per-turn status-effect resolution and item evocation
//!
//! This crate contains the player-side duration ledger, the per-turn
//! reaction orchestrator, and the evokable-item resolver, with no I/O
//! dependencies. It is designed to be pure and testable: all randomness
//! flows through a seeded [`GameRng`] owned by the [`GameState`].

pub mod beam;
pub mod evoke;
pub mod object;
pub mod player;
pub mod turn;
pub mod world;

mod consts;
mod msg;
mod rng;
mod state;

pub use consts::*;
pub use msg::{Channel, Message, MessageLog};
pub use rng::GameRng;
pub use state::{ActionCounts, ActionKind, GameState};
