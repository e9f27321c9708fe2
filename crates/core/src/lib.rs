//! Elimination wheel engine. Keep this crate free of IO and rendering concerns.

pub mod clock;
pub mod config;
pub mod elimination;
pub mod engine;
pub mod entry;
pub mod events;
pub mod guard;
pub mod import;
pub mod ledger;
pub mod partition;
pub mod rng;
pub mod spin;
pub mod state;

pub use clock::*;
pub use config::*;
pub use elimination::*;
pub use engine::*;
pub use entry::*;
pub use events::*;
pub use guard::*;
pub use import::*;
pub use ledger::*;
pub use partition::*;
pub use rng::*;
pub use spin::*;
pub use state::*;
