//! Headless driver for the elimination wheel: plays whole games against a
//! manual clock and records what happened.

mod config;
mod error;
mod invariants;
mod logging;
mod simulator;
mod trace;

pub use config::*;
pub use error::*;
pub use invariants::*;
pub use logging::*;
pub use simulator::*;
pub use trace::*;
