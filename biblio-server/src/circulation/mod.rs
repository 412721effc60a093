//! Circulation module: the borrow ledger
//!
//! Orchestrates checkout and return as single transactions over the
//! catalog and membership counters, assesses overdue fines, and runs the
//! periodic overdue sweep.

pub mod error;
pub mod fine;
pub mod scheduler;
pub mod service;

pub use error::{CirculationError, CirculationResult};
pub use fine::FinePolicy;
pub use scheduler::OverdueScheduler;
pub use service::CirculationService;
