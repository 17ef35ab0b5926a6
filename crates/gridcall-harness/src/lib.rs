//! Deterministic simulation harness for gridcall testing.
//!
//! Virtual-time implementations of the Environment and Driver traits for
//! deterministic, reproducible testing of the session and view state
//! machines: the clock only moves when a test advances it, and randomness is
//! seeded.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod sim_driver;
pub mod sim_env;

pub use sim_driver::{SimDriver, SimDriverError};
pub use sim_env::{SimEnv, SimInstant};
