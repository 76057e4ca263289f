//! Pipeline entry points for monitor operations.
//!
//! - `run_check`: one full check cycle (detect, decide, notify, persist)
//! - `run_monitor`: the scheduling loop around `run_check`
//! - `transition`: the pure decision rules between consecutive readings

pub mod check;
pub mod monitor;
pub mod transition;

pub use check::{process_reading, run_check};
pub use monitor::run_monitor;
pub use transition::{Decision, decide};
