//! A process scheduling library.
//!
//! This library provides the data model of a simulated CPU scheduler:
//! the process lifecycle state machine, the process table, the ready
//! queue, the per-core slots and the scheduling configuration. The
//! concurrent execution of these pieces lives in the `engine` crate.

mod config;
mod error;
mod policy;
mod process;
mod queue;
mod slots;
mod table;

pub use crate::config::{draw_instructions, Config, MAX_CORES};
pub use crate::error::SchedulerError;
pub use crate::policy::{CorePolicy, Policy};
pub use crate::process::{Process, ProcessState, ProcessView, TIMESTAMP_FORMAT};
pub use crate::queue::ReadyQueue;
pub use crate::slots::CoreSlots;
pub use crate::table::ProcessTable;
