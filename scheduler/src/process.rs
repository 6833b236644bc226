use std::fmt::{self, Display};
use std::sync::Mutex;

use chrono::{DateTime, Local};

/// Timestamp format used for creation times and log records,
/// e.g. `(11/05/24 14:32:01 PM)`.
pub const TIMESTAMP_FORMAT: &str = "(%m/%d/%y %H:%M:%S %p)";

/// The lifecycle state of a process.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ProcessState {
    /// Eligible for dispatch, not occupying a core.
    Ready,

    /// Currently occupying a core and being advanced.
    Running,

    /// Parked; no discipline in this emulator uses it, kept for parity
    /// with the state set of the emulated machine.
    Waiting,

    /// All instructions executed. Absorbing.
    Terminated,
}

impl Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessState::Ready => write!(f, "READY"),
            ProcessState::Running => write!(f, "RUNNING"),
            ProcessState::Waiting => write!(f, "WAITING"),
            ProcessState::Terminated => write!(f, "TERMINATED"),
        }
    }
}

/// Mutable part of a process record.
///
/// State, the executed counter and the log live under one lock so a log
/// append and the state transition it may trigger are atomic to any
/// concurrent reader.
#[derive(Debug)]
struct Body {
    state: ProcessState,
    /// Core currently owning the process; `Some` only while RUNNING.
    core: Option<usize>,
    executed: u32,
    log: Vec<String>,
}

/// One schedulable unit of work.
///
/// Owned by the [`ProcessTable`](crate::ProcessTable); the ready queue and
/// the core slots refer to it by name only. A process is advanced by at most
/// one core worker at a time, but its state and log may be read concurrently
/// by status and report queries.
#[derive(Debug)]
pub struct Process {
    name: String,
    created_at: DateTime<Local>,
    total: u32,
    body: Mutex<Body>,
}

impl Process {
    pub fn new(name: impl Into<String>, total_instructions: u32) -> Process {
        assert!(total_instructions >= 1, "a process needs at least one instruction");
        Process {
            name: name.into(),
            created_at: Local::now(),
            total: total_instructions,
            body: Mutex::new(Body {
                state: ProcessState::Ready,
                core: None,
                executed: 0,
                log: Vec::new(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }

    pub fn total_instructions(&self) -> u32 {
        self.total
    }

    pub fn state(&self) -> ProcessState {
        self.body.lock().unwrap().state
    }

    /// Whether the process is RUNNING under `core_id`'s ownership.
    pub fn running_on(&self, core_id: usize) -> bool {
        let body = self.body.lock().unwrap();
        body.state == ProcessState::Running && body.core == Some(core_id)
    }

    /// Move the process to `state` and release its core ownership.
    ///
    /// Transitions out of [`ProcessState::Terminated`] are refused; a
    /// terminated process must never be scheduled again. To make a process
    /// RUNNING use [`Process::run_on`], which also records the owning core.
    pub fn set_state(&self, state: ProcessState) {
        let mut body = self.body.lock().unwrap();
        if body.state == ProcessState::Terminated {
            return;
        }
        body.state = state;
        if state != ProcessState::Running {
            body.core = None;
        }
    }

    /// Dispatch the process onto `core_id`: state becomes RUNNING and the
    /// core takes exclusive ownership of advances.
    pub fn run_on(&self, core_id: usize) {
        let mut body = self.body.lock().unwrap();
        if body.state == ProcessState::Terminated {
            return;
        }
        body.state = ProcessState::Running;
        body.core = Some(core_id);
    }

    /// Execute one instruction on core `core_id`.
    ///
    /// Legal only while RUNNING on that same core; any other call is a
    /// no-op, so a worker whose slot went stale after a preemption cannot
    /// advance a process that was since dispatched elsewhere. Appends one
    /// log record and, when the last instruction is reached, transitions to
    /// TERMINATED in the same critical section.
    ///
    /// Returns `true` when an instruction was actually executed.
    pub fn advance(&self, core_id: usize) -> bool {
        let mut body = self.body.lock().unwrap();
        if body.state != ProcessState::Running || body.core != Some(core_id) {
            return false;
        }
        if body.executed < self.total {
            let stamp = Local::now().format(TIMESTAMP_FORMAT);
            body.log
                .push(format!("{stamp} Core:{core_id} \"Hello world from {}!\"", self.name));
            body.executed += 1;
        }
        if body.executed >= self.total {
            body.state = ProcessState::Terminated;
            body.core = None;
        }
        true
    }

    /// Owned, internally consistent copy of the process for display.
    pub fn snapshot(&self) -> ProcessView {
        let body = self.body.lock().unwrap();
        ProcessView {
            name: self.name.clone(),
            created_at: self.created_at,
            state: body.state,
            executed: body.executed,
            total: self.total,
            log: body.log.clone(),
        }
    }
}

/// Read-only copy of a process, handed to status and report collaborators.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessView {
    pub name: String,
    pub created_at: DateTime<Local>,
    pub state: ProcessState,
    pub executed: u32,
    pub total: u32,
    pub log: Vec<String>,
}

impl ProcessView {
    pub fn is_terminated(&self) -> bool {
        self.state == ProcessState::Terminated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_requires_running() {
        let process = Process::new("p1", 3);
        assert!(!process.advance(0));
        assert_eq!(process.snapshot().executed, 0);
        assert!(process.snapshot().log.is_empty());
    }

    #[test]
    fn advance_requires_core_ownership() {
        let process = Process::new("p1", 3);
        process.run_on(1);
        assert!(!process.advance(0), "core 0 does not own the process");
        assert!(process.advance(1));
        assert_eq!(process.snapshot().executed, 1);
    }

    #[test]
    fn advance_counts_and_terminates() {
        let process = Process::new("p1", 2);
        process.run_on(0);
        assert!(process.advance(0));
        assert_eq!(process.state(), ProcessState::Running);
        assert!(process.advance(0));
        assert_eq!(process.state(), ProcessState::Terminated);

        let view = process.snapshot();
        assert_eq!(view.executed, 2);
        assert_eq!(view.log.len(), 2);
        assert!(view.log[0].contains("Core:0"));
        assert!(view.log[0].contains("Hello world from p1!"));
    }

    #[test]
    fn terminated_is_absorbing() {
        let process = Process::new("p1", 1);
        process.run_on(0);
        process.advance(0);
        assert_eq!(process.state(), ProcessState::Terminated);

        process.set_state(ProcessState::Ready);
        assert_eq!(process.state(), ProcessState::Terminated);
        assert!(!process.advance(0));
        assert_eq!(process.snapshot().executed, 1);
    }

    #[test]
    fn executed_never_exceeds_total() {
        let process = Process::new("p1", 1);
        process.run_on(0);
        for _ in 0..5 {
            process.advance(0);
        }
        let view = process.snapshot();
        assert_eq!(view.executed, view.total);
        assert_eq!(view.log.len(), 1);
    }
}
