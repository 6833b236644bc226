use std::fmt::{self, Display};
use std::num::NonZeroU32;
use std::str::FromStr;

use crate::SchedulerError;

/// The configured scheduling discipline.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Policy {
    /// First-come-first-served: non-preemptive, run to completion.
    Fcfs,

    /// Round-robin with a fixed time quantum.
    RoundRobin,
}

impl Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Fcfs => write!(f, "fcfs"),
            Policy::RoundRobin => write!(f, "rr"),
        }
    }
}

impl FromStr for Policy {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Policy, SchedulerError> {
        match s {
            "fcfs" => Ok(Policy::Fcfs),
            "rr" => Ok(Policy::RoundRobin),
            other => Err(SchedulerError::InvalidValue {
                key: "scheduler".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// What a core worker does when its process has used up a quantum.
///
/// Both disciplines share one worker loop; they differ only at the
/// preemption check.
#[derive(Copy, Clone, Debug)]
pub enum CorePolicy {
    /// Never preempt; the slot frees only when the process terminates.
    RunToCompletion,

    /// After this many ticks, return an unfinished process to the back of
    /// the ready queue.
    PreemptOnQuantum(NonZeroU32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_policies() {
        assert_eq!("fcfs".parse::<Policy>().unwrap(), Policy::Fcfs);
        assert_eq!("rr".parse::<Policy>().unwrap(), Policy::RoundRobin);
    }

    #[test]
    fn rejects_unknown_policy() {
        let err = "sjf".parse::<Policy>().unwrap_err();
        assert!(matches!(
            err,
            SchedulerError::InvalidValue { key, value } if key == "scheduler" && value == "sjf"
        ));
    }
}
