use std::sync::{Arc, Mutex};

use indexmap::IndexMap;

use crate::{Process, ProcessState, ProcessView, SchedulerError};

/// The set of all known processes, keyed by name.
///
/// Insertion-only: records persist after termination so reports can list
/// finished processes. Iteration follows insertion order.
pub struct ProcessTable {
    inner: Mutex<IndexMap<String, Arc<Process>>>,
}

impl ProcessTable {
    pub fn new() -> ProcessTable {
        ProcessTable {
            inner: Mutex::new(IndexMap::new()),
        }
    }

    /// Register a new process. Fails if the name is already taken,
    /// leaving the table unchanged.
    pub fn insert(&self, process: Process) -> Result<Arc<Process>, SchedulerError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.contains_key(process.name()) {
            return Err(SchedulerError::DuplicateName(process.name().to_string()));
        }
        let process = Arc::new(process);
        inner.insert(process.name().to_string(), process.clone());
        Ok(process)
    }

    pub fn get(&self, name: &str) -> Option<Arc<Process>> {
        self.inner.lock().unwrap().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.lock().unwrap().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }

    /// Views of all terminated processes, in insertion order.
    pub fn terminated_views(&self) -> Vec<ProcessView> {
        let processes: Vec<Arc<Process>> =
            self.inner.lock().unwrap().values().cloned().collect();
        processes
            .iter()
            .map(|p| p.snapshot())
            .filter(|v| v.state == ProcessState::Terminated)
            .collect()
    }
}

impl Default for ProcessTable {
    fn default() -> Self {
        Self::new()
    }
}
