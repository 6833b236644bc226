use std::sync::Mutex;

/// Per-core process assignments.
///
/// One entry per simulated core holding the name of the occupying process,
/// if any. The dispatcher is the only writer; each core worker reads its own
/// slot. Names are identifiers resolved through the process table, never
/// direct references.
pub struct CoreSlots {
    inner: Mutex<Vec<Option<String>>>,
}

impl CoreSlots {
    pub fn new(cores: usize) -> CoreSlots {
        CoreSlots {
            inner: Mutex::new(vec![None; cores]),
        }
    }

    pub fn cores(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn get(&self, core: usize) -> Option<String> {
        self.inner.lock().unwrap()[core].clone()
    }

    /// Assign `name` to `core`.
    ///
    /// Any other slot still naming the same process (stale after a
    /// preemption) is cleared in the same critical section, so a process is
    /// never owned by two cores at once.
    pub fn assign(&self, core: usize, name: &str) {
        let mut inner = self.inner.lock().unwrap();
        for slot in inner.iter_mut() {
            if slot.as_deref() == Some(name) {
                *slot = None;
            }
        }
        inner[core] = Some(name.to_string());
    }

    pub fn clear(&self, core: usize) {
        self.inner.lock().unwrap()[core] = None;
    }

    /// Occupied slots as `(core index, process name)`, ascending by core.
    pub fn occupied(&self) -> Vec<(usize, String)> {
        self.inner
            .lock()
            .unwrap()
            .iter()
            .enumerate()
            .filter_map(|(core, slot)| slot.clone().map(|name| (core, name)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_and_clear() {
        let slots = CoreSlots::new(2);
        assert_eq!(slots.get(0), None);
        slots.assign(0, "a");
        assert_eq!(slots.get(0).as_deref(), Some("a"));
        slots.clear(0);
        assert_eq!(slots.get(0), None);
    }

    #[test]
    fn assign_evicts_stale_slot() {
        let slots = CoreSlots::new(3);
        slots.assign(0, "a");
        slots.assign(2, "a");
        assert_eq!(slots.get(0), None);
        assert_eq!(slots.get(2).as_deref(), Some("a"));
        assert_eq!(slots.occupied(), vec![(2, "a".to_string())]);
    }

    #[test]
    fn occupied_is_ordered_by_core() {
        let slots = CoreSlots::new(3);
        slots.assign(2, "c");
        slots.assign(0, "a");
        assert_eq!(
            slots.occupied(),
            vec![(0, "a".to_string()), (2, "c".to_string())]
        );
    }
}
