use std::num::NonZeroU32;
use std::time::{Duration, Instant};

use engine::Engine;
use scheduler::{Config, Policy};

mod round_robin;

/// Fixed-length instruction draws (`min == max`) keep the scenarios
/// deterministic.
fn config(policy: Policy, num_cpu: usize, quantum: u32, ins: u32, delay_ms: u64) -> Config {
    Config {
        num_cpu,
        policy,
        quantum_cycles: NonZeroU32::new(quantum).unwrap(),
        batch_process_freq: 1,
        min_ins: ins,
        max_ins: ins,
        delay_per_exec: delay_ms,
    }
}

/// Poll `condition` every millisecond until it holds or `timeout` passes.
fn wait_for(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    condition()
}

fn wait_until_terminated(engine: &Engine, names: &[&str]) {
    let done = wait_for(Duration::from_secs(30), || {
        names
            .iter()
            .all(|name| engine.snapshot(name).unwrap().is_terminated())
    });
    assert!(done, "processes {names:?} did not terminate in time");
}
