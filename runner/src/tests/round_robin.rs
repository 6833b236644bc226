use std::time::Duration;

use pretty_assertions::assert_eq;

use engine::Engine;
use scheduler::{Policy, ProcessState};

use super::{config, wait_for, wait_until_terminated};

/// Quantum-2 round robin on one core alternates two 5-instruction
/// processes in blocks of two: neither process ever gets more than one
/// quantum ahead of the other, and the first submission finishes first.
#[test]
fn quantum_bounds_the_lead() {
    let mut engine = Engine::start(config(Policy::RoundRobin, 1, 2, 5, 20)).unwrap();
    engine.submit("a").unwrap();
    engine.submit("b").unwrap();

    let mut a_finished_first = false;
    let done = wait_for(Duration::from_secs(60), || {
        let a = engine.snapshot("a").unwrap();
        let b = engine.snapshot("b").unwrap();
        if !a.is_terminated() && !b.is_terminated() {
            let lead = (a.executed as i64 - b.executed as i64).abs();
            assert!(lead <= 2, "lead {lead} exceeds the quantum");
        }
        if a.is_terminated() && !b.is_terminated() {
            a_finished_first = true;
        }
        a.is_terminated() && b.is_terminated()
    });
    assert!(done, "processes did not terminate in time");
    assert!(a_finished_first, "a should terminate one quantum before b");

    let a = engine.snapshot("a").unwrap();
    let b = engine.snapshot("b").unwrap();
    assert_eq!(a.log.len(), 5);
    assert_eq!(b.log.len(), 5);

    engine.shutdown();
}

/// With an empty ready queue the quantum check is skipped and a lone
/// process keeps its core past the quantum instead of bouncing through the
/// queue.
#[test]
fn lone_process_runs_past_its_quantum() {
    let mut engine = Engine::start(config(Policy::RoundRobin, 1, 2, 12, 5)).unwrap();
    engine.submit("solo").unwrap();

    let mut saw_running = false;
    let done = wait_for(Duration::from_secs(30), || {
        let view = engine.snapshot("solo").unwrap();
        if view.state == ProcessState::Running {
            saw_running = true;
        }
        if saw_running {
            assert_ne!(
                view.state,
                ProcessState::Ready,
                "lone process was preempted with nothing else to run"
            );
        }
        view.is_terminated()
    });
    assert!(done, "process did not terminate in time");

    let view = engine.snapshot("solo").unwrap();
    assert_eq!(view.executed, 12);
    assert_eq!(view.log.len(), 12);

    engine.shutdown();
}

/// A preempted process goes to the back of the queue and still finishes
/// with exactly its own instructions, no more.
#[test]
fn preempted_processes_finish_exactly() {
    let mut engine = Engine::start(config(Policy::RoundRobin, 1, 1, 4, 5)).unwrap();
    for name in ["a", "b", "c"] {
        engine.submit(name).unwrap();
    }

    wait_until_terminated(&engine, &["a", "b", "c"]);
    for name in ["a", "b", "c"] {
        let view = engine.snapshot(name).unwrap();
        assert_eq!(view.executed, 4);
        assert_eq!(view.log.len(), 4);
        assert_eq!(view.state, ProcessState::Terminated);
    }

    engine.shutdown();
}

/// Ready-queue entries are always in the READY state (never terminated),
/// and after shutdown nothing sits both in the queue and on a core.
#[test]
fn ready_queue_holds_only_ready_processes() {
    let mut engine = Engine::start(config(Policy::RoundRobin, 2, 1, 30, 10)).unwrap();
    for name in ["a", "b", "c", "d", "e"] {
        engine.submit(name).unwrap();
    }

    for _ in 0..50 {
        for name in engine.list_ready() {
            let view = engine.snapshot(&name).unwrap();
            // A name read from the queue may have been dispatched between
            // the two reads, but it can never be terminated while queued.
            assert_ne!(view.state, ProcessState::Terminated, "{name} queued after terminating");
        }
        std::thread::sleep(Duration::from_millis(2));
    }

    engine.shutdown();

    let queued = engine.list_ready();
    for name in &queued {
        assert_eq!(
            engine.snapshot(name).unwrap().state,
            ProcessState::Ready,
            "{name} queued in a non-ready state"
        );
    }
    let running: Vec<String> = engine
        .list_running()
        .into_iter()
        .map(|(_, view)| view.name)
        .collect();
    for name in &queued {
        assert!(
            !running.contains(name),
            "{name} is queued and on a core at once"
        );
    }
}
