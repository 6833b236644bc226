//! A scheduling engine.
//!
//! This runs the data model from the [`scheduler`] crate on real threads:
//! one dispatcher, one worker per simulated core and an optional periodic
//! submitter, all paced by a fixed tick delay and stopped cooperatively
//! through a shared flag.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

use scheduler::{
    Config, CorePolicy, CoreSlots, Process, ProcessState, ProcessTable, ProcessView, ReadyQueue,
    SchedulerError,
};

/// State shared between the dispatcher, the core workers and the façade.
struct Shared {
    table: ProcessTable,
    ready: ReadyQueue,
    slots: CoreSlots,
    running: AtomicBool,
    tick: Duration,
}

impl Shared {
    /// Resolve a name recorded in a slot or in the ready queue.
    ///
    /// Both structures only ever hold names of table-registered processes;
    /// a miss means a broken invariant, and a loop that kept going would
    /// just idle a core forever.
    fn resolve(&self, name: &str, context: &str) -> Arc<Process> {
        match self.table.get(name) {
            Some(process) => process,
            None => panic!("{context} references unknown process {name}"),
        }
    }
}

/// The scheduling engine.
///
/// Spawned threads run until [`Engine::shutdown`], which is also invoked on
/// drop. All query operations return owned snapshots so callers never hold
/// engine locks.
///
/// ## Example
///
/// ```rust
/// use std::num::NonZeroU32;
/// use engine::Engine;
/// use scheduler::{Config, Policy};
///
/// let config = Config {
///     num_cpu: 2,
///     policy: Policy::RoundRobin,
///     quantum_cycles: NonZeroU32::new(4).unwrap(),
///     batch_process_freq: 1,
///     min_ins: 5,
///     max_ins: 10,
///     delay_per_exec: 0,
/// };
/// let mut engine = Engine::start(config).unwrap();
/// engine.submit("p01").unwrap();
/// engine.shutdown();
/// ```
pub struct Engine {
    config: Config,
    shared: Arc<Shared>,
    feeding: Arc<AtomicBool>,
    auto_counter: Arc<AtomicUsize>,
    threads: Vec<JoinHandle<()>>,
    feeder: Option<JoinHandle<()>>,
}

impl Engine {
    /// Validate `config` and start the dispatcher and one worker per core.
    pub fn start(config: Config) -> Result<Engine, SchedulerError> {
        config.validate()?;

        let shared = Arc::new(Shared {
            table: ProcessTable::new(),
            ready: ReadyQueue::new(),
            slots: CoreSlots::new(config.num_cpu),
            running: AtomicBool::new(true),
            tick: config.tick(),
        });

        let mut threads = Vec::with_capacity(config.num_cpu + 1);

        {
            let shared = shared.clone();
            threads.push(
                thread::Builder::new()
                    .name("dispatcher".to_string())
                    .spawn(move || dispatch_loop(&shared))?,
            );
        }

        let policy = config.core_policy();
        for core in 0..config.num_cpu {
            let shared = shared.clone();
            threads.push(
                thread::Builder::new()
                    .name(format!("core-{core}"))
                    .spawn(move || worker_loop(&shared, core, policy))?,
            );
        }

        info!(
            cores = config.num_cpu,
            policy = %config.policy,
            quantum = config.quantum_cycles.get(),
            delay_ms = config.delay_per_exec,
            "engine started"
        );

        Ok(Engine {
            config,
            shared,
            feeding: Arc::new(AtomicBool::new(false)),
            auto_counter: Arc::new(AtomicUsize::new(0)),
            threads,
            feeder: None,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Create a process, register it and enqueue it as ready.
    ///
    /// The instruction count is drawn uniformly from the configured range.
    /// Fails if the name is already taken; nothing changes in that case.
    pub fn submit(&self, name: &str) -> Result<(), SchedulerError> {
        self.submit_with_range(name, self.config.min_ins, self.config.max_ins)
    }

    /// [`Engine::submit`] with an explicit `[min, max]` instruction range.
    pub fn submit_with_range(
        &self,
        name: &str,
        min_ins: u32,
        max_ins: u32,
    ) -> Result<(), SchedulerError> {
        if min_ins < 1 || max_ins < min_ins {
            return Err(SchedulerError::InvalidConfig(format!(
                "invalid instruction range [{min_ins}, {max_ins}]"
            )));
        }
        let total = scheduler::draw_instructions(min_ins, max_ins);
        let process = self.shared.table.insert(Process::new(name, total))?;
        debug!(process = %name, instructions = process.total_instructions(), "submitted");
        self.shared.ready.push(name.to_string());
        Ok(())
    }

    pub fn exists(&self, name: &str) -> bool {
        self.shared.table.contains(name)
    }

    /// Read-only copy of one process.
    pub fn snapshot(&self, name: &str) -> Result<ProcessView, SchedulerError> {
        self.shared
            .table
            .get(name)
            .map(|process| process.snapshot())
            .ok_or_else(|| SchedulerError::NotFound(name.to_string()))
    }

    /// Processes currently running on a core, ascending by core index.
    pub fn list_running(&self) -> Vec<(usize, ProcessView)> {
        self.shared
            .slots
            .occupied()
            .into_iter()
            .filter_map(|(core, name)| {
                let view = self.shared.table.get(&name)?.snapshot();
                (view.state == ProcessState::Running).then_some((core, view))
            })
            .collect()
    }

    /// Terminated processes, in submission order.
    pub fn list_terminated(&self) -> Vec<ProcessView> {
        self.shared.table.terminated_views()
    }

    /// Names waiting in the ready queue, front first.
    pub fn list_ready(&self) -> Vec<String> {
        self.shared.ready.names()
    }

    /// `(busy cores, total cores)`.
    pub fn utilization(&self) -> (usize, usize) {
        (self.list_running().len(), self.config.num_cpu)
    }

    /// Start the periodic submitter, which synthesizes a new process every
    /// `batch_process_freq` seconds. Returns `false` if it is already on.
    pub fn start_feeder(&mut self) -> bool {
        if self.feeding.swap(true, Ordering::SeqCst) {
            return false;
        }

        let interval = Duration::from_secs(self.config.batch_process_freq);
        let shared = self.shared.clone();
        let feeding = self.feeding.clone();
        let counter = self.auto_counter.clone();
        let (min_ins, max_ins) = (self.config.min_ins, self.config.max_ins);

        let handle = thread::Builder::new()
            .name("feeder".to_string())
            .spawn(move || {
                info!(interval_s = interval.as_secs(), "feeder started");
                while feeding.load(Ordering::SeqCst) && shared.running.load(Ordering::SeqCst) {
                    thread::sleep(interval);
                    if !feeding.load(Ordering::SeqCst) || !shared.running.load(Ordering::SeqCst) {
                        break;
                    }
                    let name = format!("Process_{}", counter.fetch_add(1, Ordering::SeqCst));
                    let total = scheduler::draw_instructions(min_ins, max_ins);
                    match shared.table.insert(Process::new(&name, total)) {
                        Ok(_) => shared.ready.push(name),
                        // Counter names are unique by construction.
                        Err(err) => warn!(%err, "feeder submission rejected"),
                    }
                }
                info!("feeder stopped");
            });

        match handle {
            Ok(handle) => {
                self.feeder = Some(handle);
                true
            }
            Err(err) => {
                warn!(%err, "could not spawn feeder");
                self.feeding.store(false, Ordering::SeqCst);
                false
            }
        }
    }

    /// Stop the periodic submitter and wait for it to exit. Returns `false`
    /// if it was not running.
    pub fn stop_feeder(&mut self) -> bool {
        if !self.feeding.swap(false, Ordering::SeqCst) {
            return false;
        }
        if let Some(handle) = self.feeder.take() {
            let _ = handle.join();
        }
        true
    }

    /// Signal every loop to stop after its current tick and wait for all of
    /// them. No worker is interrupted mid-advance, so logs are never torn;
    /// once this returns, no further log entries are appended. Idempotent.
    pub fn shutdown(&mut self) {
        if !self.shared.running.swap(false, Ordering::SeqCst) {
            return;
        }
        self.stop_feeder();
        for handle in self.threads.drain(..) {
            let _ = handle.join();
        }
        info!("engine stopped");
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// The manager loop: each tick, refill every slot whose process is gone or
/// no longer running, servicing cores in ascending index order.
fn dispatch_loop(shared: &Shared) {
    while shared.running.load(Ordering::SeqCst) {
        for core in 0..shared.slots.cores() {
            let healthy = match shared.slots.get(core) {
                Some(name) => {
                    shared.resolve(&name, "core slot").state() == ProcessState::Running
                }
                None => false,
            };
            if healthy {
                continue;
            }

            match shared.ready.pop() {
                Some(next) => {
                    let process = shared.resolve(&next, "ready queue");
                    // Clear any stale slot first, then flip the state; the
                    // old core must not see the process RUNNING again.
                    shared.slots.assign(core, &next);
                    process.run_on(core);
                    debug!(core, process = %next, "dispatched");
                }
                None => shared.slots.clear(core),
            }
        }
        thread::sleep(shared.tick);
    }
}

/// One core's execution loop, shared by both disciplines.
///
/// The quantum counter is local to the core and resets whenever the slot's
/// occupant changes or the occupant is requeued.
fn worker_loop(shared: &Shared, core: usize, policy: CorePolicy) {
    let mut counter: u32 = 0;
    let mut occupant: Option<String> = None;

    while shared.running.load(Ordering::SeqCst) {
        let Some(name) = shared.slots.get(core) else {
            counter = 0;
            occupant = None;
            thread::sleep(shared.tick);
            continue;
        };
        if occupant.as_deref() != Some(name.as_str()) {
            counter = 0;
            occupant = Some(name.clone());
        }

        let process = shared.resolve(&name, "core slot");
        if process.state() == ProcessState::Terminated {
            counter = 0;
            thread::sleep(shared.tick);
            continue;
        }

        if let CorePolicy::PreemptOnQuantum(quantum) = policy {
            // Preemption is skipped while the ready queue is empty: with no
            // other work waiting, the process keeps the core past its
            // quantum. Documented trade-off of the emulated machine.
            if counter >= quantum.get() && !shared.ready.is_empty() {
                if process.running_on(core) {
                    process.set_state(ProcessState::Ready);
                    shared.ready.push(name.clone());
                    debug!(core, process = %name, "quantum expired, requeued");
                }
                counter = 0;
                thread::sleep(shared.tick);
                continue;
            }
        }

        if process.advance(core) {
            counter += 1;
            if process.state() == ProcessState::Terminated {
                debug!(core, process = %name, "terminated");
            }
        }
        thread::sleep(shared.tick);
    }
}
