//! Text rendering of the engine's structured views.
//!
//! The engine hands out [`ProcessView`] values; everything string-shaped
//! happens here, in the collaborator, not in the core.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

use engine::Engine;
use scheduler::{ProcessView, TIMESTAMP_FORMAT};

/// The `screen -ls` / `report-util` rendering: utilization summary plus the
/// running and finished process tables.
pub fn render_status(engine: &Engine) -> String {
    let (busy, total) = engine.utilization();
    let mut out = String::new();

    let _ = writeln!(out, "CPU: {}%", busy * 100 / total);
    let _ = writeln!(out, "Cores used: {busy}");
    let _ = writeln!(out, "Cores available: {}", total - busy);
    let _ = writeln!(out, "--------------------------------------");

    let _ = writeln!(out, "Running processes:");
    for (core, view) in engine.list_running() {
        let _ = writeln!(
            out,
            "{}\t{}\tCore:{core}\t{} / {}",
            view.name,
            view.created_at.format(TIMESTAMP_FORMAT),
            view.executed,
            view.total
        );
    }

    let _ = writeln!(out, "\nFinished processes:");
    for view in engine.list_terminated() {
        let _ = writeln!(
            out,
            "{}\t{}\tFinished\t{} / {}",
            view.name,
            view.created_at.format(TIMESTAMP_FORMAT),
            view.executed,
            view.total
        );
    }
    let _ = writeln!(out, "--------------------------------------");

    out
}

/// The `process-smi` rendering for a single process.
pub fn render_process(view: &ProcessView) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Process name: {}", view.name);
    let _ = writeln!(
        out,
        "Date created: {}",
        view.created_at.format(TIMESTAMP_FORMAT)
    );
    let _ = writeln!(out, "Current instruction line: {}", view.executed);
    let _ = writeln!(out, "Lines of code: {}", view.total);
    let _ = writeln!(out, "\nLogs:");
    for entry in &view.log {
        let _ = writeln!(out, "{entry}");
    }
    if view.is_terminated() {
        let _ = writeln!(out, "Finished!");
    }

    out
}

/// Write the status rendering to `path`.
pub fn write_report(engine: &Engine, path: impl AsRef<Path>) -> io::Result<()> {
    fs::write(path, render_status(engine))
}
