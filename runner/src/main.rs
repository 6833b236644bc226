//! Interactive shell around the scheduling engine.
//!
//! Thin I/O layer: reads line commands, renders the engine's structured
//! views and writes the utilization report. All scheduling behavior lives
//! in the `engine` and `scheduler` crates.

use std::io::{self, BufRead, Write};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use engine::Engine;
use scheduler::Config;

mod report;

#[cfg(test)]
mod tests;

#[derive(Parser)]
#[command(name = "runner", about = "A CPU scheduling emulator")]
struct Args {
    /// Path to the scheduler configuration file.
    #[arg(long, default_value = "config.txt")]
    config: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let stdin = io::stdin();
    let mut engine: Option<Engine> = None;

    clear_screen();
    loop {
        let Some(line) = prompt(&stdin, "\nEnter a command: ") else {
            break;
        };
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some(&command) = words.first() else {
            continue;
        };

        match command {
            "exit" => {
                if let Some(mut engine) = engine.take() {
                    engine.shutdown();
                }
                println!("Exiting program.");
                break;
            }
            "initialize" => initialize(&args.config, &mut engine),
            _ if engine.is_none() => println!("You must initialize first."),
            "screen" => screen_command(engine.as_mut().unwrap(), &words, &stdin),
            "scheduler-start" => {
                if engine.as_mut().unwrap().start_feeder() {
                    println!("Starting process generation.");
                } else {
                    println!("Scheduler is already running.");
                }
            }
            "scheduler-stop" => {
                if engine.as_mut().unwrap().stop_feeder() {
                    println!("Stopping process generation.");
                } else {
                    println!("Scheduler is not running.");
                }
            }
            "report-util" => match report::write_report(engine.as_ref().unwrap(), "report.txt") {
                Ok(()) => println!("Report successfully generated."),
                Err(err) => println!("Could not write report: {err}"),
            },
            "clear" => clear_screen(),
            other => println!("{other} is not a recognized command."),
        }
    }
}

fn initialize(path: &str, engine: &mut Option<Engine>) {
    if engine.is_some() {
        println!("Already initialized.");
        return;
    }
    let config = match Config::load(path) {
        Ok(config) => config,
        Err(err) => {
            println!("Configuration error: {err}");
            return;
        }
    };

    println!("Configuration values:");
    println!("  num-cpu: {}", config.num_cpu);
    println!("  scheduler: {}", config.policy);
    println!("  quantum-cycles: {}", config.quantum_cycles);
    println!("  batch-process-freq: {}", config.batch_process_freq);
    println!("  min-ins: {}", config.min_ins);
    println!("  max-ins: {}", config.max_ins);
    println!("  delay-per-exec: {}", config.delay_per_exec);

    match Engine::start(config) {
        Ok(started) => {
            *engine = Some(started);
            println!("Set config successfully.");
        }
        Err(err) => println!("Failed to start the engine: {err}"),
    }
}

fn screen_command(engine: &mut Engine, words: &[&str], stdin: &io::Stdin) {
    match words {
        ["screen", "-ls"] => print!("{}", report::render_status(engine)),
        ["screen", "-s", name] => {
            match engine.submit(name) {
                Ok(()) => screen_loop(engine, name, stdin),
                Err(err) => println!("{err}"),
            }
        }
        ["screen", "-r", name] => {
            if engine.exists(name) {
                screen_loop(engine, name, stdin);
            } else {
                println!("Process [{name}] does not exist.");
            }
        }
        _ => println!("Invalid screen command. Please provide -ls, or -r/-s and a name."),
    }
}

/// Per-process sub-shell: `process-smi` shows the process and its log,
/// `exit` returns to the main prompt, anything else is echoed back.
fn screen_loop(engine: &Engine, name: &str, stdin: &io::Stdin) {
    loop {
        let Some(line) = prompt(stdin, &format!("{name} << Enter a command: ")) else {
            return;
        };
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            [] => continue,
            ["exit"] => {
                clear_screen();
                return;
            }
            ["process-smi"] => match engine.snapshot(name) {
                Ok(view) => print!("{}", report::render_process(&view)),
                Err(err) => println!("{err}"),
            },
            echoed => {
                println!("echo: {}", echoed.join(" "));
            }
        }
    }
}

fn prompt(stdin: &io::Stdin, text: &str) -> Option<String> {
    print!("{text}");
    io::stdout().flush().ok()?;
    let mut line = String::new();
    match stdin.lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line),
    }
}

fn clear_screen() {
    print!("\x1B[2J\x1B[1;1H");
    println!("Welcome to the CPU scheduling emulator!");
}
