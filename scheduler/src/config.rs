use std::fs;
use std::num::NonZeroU32;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use rand::Rng;

use crate::{CorePolicy, Policy, SchedulerError};

pub const MAX_CORES: usize = 128;

/// Static configuration of the emulator.
///
/// Constructed once at startup, either from a config file in the
/// emulator's key-value format or directly, and passed by value into the
/// engine. There is no ambient global configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of simulated cores, 1..=128.
    pub num_cpu: usize,

    /// Scheduling discipline.
    pub policy: Policy,

    /// Round-robin quantum, in scheduler ticks. Ignored under FCFS.
    pub quantum_cycles: NonZeroU32,

    /// Seconds between submissions synthesized by the periodic submitter.
    pub batch_process_freq: u64,

    /// Inclusive bounds for the per-process instruction draw.
    pub min_ins: u32,
    pub max_ins: u32,

    /// Pacing delay per scheduler tick, in milliseconds. Zero means the
    /// loops spin freely.
    pub delay_per_exec: u64,
}

impl Config {
    /// Load and validate a config file.
    ///
    /// The format is whitespace-separated `key value` pairs with the keys
    /// `num-cpu`, `scheduler`, `quantum-cycles`, `batch-process-freq`,
    /// `min-ins`, `max-ins` and `delay-per-exec`, all required, in any
    /// order. Unknown keys are rejected.
    pub fn load(path: impl AsRef<Path>) -> Result<Config, SchedulerError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| SchedulerError::ConfigIo {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::parse(&contents)?;
        config.validate()?;
        Ok(config)
    }

    fn parse(contents: &str) -> Result<Config, SchedulerError> {
        let mut num_cpu = None;
        let mut policy = None;
        let mut quantum_cycles = None;
        let mut batch_process_freq = None;
        let mut min_ins = None;
        let mut max_ins = None;
        let mut delay_per_exec = None;

        let mut tokens = contents.split_whitespace();
        while let Some(key) = tokens.next() {
            let value = tokens
                .next()
                .ok_or_else(|| SchedulerError::MissingParameter(key.to_string()))?;
            match key {
                "num-cpu" => num_cpu = Some(parse_value(key, value)?),
                "scheduler" => policy = Some(Policy::from_str(value)?),
                "quantum-cycles" => quantum_cycles = Some(parse_value(key, value)?),
                "batch-process-freq" => batch_process_freq = Some(parse_value(key, value)?),
                "min-ins" => min_ins = Some(parse_value(key, value)?),
                "max-ins" => max_ins = Some(parse_value(key, value)?),
                "delay-per-exec" => delay_per_exec = Some(parse_value(key, value)?),
                other => return Err(SchedulerError::UnknownParameter(other.to_string())),
            }
        }

        Ok(Config {
            num_cpu: require("num-cpu", num_cpu)?,
            policy: require("scheduler", policy)?,
            quantum_cycles: require("quantum-cycles", quantum_cycles)?,
            batch_process_freq: require("batch-process-freq", batch_process_freq)?,
            min_ins: require("min-ins", min_ins)?,
            max_ins: require("max-ins", max_ins)?,
            delay_per_exec: require("delay-per-exec", delay_per_exec)?,
        })
    }

    /// Enforce the documented ranges. Called before any engine thread is
    /// spawned; a failure here prevents startup.
    pub fn validate(&self) -> Result<(), SchedulerError> {
        if self.num_cpu < 1 || self.num_cpu > MAX_CORES {
            return Err(SchedulerError::InvalidConfig(format!(
                "number of CPUs must be between 1 and {MAX_CORES}, got {}",
                self.num_cpu
            )));
        }
        if self.batch_process_freq < 1 {
            return Err(SchedulerError::InvalidConfig(
                "batch process frequency must be at least 1".to_string(),
            ));
        }
        if self.min_ins < 1 {
            return Err(SchedulerError::InvalidConfig(
                "minimum instructions must be at least 1".to_string(),
            ));
        }
        if self.max_ins < self.min_ins {
            return Err(SchedulerError::InvalidConfig(format!(
                "maximum instructions ({}) must not be below minimum ({})",
                self.max_ins, self.min_ins
            )));
        }
        Ok(())
    }

    /// The per-worker discipline implied by the configured policy.
    pub fn core_policy(&self) -> CorePolicy {
        match self.policy {
            Policy::Fcfs => CorePolicy::RunToCompletion,
            Policy::RoundRobin => CorePolicy::PreemptOnQuantum(self.quantum_cycles),
        }
    }

    /// One tick's pacing delay.
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.delay_per_exec)
    }

    /// Draw an instruction count uniformly from `[min_ins, max_ins]`.
    pub fn draw_instructions(&self) -> u32 {
        draw_instructions(self.min_ins, self.max_ins)
    }
}

/// Uniform draw from `[min_ins, max_ins]`, inclusive on both ends.
pub fn draw_instructions(min_ins: u32, max_ins: u32) -> u32 {
    rand::thread_rng().gen_range(min_ins..=max_ins)
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, SchedulerError> {
    value.parse().map_err(|_| SchedulerError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn require<T>(key: &str, value: Option<T>) -> Result<T, SchedulerError> {
    value.ok_or_else(|| SchedulerError::MissingParameter(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
num-cpu 4
scheduler rr
quantum-cycles 5
batch-process-freq 1
min-ins 100
max-ins 100
delay-per-exec 0
";

    #[test]
    fn parses_full_file() {
        let config = Config::parse(SAMPLE).unwrap();
        assert_eq!(config.num_cpu, 4);
        assert_eq!(config.policy, Policy::RoundRobin);
        assert_eq!(config.quantum_cycles.get(), 5);
        assert_eq!(config.batch_process_freq, 1);
        assert_eq!(config.min_ins, 100);
        assert_eq!(config.max_ins, 100);
        assert_eq!(config.delay_per_exec, 0);
        config.validate().unwrap();
    }

    #[test]
    fn rejects_unknown_key() {
        let err = Config::parse("num-cpu 4\nnice-level 3\n").unwrap_err();
        assert!(matches!(err, SchedulerError::UnknownParameter(key) if key == "nice-level"));
    }

    #[test]
    fn rejects_missing_key() {
        let err = Config::parse("num-cpu 4\n").unwrap_err();
        assert!(matches!(err, SchedulerError::MissingParameter(_)));
    }

    #[test]
    fn rejects_zero_quantum() {
        let bad = SAMPLE.replace("quantum-cycles 5", "quantum-cycles 0");
        let err = Config::parse(&bad).unwrap_err();
        assert!(matches!(
            err,
            SchedulerError::InvalidValue { key, .. } if key == "quantum-cycles"
        ));
    }

    #[test]
    fn validate_checks_ranges() {
        let mut config = Config::parse(SAMPLE).unwrap();
        config.num_cpu = 0;
        assert!(config.validate().is_err());

        let mut config = Config::parse(SAMPLE).unwrap();
        config.num_cpu = MAX_CORES + 1;
        assert!(config.validate().is_err());

        let mut config = Config::parse(SAMPLE).unwrap();
        config.max_ins = config.min_ins - 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn instruction_draw_stays_in_range() {
        let mut config = Config::parse(SAMPLE).unwrap();
        config.min_ins = 3;
        config.max_ins = 7;
        for _ in 0..200 {
            let drawn = config.draw_instructions();
            assert!((3..=7).contains(&drawn));
        }
    }

    #[test]
    fn core_policy_matches_discipline() {
        let mut config = Config::parse(SAMPLE).unwrap();
        assert!(matches!(
            config.core_policy(),
            CorePolicy::PreemptOnQuantum(q) if q.get() == 5
        ));
        config.policy = Policy::Fcfs;
        assert!(matches!(config.core_policy(), CorePolicy::RunToCompletion));
    }
}
