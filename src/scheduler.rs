//! Periodic generation scheduling.
//!
//! Runs generation batches on a fixed interval in a background worker with
//! an explicit state machine:
//!
//! ```text
//! Idle ──tick──▶ Running ──batch done──▶ Idle
//!   │                                      │
//!   └──────────── Stop command ────────────┘
//!                      │
//!                      ▼
//!                  Stopping ──ack──▶ Stopped
//! ```
//!
//! Control flows over an mpsc command channel; the worker wakes either on a
//! command or on the interval timeout, so a stop request never waits for the
//! next tick. Stopping is cooperative: a running batch finishes first, and
//! `stop` detaches after a fixed timeout rather than blocking forever.
//!
//! Nothing serializes this worker against a `karang generate` run in a
//! second process; both would race on the processed-subjects file.

use crate::{config::GeneratorConfig, generate::Generator, log};
use anyhow::Result;
use std::{
    sync::mpsc::{self, Receiver, RecvTimeoutError, Sender},
    thread::{self, JoinHandle},
    time::Duration,
};

/// How long `stop` waits for the worker to acknowledge before detaching
const STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// How long a status query waits before concluding the worker is mid-batch
const STATUS_TIMEOUT: Duration = Duration::from_secs(1);

/// Worker lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    Stopping,
    Stopped,
}

enum Command {
    Status(Sender<SchedulerState>),
    Stop,
}

/// Handle to a running periodic worker.
pub struct Scheduler {
    commands: Sender<Command>,
    ack: Receiver<()>,
    worker: Option<JoinHandle<()>>,
}

impl Scheduler {
    /// Spawn the periodic worker. The first batch runs after one interval.
    ///
    /// Each tick constructs a fresh [`Generator`] so edits to the subject
    /// list and config-managed state files are picked up between batches.
    pub fn start(config: GeneratorConfig) -> Self {
        let interval = Duration::from_secs(config.schedule_interval_minutes * 60);
        let (command_tx, command_rx) = mpsc::channel();
        let (ack_tx, ack_rx) = mpsc::channel();

        let worker = thread::spawn(move || {
            Worker::new(config, interval).run(command_rx, ack_tx);
        });

        Self {
            commands: command_tx,
            ack: ack_rx,
            worker: Some(worker),
        }
    }

    /// Query the worker state.
    ///
    /// A worker that is mid-batch cannot answer until the batch finishes;
    /// that case reports [`SchedulerState::Running`]. A closed channel means
    /// the worker is gone.
    pub fn state(&self) -> SchedulerState {
        let (reply_tx, reply_rx) = mpsc::channel();
        if self.commands.send(Command::Status(reply_tx)).is_err() {
            return SchedulerState::Stopped;
        }
        reply_rx
            .recv_timeout(STATUS_TIMEOUT)
            .unwrap_or(SchedulerState::Running)
    }

    /// Cooperative stop: send the command, wait for the acknowledgement
    /// under a fixed timeout, then join best-effort. A worker stuck in a
    /// long batch is detached rather than waited on.
    pub fn stop(mut self) {
        if self.commands.send(Command::Stop).is_err() {
            // worker already exited
            return;
        }
        match self.ack.recv_timeout(STOP_TIMEOUT) {
            Ok(()) => {
                if let Some(handle) = self.worker.take() {
                    handle.join().ok();
                }
            }
            Err(_) => log!("schedule"; "worker did not stop in time, detaching"),
        }
    }
}

/// Worker-side state machine.
struct Worker {
    config: GeneratorConfig,
    interval: Duration,
    state: SchedulerState,
}

impl Worker {
    fn new(config: GeneratorConfig, interval: Duration) -> Self {
        Self {
            config,
            interval,
            state: SchedulerState::Idle,
        }
    }

    fn run(mut self, commands: Receiver<Command>, ack: Sender<()>) {
        log!("schedule"; "started, interval {}m", self.interval.as_secs() / 60);

        loop {
            match commands.recv_timeout(self.interval) {
                Ok(Command::Status(reply)) => {
                    reply.send(self.state).ok();
                }
                Ok(Command::Stop) => {
                    self.state = SchedulerState::Stopping;
                    break;
                }
                Err(RecvTimeoutError::Timeout) => self.tick(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        self.state = SchedulerState::Stopped;
        ack.send(()).ok();
        log!("schedule"; "stopped");
    }

    fn tick(&mut self) {
        self.state = SchedulerState::Running;
        if let Err(err) = run_batch(&self.config) {
            log!("error"; "scheduled batch failed: {err:#}");
        }
        self.state = SchedulerState::Idle;
    }
}

fn run_batch(config: &GeneratorConfig) -> Result<()> {
    let mut generator = Generator::new(config.clone())?;
    generator.run(None)?;
    Ok(())
}

/// Run the scheduler until Ctrl+C.
pub fn run_blocking(config: GeneratorConfig) -> Result<()> {
    let scheduler = Scheduler::start(config);

    let (signal_tx, signal_rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        signal_tx.send(()).ok();
    })?;

    signal_rx.recv().ok();
    log!("schedule"; "shutting down...");
    scheduler.stop();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idle_config() -> GeneratorConfig {
        // interval long enough that no tick fires during the test
        let mut config = GeneratorConfig::default();
        config.schedule_interval_minutes = 60;
        config
    }

    #[test]
    fn test_starts_idle() {
        let scheduler = Scheduler::start(idle_config());
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        scheduler.stop();
    }

    #[test]
    fn test_stop_completes_promptly() {
        let scheduler = Scheduler::start(idle_config());
        let started = std::time::Instant::now();
        scheduler.stop();
        assert!(started.elapsed() < STOP_TIMEOUT);
    }

    #[test]
    fn test_state_after_stop_is_stopped() {
        let mut scheduler = Scheduler::start(idle_config());
        scheduler.commands.send(Command::Stop).unwrap();
        scheduler.ack.recv_timeout(STOP_TIMEOUT).unwrap();
        scheduler.worker.take().unwrap().join().unwrap();
        // worker exited; the command channel is closed
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
    }
}
