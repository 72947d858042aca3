//! Console operator: Ctrl-C and stdin lines become abort/resume signals,
//! display calls go to stderr.

use std::io::BufRead;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use pour_core::PollTimer;
use pour_traits::{Reporter, Signal, SignalSource};

const REMIND_EVERY: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorInput {
    Continue,
    Abort,
}

pub fn parse_line(line: &str) -> OperatorInput {
    match line.trim().to_ascii_lowercase().as_str() {
        "a" | "abort" | "q" | "quit" | "stop" => OperatorInput::Abort,
        _ => OperatorInput::Continue,
    }
}

/// Forward stdin lines from a background thread. The channel disconnects on
/// EOF, which the waits treat as an abort.
pub fn spawn_stdin_reader() -> Receiver<OperatorInput> {
    let (tx, rx) = crossbeam_channel::unbounded();
    let spawned = std::thread::Builder::new()
        .name("operator-input".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(parse_line(&line)).is_err() {
                    break;
                }
            }
            tracing::debug!("operator input closed");
        });
    if let Err(e) = spawned {
        tracing::warn!(error = %e, "failed to start operator input thread");
    }
    rx
}

pub struct ConsoleSignals {
    abort: Arc<AtomicBool>,
    input: Receiver<OperatorInput>,
    poll: Duration,
}

impl ConsoleSignals {
    pub fn new(abort: Arc<AtomicBool>, input: Receiver<OperatorInput>, poll: Duration) -> Self {
        Self {
            abort,
            input,
            poll: poll.max(Duration::from_millis(1)),
        }
    }

    /// Consume lines typed ahead; an `abort` among them latches the flag.
    fn drain(&mut self) {
        while let Ok(input) = self.input.try_recv() {
            if input == OperatorInput::Abort {
                self.abort.store(true, Ordering::SeqCst);
            }
        }
    }

    fn wait_for_operator(&mut self, what: &str) -> Signal {
        self.drain();
        eprintln!("{what}: press Enter to continue, type 'abort' to stop");
        let mut reminder = PollTimer::new(Instant::now());
        loop {
            if self.abort.load(Ordering::SeqCst) {
                return Signal::Aborted;
            }
            match self.input.recv_timeout(self.poll) {
                Ok(OperatorInput::Continue) => return Signal::Proceed,
                Ok(OperatorInput::Abort) => {
                    self.abort.store(true, Ordering::SeqCst);
                    return Signal::Aborted;
                }
                Err(RecvTimeoutError::Timeout) => {
                    if reminder.has_elapsed(Instant::now(), REMIND_EVERY) {
                        tracing::info!(waiting_for = what, "still waiting on operator");
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::warn!(waiting_for = what, "no operator input available");
                    return Signal::Aborted;
                }
            }
        }
    }
}

impl SignalSource for ConsoleSignals {
    fn is_abort_requested(&mut self) -> bool {
        self.drain();
        self.abort.load(Ordering::SeqCst)
    }

    fn wait_for_cup_present(&mut self) -> Signal {
        self.wait_for_operator("place a cup on the scale")
    }

    fn wait_for_resume(&mut self) -> Signal {
        self.wait_for_operator("replace the bottle")
    }
}

/// Status lines for the operator on stderr; stdout is kept for results.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn message(&mut self, msg: &str) {
        tracing::debug!(target: "pour::display", "{msg}");
        eprintln!("{msg}");
    }

    fn error(&mut self, msg: &str) {
        tracing::warn!(target: "pour::display", "{msg}");
        eprintln!("! {msg}");
    }

    fn clear_error(&mut self) {
        tracing::debug!(target: "pour::display", "fault cleared");
    }
}
