//! Recording mocks shared by the pour_core integration tests.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use pour_core::{Bottle, PourCore, PourSettings, ServoRange, build_pour_core};
use pour_traits::{Actuator, BoxError, ManualClock, Reporter, Sample, Scale, Signal, SignalSource};

pub const POS_DOWN: i32 = 1200;
pub const POS_UP: i32 = 1800;
pub const PAUSE: i32 = 1500;
pub const BELOW_PAUSE: i32 = 1350;

/// Servo that records every commanded position.
pub struct TestServo {
    pub pos: Rc<Cell<i32>>,
    pub moves: Rc<RefCell<Vec<i32>>>,
}

impl TestServo {
    pub fn at(initial: i32) -> Self {
        Self {
            pos: Rc::new(Cell::new(initial)),
            moves: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl Actuator for TestServo {
    fn set_position(&mut self, units: i32) -> Result<(), BoxError> {
        self.pos.set(units);
        self.moves.borrow_mut().push(units);
        Ok(())
    }

    fn position(&self) -> i32 {
        self.pos.get()
    }
}

type Script = Box<dyn FnMut(u32, i32) -> Result<Sample, BoxError>>;

/// Scale driven by a closure of (1-based poll number, servo position).
/// Blocking averages return the last ready sample unless overridden.
pub struct TestScale {
    pub polls: Rc<Cell<u32>>,
    pub stable_reads: Rc<Cell<u32>>,
    pub stable_value: i32,
    pub average_value: Option<i32>,
    last: i32,
    servo: Rc<Cell<i32>>,
    script: Script,
}

impl TestScale {
    pub fn scripted(
        servo: &TestServo,
        script: impl FnMut(u32, i32) -> Result<Sample, BoxError> + 'static,
    ) -> Self {
        Self {
            polls: Rc::new(Cell::new(0)),
            stable_reads: Rc::new(Cell::new(0)),
            stable_value: 0,
            average_value: None,
            last: 0,
            servo: servo.pos.clone(),
            script: Box::new(script),
        }
    }

    /// Replays `values` in order, then keeps repeating the last one.
    pub fn sequence(servo: &TestServo, values: Vec<i32>) -> Self {
        Self::scripted(servo, move |n, _| {
            let i = (n as usize - 1).min(values.len() - 1);
            Ok(Sample::Ready(values[i]))
        })
    }

    pub fn with_stable_value(mut self, v: i32) -> Self {
        self.stable_value = v;
        self
    }

    /// Blocking averages report `v` instead of the last sample.
    pub fn with_average_value(mut self, v: i32) -> Self {
        self.average_value = Some(v);
        self
    }
}

impl Scale for TestScale {
    fn sample_nonblocking(&mut self) -> Result<Sample, BoxError> {
        let n = self.polls.get() + 1;
        self.polls.set(n);
        let s = (self.script)(n, self.servo.get())?;
        if let Sample::Ready(w) = s {
            self.last = w;
        }
        Ok(s)
    }

    fn read_stable_blocking(&mut self) -> Result<i32, BoxError> {
        self.stable_reads.set(self.stable_reads.get() + 1);
        self.last = self.stable_value;
        Ok(self.stable_value)
    }

    fn read_average_blocking(&mut self) -> Result<i32, BoxError> {
        Ok(self.average_value.unwrap_or(self.last))
    }
}

/// Operator stand-in. Abort turns on after `abort_after` checks.
pub struct TestSignals {
    pub abort_checks: Rc<Cell<u32>>,
    pub cup_waits: Rc<Cell<u32>>,
    pub resume_waits: Rc<Cell<u32>>,
    pub abort_after: Option<u32>,
    pub cup_reply: Signal,
    pub resume_reply: Signal,
}

impl Default for TestSignals {
    fn default() -> Self {
        Self {
            abort_checks: Rc::new(Cell::new(0)),
            cup_waits: Rc::new(Cell::new(0)),
            resume_waits: Rc::new(Cell::new(0)),
            abort_after: None,
            cup_reply: Signal::Proceed,
            resume_reply: Signal::Proceed,
        }
    }
}

impl TestSignals {
    pub fn abort_after(n: u32) -> Self {
        Self {
            abort_after: Some(n),
            ..Self::default()
        }
    }
}

impl SignalSource for TestSignals {
    fn is_abort_requested(&mut self) -> bool {
        let n = self.abort_checks.get() + 1;
        self.abort_checks.set(n);
        self.abort_after.is_some_and(|after| n > after)
    }

    fn wait_for_cup_present(&mut self) -> Signal {
        self.cup_waits.set(self.cup_waits.get() + 1);
        self.cup_reply
    }

    fn wait_for_resume(&mut self) -> Signal {
        self.resume_waits.set(self.resume_waits.get() + 1);
        self.resume_reply
    }
}

/// Keeps every display call as `msg:`, `err:` or `clear`.
#[derive(Clone, Default)]
pub struct RecordingReporter {
    pub log: Rc<RefCell<Vec<String>>>,
}

impl RecordingReporter {
    pub fn count(&self, entry: &str) -> usize {
        self.log.borrow().iter().filter(|e| *e == entry).count()
    }
}

impl Reporter for RecordingReporter {
    fn message(&mut self, msg: &str) {
        self.log.borrow_mut().push(format!("msg:{msg}"));
    }

    fn error(&mut self, msg: &str) {
        self.log.borrow_mut().push(format!("err:{msg}"));
    }

    fn clear_error(&mut self) {
        self.log.borrow_mut().push("clear".to_string());
    }
}

pub type Rig = PourCore<TestServo, TestScale, TestSignals, RecordingReporter>;

pub fn bottle() -> Bottle {
    Bottle::new(1, POS_DOWN, POS_UP, ServoRange::default()).expect("valid bottle")
}

pub fn rig_with(
    servo: TestServo,
    scale: TestScale,
    signals: TestSignals,
    settings: PourSettings,
) -> (Rig, RecordingReporter, ManualClock) {
    let reporter = RecordingReporter::default();
    let clock = ManualClock::new();
    let core = build_pour_core(
        servo,
        scale,
        signals,
        reporter.clone(),
        bottle(),
        settings,
        Some(Box::new(clock.clone())),
    )
    .expect("build core");
    (core, reporter, clock)
}

pub fn rig(servo: TestServo, scale: TestScale, signals: TestSignals) -> (Rig, RecordingReporter) {
    let (core, reporter, _) = rig_with(servo, scale, signals, PourSettings::default());
    (core, reporter)
}
