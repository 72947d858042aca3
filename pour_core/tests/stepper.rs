mod common;

use std::time::Duration;

use common::*;
use pour_core::{PourError, StepChecks, StepOutcome};
use pour_traits::Sample;
use rstest::rstest;

const DELAY: Duration = Duration::from_millis(2);

#[test]
fn plain_move_visits_every_unit() {
    let servo = TestServo::at(1500);
    let moves = servo.moves.clone();
    let scale = TestScale::sequence(&servo, vec![100]);
    let polls = scale.polls.clone();
    let (mut core, _) = rig(servo, scale, TestSignals::default());

    let out = core.step_to(1495, DELAY, StepChecks::NONE).unwrap();

    assert_eq!(out, StepOutcome::Reached);
    assert_eq!(*moves.borrow(), vec![1499, 1498, 1497, 1496, 1495]);
    assert_eq!(polls.get(), 0);
}

#[test]
fn each_unit_step_sleeps_first() {
    let servo = TestServo::at(1500);
    let scale = TestScale::sequence(&servo, vec![100]);
    let (mut core, _, clock) =
        rig_with(servo, scale, TestSignals::default(), Default::default());

    core.step_to(1510, Duration::from_millis(3), StepChecks::NONE)
        .unwrap();

    assert_eq!(clock.elapsed(), Duration::from_millis(30));
}

#[test]
fn step_to_current_position_is_a_no_op() {
    let servo = TestServo::at(1500);
    let moves = servo.moves.clone();
    let scale = TestScale::sequence(&servo, vec![100]);
    let polls = scale.polls.clone();
    let signals = TestSignals::default();
    let checks = signals.abort_checks.clone();
    let (mut core, _) = rig(servo, scale, signals);

    let all = StepChecks::ABORT.with_weight().with_stable_weight();
    assert_eq!(core.step_to(1500, DELAY, all), Ok(StepOutcome::Reached));
    assert!(moves.borrow().is_empty());
    assert_eq!(polls.get(), 0);
    assert_eq!(checks.get(), 0);
}

#[rstest]
#[case(999)]
#[case(2001)]
#[case(i32::MIN)]
fn out_of_range_target_touches_nothing(#[case] target: i32) {
    let servo = TestServo::at(1500);
    let moves = servo.moves.clone();
    let scale = TestScale::sequence(&servo, vec![100]);
    let polls = scale.polls.clone();
    let signals = TestSignals::default();
    let checks = signals.abort_checks.clone();
    let (mut core, _) = rig(servo, scale, signals);

    let all = StepChecks::ABORT.with_weight().with_stable_weight();
    assert_eq!(
        core.step_to(target, DELAY, all),
        Err(PourError::OutOfRange {
            target,
            min: 1000,
            max: 2000
        })
    );
    assert!(moves.borrow().is_empty());
    assert_eq!(polls.get(), 0);
    assert_eq!(checks.get(), 0);
}

#[test]
fn light_sample_stops_with_cup_missing() {
    let servo = TestServo::at(1800);
    let moves = servo.moves.clone();
    let scale = TestScale::sequence(&servo, vec![100, 100, 100, 100, 100, 4, 100]);
    let polls = scale.polls.clone();
    let (mut core, _) = rig(servo, scale, TestSignals::default());

    let out = core.step_to(POS_DOWN, DELAY, StepChecks::NONE.with_weight());

    assert_eq!(out, Err(PourError::CupMissing));
    assert_eq!(polls.get(), 6);
    assert_eq!(*moves.borrow(), vec![1799, 1798, 1797, 1796, 1795]);
    assert_eq!(core.position(), 1795);
}

#[test]
fn weight_at_epsilon_counts_as_present() {
    let servo = TestServo::at(1210);
    let scale = TestScale::sequence(&servo, vec![5]);
    let (mut core, _) = rig(servo, scale, TestSignals::default());

    assert_eq!(
        core.step_to(POS_DOWN, DELAY, StepChecks::NONE.with_weight()),
        Ok(StepOutcome::Reached)
    );
}

#[test]
fn stable_needs_three_equal_samples_in_a_row() {
    let servo = TestServo::at(1800);
    let moves = servo.moves.clone();
    let scale = TestScale::sequence(&servo, vec![10, 10, 11, 11, 11, 12]);
    let polls = scale.polls.clone();
    let (mut core, _) = rig(servo, scale, TestSignals::default());

    let out = core.step_to(BELOW_PAUSE, DELAY, StepChecks::NONE.with_stable_weight());

    assert_eq!(out, Ok(StepOutcome::Stable(11)));
    assert_eq!(polls.get(), 5);
    // the fifth sample is taken before the fifth move
    assert_eq!(moves.borrow().len(), 4);
    assert_eq!(core.position(), 1796);
}

#[test]
fn not_ready_samples_leave_the_window_alone() {
    let servo = TestServo::at(1800);
    let scale = TestScale::scripted(&servo, |n, _| {
        Ok(if n % 2 == 0 {
            Sample::NotReady
        } else {
            Sample::Ready(42)
        })
    });
    let polls = scale.polls.clone();
    let (mut core, _) = rig(servo, scale, TestSignals::default());

    let out = core.step_to(BELOW_PAUSE, DELAY, StepChecks::NONE.with_stable_weight());

    assert_eq!(out, Ok(StepOutcome::Stable(42)));
    assert_eq!(polls.get(), 5);
}

#[test]
fn target_without_stability_is_weight_not_stable() {
    let servo = TestServo::at(1360);
    let scale = TestScale::scripted(&servo, |n, _| Ok(Sample::Ready(100 + n as i32)));
    let (mut core, _) = rig(servo, scale, TestSignals::default());

    let out = core.step_to(BELOW_PAUSE, DELAY, StepChecks::NONE.with_stable_weight());

    assert_eq!(out, Err(PourError::WeightNotStable));
    assert_eq!(core.position(), BELOW_PAUSE);
}

#[test]
fn stability_window_does_not_survive_between_calls() {
    let servo = TestServo::at(1800);
    let scale = TestScale::sequence(&servo, vec![7]);
    let (mut core, _) = rig(servo, scale, TestSignals::default());

    // two samples of 7 before the target, then a fresh call
    core.step_to(1798, DELAY, StepChecks::NONE.with_stable_weight())
        .unwrap_err();
    let out = core.step_to(1790, DELAY, StepChecks::NONE.with_stable_weight());

    assert_eq!(out, Ok(StepOutcome::Stable(7)));
    assert_eq!(core.position(), 1796);
}

#[test]
fn sensor_error_propagates_and_stops_motion() {
    let servo = TestServo::at(1800);
    let moves = servo.moves.clone();
    let scale = TestScale::scripted(&servo, |n, _| {
        if n == 3 {
            Err("adc checksum mismatch".into())
        } else {
            Ok(Sample::Ready(100))
        }
    });
    let (mut core, _) = rig(servo, scale, TestSignals::default());

    let out = core.step_to(POS_DOWN, DELAY, StepChecks::NONE.with_weight());

    assert_eq!(
        out,
        Err(PourError::Sensor("adc checksum mismatch".to_string()))
    );
    assert_eq!(moves.borrow().len(), 2);
}

#[test]
fn abort_returns_to_rest_before_reporting() {
    let servo = TestServo::at(POS_UP);
    let moves = servo.moves.clone();
    let scale = TestScale::sequence(&servo, vec![100]);
    let polls = scale.polls.clone();
    let (mut core, _) = rig(servo, scale, TestSignals::abort_after(10));

    let out = core.step_to(POS_DOWN, DELAY, StepChecks::ABORT.with_weight());

    assert_eq!(out, Err(PourError::Aborted));
    assert_eq!(core.position(), POS_UP);
    // abort is checked before the sample of that iteration
    assert_eq!(polls.get(), 10);
    let moves = moves.borrow();
    assert_eq!(moves[9], 1790);
    assert_eq!(moves[10], 1791);
    assert_eq!(*moves.last().unwrap(), POS_UP);
}

#[test]
fn abort_is_ignored_when_not_checked() {
    let servo = TestServo::at(1500);
    let signals = TestSignals::abort_after(0);
    let checks = signals.abort_checks.clone();
    let scale = TestScale::sequence(&servo, vec![100]);
    let (mut core, _) = rig(servo, scale, signals);

    assert_eq!(
        core.step_to(1450, DELAY, StepChecks::NONE),
        Ok(StepOutcome::Reached)
    );
    assert_eq!(checks.get(), 0);
}

#[test]
fn wrappers_target_their_positions() {
    let servo = TestServo::at(1700);
    let scale = TestScale::sequence(&servo, vec![100]);
    let (mut core, _) = rig(servo, scale, TestSignals::default());

    core.turn_to_pause(DELAY).unwrap();
    assert_eq!(core.position(), PAUSE);
    core.turn_down(DELAY, true).unwrap();
    assert_eq!(core.position(), POS_DOWN);
    core.turn_up(DELAY, false).unwrap();
    assert_eq!(core.position(), POS_UP);
}
