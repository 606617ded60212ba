use core::cell::RefCell;

use blaster_core::utils::config::MotorPins;
use blaster_core::utils::controllers::{MotorCommand, MotorDriver, MotorState};
use blaster_core::utils::io::{DigitalIo, Duty, PinId, PinState};

const PINS: MotorPins = MotorPins {
    a: 7,
    b: 12,
    pwm: 11,
};

/// One call made on the port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Output(PinId),
    Level(PinId, PinState),
    Duty(PinId, Duty),
}

#[derive(Debug, PartialEq, Eq)]
struct WriteFailed;

/// Port that records every call, optionally failing the n-th write.
#[derive(Default)]
struct Recorder {
    ops: Vec<Op>,
    fail_at: Option<usize>,
}

impl Recorder {
    fn push(
        &mut self,
        op: Op,
    ) -> Result<(), WriteFailed> {
        if self.fail_at == Some(self.ops.len()) {
            self.fail_at = None;
            return Err(WriteFailed);
        }
        self.ops.push(op);
        Ok(())
    }
}

impl DigitalIo for Recorder {
    type Error = WriteFailed;

    fn configure_output(
        &mut self,
        pin: PinId,
    ) -> Result<(), Self::Error> {
        self.push(Op::Output(pin))
    }

    fn write_level(
        &mut self,
        pin: PinId,
        level: PinState,
    ) -> Result<(), Self::Error> {
        self.push(Op::Level(pin, level))
    }

    fn write_duty(
        &mut self,
        pin: PinId,
        duty: Duty,
    ) -> Result<(), Self::Error> {
        self.push(Op::Duty(pin, duty))
    }
}

fn take(port: &RefCell<Recorder>) -> Vec<Op> {
    core::mem::take(&mut port.borrow_mut().ops)
}

fn brake_ops() -> Vec<Op> {
    vec![
        Op::Level(7, PinState::Low),
        Op::Level(12, PinState::Low),
        Op::Duty(11, Duty::BRAKE),
    ]
}

fn drive_ops(duty: u8) -> Vec<Op> {
    vec![
        Op::Level(12, PinState::Low),
        Op::Level(7, PinState::High),
        Op::Duty(11, Duty::new(duty)),
    ]
}

/// Replay `ops` and fail if A and B are ever HIGH at the same moment.
fn assert_never_both_high(ops: &[Op]) {
    let (mut a, mut b) = (PinState::Low, PinState::Low);
    for op in ops {
        if let Op::Level(pin, level) = *op {
            if pin == PINS.a {
                a = level;
            } else if pin == PINS.b {
                b = level;
            }
        }
        assert!(
            !(a == PinState::High && b == PinState::High),
            "both direction lines high after {:?}",
            op
        );
    }
}

#[test]
fn construction_touches_no_line() {
    let port = RefCell::new(Recorder::default());
    let motor = MotorDriver::new(&port, PINS, Duty::new(32));

    assert!(port.borrow().ops.is_empty());
    assert_eq!(motor.state(), MotorState::Freewheel);
    assert!(motor.is_freewheeling());
    assert_eq!(motor.speed(), Duty::new(32));
}

#[test]
fn initialize_configures_outputs_then_brakes() {
    let port = RefCell::new(Recorder::default());
    let mut motor = MotorDriver::new(&port, PINS, Duty::new(32));
    motor.initialize().unwrap();

    let mut expected = vec![Op::Output(7), Op::Output(12), Op::Output(11)];
    expected.extend(brake_ops());
    assert_eq!(take(&port), expected);
    assert_eq!(motor.state(), MotorState::Braking);
    assert!(motor.is_braking());
}

#[test]
fn brake_twice_writes_once() {
    let port = RefCell::new(Recorder::default());
    let mut motor = MotorDriver::new(&port, PINS, Duty::new(32));

    motor.brake().unwrap();
    motor.brake().unwrap();

    assert_eq!(take(&port), brake_ops());
    assert!(motor.is_braking());
}

#[test]
fn drive_twice_writes_once() {
    let port = RefCell::new(Recorder::default());
    let mut motor = MotorDriver::new(&port, PINS, Duty::new(32));
    motor.initialize().unwrap();
    take(&port);

    motor.drive().unwrap();
    assert_eq!(take(&port), drive_ops(32));
    motor.drive().unwrap();
    motor.drive_at(Duty::new(90)).unwrap();
    assert!(take(&port).is_empty());
    assert!(motor.is_driving());
}

#[test]
fn drive_at_while_driving_keeps_applied_duty() {
    // Only the state is compared, so a new speed is ignored until the motor
    // leaves the driving state.
    let port = RefCell::new(Recorder::default());
    let mut motor = MotorDriver::new(&port, PINS, Duty::new(32));
    motor.initialize().unwrap();
    motor.drive_at(Duty::new(100)).unwrap();
    take(&port);

    motor.drive_at(Duty::new(200)).unwrap();
    assert!(take(&port).is_empty());

    motor.brake().unwrap();
    motor.drive_at(Duty::new(200)).unwrap();
    let ops = take(&port);
    assert_eq!(ops.last(), Some(&Op::Duty(11, Duty::new(200))));
}

#[test]
fn drive_at_does_not_store_speed() {
    let port = RefCell::new(Recorder::default());
    let mut motor = MotorDriver::new(&port, PINS, Duty::new(32));
    motor.initialize().unwrap();

    motor.drive_at(Duty::new(150)).unwrap();
    assert_eq!(motor.speed(), Duty::new(32));

    motor.brake().unwrap();
    take(&port);
    motor.drive().unwrap();
    assert_eq!(take(&port), drive_ops(32));
}

#[test]
fn set_speed_is_used_by_next_drive() {
    let port = RefCell::new(Recorder::default());
    let mut motor = MotorDriver::new(&port, PINS, Duty::new(32));
    motor.initialize().unwrap();
    take(&port);

    motor.set_speed(Duty::new(77));
    assert!(take(&port).is_empty());
    assert_eq!(motor.speed(), Duty::new(77));

    motor.drive().unwrap();
    assert_eq!(take(&port), drive_ops(77));
}

#[test]
fn direction_lines_never_both_high() {
    let port = RefCell::new(Recorder::default());
    let mut motor = MotorDriver::new(&port, PINS, Duty::new(32));
    motor.initialize().unwrap();
    for step in 0..8u8 {
        if step % 3 == 0 {
            motor.brake().unwrap();
        } else {
            motor.drive_at(Duty::new(step * 30)).unwrap();
        }
    }
    motor.drive().unwrap();
    motor.brake().unwrap();

    assert_never_both_high(&take(&port));
}

#[test]
fn failed_write_faults_and_retries_fully() {
    let port = RefCell::new(Recorder::default());
    let mut motor = MotorDriver::new(&port, PINS, Duty::new(32));
    motor.initialize().unwrap();
    take(&port);

    // fail on the PWM write of the drive transition
    port.borrow_mut().fail_at = Some(2);
    assert_eq!(motor.drive(), Err(WriteFailed));
    assert_eq!(motor.state(), MotorState::Fault);
    take(&port);

    motor.drive().unwrap();
    assert_eq!(take(&port), drive_ops(32));
    assert!(motor.is_driving());
}

#[test]
fn brake_after_partial_drive_rewrites_lines() {
    let port = RefCell::new(Recorder::default());
    let mut motor = MotorDriver::new(&port, PINS, Duty::new(32));
    motor.initialize().unwrap();
    take(&port);

    // A is already HIGH when the PWM write fails
    port.borrow_mut().fail_at = Some(2);
    assert_eq!(motor.drive(), Err(WriteFailed));
    assert_eq!(
        take(&port),
        vec![Op::Level(12, PinState::Low), Op::Level(7, PinState::High)]
    );
    assert!(motor.is_faulted());

    motor.brake().unwrap();
    assert_eq!(take(&port), brake_ops());
    assert!(motor.is_braking());
}

#[test]
fn drive_after_partial_brake_rewrites_lines() {
    let port = RefCell::new(Recorder::default());
    let mut motor = MotorDriver::new(&port, PINS, Duty::new(32));
    motor.initialize().unwrap();
    motor.drive().unwrap();
    take(&port);

    // A already LOW when B fails
    port.borrow_mut().fail_at = Some(1);
    assert_eq!(motor.brake(), Err(WriteFailed));
    assert!(motor.is_faulted());
    take(&port);

    motor.drive().unwrap();
    assert_eq!(take(&port), drive_ops(32));
    assert!(motor.is_driving());
}

#[test]
fn execute_reports_resulting_state() {
    let port = RefCell::new(Recorder::default());
    let mut motor = MotorDriver::new(&port, PINS, Duty::new(32));
    motor.initialize().unwrap();

    assert_eq!(
        motor.execute(MotorCommand::SetSpeed { s: Duty::new(64) }),
        Ok(MotorState::Braking)
    );
    assert_eq!(motor.execute(MotorCommand::Drive), Ok(MotorState::Driving));
    assert_eq!(motor.execute(MotorCommand::Brake), Ok(MotorState::Braking));
    assert_eq!(
        motor.execute(MotorCommand::DriveAt { s: Duty::new(10) }),
        Ok(MotorState::Driving)
    );
    assert_eq!(motor.speed(), Duty::new(64));
}

/// Construct, initialize, drive, drive again, brake on the stock pusher lines.
#[test]
fn pusher_end_to_end() {
    let port = RefCell::new(Recorder::default());
    let mut motor = MotorDriver::new(&port, PINS, Duty::new(32));

    motor.initialize().unwrap();
    let ops = take(&port);
    assert_eq!(&ops[..3], &[Op::Output(7), Op::Output(12), Op::Output(11)]);
    assert_eq!(&ops[3..], brake_ops().as_slice());
    assert_eq!(motor.state(), MotorState::Braking);

    motor.drive().unwrap();
    assert_eq!(take(&port), drive_ops(32));
    assert_eq!(motor.state(), MotorState::Driving);

    motor.drive().unwrap();
    assert!(take(&port).is_empty());

    motor.brake().unwrap();
    assert_eq!(take(&port), brake_ops());
    assert_eq!(motor.state(), MotorState::Braking);
}
