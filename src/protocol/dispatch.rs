//! Resolve a command against the motor registry.

use tracing::{debug, info, warn};

use crate::messages::{Command, Direction, Response};
use crate::motor::{Motor, MotorError, MotorRegistry, OutputPin, PwmChannel};

/// Apply `cmd` to the registered motors and pick the reply.
///
/// Unknown motor ids are ignored but still acknowledged. Peripheral faults
/// are logged; the reply does not change.
pub fn dispatch<P, C>(cmd: &Command, registry: &mut MotorRegistry<P, C>) -> Response
where
    P: OutputPin,
    C: PwmChannel,
{
    match cmd.direction {
        Direction::Forward => {
            with_motor(registry, cmd.motor, |m| m.drive_forward(cmd.speed));
            Response::Forward
        }
        Direction::Backward => {
            with_motor(registry, cmd.motor, |m| m.drive_backward(cmd.speed));
            Response::Backward
        }
        Direction::Stop => {
            with_motor(registry, cmd.motor, Motor::stop);
            Response::Stopped
        }
        Direction::StopAll => {
            for motor in registry.iter_mut() {
                if let Err(e) = motor.stop() {
                    report(motor.id(), &e);
                }
            }
            info!("All motors stopped");
            Response::AllStopped
        }
        Direction::Invalid => Response::InvalidCommand,
    }
}

fn with_motor<P, C, F>(registry: &mut MotorRegistry<P, C>, id: i32, action: F)
where
    P: OutputPin,
    C: PwmChannel,
    F: FnOnce(&mut Motor<P, C>) -> Result<(), MotorError>,
{
    match registry.get_mut(id) {
        Some(motor) => {
            if let Err(e) = action(motor) {
                report(id, &e);
            }
        }
        None => debug!("No motor with id {}, ignoring", id),
    }
}

fn report(id: i32, err: &MotorError) {
    warn!("Motor {} actuation failed: {}", id, err);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MOTOR_LAYOUT, PWM_TIMER};
    use crate::motor::{MotorState, SimBoard, SimPin, SimPwmChannel};
    use crate::protocol::parse_command;

    type SimRegistry = MotorRegistry<SimPin, SimPwmChannel>;

    fn registry() -> SimRegistry {
        MotorRegistry::init(&mut SimBoard::new(), &MOTOR_LAYOUT, &PWM_TIMER).unwrap()
    }

    fn states(r: &SimRegistry) -> Vec<MotorState> {
        r.iter().map(|m| m.state()).collect()
    }

    fn run(r: &mut SimRegistry, payload: &str) -> &'static str {
        dispatch(&parse_command(payload.as_bytes()), r).as_str()
    }

    #[test]
    fn test_forward_motor_one() {
        let mut r = registry();
        let reply = run(&mut r, r#"{"motor":1,"direction":"forward","speed":200}"#);
        assert_eq!(reply, "forward\n");
        assert_eq!(r.get(1).unwrap().state(), MotorState::Forward { duty: 200 });
        assert_eq!(r.get(2).unwrap().state(), MotorState::Stopped);
        assert_eq!(r.get(3).unwrap().state(), MotorState::Stopped);
    }

    #[test]
    fn test_backward_motor_three() {
        let mut r = registry();
        let reply = run(&mut r, r#"{"motor":3,"direction":"backward","speed":90}"#);
        assert_eq!(reply, "backward\n");
        assert_eq!(r.get(3).unwrap().state(), MotorState::Backward { duty: 90 });
    }

    #[test]
    fn test_unknown_motor_still_acknowledged() {
        let mut r = registry();
        let reply = run(&mut r, r#"{"motor":99,"direction":"forward","speed":50}"#);
        assert_eq!(reply, "forward\n");
        assert!(states(&r).iter().all(|s| *s == MotorState::Stopped));
    }

    #[test]
    fn test_missing_motor_addresses_nothing() {
        let mut r = registry();
        let reply = run(&mut r, r#"{"direction":"backward","speed":50}"#);
        assert_eq!(reply, "backward\n");
        assert!(states(&r).iter().all(|s| *s == MotorState::Stopped));
    }

    #[test]
    fn test_missing_direction_is_invalid_without_actuation() {
        let mut r = registry();
        let reply = run(&mut r, r#"{"motor":1,"speed":100}"#);
        assert_eq!(reply, "invalid command\n");
        assert_eq!(r.get(1).unwrap().state(), MotorState::Stopped);
    }

    #[test]
    fn test_garbage_is_invalid() {
        let mut r = registry();
        assert_eq!(run(&mut r, "~~ definitely not a command ~~"), "invalid command\n");
    }

    #[test]
    fn test_stop_single_motor() {
        let mut r = registry();
        run(&mut r, r#"{"motor":1,"direction":"forward","speed":100}"#);
        run(&mut r, r#"{"motor":2,"direction":"forward","speed":100}"#);

        assert_eq!(run(&mut r, r#"{"motor":2,"direction":"stop"}"#), "stopped\n");
        assert_eq!(r.get(1).unwrap().state(), MotorState::Forward { duty: 100 });
        assert_eq!(r.get(2).unwrap().state(), MotorState::Stopped);
    }

    #[test]
    fn test_stop_twice_is_idempotent() {
        let mut r = registry();
        run(&mut r, r#"{"motor":1,"direction":"backward","speed":100}"#);

        run(&mut r, r#"{"motor":1,"direction":"stop"}"#);
        let m = r.get(1).unwrap();
        let (in1, in2) = m.drive_pins();
        let first = (m.state(), in1.is_set_high(), in2.is_set_high(), m.pwm().duty());

        run(&mut r, r#"{"motor":1,"direction":"stop"}"#);
        let m = r.get(1).unwrap();
        let (in1, in2) = m.drive_pins();
        let second = (m.state(), in1.is_set_high(), in2.is_set_high(), m.pwm().duty());

        assert_eq!(first, (MotorState::Stopped, false, false, 0));
        assert_eq!(first, second);
    }

    #[test]
    fn test_stop_all_ignores_motor_field() {
        for payload in [
            r#"{"direction":"stop_all"}"#,
            r#"{"motor":2,"direction":"stop_all"}"#,
            r#"{"motor":99,"direction":"stop_all"}"#,
        ] {
            let mut r = registry();
            for id in 1..=3 {
                let cmd = Command {
                    motor: id,
                    direction: Direction::Forward,
                    speed: 150,
                };
                dispatch(&cmd, &mut r);
            }

            assert_eq!(run(&mut r, payload), "all motors stopped\n");
            assert!(states(&r).iter().all(|s| *s == MotorState::Stopped));
        }
    }

    #[test]
    fn test_speed_not_validated_before_channel() {
        let mut r = registry();
        assert_eq!(
            run(&mut r, r#"{"motor":2,"direction":"forward","speed":4000}"#),
            "forward\n"
        );
        assert_eq!(r.get(2).unwrap().state(), MotorState::Forward { duty: 255 });
    }

    #[test]
    fn test_peripheral_fault_keeps_reply() {
        let mut board = SimBoard::new().with_faulty_channel(0);
        let mut r = MotorRegistry::init(&mut board, &MOTOR_LAYOUT, &PWM_TIMER).unwrap();

        assert_eq!(
            run(&mut r, r#"{"motor":1,"direction":"forward","speed":10}"#),
            "forward\n"
        );
        // Polarity released again, state reports the fault
        let m = r.get(1).unwrap();
        let (in1, in2) = m.drive_pins();
        assert_eq!(m.state(), MotorState::Fault);
        assert_eq!((in1.is_set_high(), in2.is_set_high(), m.pwm().duty()), (false, false, 0));

        // Other motors still stop even though motor 1 faults
        run(&mut r, r#"{"motor":3,"direction":"forward","speed":10}"#);
        assert_eq!(run(&mut r, r#"{"direction":"stop_all"}"#), "all motors stopped\n");
        assert_eq!(r.get(3).unwrap().state(), MotorState::Stopped);
        assert_eq!(r.get(1).unwrap().state(), MotorState::Fault);
    }
}
