// Single DC motor behind an H-bridge
//
// IN1/IN2 select the polarity, the enable pin carries PWM for speed.
//
// | IN1 | IN2 | state    |
// |-----|-----|----------|
// | 1   | 0   | forward  |
// | 0   | 1   | backward |
// | 0   | 0   | stopped  |

use tracing::{info, warn};

use super::hal::{Board, OutputPin, PwmChannel, Result};
use crate::config::{MotorSpec, PwmTimerConfig};

/// Commanded state of a motor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotorState {
    #[default]
    Stopped,
    Forward { duty: u32 },
    Backward { duty: u32 },
    /// A peripheral write failed and the outputs could not be brought to a
    /// known state; none of the three states above is guaranteed to hold
    Fault,
}

pub struct Motor<P, C> {
    id: i32,
    name: &'static str,
    in1: P,
    in2: P,
    pwm: C,
    state: MotorState,
}

impl<P: OutputPin, C: PwmChannel> Motor<P, C> {
    /// Wrap already configured peripherals. The motor starts stopped.
    pub fn new(id: i32, name: &'static str, in1: P, in2: P, pwm: C) -> Self {
        Self {
            id,
            name,
            in1,
            in2,
            pwm,
            state: MotorState::Stopped,
        }
    }

    /// Bring up a motor's pins and PWM channel through the board
    pub fn init<B>(board: &mut B, spec: &MotorSpec, timer: &PwmTimerConfig) -> Result<Self>
    where
        B: Board<Pin = P, Channel = C>,
    {
        info!("Initializing {}...", spec.name);
        let (in1, in2, pwm) = board.configure_motor(spec, timer)?;
        info!("PWM channel configured: EN={} | channel={}", spec.en, spec.channel);
        info!("{} initialized", spec.name);
        Ok(Self::new(spec.id, spec.name, in1, in2, pwm))
    }

    /// Drive forward (IN1 high, IN2 low) at `speed`
    pub fn drive_forward(&mut self, speed: i32) -> Result<()> {
        self.drive(true, speed)?;
        self.state = MotorState::Forward {
            duty: self.pwm.duty(),
        };
        info!("{} forward (speed={})", self.name, speed);
        Ok(())
    }

    /// Drive backward (IN1 low, IN2 high) at `speed`
    pub fn drive_backward(&mut self, speed: i32) -> Result<()> {
        self.drive(false, speed)?;
        self.state = MotorState::Backward {
            duty: self.pwm.duty(),
        };
        info!("{} backward (speed={})", self.name, speed);
        Ok(())
    }

    /// Both drive pins low, duty 0.
    ///
    /// Every step is attempted even if an earlier one fails; the first error
    /// is returned and the motor is left in `MotorState::Fault`.
    pub fn stop(&mut self) -> Result<()> {
        let in1 = self.in1.set_level(false);
        let in2 = self.in2.set_level(false);
        let duty = self.apply_duty(0);

        match in1.and(in2).and(duty) {
            Ok(()) => {
                self.state = MotorState::Stopped;
                info!("{} stopped", self.name);
                Ok(())
            }
            Err(e) => {
                self.state = MotorState::Fault;
                warn!("{} could not be fully stopped: {}", self.name, e);
                Err(e)
            }
        }
    }

    /// Write polarity then duty. On failure the motor is stopped so no
    /// half-applied command stays on the outputs.
    fn drive(&mut self, forward: bool, speed: i32) -> Result<()> {
        let written = self.write_outputs(forward, !forward, speed);
        if let Err(e) = written {
            warn!("{} drive failed ({}), stopping", self.name, e);
            // stop() records Stopped or Fault and logs its own failure
            let _ = self.stop();
            return Err(e);
        }
        Ok(())
    }

    fn write_outputs(&mut self, in1: bool, in2: bool, duty: i32) -> Result<()> {
        self.in1.set_level(in1)?;
        self.in2.set_level(in2)?;
        self.apply_duty(duty)
    }

    fn apply_duty(&mut self, duty: i32) -> Result<()> {
        self.pwm.set_duty(duty)?;
        self.pwm.update_duty()
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn state(&self) -> MotorState {
        self.state
    }

    /// Drive pins as (IN1, IN2)
    pub fn drive_pins(&self) -> (&P, &P) {
        (&self.in1, &self.in2)
    }

    pub fn pwm(&self) -> &C {
        &self.pwm
    }
}
