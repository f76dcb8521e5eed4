// Fixed set of motors addressed by small integer ids

use tracing::info;

use super::driver::Motor;
use super::hal::{Board, OutputPin, PwmChannel, Result};
use crate::config::{MotorSpec, PwmTimerConfig};

/// Motors registered at startup, in registration order
pub struct MotorRegistry<P, C> {
    motors: Vec<Motor<P, C>>,
}

impl<P: OutputPin, C: PwmChannel> MotorRegistry<P, C> {
    pub fn new(motors: Vec<Motor<P, C>>) -> Self {
        Self { motors }
    }

    /// Bring up every motor in `layout` on `board`
    pub fn init<B>(board: &mut B, layout: &[MotorSpec], timer: &PwmTimerConfig) -> Result<Self>
    where
        B: Board<Pin = P, Channel = C>,
    {
        info!(
            "PWM timer: {}Hz, {}-bit duty resolution",
            timer.frequency_hz, timer.resolution_bits
        );
        let motors = layout
            .iter()
            .map(|spec| Motor::init(board, spec, timer))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(motors))
    }

    pub fn get(&self, id: i32) -> Option<&Motor<P, C>> {
        self.motors.iter().find(|m| m.id() == id)
    }

    pub fn get_mut(&mut self, id: i32) -> Option<&mut Motor<P, C>> {
        self.motors.iter_mut().find(|m| m.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Motor<P, C>> {
        self.motors.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Motor<P, C>> {
        self.motors.iter_mut()
    }

    pub fn ids(&self) -> Vec<i32> {
        self.motors.iter().map(|m| m.id()).collect()
    }
}
