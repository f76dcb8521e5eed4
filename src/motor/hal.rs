// Peripheral seams used by the motor layer
//
// The runtime only sets pin levels and PWM duty once a motor is brought up.
// Configuring the pins and the PWM channel is the board's job.

use crate::config::{MotorSpec, PwmTimerConfig};

/// Error types for motor peripherals
#[derive(Debug, thiserror::Error)]
pub enum MotorError {
    #[error("GPIO {pin} could not be configured as output")]
    PinConfig { pin: u8 },

    #[error("GPIO {pin} write failed")]
    PinWrite { pin: u8 },

    #[error("PWM channel {channel} could not be configured: {reason}")]
    PwmConfig { channel: u8, reason: String },

    #[error("PWM channel {channel} duty update failed")]
    PwmWrite { channel: u8 },
}

pub type Result<T> = std::result::Result<T, MotorError>;

/// Digital output driving one H-bridge input
pub trait OutputPin {
    fn set_level(&mut self, high: bool) -> Result<()>;

    /// Last level written to the pin
    fn is_set_high(&self) -> bool;
}

/// PWM channel feeding an H-bridge enable input
///
/// Duty is staged with `set_duty` and applied by `update_duty`. Values outside
/// the channel's range are clamped by the channel itself.
pub trait PwmChannel {
    fn set_duty(&mut self, duty: i32) -> Result<()>;

    fn update_duty(&mut self) -> Result<()>;

    /// Duty currently applied to the output
    fn duty(&self) -> u32;
}

/// Peripheral bring-up for motors
pub trait Board {
    type Pin: OutputPin;
    type Channel: PwmChannel;

    /// Configure both drive pins as outputs (low) and the enable pin's PWM
    /// channel on `timer` with duty 0.
    fn configure_motor(
        &mut self,
        spec: &MotorSpec,
        timer: &PwmTimerConfig,
    ) -> Result<(Self::Pin, Self::Pin, Self::Channel)>;
}
