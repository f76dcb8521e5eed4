// Simulated driver board
//
// Stands in for the real GPIO/PWM peripherals on the host and in tests.
// Tracks pin levels and applied duty so motor behaviour can be inspected.

use std::collections::HashSet;
use tracing::debug;

use super::hal::{Board, MotorError, OutputPin, PwmChannel, Result};
use crate::config::{MotorSpec, PwmTimerConfig};

/// Simulated push-pull output
#[derive(Debug)]
pub struct SimPin {
    pin: u8,
    high: bool,
}

impl SimPin {
    pub fn pin(&self) -> u8 {
        self.pin
    }
}

impl OutputPin for SimPin {
    fn set_level(&mut self, high: bool) -> Result<()> {
        self.high = high;
        Ok(())
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

/// Simulated PWM channel with staged duty, clamped to the timer resolution
#[derive(Debug)]
pub struct SimPwmChannel {
    channel: u8,
    max_duty: u32,
    staged: u32,
    applied: u32,
    faulty: bool,
}

impl SimPwmChannel {
    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn max_duty(&self) -> u32 {
        self.max_duty
    }
}

impl PwmChannel for SimPwmChannel {
    fn set_duty(&mut self, duty: i32) -> Result<()> {
        if self.faulty {
            return Err(MotorError::PwmWrite {
                channel: self.channel,
            });
        }
        self.staged = duty.clamp(0, self.max_duty as i32) as u32;
        Ok(())
    }

    fn update_duty(&mut self) -> Result<()> {
        if self.faulty {
            return Err(MotorError::PwmWrite {
                channel: self.channel,
            });
        }
        self.applied = self.staged;
        debug!("PWM channel {} duty={}", self.channel, self.applied);
        Ok(())
    }

    fn duty(&self) -> u32 {
        self.applied
    }
}

/// Simulated board handing out pins and PWM channels
#[derive(Debug, Default)]
pub struct SimBoard {
    claimed_pins: HashSet<u8>,
    claimed_channels: HashSet<u8>,
    faulty_channels: HashSet<u8>,
}

impl SimBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every duty write on `channel` fail
    pub fn with_faulty_channel(mut self, channel: u8) -> Self {
        self.faulty_channels.insert(channel);
        self
    }

    fn claim_pin(&mut self, pin: u8) -> Result<SimPin> {
        if !self.claimed_pins.insert(pin) {
            return Err(MotorError::PinConfig { pin });
        }
        Ok(SimPin { pin, high: false })
    }
}

impl Board for SimBoard {
    type Pin = SimPin;
    type Channel = SimPwmChannel;

    fn configure_motor(
        &mut self,
        spec: &MotorSpec,
        timer: &PwmTimerConfig,
    ) -> Result<(SimPin, SimPin, SimPwmChannel)> {
        if timer.resolution_bits == 0 || timer.resolution_bits > 20 {
            return Err(MotorError::PwmConfig {
                channel: spec.channel,
                reason: format!("unsupported resolution {} bits", timer.resolution_bits),
            });
        }
        if !self.claimed_channels.insert(spec.channel) {
            return Err(MotorError::PwmConfig {
                channel: spec.channel,
                reason: "channel already in use".to_string(),
            });
        }

        let in1 = self.claim_pin(spec.in1)?;
        let in2 = self.claim_pin(spec.in2)?;
        self.claim_pin(spec.en)?;

        let pwm = SimPwmChannel {
            channel: spec.channel,
            max_duty: timer.max_duty(),
            staged: 0,
            applied: 0,
            faulty: self.faulty_channels.contains(&spec.channel),
        };
        debug!(
            "Configured {}: IN1={} IN2={} EN={} @ {}Hz",
            spec.name, spec.in1, spec.in2, spec.en, timer.frequency_hz
        );
        Ok((in1, in2, pwm))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MOTOR_LAYOUT, PWM_TIMER};

    #[test]
    fn test_configure_layout() {
        let mut board = SimBoard::new();
        for spec in &MOTOR_LAYOUT {
            let (in1, in2, pwm) = board.configure_motor(spec, &PWM_TIMER).unwrap();
            assert_eq!(in1.pin(), spec.in1);
            assert_eq!(in2.pin(), spec.in2);
            assert_eq!(pwm.channel(), spec.channel);
            assert_eq!(pwm.max_duty(), 255);
            assert!(!in1.is_set_high());
            assert_eq!(pwm.duty(), 0);
        }
    }

    #[test]
    fn test_pin_cannot_be_claimed_twice() {
        let mut board = SimBoard::new();
        board.configure_motor(&MOTOR_LAYOUT[0], &PWM_TIMER).unwrap();

        let clash = MotorSpec {
            id: 4,
            channel: 7,
            ..MOTOR_LAYOUT[0]
        };
        let err = board.configure_motor(&clash, &PWM_TIMER).unwrap_err();
        assert!(matches!(err, MotorError::PinConfig { pin: 33 }));
    }

    #[test]
    fn test_duty_staged_until_update() {
        let mut board = SimBoard::new();
        let (_, _, mut pwm) = board.configure_motor(&MOTOR_LAYOUT[1], &PWM_TIMER).unwrap();

        pwm.set_duty(128).unwrap();
        assert_eq!(pwm.duty(), 0);
        pwm.update_duty().unwrap();
        assert_eq!(pwm.duty(), 128);
    }

    #[test]
    fn test_faulty_channel_rejects_writes() {
        let mut board = SimBoard::new().with_faulty_channel(2);
        let (_, _, mut pwm) = board.configure_motor(&MOTOR_LAYOUT[2], &PWM_TIMER).unwrap();
        assert!(matches!(
            pwm.set_duty(10),
            Err(MotorError::PwmWrite { channel: 2 })
        ));
    }
}
