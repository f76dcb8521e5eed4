// Ports, buffer sizes, PWM timer and motor wiring
use std::time::Duration;

// TCP server defaults
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

// Receive buffer per read; the last byte is never filled
pub const RX_BUFFER_SIZE: usize = 128;

// Direction token must fit this buffer including its terminator
pub const DIRECTION_BUFFER_SIZE: usize = 32;

// Pause before retrying after a failed accept
pub const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Where the command server listens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Shared PWM timer settings for every motor channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PwmTimerConfig {
    pub frequency_hz: u32,
    pub resolution_bits: u8,
}

impl PwmTimerConfig {
    /// Largest duty value accepted by a channel on this timer
    pub fn max_duty(&self) -> u32 {
        (1u32 << self.resolution_bits) - 1
    }
}

pub const PWM_TIMER: PwmTimerConfig = PwmTimerConfig {
    frequency_hz: 5000,
    resolution_bits: 8,
};

/// Wiring of one motor on the driver board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorSpec {
    pub id: i32,
    pub name: &'static str,
    pub in1: u8,
    pub in2: u8,
    pub en: u8, // PWM output
    pub channel: u8,
}

// Motor A and B share the first driver chip, C sits on the second one
pub const MOTOR_LAYOUT: [MotorSpec; 3] = [
    MotorSpec {
        id: 1,
        name: "Motor A (OUT1/OUT2)",
        in1: 33,
        in2: 32,
        en: 14,
        channel: 0,
    },
    MotorSpec {
        id: 2,
        name: "Motor B (OUT3/OUT4)",
        in1: 26,
        in2: 27,
        en: 25,
        channel: 1,
    },
    MotorSpec {
        id: 3,
        name: "Motor C (OUT1/OUT2)",
        in1: 16,
        in2: 17,
        en: 18,
        channel: 2,
    },
];
