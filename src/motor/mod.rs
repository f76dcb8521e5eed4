// Motor control module for the three-channel H-bridge board
//
// Provides:
// - Peripheral seams (output pins, PWM channels, board bring-up)
// - Single-motor actuation (forward / backward / stop)
// - Registry of motors addressed by id
// - Simulated board for host runs and tests

mod driver;
pub mod hal;
mod registry;
pub mod sim;

pub use driver::{Motor, MotorState};
pub use hal::{Board, MotorError, OutputPin, PwmChannel};
pub use registry::MotorRegistry;
pub use sim::{SimBoard, SimPin, SimPwmChannel};
