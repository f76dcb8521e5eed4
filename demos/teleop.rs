// Keyboard teleop: 1/2/3 select motor, W forward, S backward, Space stop,
// X stop all, R/F speed, Q quit
//
// Usage: cargo run --example teleop -- [addr]
// Example: cargo run --example teleop -- 192.168.4.1:8080
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::info;

use tcp_motor_runtime::messages::{Command, Direction};

const SPEEDS: [i32; 3] = [80, 160, 255]; // duty
const DEFAULT_ADDR: &str = "192.168.4.1:8080";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_ADDR.to_string());

    info!("Connecting to {}...", addr);
    let stream = TcpStream::connect(&addr).await?;

    info!("Controls: 1/2/3=motor, W/S=forward/backward, Space=stop, X=stop all, R/F=speed, Q=quit");
    info!("Motor: 1, speed: LOW");

    enable_raw_mode()?;
    let result = run_teleop(stream).await;
    disable_raw_mode()?;

    result
}

async fn run_teleop(stream: TcpStream) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let (reader, mut writer) = stream.into_split();
    let mut replies = BufReader::new(reader).lines();

    let mut motor = 1;
    let mut speed_idx: usize = 0;

    loop {
        if !event::poll(Duration::from_millis(20))? {
            continue;
        }
        let Event::Key(KeyEvent { code, kind, .. }) = event::read()? else {
            continue;
        };
        if kind != KeyEventKind::Press {
            continue;
        }

        let direction = match code {
            KeyCode::Char(c @ '1'..='3') => {
                motor = c as i32 - '0' as i32;
                info!("Motor: {}", motor);
                continue;
            }
            KeyCode::Char('r') => {
                speed_idx = (speed_idx + 1).min(2);
                print_speed(speed_idx);
                continue;
            }
            KeyCode::Char('f') => {
                speed_idx = speed_idx.saturating_sub(1);
                print_speed(speed_idx);
                continue;
            }
            KeyCode::Char('w') => Direction::Forward,
            KeyCode::Char('s') => Direction::Backward,
            KeyCode::Char(' ') => Direction::Stop,
            KeyCode::Char('x') => Direction::StopAll,
            KeyCode::Char('q') | KeyCode::Esc => break,
            _ => continue,
        };

        let cmd = Command {
            motor,
            direction,
            speed: SPEEDS[speed_idx],
        };
        writer.write_all(serde_json::to_string(&cmd)?.as_bytes()).await?;

        // One reply line per command
        match replies.next_line().await? {
            Some(reply) => info!("{} -> {}", direction, reply),
            None => {
                info!("Server closed the connection");
                return Ok(());
            }
        }
    }

    // Leave nothing running on the way out
    let stop_all = Command {
        direction: Direction::StopAll,
        ..Command::default()
    };
    writer
        .write_all(serde_json::to_string(&stop_all)?.as_bytes())
        .await?;

    Ok(())
}

fn print_speed(idx: usize) {
    let label = ["LOW", "MED", "HIGH"][idx];
    info!("Speed: {} (duty {})", label, SPEEDS[idx]);
}
