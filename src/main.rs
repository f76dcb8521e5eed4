use clap::Parser;
use tracing_subscriber::EnvFilter;

use tcp_motor_runtime::config::{ServerConfig, DEFAULT_BIND_ADDR, DEFAULT_PORT};
use tcp_motor_runtime::motor::SimBoard;

/// TCP command server for the three-motor H-bridge board
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Address to bind the command server to
    #[arg(long, default_value = DEFAULT_BIND_ADDR)]
    bind: String,

    /// TCP port for client commands
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,
}

#[tokio::main]
async fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    let args = Args::parse();
    let config = ServerConfig {
        bind_addr: args.bind,
        port: args.port,
    };

    // No GPIO/PWM hardware on the host, drive the simulated board
    if let Err(e) = tcp_motor_runtime::runtime::run(SimBoard::new(), &config).await {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    }
}
