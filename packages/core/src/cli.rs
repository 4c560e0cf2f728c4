use clap::Parser;

/// Device monitor CLI arguments
#[derive(Debug, Parser)]
#[command(
    name = "device-monitor",
    version,
    about = "Telemetry registry and threshold diagnostics for monitored devices"
)]
pub struct Cli {
    /// SQLite database URL (overrides DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// HTTP listen port (overrides PORT)
    #[arg(long)]
    pub port: Option<u16>,
}
