use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;

/// Run the card economy engine HTTP service
#[derive(Parser, Debug)]
#[command(name = "card-economy-engine")]
#[command(about = "Card economy service: rarity-priced sells and two-party trades", long_about = None)]
pub struct CliArgs {
    /// Directory holding the persisted JSON documents
    #[arg(
        long = "data-dir",
        value_name = "DIR",
        default_value = "data/persist",
        help = "Primary storage directory for ledger, quota, and session documents"
    )]
    pub data_dir: PathBuf,

    /// Optional fallback mirror directory
    #[arg(
        long = "mirror-dir",
        value_name = "DIR",
        help = "Secondary storage directory consulted when the primary fails"
    )]
    pub mirror_dir: Option<PathBuf>,

    /// Address to bind the HTTP listener on
    #[arg(
        long = "bind",
        value_name = "ADDR",
        default_value = "127.0.0.1",
        help = "IP address to bind the HTTP listener on"
    )]
    pub bind: IpAddr,

    /// Port to listen on
    #[arg(
        long = "port",
        value_name = "PORT",
        default_value_t = 5173,
        help = "TCP port to listen on"
    )]
    pub port: u16,

    /// Per-player daily sell limit in card units
    #[arg(
        long = "daily-limit",
        value_name = "COUNT",
        default_value_t = 5,
        help = "Maximum card units each player may sell per UTC day"
    )]
    pub daily_limit: u32,
}
