//! Command-line surface.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "wg-provision",
    version,
    about = "Provision WireGuard client configs from a VPN provider account"
)]
pub struct Cli {
    /// Region id to provision (repeatable; default: every region in the
    /// directory)
    #[arg(long)]
    pub region: Vec<String>,

    /// How to choose among a region's candidate servers
    #[arg(long, value_enum, default_value_t = Mode::Latency)]
    pub mode: Mode,

    /// 1-based candidate index for manual mode (repeatable). With manual
    /// mode and no index, the candidate list is printed and nothing is
    /// provisioned.
    #[arg(long)]
    pub select: Vec<usize>,

    /// Provider account username (overrides WGPROV__PROVIDER__USERNAME)
    #[arg(long)]
    pub username: Option<String>,

    /// Provider account password (prefer WGPROV__PROVIDER__PASSWORD or .env
    /// over the flag; flags leak into shell history)
    #[arg(long)]
    pub password: Option<String>,

    /// Directory to write config files into
    #[arg(long, default_value = ".")]
    pub output: PathBuf,

    /// Path to the provider CA certificate (PEM) used to pin registration TLS
    #[arg(long)]
    pub ca_cert: Option<PathBuf>,

    /// Override the account API base URL
    #[arg(long)]
    pub api_url: Option<String>,

    /// Enable debug logging
    #[arg(long, short)]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Operator picks by index from the enumerated list
    Manual,
    /// First candidate that answers a reachability probe
    First,
    /// Candidate with the lowest measured latency
    Latency,
}
