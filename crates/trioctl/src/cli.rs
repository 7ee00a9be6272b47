//! Command-line surface for trioctl

use clap::Parser;
use std::path::PathBuf;

// Version is embedded at build time
const VERSION: &str = env!("TRIO_VERSION");

#[derive(Debug, Parser)]
#[command(name = "trioctl")]
#[command(
    about = "Planner -> Reviewer -> Finalizer: 3 tags and a <=25-word summary from a local model",
    long_about = None
)]
#[command(version = VERSION)]
pub struct Cli {
    /// Blog title (prompted for when omitted)
    #[arg(long)]
    pub title: Option<String>,

    /// Blog content (read from stdin until EOF when omitted)
    #[arg(long)]
    pub content: Option<String>,

    /// Config file (default: ~/.config/trio/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Generate endpoint URL
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Model name
    #[arg(long)]
    pub model: Option<String>,

    /// Per-call timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}
