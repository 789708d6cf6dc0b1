use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_WS_ADDR: &str = "127.0.0.1:8765";

#[derive(Debug, Parser)]
#[command(name = "study_timer", about = "PreparAI study timer: Pomodoro, essay and mock-exam clocks")]
pub struct Cli {
    /// Serve the timer over WebSocket instead of the terminal
    #[arg(long)]
    pub daemon: bool,

    /// WebSocket listen address (daemon mode)
    #[arg(long, default_value = DEFAULT_WS_ADDR)]
    pub addr: SocketAddr,

    /// Directory holding the timer snapshot
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Activity log file
    #[arg(short, long)]
    pub log: Option<PathBuf>,

    /// Do not raise desktop notifications
    #[arg(long)]
    pub no_desktop_notify: bool,

    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub daemon: bool,
    pub ws_addr: SocketAddr,
    pub data_dir: PathBuf,
    pub activity_log: PathBuf,
    pub desktop_notify: bool,
    pub verbose: bool,
}

fn default_data_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".local/share/study_timer")
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        let data_dir = cli.data_dir.unwrap_or_else(default_data_dir);
        let activity_log = cli
            .log
            .unwrap_or_else(|| data_dir.join("activity.log"));
        Self {
            daemon: cli.daemon,
            ws_addr: cli.addr,
            data_dir,
            activity_log,
            desktop_notify: !cli.no_desktop_notify,
            verbose: cli.verbose,
        }
    }
}

impl Config {
    pub fn from_args() -> Self {
        Cli::parse().into()
    }
}
