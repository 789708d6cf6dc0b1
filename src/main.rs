use std::sync::Arc;

use study_timer::clock::wall::SystemClock;
use study_timer::config::config::Config;
use study_timer::notify::notify::{ActivityLog, Alerts, DesktopNotifier};
use study_timer::pomodoro::pomodoro::{
    CYCLES_BEFORE_LONG_BREAK, FOCUS_SECONDS, LONG_BREAK_SECONDS, SHORT_BREAK_SECONDS,
};
use study_timer::render::render::{Renderer, TerminalRenderer, WatchRenderer};
use study_timer::storage::storage::FileStore;
use study_timer::timer::command::Command;
use study_timer::timer::driver::{Driver, SAMPLE_PERIOD};
use study_timer::timer::timer::StudyTimer;
use study_timer::ws::websocket_server;
use tokio::io::{AsyncBufReadExt, BufReader};

fn build_alerts(config: &Config) -> Alerts {
    let mut alerts = Alerts::new();
    if config.desktop_notify {
        alerts = alerts.with(DesktopNotifier);
    }
    match ActivityLog::open(&config.activity_log) {
        Ok(log) => alerts = alerts.with(log),
        Err(e) => log::warn!(
            "Activity log {} unavailable: {}",
            config.activity_log.display(),
            e
        ),
    }
    alerts
}

fn mount(config: &Config, renderer: Box<dyn Renderer>) -> StudyTimer {
    StudyTimer::mount(
        Box::new(FileStore::new(&config.data_dir)),
        Box::new(build_alerts(config)),
        renderer,
        Arc::new(SystemClock),
    )
}

fn print_banner(config: &Config) {
    println!("🍅 PreparAI Study Timer");
    println!("======================================================");
    println!(
        "Pomodoro settings: {}min focus / {}min break / {}min long break every {} cycles",
        FOCUS_SECONDS / 60,
        SHORT_BREAK_SECONDS / 60,
        LONG_BREAK_SECONDS / 60,
        CYCLES_BEFORE_LONG_BREAK
    );
    println!("Snapshot directory: {}", config.data_dir.display());
    println!("Logging to: {}", config.activity_log.display());
    if config.verbose {
        println!("Verbose mode: ON");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_args();
    let default_level = if config.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    print_banner(&config);

    if config.daemon {
        return run_daemon_mode(&config).await;
    }
    run_terminal_mode(&config).await
}

/// Interactive mode: one command per line on stdin.
async fn run_terminal_mode(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("Commands: start | pause | reset | mode <pomodoro|essay|exam> | toggle | status | quit\n");

    let driver = Driver::new(mount(config, Box::new(TerminalRenderer::new())), SAMPLE_PERIOD);
    driver.toggle_panel();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let line = line.trim();
                if matches!(line, "quit" | "exit" | "q") {
                    break;
                }
                match line.parse::<Command>() {
                    Ok(command) => {
                        let view = driver.execute(command);
                        if command == Command::Status {
                            println!("\n{}", view.status_line());
                        }
                    }
                    Err(e) => eprintln!("\n{}", e),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    println!("\n{}", driver.view().status_line());
    Ok(())
}

/// Daemon mode: commands and view updates over WebSocket.
async fn run_daemon_mode(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("Running WebSocket server on ws://{}\n", config.ws_addr);

    let (renderer, views) = WatchRenderer::new();
    let driver = Arc::new(Driver::new(mount(config, Box::new(renderer)), SAMPLE_PERIOD));

    let server_driver = Arc::clone(&driver);
    let addr = config.ws_addr;
    let server = tokio::spawn(async move {
        if let Err(e) = websocket_server::start_websocket_server(addr, server_driver, views).await {
            log::error!("WebSocket server error: {}", e);
        }
    });

    tokio::signal::ctrl_c().await?;
    server.abort();
    log::info!("Shutting down, last state: {}", driver.view().status_line());
    Ok(())
}
