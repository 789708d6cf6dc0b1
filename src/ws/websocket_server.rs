use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::protocol::Message;

use crate::render::render::View;
use crate::timer::command::{Command, CommandResponse};
use crate::timer::driver::Driver;

pub type ViewReceiver = watch::Receiver<Option<View>>;

pub async fn start_websocket_server(
    addr: SocketAddr,
    driver: Arc<Driver>,
    views: ViewReceiver,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind(&addr).await?;
    log::info!("WebSocket server listening on: {}", addr);

    while let Ok((stream, peer_addr)) = listener.accept().await {
        log::info!("New WebSocket connection from: {}", peer_addr);
        tokio::spawn(handle_connection(
            stream,
            peer_addr,
            Arc::clone(&driver),
            views.clone(),
        ));
    }

    Ok(())
}

pub fn handle_text(driver: &Driver, text: &str) -> CommandResponse {
    match text.parse::<Command>() {
        Ok(command) => {
            log::debug!("[WebSocket] Received: {:?}", command);
            CommandResponse::ok(driver.execute(command))
        }
        Err(e) => {
            log::warn!("Failed to parse message: {}", e);
            CommandResponse::error(format!("Parse error: {}", e))
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    driver: Arc<Driver>,
    mut views: ViewReceiver,
) {
    let ws_stream = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            log::warn!("WebSocket handshake failed with {}: {}", peer_addr, e);
            return;
        }
    };

    log::debug!("WebSocket handshake completed with {}", peer_addr);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    views.mark_unchanged();
    // last view this client saw, so a mutation is not echoed twice
    let mut last_sent: Option<View> = None;

    loop {
        tokio::select! {
            msg = ws_receiver.next() => {
                let Some(msg) = msg else { break };
                match msg {
                    Ok(Message::Text(text)) => {
                        let response = handle_text(&driver, &text);
                        if let Ok(response_json) = serde_json::to_string(&response) {
                            if let Err(e) = ws_sender.send(Message::Text(response_json)).await {
                                log::warn!("Failed to send WebSocket response: {}", e);
                                break;
                            }
                            if response.view.is_some() {
                                last_sent = response.view;
                            }
                        }
                    }
                    Ok(Message::Close(_)) => {
                        log::info!("WebSocket connection closed by {}", peer_addr);
                        break;
                    }
                    Ok(Message::Ping(data)) => {
                        if let Err(e) = ws_sender.send(Message::Pong(data)).await {
                            log::warn!("Failed to send pong: {}", e);
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        log::warn!("WebSocket error from {}: {}", peer_addr, e);
                        break;
                    }
                }
            }
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let update = views.borrow_and_update().clone();
                let Some(view) = update else { continue };
                if last_sent.as_ref() == Some(&view) {
                    continue;
                }
                let push = CommandResponse::ok(view);
                if let Ok(json) = serde_json::to_string(&push) {
                    if let Err(e) = ws_sender.send(Message::Text(json)).await {
                        log::warn!("Failed to push view to {}: {}", peer_addr, e);
                        break;
                    }
                    last_sent = push.view;
                }
            }
        }
    }

    log::info!("WebSocket connection with {} terminated", peer_addr);
}
