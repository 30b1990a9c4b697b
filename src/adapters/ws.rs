//! WebSocket observer endpoint on the ESP-IDF HTTP server.
//!
//! Every connection on `/ws` is an observer.  The handler runs on the httpd
//! worker thread and never touches regulation state: it announces sessions
//! through [`SESSION_CHANNEL`] (handing over a detached sender for
//! broadcasts) and forwards text payloads to the inbound frame queue.

use esp_idf_svc::http::server::ws::EspHttpWsDetachedSender;
use esp_idf_svc::http::server::{Configuration, EspHttpServer};
use esp_idf_svc::sys::EspError;
use esp_idf_svc::ws::FrameType;
use log::{info, warn};

use embassy_sync::channel::Channel;

use crate::protocol::broadcaster::Subscriber;
use crate::transport::channels::{
    INBOUND_CHANNEL, MAX_FRAME_LEN, SESSION_DEPTH, SessionEvent, SessionQueue, push_frame,
};

/// Endpoint path the UI connects to.
pub const WS_PATH: &str = "/ws";

/// Session announcements: ws handler → control loop.
pub static SESSION_CHANNEL: SessionQueue<WsSubscriber, SESSION_DEPTH> = Channel::new();

/// Broadcast handle for one connected browser.
pub struct WsSubscriber(EspHttpWsDetachedSender);

impl Subscriber for WsSubscriber {
    type Error = EspError;

    fn send_text(&mut self, frame: &str) -> Result<(), EspError> {
        self.0.send(FrameType::Text(false), frame.as_bytes())
    }
}

/// Start the HTTP server with the observer endpoint registered.
///
/// The returned server must be kept alive for the endpoint to stay up.
pub fn start_server() -> anyhow::Result<EspHttpServer<'static>> {
    let mut server = EspHttpServer::new(&Configuration::default())?;

    server.ws_handler(WS_PATH, move |ws| -> Result<(), EspError> {
        let id = ws.session();

        if ws.is_new() {
            let sender = ws.create_detached_sender()?;
            if SESSION_CHANNEL
                .try_send(SessionEvent::Connected(id, WsSubscriber(sender)))
                .is_err()
            {
                warn!("WS: session queue full, client #{} not registered", id);
            }
            return Ok(());
        }

        if ws.is_closed() {
            if SESSION_CHANNEL
                .try_send(SessionEvent::Disconnected(id))
                .is_err()
            {
                warn!("WS: session queue full, close of #{} lost", id);
            }
            return Ok(());
        }

        // The payload length must be fetched with an empty buffer first and
        // then read exactly once.
        let (_frame_type, len) = ws.recv(&mut [])?;
        let mut buf = [0u8; 2 * MAX_FRAME_LEN];
        if len > buf.len() {
            warn!("WS: client #{} sent {} bytes, closing", id, len);
            ws.send(FrameType::Close, &[])?;
            return Ok(());
        }
        ws.recv(&mut buf[..len])?;

        if let Err(e) = push_frame(&INBOUND_CHANNEL, id, &buf[..len]) {
            warn!("WS: dropped frame from #{}: {}", id, e);
        }
        Ok(())
    })?;

    info!("WS: observer endpoint on {}", WS_PATH);
    Ok(server)
}
