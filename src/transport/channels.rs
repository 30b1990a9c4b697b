//! Inter-task channels between the WebSocket server and the control loop.
//!
//! Uses `embassy-sync` bounded MPMC channels so the httpd worker thread can
//! hand frames to the synchronous control loop without sharing the
//! regulation state.  Handlers only ever `try_send`; a full queue drops the
//! frame with a warning rather than blocking the server.
//!
//! ```text
//! ┌──────────────┐  InboundFrame  ┌──────────────┐
//! │  httpd / ws  │──────────────▶│ Control Loop │
//! │  (handlers)  │  SessionEvent  │    (sync)    │
//! │              │──────────────▶│              │
//! └──────────────┘                └──────────────┘
//! ```

use core::fmt;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{info, warn};

use crate::app::ports::{ActuatorPort, EventSink};
use crate::app::service::RegulatorService;
use crate::protocol::broadcaster::{ClientId, Subscriber};

/// Longest accepted command frame in bytes.
pub const MAX_FRAME_LEN: usize = 64;

/// Channel depth for inbound command frames.
pub const INBOUND_DEPTH: usize = 8;

/// Channel depth for connect / disconnect notifications.
pub const SESSION_DEPTH: usize = 4;

/// Inbound text frame from an observer, delivered to the control loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundFrame {
    /// Which session sent this frame.
    pub client_id: ClientId,
    pub text: heapless::String<MAX_FRAME_LEN>,
}

/// Observer lifecycle, carrying the outbound handle on connect.
pub enum SessionEvent<S> {
    Connected(ClientId, S),
    Disconnected(ClientId),
}

pub type FrameQueue<const N: usize> = Channel<CriticalSectionRawMutex, InboundFrame, N>;
pub type SessionQueue<S, const N: usize> = Channel<CriticalSectionRawMutex, SessionEvent<S>, N>;

/// Inbound command channel: ws handler → control loop.
pub static INBOUND_CHANNEL: FrameQueue<INBOUND_DEPTH> = Channel::new();

/// Why a frame never reached the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameDropped {
    NotUtf8,
    TooLong,
    QueueFull,
}

impl fmt::Display for FrameDropped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotUtf8 => write!(f, "frame is not valid UTF-8"),
            Self::TooLong => write!(f, "frame exceeds {} bytes", MAX_FRAME_LEN),
            Self::QueueFull => write!(f, "inbound queue full"),
        }
    }
}

/// Queue a raw text payload.  Called from the transport's thread.
pub fn push_frame<const N: usize>(
    queue: &FrameQueue<N>,
    client_id: ClientId,
    raw: &[u8],
) -> Result<(), FrameDropped> {
    let text = core::str::from_utf8(raw).map_err(|_| FrameDropped::NotUtf8)?;
    let text = heapless::String::try_from(text).map_err(|_| FrameDropped::TooLong)?;
    queue
        .try_send(InboundFrame { client_id, text })
        .map_err(|_| FrameDropped::QueueFull)
}

/// Apply every queued frame, in arrival order.  Returns how many were taken.
pub fn drain_frames<A, S, const N: usize>(
    queue: &FrameQueue<N>,
    service: &mut RegulatorService<A, S>,
    now_ms: u64,
    sink: &mut impl EventSink,
) -> usize
where
    A: ActuatorPort,
    S: Subscriber,
{
    let mut taken = 0;
    while let Ok(frame) = queue.try_receive() {
        taken += 1;
        // Rejections are already logged and emitted by the service.
        let _ = service.handle_frame(&frame.text, now_ms, sink);
    }
    taken
}

/// Register and drop observers announced by the transport.
pub fn drain_sessions<A, S, const N: usize>(
    queue: &SessionQueue<S, N>,
    service: &mut RegulatorService<A, S>,
    sink: &mut impl EventSink,
) where
    A: ActuatorPort,
    S: Subscriber,
{
    while let Ok(event) = queue.try_receive() {
        match event {
            SessionEvent::Connected(id, subscriber) => {
                if let Err(e) = service.subscribe(id, subscriber, sink) {
                    warn!("Session {}: {}", id, e);
                } else {
                    info!("Session {} connected", id);
                }
            }
            SessionEvent::Disconnected(id) => {
                service.unsubscribe(id, sink);
                info!("Session {} disconnected", id);
            }
        }
    }
}
