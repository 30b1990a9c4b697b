//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements   | Connects to                 |
//! |------------|--------------|-----------------------------|
//! | `log_sink` | EventSink    | Serial log output           |
//! | `time`     | time base    | ESP32 system timer          |
//! | `wifi`     | -            | ESP-IDF WiFi STA            |
//! | `ws`       | Subscriber   | ESP-IDF httpd WebSocket     |

pub mod log_sink;
pub mod time;
pub mod wifi;
#[cfg(target_os = "espidf")]
pub mod ws;
