// pilotsync-api: wire protocol and transport for the dashboard backend channel

pub mod control;
pub mod error;
pub mod protocol;
pub mod transport;
pub mod websocket;

pub use control::{ControlClient, ControlRequest};
pub use error::Error;
pub use protocol::{Envelope, MessageType};
pub use websocket::{ChannelEvent, ReconnectConfig, WebSocketHandle};
