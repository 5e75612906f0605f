//! Server-to-client sync of Lumar state.
//!
//! The server side encodes `WorldEvent`s into bit-stable frames and hands them
//! to the I/O layer through a channel. The client side mirrors the pushed
//! state and answers local queries from it.

pub mod channel;
pub mod client;
pub mod client_rainline;
pub mod error;
pub mod protocol;

pub use channel::{Outbound, SyncChannel};
pub use client::{ClientLunagreeData, ClientMirror, ClientSeetheData};
pub use client_rainline::ClientRainlineData;
pub use error::DecodeError;
pub use protocol::{Frame, FrameTag};
