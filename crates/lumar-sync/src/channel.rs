use crossbeam_channel::{unbounded, Receiver, Sender};
use lumar_core::types::ObserverId;
use lumar_world::{Recipients, World, WorldEvent};

use crate::protocol::Frame;

/// One encoded frame addressed to one observer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub observer: ObserverId,
    pub frame: Vec<u8>,
}

/// Server half of the sync channel.
///
/// Sending never blocks the simulation thread: the queue is unbounded and
/// drained by the I/O layer. Frames to one observer arrive in send order.
pub struct SyncChannel {
    sender: Sender<Outbound>,
}

impl SyncChannel {
    /// Create the channel and the receiver the I/O layer drains.
    pub fn new() -> (Self, Receiver<Outbound>) {
        let (sender, receiver) = unbounded();
        (Self { sender }, receiver)
    }

    /// Encode and send `events`, resolving broadcasts against the world's
    /// connected observers. Returns the number of frames queued.
    pub fn publish(&self, world: &World, events: &[WorldEvent]) -> usize {
        let mut sent = 0;
        for event in events {
            match *event {
                WorldEvent::KnownLocationsChanged {
                    observer,
                    locations,
                } => {
                    let frame = Frame::KnownLocations(locations).encode();
                    if !self.send(observer, frame) {
                        return sent;
                    }
                    sent += 1;
                }
                WorldEvent::SeetheChanged { state, recipients } => {
                    let frame = Frame::Seethe(state).encode();
                    let targets = match recipients {
                        Recipients::AllConnected => world.connected_observers(),
                        Recipients::Only(id) => vec![id],
                    };
                    for observer in targets {
                        if !self.send(observer, frame.clone()) {
                            return sent;
                        }
                        sent += 1;
                    }
                }
            }
        }
        sent
    }

    fn send(&self, observer: ObserverId, frame: Vec<u8>) -> bool {
        match self.sender.send(Outbound { observer, frame }) {
            Ok(()) => true,
            Err(_) => {
                log::warn!(
                    "Sync receiver closed; dropping frames for observer {}",
                    observer.0
                );
                false
            }
        }
    }
}
