use lumar_core::types::{KnownLocationSet, ObserverId, SeetheState};

/// Who should receive a broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipients {
    /// Every observer connected when the event is published.
    AllConnected,
    /// A single observer, e.g. the full resend on connect.
    Only(ObserverId),
}

/// A state change the sync layer must push to observers.
/// Produced by the world in step order: seethe first, then trackers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldEvent {
    KnownLocationsChanged {
        observer: ObserverId,
        locations: KnownLocationSet,
    },
    SeetheChanged {
        state: SeetheState,
        recipients: Recipients,
    },
}
