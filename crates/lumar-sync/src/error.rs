/// Reasons a received frame is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("frame too short ({0} bytes, header needs {1})")]
    TooShort(usize, usize),

    #[error("unknown frame tag {0}")]
    UnknownTag(u8),

    #[error("unsupported protocol version {0}")]
    UnsupportedVersion(u8),

    #[error("frame length mismatch for tag {tag}: expected {expected} bytes, got {actual}")]
    LengthMismatch { tag: u8, expected: usize, actual: usize },

    #[error("present mask {0:#06x} has bits beyond the known-location slots")]
    InvalidMask(u16),
}
