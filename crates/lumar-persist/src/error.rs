/// Errors that can occur during save/load operations.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("invalid magic bytes (expected LUMR)")]
    InvalidMagic,

    #[error("unsupported save format version {0}")]
    UnsupportedVersion(u16),

    #[error("file too small ({0} bytes, minimum {1})")]
    FileTooSmall(usize, usize),

    #[error("truncated file: expected {expected} bytes, got {actual}")]
    TruncatedFile { expected: usize, actual: usize },

    #[error("observer {0} appears more than once")]
    DuplicateObserver(u64),
}
