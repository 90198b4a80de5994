/// Errors of the convenience layers built on the primitives.
///
/// The primitives themselves never fail: contention is reported as a plain
/// `false` or `Err(observed)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error("lock still held after {attempts} attempts")]
    Busy { attempts: usize },
    #[error("instance slot {index} is already occupied")]
    Occupied { index: usize },
    #[error("instance slot {index} does not hold the expected instance")]
    Mismatch { index: usize },
    #[error("instance slot {index} is not held by the caller")]
    NotRegistered { index: usize },
    #[error("instance index {index} out of range (length {len})")]
    IndexOutOfRange { index: usize, len: usize },
}
