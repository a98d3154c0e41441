/// Recoverable conditions reported by the history buffer.
///
/// None of these are fatal: the buffer is always left unchanged (or, for
/// capacities, clamped) and callers may simply ignore the error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HistoryError {
    /// Undo at the first entry or redo at the last one.
    #[error("Nothing to undo or redo at this end of the history")]
    EmptyHistory,
    #[error("History index {index} is out of range (len {len})")]
    OutOfRange { index: usize, len: usize },
    #[error("Invalid history capacity {0}, clamped to 1")]
    InvalidCapacity(usize),
}
