use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// No block provider was attached before `layout` was called.
    #[error("no block provider attached to the layout engine")]
    MissingProvider,

    #[error("row {index} out of range for provider with {count} rows")]
    RowOutOfRange { index: usize, count: usize },
}
