//! Handler error types.

use store::StoreError;
use thiserror::Error;

/// Unexpected faults raised while handling a request.
///
/// Expected outcomes such as validation failures or missing items are
/// reported in the [`Envelope`](crate::Envelope) instead.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// An error occurred in the store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
