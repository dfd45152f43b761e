//! Handler contract.

use async_trait::async_trait;

use crate::envelope::Envelope;
use crate::error::HandlerError;
use crate::request::Request;

/// Performs the work for one request type.
///
/// Expected outcomes, including "not found", are returned as an
/// [`Envelope`]. `Err` is reserved for unexpected faults, which the
/// outermost decorator logs before passing them on unchanged.
#[async_trait]
pub trait Handler<R: Request>: Send + Sync {
    async fn handle(&self, request: R) -> Result<Envelope<R::Response>, HandlerError>;
}
