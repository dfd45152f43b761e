//! Cross-cutting wrappers composed around every handler.
//!
//! The order is fixed by [`decorate`]: unhandled-error logging outside,
//! validation inside, then the handler itself. Validation failures are
//! expected outcomes and never reach the error log.

use std::panic::AssertUnwindSafe;

use async_trait::async_trait;
use futures_util::FutureExt;

use crate::envelope::Envelope;
use crate::error::HandlerError;
use crate::handler::Handler;
use crate::messages::validator_message;
use crate::request::{Request, Validation};

/// A handler wrapped in the standard decorator chain.
pub type Pipeline<H> = UnhandledErrorDecorator<ValidationDecorator<H>>;

/// Wraps a handler in the standard decorator chain.
pub fn decorate<H>(handler: H) -> Pipeline<H> {
    UnhandledErrorDecorator::new(ValidationDecorator::new(handler))
}

/// Rejects invalid requests before they reach the inner handler.
pub struct ValidationDecorator<H> {
    inner: H,
}

impl<H> ValidationDecorator<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }
}

#[async_trait]
impl<R, H> Handler<R> for ValidationDecorator<H>
where
    R: Request,
    H: Handler<R>,
{
    async fn handle(&self, request: R) -> Result<Envelope<R::Response>, HandlerError> {
        match request.validate() {
            Validation::Valid => self.inner.handle(request).await,
            Validation::Invalid(message) => {
                let message =
                    message.unwrap_or_else(|| validator_message::VALIDATION_FAILED.to_string());
                metrics::counter!("requests_rejected_total", "request" => R::type_name())
                    .increment(1);
                tracing::debug!(request_type = R::type_name(), %message, "request rejected");
                Ok(Envelope::failure(message, None))
            }
        }
    }
}

/// Logs faults escaping the inner chain, then passes them on unchanged.
///
/// Covers the three ways a request can end abnormally: an `Err`, a panic
/// (resumed after logging), and the future being dropped before it
/// completes (client disconnect or timeout).
pub struct UnhandledErrorDecorator<H> {
    inner: H,
}

impl<H> UnhandledErrorDecorator<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }
}

/// Logs if dropped while still armed, i.e. when the request future is
/// cancelled mid-flight.
struct InFlight<R: Request> {
    armed: bool,
    _request: std::marker::PhantomData<fn() -> R>,
}

impl<R: Request> InFlight<R> {
    fn new() -> Self {
        Self {
            armed: true,
            _request: std::marker::PhantomData,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl<R: Request> Drop for InFlight<R> {
    fn drop(&mut self) {
        if self.armed {
            metrics::counter!("requests_failed_total", "request" => R::type_name()).increment(1);
            tracing::error!(
                request_kind = %R::KIND,
                request_type = R::type_name(),
                "{} of type {} was cancelled before completing",
                R::KIND,
                R::type_name()
            );
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

#[async_trait]
impl<R, H> Handler<R> for UnhandledErrorDecorator<H>
where
    R: Request,
    H: Handler<R>,
{
    async fn handle(&self, request: R) -> Result<Envelope<R::Response>, HandlerError> {
        let mut in_flight = InFlight::<R>::new();
        let outcome = AssertUnwindSafe(self.inner.handle(request))
            .catch_unwind()
            .await;
        in_flight.disarm();

        match outcome {
            Ok(Ok(envelope)) => {
                metrics::counter!("requests_handled_total", "request" => R::type_name())
                    .increment(1);
                Ok(envelope)
            }
            Ok(Err(error)) => {
                metrics::counter!("requests_failed_total", "request" => R::type_name())
                    .increment(1);
                tracing::error!(
                    error = %error,
                    request_kind = %R::KIND,
                    request_type = R::type_name(),
                    "Unhandled error occurred while processing {} of type {}",
                    R::KIND,
                    R::type_name()
                );
                Err(error)
            }
            Err(payload) => {
                metrics::counter!("requests_failed_total", "request" => R::type_name())
                    .increment(1);
                tracing::error!(
                    panic = panic_message(payload.as_ref()),
                    request_kind = %R::KIND,
                    request_type = R::type_name(),
                    "Panic occurred while processing {} of type {}",
                    R::KIND,
                    R::type_name()
                );
                std::panic::resume_unwind(payload)
            }
        }
    }
}
