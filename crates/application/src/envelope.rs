//! Uniform success/failure wrapper returned by every request.

use serde::{Deserialize, Serialize};

/// Error half of an [`Envelope`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeError {
    pub message: String,
    pub inner_exception: Option<String>,
}

impl EnvelopeError {
    pub fn new(message: impl Into<String>, inner_exception: Option<String>) -> Self {
        Self {
            message: message.into(),
            inner_exception,
        }
    }
}

impl std::fmt::Display for EnvelopeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner_exception {
            Some(inner) => write!(f, "{} ({inner})", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Outcome of a request: either data or an error, never both.
///
/// A successful envelope may still carry "empty looking" data such as
/// `false` or an empty list; callers decide success by checking
/// [`Envelope::error`], not the data.
///
/// Serialized as `{"data": ..., "error": {"message": ..., "innerException": ...}}`
/// with `null` for the absent half. Deserializing input with both halves
/// set is an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawEnvelope<T>")]
pub struct Envelope<T> {
    data: Option<T>,
    error: Option<EnvelopeError>,
}

/// Unchecked wire form of an [`Envelope`].
#[derive(Deserialize)]
struct RawEnvelope<T> {
    data: Option<T>,
    error: Option<EnvelopeError>,
}

impl<T> TryFrom<RawEnvelope<T>> for Envelope<T> {
    type Error = &'static str;

    fn try_from(raw: RawEnvelope<T>) -> Result<Self, Self::Error> {
        match (raw.data, raw.error) {
            (Some(_), Some(_)) => Err("envelope cannot carry both data and error"),
            (data, error) => Ok(Self { data, error }),
        }
    }
}

impl<T> Envelope<T> {
    /// Wraps a successful value.
    pub fn success(value: T) -> Self {
        Self {
            data: Some(value),
            error: None,
        }
    }

    /// Creates a failed envelope with no data.
    pub fn failure(message: impl Into<String>, inner_exception: Option<String>) -> Self {
        Self {
            data: None,
            error: Some(EnvelopeError::new(message, inner_exception)),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&EnvelopeError> {
        self.error.as_ref()
    }

    /// Converts into a standard `Result`, treating any error as failure.
    pub fn into_result(self) -> Result<Option<T>, EnvelopeError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_has_no_error() {
        let envelope = Envelope::success(42);
        assert!(envelope.is_success());
        assert_eq!(envelope.data(), Some(&42));
        assert!(envelope.error().is_none());
    }

    #[test]
    fn failure_has_no_data() {
        let envelope: Envelope<i32> = Envelope::failure("boom", Some("inner".to_string()));
        assert!(!envelope.is_success());
        assert!(envelope.data().is_none());
        assert_eq!(
            envelope.error(),
            Some(&EnvelopeError::new("boom", Some("inner".to_string())))
        );
    }

    #[test]
    fn falsy_success_values_are_still_success() {
        assert!(Envelope::success(false).is_success());
        assert!(Envelope::success(Vec::<i32>::new()).is_success());
    }

    #[test]
    fn wire_shape_uses_camel_case_and_nulls() {
        let success = serde_json::to_value(Envelope::success(true)).unwrap();
        assert_eq!(success, serde_json::json!({ "data": true, "error": null }));

        let failure = serde_json::to_value(Envelope::<bool>::failure("nope", None)).unwrap();
        assert_eq!(
            failure,
            serde_json::json!({
                "data": null,
                "error": { "message": "nope", "innerException": null }
            })
        );
    }

    #[test]
    fn empty_list_survives_round_trip() {
        let json = serde_json::to_string(&Envelope::success(Vec::<String>::new())).unwrap();
        let back: Envelope<Vec<String>> = serde_json::from_str(&json).unwrap();
        assert!(back.is_success());
        assert_eq!(back.data(), Some(&Vec::new()));
    }

    #[test]
    fn deserializing_both_halves_is_rejected() {
        let json = r#"{"data": 1, "error": {"message": "bad", "innerException": null}}"#;
        let err = serde_json::from_str::<Envelope<i32>>(json).unwrap_err();
        assert!(err.to_string().contains("both data and error"));
    }

    #[test]
    fn failure_survives_round_trip() {
        let json = serde_json::to_string(&Envelope::<i32>::failure("bad", None)).unwrap();
        let back: Envelope<i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Envelope::failure("bad", None));
    }

    #[test]
    fn into_result_splits_halves() {
        assert_eq!(Envelope::success(1).into_result(), Ok(Some(1)));
        let err = Envelope::<i32>::failure("bad", None).into_result().unwrap_err();
        assert_eq!(err.to_string(), "bad");
    }
}
