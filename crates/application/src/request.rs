//! Commands, queries, and self-validation.

/// Result of validating a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid,
    /// The request is rejected, optionally with a reason.
    Invalid(Option<String>),
}

impl Validation {
    /// Rejects the request with a reason.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(Some(message.into()))
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Returns the rejection reason, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Invalid(message) => message.as_deref(),
        }
    }
}

/// Capability of requests that check their own input.
///
/// Requests without constraints keep the default, which accepts
/// everything.
pub trait Validatable {
    fn validate(&self) -> Validation {
        Validation::Valid
    }
}

/// Whether a request changes state or only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Command,
    Query,
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Command => write!(f, "command"),
            Self::Query => write!(f, "query"),
        }
    }
}

/// A command or query handled by exactly one [`Handler`](crate::Handler).
pub trait Request: Validatable + std::fmt::Debug + Send + Sync + 'static {
    /// Data carried by a successful [`Envelope`](crate::Envelope).
    type Response: Send + 'static;

    const KIND: RequestKind;

    /// Short type name used in logs and metrics.
    fn type_name() -> &'static str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Ping;

    impl Validatable for Ping {}

    impl Request for Ping {
        type Response = ();
        const KIND: RequestKind = RequestKind::Query;
    }

    #[test]
    fn default_validation_accepts() {
        assert!(Ping.validate().is_valid());
    }

    #[test]
    fn invalid_carries_message() {
        let validation = Validation::invalid("nope");
        assert!(!validation.is_valid());
        assert_eq!(validation.message(), Some("nope"));
        assert_eq!(Validation::Invalid(None).message(), None);
    }

    #[test]
    fn type_name_strips_module_path() {
        assert_eq!(Ping::type_name(), "Ping");
        assert_eq!(RequestKind::Command.to_string(), "command");
    }
}
