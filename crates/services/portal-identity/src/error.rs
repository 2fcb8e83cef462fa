//! Identity error types.

/// Errors raised by the identity SDK and the client around it.
#[derive(thiserror::Error, Debug)]
pub enum IdentityError {
    /// The SDK was used before `initialize` completed.
    #[error("identity client is not initialized")]
    NotInitialized,

    /// Silent acquisition cannot proceed without user interaction.
    #[error("interaction required: {0}")]
    InteractionRequired(String),

    /// No account is designated as active.
    #[error("no active account")]
    NoActiveAccount,

    /// The redirect callback did not match the pending request.
    #[error("redirect response rejected: {0}")]
    Redirect(String),

    /// The identity provider answered with an OAuth error.
    #[error("identity provider error {code}: {description}")]
    Provider { code: String, description: String },

    /// Transport failure while talking to the identity provider.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Token cache could not be read or written.
    #[error("cache storage error: {0}")]
    Storage(String),

    /// Invalid authority or client configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Navigation to the identity provider failed.
    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// OAuth error codes that only an interactive sign-in can resolve.
const INTERACTION_CODES: &[&str] = &[
    "interaction_required",
    "invalid_grant",
    "login_required",
    "consent_required",
];

impl IdentityError {
    /// Whether the failure can be recovered by an interactive redirect.
    #[must_use]
    pub const fn is_interaction_required(&self) -> bool {
        matches!(self, Self::InteractionRequired(_))
    }

    /// Maps an OAuth error response to an error, classifying interaction codes.
    #[must_use]
    pub fn from_oauth(code: &str, description: &str) -> Self {
        if INTERACTION_CODES.contains(&code) {
            Self::InteractionRequired(format!("{code}: {description}"))
        } else {
            Self::Provider {
                code: code.to_string(),
                description: description.to_string(),
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, IdentityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interaction_codes_are_classified() {
        for code in INTERACTION_CODES {
            assert!(IdentityError::from_oauth(code, "x").is_interaction_required());
        }
        let err = IdentityError::from_oauth("invalid_client", "bad secret");
        assert!(!err.is_interaction_required());
        assert_eq!(err.to_string(), "identity provider error invalid_client: bad secret");
    }
}
