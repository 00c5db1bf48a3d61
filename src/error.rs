//! Error types for polymorphic encode and decode failures.
//!
//! Uses `thiserror` for ergonomic error handling with typed variants that
//! can be inspected by callers. Errors surface to the host serialisation
//! framework through the serde error channel; the registry itself never
//! fails (registration is last-write-wins and lookups return `Option`).

use std::any::type_name;
use thiserror::Error;

/// Errors that can occur while encoding or decoding a polymorphic value.
#[derive(Debug, Clone, Error)]
pub enum PolyError {
    /// Something that should carry a discriminator does not: on encode, a
    /// present value whose concrete type has no mapping under the active
    /// capability set; on decode, an encoded sequence whose leading
    /// discriminator is the empty string.
    #[error("missing discriminator for {subject} as {capability}")]
    MissingDiscriminator {
        /// What lacked the discriminator: the concrete payload type on
        /// encode, or the encoded payload on decode.
        subject: &'static str,
        /// Name of the capability set the container was declared with.
        capability: &'static str,
    },

    /// A discriminator string was read from input but does not resolve to
    /// a reconstructible type for the active capability set (decode-side
    /// failure; unknown or mis-registered tag).
    #[error("no type registered for discriminator '{discriminator}' as {capability}")]
    MissingTypeFor {
        /// The discriminator read from the wire.
        discriminator: String,
        /// Name of the capability set the container was declared with.
        capability: &'static str,
    },

    /// The input does not match the expected wire shape (wrong element
    /// type, wrong arity, or not a sequence at all).
    #[error("invalid polymorphic encoding: {reason}")]
    InvalidEncoding {
        /// Description of the shape mismatch.
        reason: String,
    },
}

impl PolyError {
    /// Creates a missing-discriminator error for a concrete type held
    /// under capability set `P`.
    #[must_use]
    pub fn missing_discriminator<P: ?Sized>(concrete: &'static str) -> Self {
        Self::MissingDiscriminator {
            subject: concrete,
            capability: type_name::<P>(),
        }
    }

    /// Creates a missing-discriminator error for decoded input whose
    /// discriminator slot holds the empty string.
    #[must_use]
    pub fn empty_discriminator<P: ?Sized>() -> Self {
        Self::MissingDiscriminator {
            subject: "encoded payload",
            capability: type_name::<P>(),
        }
    }

    /// Creates a missing-type error for a discriminator read under
    /// capability set `P`.
    #[must_use]
    pub fn missing_type_for<P: ?Sized>(discriminator: impl Into<String>) -> Self {
        Self::MissingTypeFor {
            discriminator: discriminator.into(),
            capability: type_name::<P>(),
        }
    }

    /// Creates an invalid-encoding error with a shape description.
    #[must_use]
    pub fn invalid_encoding(reason: impl Into<String>) -> Self {
        Self::InvalidEncoding {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PolyError;

    trait Job {}

    #[test]
    fn missing_discriminator_names_both_types() {
        let err = PolyError::missing_discriminator::<dyn Job>("crate::EmailJob");
        let text = err.to_string();
        assert!(text.contains("missing discriminator"));
        assert!(text.contains("EmailJob"));
        assert!(text.contains("Job"));
    }

    #[test]
    fn empty_discriminator_points_at_the_payload() {
        let err = PolyError::empty_discriminator::<dyn Job>();
        assert!(err.to_string().contains("encoded payload"));
    }

    #[test]
    fn missing_type_for_quotes_the_discriminator() {
        let err = PolyError::missing_type_for::<dyn Job>("email");
        assert!(err.to_string().contains("'email'"));
    }

    #[test]
    fn invalid_encoding_carries_the_reason() {
        let err = PolyError::invalid_encoding("expected a sequence");
        assert_eq!(
            err.to_string(),
            "invalid polymorphic encoding: expected a sequence"
        );
    }
}
