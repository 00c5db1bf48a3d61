//! Generic container for one optional polymorphic value.
//!
//! [`Poly<P>`] holds either nothing or one boxed payload viewed through
//! the capability set `P`. On the wire a present value is the 2-element
//! sequence `["<discriminator>", <payload>]` and an absent value is the
//! empty sequence; the serde implementations live in [`crate::codec`].

use std::fmt;

use crate::registry;
use crate::value::{Admits, PolyValue};

/// One optional payload viewed through the capability set `P`.
///
/// `P` is a capability trait object such as `dyn Job`; any concrete type
/// admitted by `P` can be stored and travels with its registered
/// discriminator. Absence is a first-class state so the container can sit
/// directly in serialisable structs.
///
/// ```
/// use serde::{Deserialize, Serialize};
///
/// trait Job: polybox::PolyValue {}
/// polybox::capability!(Job);
///
/// #[derive(Debug, Default, Serialize, Deserialize)]
/// struct EmailJob {
///     message: String,
/// }
/// impl Job for EmailJob {}
///
/// polybox::register::<dyn Job, EmailJob>("email");
///
/// let job = polybox::Poly::<dyn Job>::new(EmailJob {
///     message: "Hello World!".into(),
/// });
/// let wire = serde_json::to_string(&job)?;
/// assert_eq!(wire, r#"["email",{"message":"Hello World!"}]"#);
///
/// let back: polybox::Poly<dyn Job> = serde_json::from_str(&wire)?;
/// assert_eq!(back.discriminator().as_deref(), Some("email"));
/// # Ok::<(), serde_json::Error>(())
/// ```
pub struct Poly<P: ?Sized> {
    value: Option<Box<P>>,
}

impl<P: ?Sized> Poly<P> {
    /// Creates an absent container.
    #[must_use]
    pub const fn none() -> Self {
        Self { value: None }
    }

    /// Boxes a concrete payload behind the capability set `P`.
    #[must_use]
    pub fn new<S>(value: S) -> Self
    where
        P: Admits<S>,
    {
        Self {
            value: Some(P::admit(value)),
        }
    }

    /// Returns `true` when no payload is held.
    ///
    /// Suitable as a serde skip predicate:
    /// `#[serde(default, skip_serializing_if = "Poly::is_none")]`.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        self.value.is_none()
    }

    /// Returns `true` when a payload is held.
    #[must_use]
    pub const fn is_some(&self) -> bool {
        self.value.is_some()
    }

    /// Borrows the payload, if present.
    #[must_use]
    pub fn value(&self) -> Option<&P> {
        self.value.as_deref()
    }

    /// Mutably borrows the payload, if present.
    #[must_use]
    pub fn value_mut(&mut self) -> Option<&mut P> {
        self.value.as_deref_mut()
    }

    /// Removes and returns the payload, leaving the container absent.
    #[must_use]
    pub const fn take(&mut self) -> Option<Box<P>> {
        self.value.take()
    }
}

impl<P> Poly<P>
where
    P: ?Sized + PolyValue + 'static,
{
    /// Resolves the discriminator for the held payload against the
    /// default registry, preferring mappings specialised to `P`.
    ///
    /// Returns `None` when the container is absent or the payload's
    /// concrete type has no mapping in either tier.
    #[must_use]
    pub fn discriminator(&self) -> Option<String> {
        registry::default_discriminator_for(self.value.as_deref()?)
    }

    /// Builds a fresh zero-value payload for `discriminator` from the
    /// default registry.
    ///
    /// Returns `None` when the discriminator is unregistered for `P` or
    /// the resolved type cannot be rebuilt behind `P`.
    #[must_use]
    pub fn discriminated(discriminator: &str) -> Option<Box<P>> {
        registry::default_discriminated(discriminator)
    }
}

impl<P: ?Sized> Default for Poly<P> {
    fn default() -> Self {
        Self::none()
    }
}

impl<P: ?Sized> From<Box<P>> for Poly<P> {
    fn from(value: Box<P>) -> Self {
        Self { value: Some(value) }
    }
}

impl<P> fmt::Debug for Poly<P>
where
    P: ?Sized + PolyValue,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tuple = f.debug_tuple("Poly");
        if let Some(value) = self.value.as_deref() {
            tuple.field(&value.type_name());
        }
        tuple.finish()
    }
}
