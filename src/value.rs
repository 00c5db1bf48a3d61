//! Capability surface shared by every polymorphic payload.
//!
//! A payload is any `'static` type that serialises with serde. The
//! [`PolyValue`] trait erases the payload behind an object-safe surface:
//! serialisation goes through `erased_serde`, and identity goes through
//! [`std::any::Any`] so the registry can key lookups by concrete type.
//!
//! Capability sets are plain `dyn`-compatible traits declared with
//! [`PolyValue`] as a supertrait and wired up with the [`capability!`]
//! macro. The macro implements [`Admits`] for the trait object, which is
//! what lets containers and the registry prove at compile time that a
//! concrete type satisfies the capability set it is filed under.

use std::any::Any;

/// Object-safe surface implemented by every polymorphic payload.
///
/// Implemented automatically for any `'static` type that implements
/// [`serde::Serialize`]; capability traits name it as a supertrait so the
/// trait object inherits erased serialisation and runtime identity.
pub trait PolyValue: erased_serde::Serialize + 'static {
    /// Borrows the payload as [`Any`] for concrete-type identity and
    /// downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Mutably borrows the payload as [`Any`] for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Returns the fully qualified name of the concrete payload type.
    fn type_name(&self) -> &'static str;
}

impl<T> PolyValue for T
where
    T: serde::Serialize + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Marks a capability trait object as admitting concrete payloads of
/// type `S`.
///
/// Implemented for `dyn Capability` by the [`capability!`] macro. The
/// bound `P: Admits<S>` is how registration and construction enforce, at
/// compile time, that `S` actually satisfies the capability set `P`.
pub trait Admits<S>: PolyValue {
    /// Boxes a concrete payload behind the capability trait object.
    fn admit(value: S) -> Box<Self>;
}

/// Wires a capability trait into the polymorphic machinery.
///
/// The trait must be `dyn`-compatible and name [`PolyValue`] as a
/// supertrait:
///
/// ```
/// use serde::{Deserialize, Serialize};
///
/// trait Job: polybox::PolyValue {
///     fn run(&mut self) -> String;
/// }
/// polybox::capability!(Job);
///
/// #[derive(Debug, Default, Serialize, Deserialize)]
/// struct EmailJob {
///     message: String,
/// }
///
/// impl Job for EmailJob {
///     fn run(&mut self) -> String {
///         format!("sending: {}", self.message)
///     }
/// }
///
/// let job = polybox::Poly::<dyn Job>::new(EmailJob {
///     message: "hello".into(),
/// });
/// assert!(job.is_some());
/// ```
#[macro_export]
macro_rules! capability {
    ($capability:path) => {
        impl<S> $crate::Admits<S> for dyn $capability
        where
            S: $crate::PolyValue,
            S: $capability,
        {
            fn admit(value: S) -> ::std::boxed::Box<Self> {
                ::std::boxed::Box::new(value)
            }
        }
    };
}
