//! Discriminator registry mapping concrete payload types to short,
//! stable wire names.
//!
//! A [`Registry`] holds two precedence tiers. The global tier maps each
//! concrete type to a single discriminator shared by every capability
//! set. The specialised tier scopes a mapping to one capability set and
//! shadows the global tier for lookups under that set, so the same
//! concrete type can carry a shorter name in a narrower context.
//!
//! Alongside the name maps the registry keeps one reconstruction entry
//! per `(capability set, concrete type)` pair. Entries are plain function
//! pointers minted where both types are statically known, which is what
//! lets decoding rebuild a boxed trait object from a discriminator
//! without any runtime reflection.
//!
//! A process-wide default registry backs the crate-level
//! [`register`], [`register_specialized`], [`bind`] and [`reset`]
//! functions; containers consult it implicitly when encoding and
//! decoding. Independent [`Registry`] values can be built for direct
//! lookups in tests or embedding scenarios.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{OnceLock, PoisonError, RwLock};

use serde::de::DeserializeOwned;

use crate::value::{Admits, PolyValue};

/// Rebuilds one payload behind `Box<P>` from a self-describing
/// deserialiser.
pub(crate) type DeserializeFn<P> =
    fn(&mut dyn erased_serde::Deserializer) -> Result<Box<P>, erased_serde::Error>;

/// Monomorphised glue for rebuilding one concrete payload type behind
/// the capability trait object `P`.
struct Reconstructor<P: ?Sized> {
    instantiate: fn() -> Box<P>,
    deserialize: DeserializeFn<P>,
}

fn instantiate_boxed<P, S>() -> Box<P>
where
    P: ?Sized + Admits<S>,
    S: Default,
{
    P::admit(S::default())
}

fn deserialize_boxed<P, S>(
    deserializer: &mut dyn erased_serde::Deserializer,
) -> Result<Box<P>, erased_serde::Error>
where
    P: ?Sized + Admits<S>,
    S: DeserializeOwned,
{
    erased_serde::deserialize::<S>(deserializer).map(P::admit)
}

/// Two-tier mapping between concrete payload types and discriminators,
/// plus the reconstruction entries decoding needs.
///
/// Registration is last-write-wins in every tier. Lookups under a
/// capability set consult that set's specialised tier first and fall
/// back to the global tier; sets without a specialised mapping are
/// unaffected by other sets' specialisations.
#[derive(Default)]
pub struct Registry {
    by_type: HashMap<TypeId, String>,
    by_discriminator: HashMap<String, TypeId>,
    specialized_by_type: HashMap<TypeId, HashMap<TypeId, String>>,
    specialized_by_discriminator: HashMap<TypeId, HashMap<String, TypeId>>,
    reconstructors: HashMap<(TypeId, TypeId), Box<dyn Any + Send + Sync>>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Files the concrete type `S` under `discriminator` in the global
    /// tier and records a reconstruction entry for the capability set
    /// `P`.
    ///
    /// The global mapping is shared by every capability set. Decoding
    /// under a further capability set needs its own entry; add one with
    /// [`Registry::bind`].
    pub fn register<P, S>(&mut self, discriminator: impl Into<String>)
    where
        P: ?Sized + Admits<S> + 'static,
        S: DeserializeOwned + Default + 'static,
    {
        let tag = discriminator.into();
        let concrete = TypeId::of::<S>();
        self.by_type.insert(concrete, tag.clone());
        self.by_discriminator.insert(tag, concrete);
        self.bind::<P, S>();
    }

    /// Files the concrete type `S` under `discriminator` for the
    /// capability set `P` only, shadowing any global mapping when
    /// looking up under `P`.
    pub fn register_specialized<P, S>(&mut self, discriminator: impl Into<String>)
    where
        P: ?Sized + Admits<S> + 'static,
        S: DeserializeOwned + Default + 'static,
    {
        let tag = discriminator.into();
        let capability = TypeId::of::<P>();
        let concrete = TypeId::of::<S>();
        self.specialized_by_type
            .entry(capability)
            .or_default()
            .insert(concrete, tag.clone());
        self.specialized_by_discriminator
            .entry(capability)
            .or_default()
            .insert(tag, concrete);
        self.bind::<P, S>();
    }

    /// Records a reconstruction entry for `S` under the capability set
    /// `P` without touching the name maps.
    ///
    /// Use this when a type registered through another capability set
    /// must also decode behind `P`.
    pub fn bind<P, S>(&mut self)
    where
        P: ?Sized + Admits<S> + 'static,
        S: DeserializeOwned + Default + 'static,
    {
        self.reconstructors.insert(
            (TypeId::of::<P>(), TypeId::of::<S>()),
            Box::new(Reconstructor::<P> {
                instantiate: instantiate_boxed::<P, S>,
                deserialize: deserialize_boxed::<P, S>,
            }),
        );
    }

    /// Clears every mapping and reconstruction entry in all tiers.
    pub fn reset(&mut self) {
        self.by_type.clear();
        self.by_discriminator.clear();
        self.specialized_by_type.clear();
        self.specialized_by_discriminator.clear();
        self.reconstructors.clear();
    }

    /// Looks up the discriminator for a payload's concrete type under
    /// the capability set `P`, preferring the specialised tier.
    ///
    /// Returns `None` when the concrete type is registered in neither
    /// tier.
    #[must_use]
    pub fn discriminator_for<P>(&self, value: &P) -> Option<&str>
    where
        P: ?Sized + PolyValue + 'static,
    {
        let capability = TypeId::of::<P>();
        let concrete = value.as_any().type_id();
        self.specialized_by_type
            .get(&capability)
            .and_then(|types| types.get(&concrete))
            .or_else(|| self.by_type.get(&concrete))
            .map(String::as_str)
    }

    /// Builds a fresh zero-value payload for the type filed under
    /// `discriminator` in the capability set `P`.
    ///
    /// Returns `None` when the discriminator resolves in neither tier
    /// or the resolved type has no reconstruction entry for `P`.
    #[must_use]
    pub fn discriminated<P>(&self, discriminator: &str) -> Option<Box<P>>
    where
        P: ?Sized + 'static,
    {
        let concrete = self.resolve_concrete(TypeId::of::<P>(), discriminator)?;
        let entry = self.reconstructor::<P>(concrete)?;
        Some((entry.instantiate)())
    }

    pub(crate) fn deserialize_fn<P>(&self, discriminator: &str) -> Option<DeserializeFn<P>>
    where
        P: ?Sized + 'static,
    {
        let concrete = self.resolve_concrete(TypeId::of::<P>(), discriminator)?;
        Some(self.reconstructor::<P>(concrete)?.deserialize)
    }

    fn resolve_concrete(&self, capability: TypeId, discriminator: &str) -> Option<TypeId> {
        self.specialized_by_discriminator
            .get(&capability)
            .and_then(|tags| tags.get(discriminator))
            .or_else(|| self.by_discriminator.get(discriminator))
            .copied()
    }

    fn reconstructor<P>(&self, concrete: TypeId) -> Option<&Reconstructor<P>>
    where
        P: ?Sized + 'static,
    {
        self.reconstructors
            .get(&(TypeId::of::<P>(), concrete))
            .and_then(|entry| entry.downcast_ref::<Reconstructor<P>>())
    }
}

static DEFAULT_REGISTRY: OnceLock<RwLock<Registry>> = OnceLock::new();

fn default_registry() -> &'static RwLock<Registry> {
    DEFAULT_REGISTRY.get_or_init(|| RwLock::new(Registry::new()))
}

pub(crate) fn with_default<R>(read: impl FnOnce(&Registry) -> R) -> R {
    let guard = default_registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner);
    read(&guard)
}

pub(crate) fn with_default_mut<R>(write: impl FnOnce(&mut Registry) -> R) -> R {
    let mut guard = default_registry()
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    write(&mut guard)
}

/// Copies the discriminator for a payload out of the default registry.
pub(crate) fn default_discriminator_for<P>(value: &P) -> Option<String>
where
    P: ?Sized + PolyValue + 'static,
{
    with_default(|registry| registry.discriminator_for(value).map(str::to_owned))
}

/// Copies the deserialisation entry point for a discriminator out of
/// the default registry, so payload work runs outside the lock.
pub(crate) fn default_deserialize_fn<P>(discriminator: &str) -> Option<DeserializeFn<P>>
where
    P: ?Sized + 'static,
{
    with_default(|registry| registry.deserialize_fn::<P>(discriminator))
}

pub(crate) fn default_discriminated<P>(discriminator: &str) -> Option<Box<P>>
where
    P: ?Sized + 'static,
{
    with_default(|registry| registry.discriminated::<P>(discriminator))
}

/// Files `S` under `discriminator` in the default registry's global
/// tier, with a reconstruction entry for the capability set `P`.
pub fn register<P, S>(discriminator: impl Into<String>)
where
    P: ?Sized + Admits<S> + 'static,
    S: DeserializeOwned + Default + 'static,
{
    with_default_mut(|registry| registry.register::<P, S>(discriminator));
}

/// Files `S` under `discriminator` in the default registry, scoped to
/// the capability set `P`.
pub fn register_specialized<P, S>(discriminator: impl Into<String>)
where
    P: ?Sized + Admits<S> + 'static,
    S: DeserializeOwned + Default + 'static,
{
    with_default_mut(|registry| registry.register_specialized::<P, S>(discriminator));
}

/// Adds a reconstruction entry for `S` under the capability set `P` to
/// the default registry without renaming anything.
pub fn bind<P, S>()
where
    P: ?Sized + Admits<S> + 'static,
    S: DeserializeOwned + Default + 'static,
{
    with_default_mut(Registry::bind::<P, S>);
}

/// Clears the default registry's mappings in every tier.
///
/// Intended for tests that need a pristine process-wide registry; it
/// also severs decoding for every previously registered type.
pub fn reset() {
    with_default_mut(Registry::reset);
}
