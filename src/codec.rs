//! Serde wire format for [`Poly`].
//!
//! A present container encodes as the 2-element sequence
//! `["<discriminator>", <payload>]`; an absent container encodes as the
//! empty sequence (`[]` in JSON and YAML alike). Decoding additionally
//! accepts a null node as absent, so optional YAML fields and JSON
//! `null` both round-trip.
//!
//! Decoding reads the discriminator, copies the matching reconstruction
//! entry out of the default registry, then releases the lock before any
//! payload work runs. Payloads may therefore themselves contain nested
//! [`Poly`] fields without deadlocking.
//!
//! Arity is strict: anything other than zero or exactly two elements is
//! rejected, as is a leading element that is not a non-empty string.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, DeserializeSeed, Deserializer, IgnoredAny, SeqAccess, Visitor};
use serde::ser::{self, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

use crate::container::Poly;
use crate::error::PolyError;
use crate::registry::{self, DeserializeFn};
use crate::value::PolyValue;

impl<P> Serialize for Poly<P>
where
    P: ?Sized + PolyValue + 'static,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let Some(value) = self.value() else {
            return serializer.serialize_seq(Some(0))?.end();
        };
        let discriminator = registry::default_discriminator_for(value).ok_or_else(|| {
            ser::Error::custom(PolyError::missing_discriminator::<P>(value.type_name()))
        })?;
        let mut seq = serializer.serialize_seq(Some(2))?;
        seq.serialize_element(&discriminator)?;
        seq.serialize_element(&ErasedPayload(value))?;
        seq.end()
    }
}

/// Forwards a type-erased payload to the concrete serialiser.
struct ErasedPayload<'a, P: ?Sized>(&'a P);

impl<P> Serialize for ErasedPayload<'_, P>
where
    P: ?Sized + PolyValue,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        erased_serde::serialize(self.0, serializer)
    }
}

impl<'de, P> Deserialize<'de> for Poly<P>
where
    P: ?Sized + 'static,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(PolyVisitor::<P>(PhantomData))
    }
}

struct PolyVisitor<P: ?Sized>(PhantomData<fn() -> Box<P>>);

impl<'de, P> Visitor<'de> for PolyVisitor<P>
where
    P: ?Sized + 'static,
{
    type Value = Poly<P>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a `[discriminator, payload]` sequence, an empty sequence, or null")
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Poly::none())
    }

    fn visit_none<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Poly::none())
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let Some(discriminator) = seq.next_element::<String>()? else {
            return Ok(Poly::none());
        };
        if discriminator.is_empty() {
            return Err(de::Error::custom(PolyError::empty_discriminator::<P>()));
        }
        let deserialize = registry::default_deserialize_fn::<P>(&discriminator)
            .ok_or_else(|| de::Error::custom(PolyError::missing_type_for::<P>(discriminator)))?;
        let Some(payload) = seq.next_element_seed(ReconstructSeed { deserialize })? else {
            return Err(de::Error::custom(PolyError::invalid_encoding(
                "missing payload after discriminator",
            )));
        };
        if seq.next_element::<IgnoredAny>()?.is_some() {
            return Err(de::Error::custom(PolyError::invalid_encoding(
                "more than two elements in sequence",
            )));
        }
        Ok(Poly::from(payload))
    }
}

/// Applies a reconstruction entry to the next sequence element.
struct ReconstructSeed<P: ?Sized> {
    deserialize: DeserializeFn<P>,
}

impl<'de, P> DeserializeSeed<'de> for ReconstructSeed<P>
where
    P: ?Sized,
{
    type Value = Box<P>;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut erased = <dyn erased_serde::Deserializer>::erase(deserializer);
        (self.deserialize)(&mut erased).map_err(de::Error::custom)
    }
}
