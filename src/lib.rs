//! Polybox: tagged polymorphic values for serde.
//!
//! This crate lets a serialisable struct hold "some implementation of a
//! capability trait" in a single field and still round-trip through
//! serde. On the wire a present value travels as the 2-element sequence
//! `["<discriminator>", <payload>]` and an absent value as the empty
//! sequence; a process-wide registry maps concrete payload types to
//! their discriminators and back.
//!
//! # Architecture
//!
//! - [`value`]: the surface every payload satisfies, and the
//!   [`capability!`] wiring for capability traits
//! - [`registry`]: two-tier discriminator mappings plus the
//!   reconstruction entries decoding needs, with a process-wide default
//! - [`container`]: the [`Poly`] field type holding one optional payload
//! - [`codec`]: the serde wire format for [`Poly`]
//! - [`error`]: typed encode and decode failures
//!
//! # Example
//!
//! ```
//! use polybox::Poly;
//! use serde::{Deserialize, Serialize};
//!
//! trait Job: polybox::PolyValue {
//!     fn run(&mut self) -> String;
//! }
//! polybox::capability!(Job);
//!
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! struct EmailJob {
//!     message: String,
//! }
//!
//! impl Job for EmailJob {
//!     fn run(&mut self) -> String {
//!         format!("emailing: {}", self.message)
//!     }
//! }
//!
//! #[derive(Serialize, Deserialize)]
//! struct Envelope {
//!     job: Poly<dyn Job>,
//! }
//!
//! polybox::register::<dyn Job, EmailJob>("email");
//!
//! let envelope = Envelope {
//!     job: Poly::new(EmailJob {
//!         message: "Hello World!".into(),
//!     }),
//! };
//! let wire = serde_json::to_string(&envelope)?;
//! assert_eq!(wire, r#"{"job":["email",{"message":"Hello World!"}]}"#);
//!
//! let mut back: Envelope = serde_json::from_str(&wire)?;
//! let job = back.job.value_mut().ok_or("job missing")?;
//! assert_eq!(job.run(), "emailing: Hello World!");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod codec;
pub mod container;
pub mod error;
pub mod registry;
pub mod value;

pub use container::Poly;
pub use error::PolyError;
pub use registry::{Registry, bind, register, register_specialized, reset};
pub use value::{Admits, PolyValue};

#[cfg(test)]
mod tests;
