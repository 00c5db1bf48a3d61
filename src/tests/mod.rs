//! Unit tests for the polymorphic value machinery.
//!
//! Tests are organised by module, covering the capability surface,
//! registration precedence, container state, and the serde wire shape. Tests that touch the
//! process-wide default registry only ever install the canonical
//! fixture mappings, so they stay deterministic under parallel
//! execution; scenarios that mutate or clear the default registry live
//! in the integration suites, which run in their own processes.
