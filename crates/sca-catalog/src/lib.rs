//! # sca-catalog — Rule and audit-question catalogs
//!
//! Holds the two catalogs the compliance pipeline draws from, the mapper
//! that connects them, and the TTL cache layer that sits in front of both:
//!
//! - [`RuleCatalog`] — in-memory rule store with CRUD semantics.
//! - [`AuditQuestionCatalog`] — fixed reference data: the audit questions of
//!   each underwriting lifecycle stage.
//! - [`mapping`] — resolves which audit questions a rule informs, by
//!   category or by lexical fallback.
//! - [`ComplianceCaches`] — TTL maps for rules, mappings, and evaluation
//!   results.
//!
//! Catalogs are explicitly constructed and internally synchronized, so they
//! can be shared behind an `Arc` without further locking by callers.

pub mod cache;
pub mod error;
pub mod mapping;
pub mod questions;
pub mod rules;

pub use cache::{ComplianceCaches, TtlCache};
pub use error::CatalogError;
pub use questions::AuditQuestionCatalog;
pub use rules::RuleCatalog;
