// trust/mod.rs - Web of Trust Module

//! Viewer-relative web of trust.
//!
//! Entities vouch for each other with `complete` or `partial` assertions, and
//! each viewer derives its own view of who is valid:
//!
//! - **Store**: registered entities and the directed assertions between them
//! - **Validity**: least fixed point classifying every entity for one viewer
//! - **Paths**: depth-first enumeration of the chains that justify a verdict
//! - **Query**: `check_trust` composing the above into a verdict
//! - **Web**: shared, lock-protected handle exposing the string interface
//!
//! # Example
//!
//! ```
//! use wot_engine::trust::{ValidityLevel, WebOfTrust};
//!
//! let web = WebOfTrust::default();
//! for name in ["A", "B", "C", "D"] {
//!     web.register_entity(name);
//! }
//! web.assert_trust("A", "B", "complete");
//! web.assert_trust("A", "C", "complete");
//! web.assert_trust("B", "D", "partial");
//! web.assert_trust("C", "D", "partial");
//!
//! let verdict = web.check_trust("A", "D");
//! assert!(verdict.trusted);
//! assert_eq!(verdict.trust_level, ValidityLevel::Marginal);
//! assert_eq!(verdict.paths.len(), 2);
//! ```

mod entity;
mod error;
mod paths;
mod query;
mod scenario;
mod store;
mod validity;
mod web;

pub use entity::{AssertionLevel, EntityName, ValidityLevel};

pub use error::TrustError;

pub use paths::{PathExplainer, PathLimits, PathSearch, TrustPath};

pub use query::{
    TrustQueryFacade, TrustVerdict, REASON_COMPLETE, REASON_NOT_TRUSTED, REASON_SELF_TRUST,
    REASON_UNKNOWN_ENTITY,
};

pub use scenario::{
    AssertionResult, AssertionSpec, QueryResult, QuerySpec, RegistrationResult, Scenario,
    ScenarioReport,
};

pub use store::{StoreStats, TrustAssertion, TrustAssertionStore};

pub use validity::{ValidityEngine, ValidityMap, MARGINALS_NEEDED};

pub use web::{AssertionOutcome, TrustConfig, WebOfTrust};
