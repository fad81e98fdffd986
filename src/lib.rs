//! # Picolog
//!
//! A small deductive database: ground facts and Horn rules over atoms with
//! one or two terms, queried top-down with bounded buffers.
//!
//! ## Features
//!
//! - Rules with a single subgoal or two subgoals joined by AND / OR
//! - Termination on recursive rules: a rule is never re-entered while it is
//!   being derived
//! - Capacity limits on every intermediate buffer, reported as errors
//! - Textual clause syntax (feature `parsing`)
//!
//! ## Example
//!
//! ```rust
//! use picolog::{Atom, LogicEngine, Rule};
//!
//! let engine = LogicEngine::attach_database(
//!     [
//!         Atom::binary("motherOf", "marry", "judy"),
//!         Atom::binary("motherOf", "ann", "marry"),
//!     ],
//!     [Rule::and(
//!         Atom::binary("grandMotherOf", "X", "GM"),
//!         Atom::binary("motherOf", "X", "F"),
//!         Atom::binary("motherOf", "F", "GM"),
//!     )],
//! )?;
//!
//! let result = engine.solve(&Atom::binary("grandMotherOf", "X", "GM"))?;
//! assert!(result.success);
//! assert_eq!(result.bindings, vec![Atom::binary("grandMotherOf", "ann", "judy")]);
//! # Ok::<(), picolog::Error>(())
//! ```

/// Terms and atoms.
pub mod atom;
/// Specializing rules for a query.
pub mod binder;
/// Engine limits.
pub mod config;
/// Fact and rule storage.
pub mod database;
/// Query resolution.
pub mod engine;
/// Error types.
pub mod error;
/// Human readable answers.
pub mod format;
/// Candidate matching.
pub mod matcher;
/// Binding layout.
pub mod projector;
/// Clause syntax.
#[cfg(feature = "parsing")]
pub mod parser;

pub use atom::{Atom, Binding, Term};
pub use config::EngineConfig;
pub use database::{Body, Combinator, Database, FactId, Rule, RuleId};
pub use engine::{BufferUsage, LogicEngine, QueryResult};
pub use error::{Buffer, Error, Result};
