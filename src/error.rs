use std::fmt;

use thiserror::Error;

/// Working buffers whose size is bounded by [`EngineConfig`](crate::EngineConfig)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Buffer {
    /// Facts selected by a single fact scan
    MatchingFacts,
    /// Rules selected by a single rule scan
    MatchingRules,
    /// Bindings accumulated by a single `solve` step
    Results,
}

impl fmt::Display for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MatchingFacts => "matching facts",
            Self::MatchingRules => "matching rules",
            Self::Results => "results",
        };
        f.write_str(name)
    }
}

/// Errors reported by the engine, the database and the parser
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A scan or accumulation step produced more entries than its buffer holds
    #[error("{buffer} buffer overflow: {attempted} entries for a capacity of {capacity}")]
    CapacityExceeded {
        /// The buffer that overflowed
        buffer: Buffer,
        /// How many entries the step tried to hold
        attempted: usize,
        /// The configured capacity
        capacity: usize,
    },

    /// An atom violates the structural invariants of the atom model
    #[error("malformed atom `{atom}`: {reason}")]
    MalformedAtom {
        /// Rendering of the offending atom
        atom: String,
        /// What is wrong with it
        reason: String,
    },

    /// A rule is made of valid atoms but cannot be resolved soundly
    #[error("malformed rule `{rule}`: {reason}")]
    MalformedRule {
        /// Rendering of the offending rule
        rule: String,
        /// What is wrong with it
        reason: String,
    },

    /// Text could not be parsed into an atom or a clause
    #[cfg(feature = "parsing")]
    #[error("cannot parse `{input}`: {reason}")]
    Parse {
        /// The remaining input at the point of failure
        input: String,
        /// Parser diagnostic
        reason: String,
    },
}

/// Result alias used throughout the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;
