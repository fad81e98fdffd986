use std::fmt;

use smallvec::SmallVec;

use crate::error::{Error, Result};

/// Returns true if `name` denotes a variable, i.e. starts with an uppercase ASCII letter
#[must_use]
pub fn is_variable_name(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

/// A term of an atom: an unbound variable or a ground constant
///
/// Variables are identified by name only. Two terms with the same variable
/// name denote the same logical variable wherever they appear in a query or a
/// rule; there is no renaming apart and no occurs-check.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Term {
    /// A variable to be solved for (e.g. `X`, `GM`)
    Variable(String),
    /// A concrete constant (e.g. `ann`, `wine`)
    Symbol(String),
}

impl Term {
    /// Builds a term from its name, choosing the variant with [`is_variable_name`]
    pub fn classify(name: impl Into<String>) -> Self {
        let name = name.into();
        if is_variable_name(&name) {
            Self::Variable(name)
        } else {
            Self::Symbol(name)
        }
    }

    /// The textual name of the term
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Variable(name) | Self::Symbol(name) => name,
        }
    }

    /// Whether this term is an unbound variable
    #[must_use]
    pub fn is_variable(&self) -> bool {
        matches!(self, Self::Variable(_))
    }

    /// Whether the variant agrees with the lexical rule for its name
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.is_variable() == is_variable_name(self.name())
    }

    /// Re-derives the variant from the name
    #[must_use]
    pub fn normalized(self) -> Self {
        match self {
            Self::Variable(name) | Self::Symbol(name) => Self::classify(name),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A predicate applied to one or two terms (e.g. `motherOf(ann, X)`)
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Atom {
    /// The name of the predicate (e.g. `"motherOf"`)
    pub predicate: String,
    /// The arguments of the predicate; one or two for a well-formed atom
    pub terms: SmallVec<[Term; 2]>,
}

/// A resolved answer to a query, shaped like the query atom
///
/// See [`project`](crate::projector::project) for where each value lives.
pub type Binding = Atom;

impl Atom {
    /// Creates an atom from already classified terms
    pub fn new(predicate: impl Into<String>, terms: impl IntoIterator<Item = Term>) -> Self {
        Self {
            predicate: predicate.into(),
            terms: terms.into_iter().collect(),
        }
    }

    /// Creates a one-term atom, classifying the term by its name
    pub fn unary(predicate: impl Into<String>, term: &str) -> Self {
        Self::new(predicate, [Term::classify(term)])
    }

    /// Creates a two-term atom, classifying both terms by their names
    pub fn binary(predicate: impl Into<String>, first: &str, second: &str) -> Self {
        Self::new(predicate, [Term::classify(first), Term::classify(second)])
    }

    /// Number of terms
    #[must_use]
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Number of term slots holding a variable
    #[must_use]
    pub fn variable_count(&self) -> usize {
        self.terms.iter().filter(|term| term.is_variable()).count()
    }

    /// Whether no term is a variable
    #[must_use]
    pub fn is_ground(&self) -> bool {
        self.variable_count() == 0
    }

    /// Names of the variables in term order, repeats included
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.terms
            .iter()
            .filter(|term| term.is_variable())
            .map(Term::name)
    }

    /// Whether `candidate` has the same predicate name and term count
    #[must_use]
    pub fn same_signature(&self, candidate: &Atom) -> bool {
        self.term_count() == candidate.term_count() && self.predicate == candidate.predicate
    }

    /// Recomputes every variable flag from the term names
    pub fn normalize(&mut self) {
        for term in &mut self.terms {
            *term = std::mem::replace(term, Term::Symbol(String::new())).normalized();
        }
    }

    /// Owned variant of [`Atom::normalize`]
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// Checks the structural invariants of the atom model
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedAtom`] for an empty predicate name, a term
    /// count outside `1..=2`, or a term whose variant disagrees with its name.
    pub fn validate(&self) -> Result<()> {
        if self.predicate.is_empty() {
            return Err(self.malformed("empty predicate name"));
        }
        if !(1..=2).contains(&self.term_count()) {
            return Err(self.malformed(format!(
                "{} terms, expected 1 or 2",
                self.term_count()
            )));
        }
        if let Some(term) = self.terms.iter().find(|term| !term.is_consistent()) {
            let reason = if term.is_variable() {
                format!("variable `{term}` does not start with an uppercase letter")
            } else {
                format!("constant `{term}` starts with an uppercase letter")
            };
            return Err(self.malformed(reason));
        }
        Ok(())
    }

    pub(crate) fn malformed(&self, reason: impl Into<String>) -> Error {
        Error::MalformedAtom {
            atom: self.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.predicate)?;
        for (idx, term) in self.terms.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{term}")?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uppercase_initial_is_variable() {
        assert!(is_variable_name("X"));
        assert!(is_variable_name("GM"));
        assert!(is_variable_name("Female"));
        assert!(!is_variable_name("ann"));
        assert!(!is_variable_name("1"));
        assert!(!is_variable_name("_X"));
        assert!(!is_variable_name(""));
        assert!(!is_variable_name("Ärger"));
    }

    #[test]
    fn test_classify_picks_variant() {
        assert_eq!(Term::classify("X"), Term::Variable("X".to_string()));
        assert_eq!(Term::classify("wine"), Term::Symbol("wine".to_string()));
    }

    #[test]
    fn test_normalize_fixes_inconsistent_flags() {
        let mut atom = Atom::new(
            "likes",
            [
                Term::Symbol("X".to_string()),
                Term::Variable("wine".to_string()),
            ],
        );
        assert!(atom.validate().is_err());

        atom.normalize();
        assert_eq!(atom, Atom::binary("likes", "X", "wine"));
        assert!(atom.validate().is_ok());
    }

    #[test]
    fn test_variable_count_and_names() {
        let atom = Atom::binary("motherOf", "X", "F");
        assert_eq!(atom.variable_count(), 2);
        assert_eq!(atom.variables().collect::<Vec<_>>(), vec!["X", "F"]);
        assert!(!atom.is_ground());
        assert!(Atom::unary("fruit", "apple").is_ground());
    }

    #[test]
    fn test_validate_rejects_bad_arity() {
        let nullary = Atom::new("p", []);
        let ternary = Atom::new(
            "p",
            [Term::classify("a"), Term::classify("b"), Term::classify("c")],
        );
        assert!(matches!(
            nullary.validate(),
            Err(Error::MalformedAtom { .. })
        ));
        assert!(matches!(
            ternary.validate(),
            Err(Error::MalformedAtom { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_empty_predicate() {
        let atom = Atom::unary("", "a");
        assert!(matches!(atom.validate(), Err(Error::MalformedAtom { .. })));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Atom::binary("grandMotherOf", "ann", "GM").to_string(),
            "grandMotherOf(ann, GM)"
        );
        assert_eq!(Atom::unary("fruit", "X").to_string(), "fruit(X)");
    }

    #[test]
    fn test_same_signature_requires_name_and_arity() {
        let query = Atom::binary("likes", "X", "Y");
        assert!(query.same_signature(&Atom::binary("likes", "john", "wine")));
        assert!(!query.same_signature(&Atom::unary("likes", "john")));
        assert!(!query.same_signature(&Atom::binary("loves", "john", "wine")));
    }
}
