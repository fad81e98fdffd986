use std::fmt;

use indexmap::{IndexMap, IndexSet};
use log::trace;

use crate::atom::{Atom, Term};
use crate::error::{Error, Result};
use crate::matcher;

/// How the two subgoals of a rule body are combined
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Combinator {
    /// Both subgoals must hold, sharing variables
    And,
    /// Either subgoal may hold; results are concatenated
    Or,
}

/// The body of a rule: one subgoal, or two joined by a [`Combinator`]
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Body {
    /// A single subgoal
    Single(Atom),
    /// Two subgoals
    Pair {
        /// Solved first
        first: Atom,
        /// AND or OR
        combinator: Combinator,
        /// Solved second
        second: Atom,
    },
}

impl Body {
    /// Subgoals in body order
    pub fn goals(&self) -> impl Iterator<Item = &Atom> {
        let (first, second) = match self {
            Self::Single(goal) => (goal, None),
            Self::Pair { first, second, .. } => (first, Some(second)),
        };
        std::iter::once(first).chain(second)
    }

    /// Mutable subgoals in body order
    pub fn goals_mut(&mut self) -> impl Iterator<Item = &mut Atom> {
        let (first, second) = match self {
            Self::Single(goal) => (goal, None),
            Self::Pair { first, second, .. } => (first, Some(second)),
        };
        std::iter::once(first).chain(second)
    }
}

/// A Horn-like clause (e.g. `grandMotherOf(X, GM) :- motherOf(X, F), motherOf(F, GM)`)
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rule {
    /// The conclusion; its variables are the formal parameters of the rule
    pub head: Atom,
    /// The conditions that must be satisfied
    pub body: Body,
}

impl Rule {
    /// `head :- goal`
    #[must_use]
    pub fn single(head: Atom, goal: Atom) -> Self {
        Self {
            head,
            body: Body::Single(goal),
        }
    }

    /// `head :- first, second`
    #[must_use]
    pub fn and(head: Atom, first: Atom, second: Atom) -> Self {
        Self {
            head,
            body: Body::Pair {
                first,
                combinator: Combinator::And,
                second,
            },
        }
    }

    /// `head :- first ; second`
    #[must_use]
    pub fn or(head: Atom, first: Atom, second: Atom) -> Self {
        Self {
            head,
            body: Body::Pair {
                first,
                combinator: Combinator::Or,
                second,
            },
        }
    }

    /// Checks that every atom is well formed and that every head variable is
    /// produced by the body (by both branches of an OR body)
    ///
    /// # Errors
    ///
    /// [`Error::MalformedAtom`] for a bad atom, [`Error::MalformedRule`] for an
    /// unproduced head variable.
    pub fn validate(&self) -> Result<()> {
        self.head.validate()?;
        for goal in self.body.goals() {
            goal.validate()?;
        }

        let head_vars: IndexSet<&str> = self.head.variables().collect();
        let branches: Vec<IndexSet<&str>> = match &self.body {
            Body::Pair {
                first,
                combinator: Combinator::Or,
                second,
            } => vec![first.variables().collect(), second.variables().collect()],
            body => vec![body.goals().flat_map(|goal| goal.variables()).collect()],
        };

        for branch in &branches {
            if let Some(missing) = head_vars.iter().find(|var| !branch.contains(*var)) {
                return Err(Error::MalformedRule {
                    rule: self.to_string(),
                    reason: format!("variable `{missing}` appears in head but not in body"),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.body {
            Body::Single(goal) => write!(f, "{} :- {goal}.", self.head),
            Body::Pair {
                first,
                combinator,
                second,
            } => {
                let op = match combinator {
                    Combinator::And => ",",
                    Combinator::Or => " ;",
                };
                write!(f, "{} :- {first}{op} {second}.", self.head)
            }
        }
    }
}

/// Position of a fact in its [`Database`]
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct FactId(usize);

/// Position of a rule in its [`Database`]
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct RuleId(usize);

impl RuleId {
    /// Index of the rule in insertion order
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl FactId {
    /// Index of the fact in insertion order
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Append-only store of ground facts and rules
///
/// Scans visit candidates in insertion order. Lookups go through a
/// per-predicate index, so only atoms sharing the query's predicate name are
/// ever compared.
#[derive(Debug, Clone, Default)]
pub struct Database {
    facts: Vec<Atom>,
    rules: Vec<Rule>,
    facts_by_pred: IndexMap<String, Vec<usize>>,
    rules_by_pred: IndexMap<String, Vec<usize>>,
}

impl Database {
    /// Creates an empty database
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a database from facts and rules, in order
    ///
    /// # Errors
    ///
    /// Fails on the first fact or rule rejected by [`Database::add_fact`] or
    /// [`Database::add_rule`].
    pub fn from_clauses(
        facts: impl IntoIterator<Item = Atom>,
        rules: impl IntoIterator<Item = Rule>,
    ) -> Result<Self> {
        let mut database = Self::new();
        for fact in facts {
            database.add_fact(fact)?;
        }
        for rule in rules {
            database.add_rule(rule)?;
        }
        Ok(database)
    }

    /// Appends a fact
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedAtom`] if the atom is malformed or holds a variable.
    pub fn add_fact(&mut self, fact: Atom) -> Result<FactId> {
        fact.validate()?;
        if let Some(Term::Variable(var)) = fact.terms.iter().find(|term| term.is_variable()) {
            return Err(fact.malformed(format!("fact contains variable `{var}`")));
        }

        let id = self.facts.len();
        self.facts_by_pred
            .entry(fact.predicate.clone())
            .or_default()
            .push(id);
        self.facts.push(fact);
        Ok(FactId(id))
    }

    /// Appends a rule
    ///
    /// # Errors
    ///
    /// See [`Rule::validate`].
    pub fn add_rule(&mut self, rule: Rule) -> Result<RuleId> {
        rule.validate()?;

        let id = self.rules.len();
        self.rules_by_pred
            .entry(rule.head.predicate.clone())
            .or_default()
            .push(id);
        self.rules.push(rule);
        Ok(RuleId(id))
    }

    /// All facts in insertion order
    #[must_use]
    pub fn facts(&self) -> &[Atom] {
        &self.facts
    }

    /// All rules in insertion order
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Looks up a fact
    #[must_use]
    pub fn fact(&self, id: FactId) -> Option<&Atom> {
        self.facts.get(id.0)
    }

    /// Looks up a rule
    #[must_use]
    pub fn rule(&self, id: RuleId) -> Option<&Rule> {
        self.rules.get(id.0)
    }

    /// Number of facts
    #[must_use]
    pub fn fact_count(&self) -> usize {
        self.facts.len()
    }

    /// Number of rules
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Facts with the query's signature that satisfy [`matcher::matches`], in store order
    pub fn matching_facts<'a>(&'a self, query: &'a Atom) -> impl Iterator<Item = &'a Atom> + 'a {
        trace!("scanning facts for {query}");
        self.facts_by_pred
            .get(&query.predicate)
            .into_iter()
            .flatten()
            .map(move |&idx| &self.facts[idx])
            .filter(move |fact| query.same_signature(fact) && matcher::matches(query, fact))
    }

    /// Rules whose head satisfies [`matcher::matches`], skipping those for
    /// which `is_active` holds, in store order
    pub fn matching_rules<'a, F>(
        &'a self,
        query: &'a Atom,
        is_active: F,
    ) -> impl Iterator<Item = RuleId> + 'a
    where
        F: Fn(RuleId) -> bool + 'a,
    {
        trace!("scanning rules for {query}");
        self.rules_by_pred
            .get(&query.predicate)
            .into_iter()
            .flatten()
            .map(|&idx| RuleId(idx))
            .filter(move |&id| !is_active(id))
            .filter(move |id| {
                let head = &self.rules[id.0].head;
                query.same_signature(head) && matcher::matches(query, head)
            })
    }
}
