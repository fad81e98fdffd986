use std::fmt;
use std::ops::{Deref, DerefMut};

use indexmap::IndexMap;
use log::{debug, trace};
use smallvec::SmallVec;

use crate::atom::{Atom, Binding, Term};
use crate::binder;
use crate::config::EngineConfig;
use crate::database::{Body, Combinator, Database, Rule, RuleId};
use crate::error::{Buffer, Error, Result};
use crate::projector::{self, column_value};

/// Outcome of solving a query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResult {
    /// Whether the query holds
    pub success: bool,
    /// Answers in discovery order, shaped by [`projector::project`]; not deduplicated
    pub bindings: Vec<Binding>,
}

impl QueryResult {
    /// Number of bindings
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether there are no bindings
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Variable name to value maps for each binding of `query`
    #[must_use]
    pub fn named(&self, query: &Atom) -> Vec<IndexMap<String, String>> {
        self.bindings
            .iter()
            .map(|binding| projector::named(query, binding))
            .collect()
    }

    fn absorb(&mut self, other: QueryResult) {
        self.success |= other.success;
        self.bindings.extend(other.bindings);
    }
}

/// Fill level of a bounded buffer, reported after every scan and solve step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferUsage {
    /// Which buffer
    pub buffer: Buffer,
    /// Entries the step needed
    pub used: usize,
    /// Configured capacity
    pub capacity: usize,
}

type UsageMonitor = Box<dyn Fn(BufferUsage) + Send + Sync>;

/// Rules currently being derived along the current call chain
///
/// A rule on this stack is not a candidate for nested goals, which is what
/// makes resolution terminate on cyclic rule graphs.
#[derive(Debug, Default)]
struct ActiveRules {
    stack: SmallVec<[RuleId; 8]>,
}

impl ActiveRules {
    fn contains(&self, id: RuleId) -> bool {
        self.stack.contains(&id)
    }

    fn enter(&mut self, id: RuleId) -> ActiveGuard<'_> {
        self.stack.push(id);
        ActiveGuard { active: self }
    }
}

/// Pops the rule pushed by [`ActiveRules::enter`] when dropped
struct ActiveGuard<'a> {
    active: &'a mut ActiveRules,
}

impl Deref for ActiveGuard<'_> {
    type Target = ActiveRules;

    fn deref(&self) -> &ActiveRules {
        self.active
    }
}

impl DerefMut for ActiveGuard<'_> {
    fn deref_mut(&mut self) -> &mut ActiveRules {
        self.active
    }
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.active.stack.pop();
    }
}

/// Top-down resolution engine over a fixed [`Database`]
///
/// Goals are resolved depth first. A goal is first tried against the rules
/// whose heads match it; only when no rule head matches are the facts
/// scanned. Results from every matching rule accumulate in scan order.
///
/// `solve` takes `&self`: all per-query state lives on the call stack, so one
/// engine may answer queries from several threads at once.
pub struct LogicEngine {
    database: Database,
    config: EngineConfig,
    monitor: Option<UsageMonitor>,
}

impl fmt::Debug for LogicEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogicEngine")
            .field("database", &self.database)
            .field("config", &self.config)
            .field("monitor", &self.monitor.is_some())
            .finish()
    }
}

impl LogicEngine {
    /// Creates an engine over `database` with the default configuration
    #[must_use]
    pub fn new(database: Database) -> Self {
        Self::with_config(database, EngineConfig::default())
    }

    /// Creates an engine over `database` with explicit limits
    #[must_use]
    pub fn with_config(database: Database, config: EngineConfig) -> Self {
        Self {
            database,
            config,
            monitor: None,
        }
    }

    /// Builds the database from `facts` and `rules` and attaches it
    ///
    /// # Errors
    ///
    /// See [`Database::from_clauses`].
    pub fn attach_database(
        facts: impl IntoIterator<Item = Atom>,
        rules: impl IntoIterator<Item = Rule>,
    ) -> Result<Self> {
        Ok(Self::new(Database::from_clauses(facts, rules)?))
    }

    /// Installs a callback receiving every [`BufferUsage`] report
    #[must_use]
    pub fn with_usage_monitor<F>(mut self, monitor: F) -> Self
    where
        F: Fn(BufferUsage) + Send + Sync + 'static,
    {
        self.monitor = Some(Box::new(monitor));
        self
    }

    /// The attached database
    #[must_use]
    pub fn database(&self) -> &Database {
        &self.database
    }

    /// The active limits
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Solves `query`, returning every binding of its variables
    ///
    /// A query that matches neither a rule nor a fact is not an error; it
    /// yields an unsuccessful, empty result.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedAtom`] if `query` breaks the atom invariants and
    /// [`Error::CapacityExceeded`] if any step outgrows its buffer.
    pub fn solve(&self, query: &Atom) -> Result<QueryResult> {
        query.validate()?;
        debug!("solving {query}");

        let mut active = ActiveRules::default();
        let result = self.solve_goal(query, &mut active)?;

        debug!("{query}: {} binding(s)", result.len());
        Ok(result)
    }

    /// Returns whether `query` holds
    ///
    /// # Errors
    ///
    /// Same as [`LogicEngine::solve`].
    pub fn ask(&self, query: &Atom) -> Result<bool> {
        Ok(self.solve(query)?.success)
    }

    fn solve_goal(&self, query: &Atom, active: &mut ActiveRules) -> Result<QueryResult> {
        let candidates: Vec<RuleId> = self
            .database
            .matching_rules(query, |id| active.contains(id))
            .collect();
        self.report(
            Buffer::MatchingRules,
            candidates.len(),
            self.config.max_matching_rules,
        )?;

        if candidates.is_empty() {
            return self.try_facts(query);
        }

        let mut result = QueryResult::default();
        for id in candidates {
            let contribution = self.derive(query, id, &mut active.enter(id))?;
            result.absorb(contribution);
            self.report(Buffer::Results, result.len(), self.config.max_results)?;
        }
        Ok(result)
    }

    fn try_facts(&self, query: &Atom) -> Result<QueryResult> {
        let matched: Vec<&Atom> = self.database.matching_facts(query).collect();
        self.report(
            Buffer::MatchingFacts,
            matched.len(),
            self.config.max_matching_facts,
        )?;

        let bindings = projector::project(query, matched);
        self.report(Buffer::Results, bindings.len(), self.config.max_results)?;
        Ok(QueryResult {
            success: !bindings.is_empty(),
            bindings,
        })
    }

    /// Contribution of one rule to `query`; the rule is already active
    fn derive(&self, query: &Atom, id: RuleId, active: &mut ActiveRules) -> Result<QueryResult> {
        let rule = &self.database.rules()[id.index()];
        debug!("trying {rule} for {query}");

        let Some(bound) = binder::bind_head(query, rule) else {
            trace!("{rule} cannot hold for {query}");
            return Ok(QueryResult::default());
        };

        match bound.body {
            Body::Single(goal) => {
                let solved = self.solve_goal(&goal, active)?;
                Ok(lift(query, rule, &goal, &solved))
            }
            Body::Pair {
                first,
                combinator: Combinator::Or,
                second,
            } => {
                let left = self.solve_goal(&first, active)?;
                let right = self.solve_goal(&second, active)?;

                let mut result = lift(query, rule, &first, &left);
                result.absorb(lift(query, rule, &second, &right));
                self.report(Buffer::Results, result.len(), self.config.max_results)?;
                Ok(result)
            }
            Body::Pair {
                first,
                combinator: Combinator::And,
                second,
            } => self.join(query, rule, first, second, active),
        }
    }

    /// Nested-loop join of an AND body
    ///
    /// Every binding of the first subgoal is substituted into the second,
    /// which is then solved on its own; each pair of bindings yields one
    /// answer for `query`.
    fn join(
        &self,
        query: &Atom,
        rule: &Rule,
        first: Atom,
        second: Atom,
        active: &mut ActiveRules,
    ) -> Result<QueryResult> {
        let (first, second) = if self.config.reorder_conjunctions
            && first.variable_count() == 2
            && second.variable_count() < 2
        {
            trace!("solving {second} before {first}");
            (second, first)
        } else {
            (first, second)
        };

        let left = self.solve_goal(&first, active)?;
        let mut result = QueryResult::default();
        if !left.success {
            return Ok(result);
        }

        for left_binding in &left.bindings {
            let goal = binder::substitute(&second, &first, left_binding);
            let right = self.solve_goal(&goal, active)?;

            result.bindings.extend(right.bindings.iter().filter_map(|right_binding| {
                instantiate(
                    query,
                    rule,
                    &[(&first, left_binding), (&goal, right_binding)],
                )
            }));
            self.report(Buffer::Results, result.len(), self.config.max_results)?;
        }
        result.success = !result.is_empty();
        Ok(result)
    }

    fn report(&self, buffer: Buffer, used: usize, capacity: usize) -> Result<()> {
        trace!("buffer: {used} / {capacity} ({buffer})");
        if let Some(monitor) = &self.monitor {
            monitor(BufferUsage {
                buffer,
                used,
                capacity,
            });
        }

        if used > capacity {
            return Err(Error::CapacityExceeded {
                buffer,
                attempted: used,
                capacity,
            });
        }
        Ok(())
    }
}

/// Re-expresses the bindings of a single subgoal as answers to `query`
fn lift(query: &Atom, rule: &Rule, goal: &Atom, solved: &QueryResult) -> QueryResult {
    let bindings: Vec<Binding> = solved
        .bindings
        .iter()
        .filter_map(|binding| instantiate(query, rule, &[(goal, binding)]))
        .collect();
    QueryResult {
        success: !bindings.is_empty(),
        bindings,
    }
}

/// Grounds `query` from one derivation of `rule`
///
/// A query variable takes the head constant of `rule` at its position, or
/// else the value of the same-named variable in the first source that binds
/// it. Positions sharing one head variable share one value. Returns `None`
/// if some variable stays unbound.
fn instantiate(query: &Atom, rule: &Rule, sources: &[(&Atom, &Binding)]) -> Option<Binding> {
    let mut values: SmallVec<[Option<&str>; 2]> = query
        .terms
        .iter()
        .zip(&rule.head.terms)
        .map(|(term, formal)| match (term, formal) {
            (Term::Symbol(value), _) | (Term::Variable(_), Term::Symbol(value)) => {
                Some(value.as_str())
            }
            (Term::Variable(name), Term::Variable(_)) => sources
                .iter()
                .find_map(|(goal, binding)| column_value(goal, binding, name)),
        })
        .collect();

    // bind_head passes only one query term into the body for a repeated head variable
    let repeated = matches!(
        rule.head.terms.as_slice(),
        [first, second] if first.is_variable() && first == second
    );
    if let (true, [first, second]) = (repeated, values.as_mut_slice()) {
        let shared = first.or(*second);
        *first = shared;
        *second = shared;
    }

    let terms = values
        .into_iter()
        .map(|value| value.map(|value| Term::Symbol(value.to_owned())))
        .collect::<Option<SmallVec<[Term; 2]>>>()?;

    Some(projector::project_one(
        query,
        Atom {
            predicate: query.predicate.clone(),
            terms,
        },
    ))
}
