//! Name-based substitution into rules and subgoals.

use crate::atom::{Atom, Binding, Term};
use crate::database::Rule;
use crate::projector::column_value;

/// Specializes `rule` for `query`
///
/// The head terms are replaced by the query's terms. Every subgoal term that
/// names the same variable as the original head term in that position
/// receives the query's term as well, wherever it sits in the subgoal.
/// Constants in the original head are never propagated.
///
/// A head variable repeated across both positions stands for one query term:
/// a query constant is preferred over a query variable. Returns `None` when
/// the query puts two different constants under the same head variable.
#[must_use]
pub fn bind_head(query: &Atom, rule: &Rule) -> Option<Rule> {
    let mut bound = rule.clone();
    bound.head.terms.clone_from(&query.terms);

    for (position, formal) in rule.head.terms.iter().enumerate() {
        let Term::Variable(formal_name) = formal else {
            continue;
        };
        if rule.head.terms[..position].contains(formal) {
            continue;
        }

        let actual = actual_for(
            rule.head
                .terms
                .iter()
                .zip(&query.terms)
                .filter(|(other, _)| *other == formal)
                .map(|(_, actual)| actual),
        )?;
        for (original, goal) in rule.body.goals().zip(bound.body.goals_mut()) {
            for (from, to) in original.terms.iter().zip(goal.terms.iter_mut()) {
                if matches!(from, Term::Variable(name) if name == formal_name) {
                    *to = actual.clone();
                }
            }
        }
    }

    Some(bound)
}

/// The one query term that a head variable stands for
fn actual_for<'q>(mut actuals: impl Iterator<Item = &'q Term>) -> Option<&'q Term> {
    let mut chosen = actuals.next()?;
    for actual in actuals {
        match (chosen, actual) {
            (Term::Symbol(left), Term::Symbol(right)) if left != right => return None,
            (Term::Variable(_), Term::Symbol(_)) => chosen = actual,
            _ => {}
        }
    }
    Some(chosen)
}

/// Grounds the variables `goal` shares with `solved`, using one of the
/// bindings produced for `solved`
///
/// Variables of `goal` that `solved` does not bind stay open.
#[must_use]
pub fn substitute(goal: &Atom, solved: &Atom, binding: &Binding) -> Atom {
    let mut grounded = goal.clone();
    for term in &mut grounded.terms {
        if let Term::Variable(name) = term {
            if let Some(value) = column_value(solved, binding, name) {
                *term = Term::Symbol(value.to_owned());
            }
        }
    }
    grounded
}
