//! Column layout of bindings.
//!
//! A binding is a ground atom shaped like the query it answers. For queries
//! with zero or two variables it is the matched atom unchanged. For a query
//! with exactly one variable the answer always lives in the first term, so a
//! variable in the second position has its value copied into the first.

use indexmap::IndexMap;

use crate::atom::{Atom, Binding, Term};

/// Shapes matched ground atoms into bindings for `query`, keeping their order
pub fn project<'a>(query: &Atom, matched: impl IntoIterator<Item = &'a Atom>) -> Vec<Binding> {
    matched
        .into_iter()
        .map(|atom| project_one(query, atom.clone()))
        .collect()
}

/// Shapes one ground atom into a binding for `query`
#[must_use]
pub fn project_one(query: &Atom, mut ground: Atom) -> Binding {
    let second_is_answer =
        query.variable_count() == 1 && query.terms.get(1).is_some_and(Term::is_variable);
    if second_is_answer && ground.terms.len() == 2 {
        ground.terms[0] = ground.terms[1].clone();
    }
    ground
}

/// Reads the value bound to `variable` from a binding produced for `query`
///
/// Returns `None` when `variable` is not one of the query's variables.
#[must_use]
pub fn column_value<'b>(query: &Atom, binding: &'b Binding, variable: &str) -> Option<&'b str> {
    match query.variable_count() {
        1 => query
            .variables()
            .next()
            .filter(|name| *name == variable)
            .and_then(|_| binding.terms.first())
            .map(Term::name),
        2 => query
            .terms
            .iter()
            .zip(&binding.terms)
            .find(|(term, _)| term.name() == variable)
            .map(|(_, value)| value.name()),
        _ => None,
    }
}

/// Maps each variable of `query` to its value in `binding`, in term order
#[must_use]
pub fn named(query: &Atom, binding: &Binding) -> IndexMap<String, String> {
    query
        .variables()
        .filter_map(|var| {
            column_value(query, binding, var).map(|value| (var.to_owned(), value.to_owned()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_variable_query_copies_facts_through() {
        let query = Atom::binary("motherOf", "X", "Y");
        let facts = [
            Atom::binary("motherOf", "marry", "judy"),
            Atom::binary("motherOf", "ann", "marry"),
        ];
        assert_eq!(project(&query, &facts), facts.to_vec());
    }

    #[test]
    fn test_ground_query_copies_facts_through() {
        let query = Atom::binary("motherOf", "ann", "marry");
        let facts = [Atom::binary("motherOf", "ann", "marry")];
        assert_eq!(project(&query, &facts), facts.to_vec());
    }

    #[test]
    fn test_answer_in_first_position_stays() {
        let query = Atom::binary("motherOf", "X", "jane");
        let facts = [Atom::binary("motherOf", "dick", "jane")];
        let bindings = project(&query, &facts);
        assert_eq!(bindings[0].terms[0].name(), "dick");
    }

    #[test]
    fn test_answer_in_second_position_moves_to_first() {
        let query = Atom::binary("motherOf", "ann", "X");
        let facts = [Atom::binary("motherOf", "ann", "marry")];
        let bindings = project(&query, &facts);
        assert_eq!(bindings[0], Atom::binary("motherOf", "marry", "marry"));
    }

    #[test]
    fn test_column_value_single_variable_reads_first_term() {
        let query = Atom::binary("motherOf", "ann", "F");
        let binding = project_one(&query, Atom::binary("motherOf", "ann", "marry"));
        assert_eq!(column_value(&query, &binding, "F"), Some("marry"));
        assert_eq!(column_value(&query, &binding, "X"), None);
    }

    #[test]
    fn test_column_value_two_variables_reads_by_position() {
        let query = Atom::binary("motherOf", "X", "F");
        let binding = Atom::binary("motherOf", "ann", "marry");
        assert_eq!(column_value(&query, &binding, "X"), Some("ann"));
        assert_eq!(column_value(&query, &binding, "F"), Some("marry"));
    }

    #[test]
    fn test_column_value_ground_query_binds_nothing() {
        let query = Atom::unary("fruit", "apple");
        assert_eq!(column_value(&query, &query.clone(), "apple"), None);
    }

    #[test]
    fn test_named_bindings() {
        let query = Atom::binary("grandMotherOf", "X", "GM");
        let binding = Atom::binary("grandMotherOf", "ann", "judy");
        let values = named(&query, &binding);
        assert_eq!(values.get("X").map(String::as_str), Some("ann"));
        assert_eq!(values.get("GM").map(String::as_str), Some("judy"));

        let repeated = Atom::binary("same", "X", "X");
        assert_eq!(named(&repeated, &Atom::binary("same", "c", "c")).len(), 1);
    }
}
