//! Shape-based matching of a query atom against a fact or a rule head.

use crate::atom::{Atom, Term};

/// Decides whether `candidate` (a fact, or a rule head that may hold formal
/// variables) satisfies `query`
///
/// The caller must already have checked [`Atom::same_signature`]; atoms of
/// any other shape never match.
///
/// For two-term atoms a fully variable candidate matches anything. A fully
/// variable query follows the name rule: `p(X, X)` only accepts candidates
/// whose two names are equal and `p(X, Y)` only candidates whose names differ.
/// Otherwise every constant in the query must equal the candidate term in the
/// same position unless that candidate term is a variable.
#[must_use]
pub fn matches(query: &Atom, candidate: &Atom) -> bool {
    match (query.terms.as_slice(), candidate.terms.as_slice()) {
        ([q], [c]) => q.is_variable() || c.is_variable() || q.name() == c.name(),
        ([q1, q2], [c1, c2]) => {
            if c1.is_variable() && c2.is_variable() {
                return true;
            }
            let accepts = |q: &Term, c: &Term| c.is_variable() || q.name() == c.name();
            match (q1.is_variable(), q2.is_variable()) {
                (true, true) => (q1.name() == q2.name()) == (c1.name() == c2.name()),
                (true, false) => accepts(q2, c2),
                (false, true) => accepts(q1, c1),
                (false, false) => accepts(q1, c1) && accepts(q2, c2),
            }
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fact(a: &str, b: &str) -> Atom {
        Atom::binary("p", a, b)
    }

    #[test]
    fn test_unary_open_query_matches_anything() {
        assert!(matches(&Atom::unary("fruit", "X"), &Atom::unary("fruit", "apple")));
    }

    #[test]
    fn test_unary_formal_parameter_matches_constant() {
        assert!(matches(&Atom::unary("fruit", "apple"), &Atom::unary("fruit", "X")));
    }

    #[test]
    fn test_unary_constants_compare_names() {
        let query = Atom::unary("fruit", "apple");
        assert!(matches(&query, &Atom::unary("fruit", "apple")));
        assert!(!matches(&query, &Atom::unary("fruit", "pear")));
    }

    #[test]
    fn test_fully_variable_candidate_matches_every_query_shape() {
        let head = fact("X", "Y");
        assert!(matches(&fact("a", "b"), &head));
        assert!(matches(&fact("A", "b"), &head));
        assert!(matches(&fact("A", "A"), &head));
        assert!(matches(&fact("A", "B"), &head));
    }

    #[test]
    fn test_repeated_query_variable_needs_equal_candidate_terms() {
        let query = fact("X", "X");
        assert!(matches(&query, &fact("c", "c")));
        assert!(!matches(&query, &fact("a", "b")));
    }

    #[test]
    fn test_distinct_query_variables_need_distinct_candidate_terms() {
        let query = fact("X", "Y");
        assert!(matches(&query, &fact("a", "b")));
        assert!(!matches(&query, &fact("c", "c")));
        // a head with one formal parameter compares names too
        assert!(matches(&query, &fact("john", "X")));
    }

    #[test]
    fn test_one_query_variable_compares_constant_position() {
        let query = fact("X", "jane");
        assert!(matches(&query, &fact("dick", "jane")));
        assert!(!matches(&query, &fact("dick", "judy")));
        assert!(matches(&query, &fact("dick", "Y")));

        let query = fact("ann", "X");
        assert!(matches(&query, &fact("ann", "marry")));
        assert!(!matches(&query, &fact("tom", "marry")));
        assert!(matches(&query, &fact("Z", "marry")));
    }

    #[test]
    fn test_ground_query_against_ground_candidate() {
        let query = fact("ann", "marry");
        assert!(matches(&query, &fact("ann", "marry")));
        assert!(!matches(&query, &fact("marry", "ann")));
    }

    #[test]
    fn test_ground_query_ignores_candidate_variable_position() {
        assert!(matches(&fact("john", "ann"), &fact("john", "X")));
        assert!(!matches(&fact("tom", "ann"), &fact("john", "X")));
        assert!(matches(&fact("tom", "ann"), &fact("X", "ann")));
    }

    #[test]
    fn test_mismatched_arity_never_matches() {
        assert!(!matches(&Atom::unary("p", "X"), &fact("a", "b")));
    }
}
