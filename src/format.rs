use crate::atom::{Atom, Binding};
use crate::engine::QueryResult;

/// Printed when a query fails
pub const NO_RESULTS: &str = "no results!";

/// Renders one binding of `query`
///
/// `true` for a ground query, the value for a single variable and both
/// values separated by `, ` for two.
#[must_use]
pub fn render(query: &Atom, binding: &Binding) -> String {
    match query.variable_count() {
        0 => "true".to_string(),
        1 => binding
            .terms
            .first()
            .map(|term| term.name().to_owned())
            .unwrap_or_default(),
        _ => binding
            .terms
            .iter()
            .map(|term| term.name())
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// Renders every binding on its own line, or [`NO_RESULTS`]
#[must_use]
pub fn render_result(query: &Atom, result: &QueryResult) -> String {
    if !result.success {
        return NO_RESULTS.to_string();
    }
    result
        .bindings
        .iter()
        .map(|binding| render(query, binding))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_by_variable_count() {
        let binding = Atom::binary("motherOf", "ann", "marry");
        assert_eq!(render(&Atom::binary("motherOf", "ann", "marry"), &binding), "true");
        assert_eq!(
            render(
                &Atom::binary("motherOf", "ann", "X"),
                &Atom::binary("motherOf", "marry", "marry")
            ),
            "marry"
        );
        assert_eq!(render(&Atom::binary("motherOf", "X", "Y"), &binding), "ann, marry");
    }

    #[test]
    fn test_render_result_lines() {
        let query = Atom::unary("fruit", "X");
        let result = QueryResult {
            success: true,
            bindings: vec![Atom::unary("fruit", "apple"), Atom::unary("fruit", "pear")],
        };
        assert_eq!(render_result(&query, &result), "apple\npear");
    }

    #[test]
    fn test_render_failure() {
        let query = Atom::unary("fruit", "X");
        assert_eq!(render_result(&query, &QueryResult::default()), NO_RESULTS);
    }
}
