//! Textual clause syntax.
//!
//! ```text
//! fact(a, b).
//! head(X, Y) :- first(X, Z), second(Z, Y).   % AND
//! head(X) :- first(X) ; second(X).           % OR
//! ```
//!
//! Names are ASCII alphanumerics, `_` and `-`; a name starting with an
//! uppercase letter is a variable.

use nom::branch::alt;
use nom::bytes::complete::{tag, take_while1};
use nom::character::complete::{char as pchar, multispace0, one_of};
use nom::combinator::{all_consuming, map, opt};
use nom::multi::separated_list1;
use nom::sequence::{delimited, pair, preceded, terminated};
use nom::{Finish, IResult};

use crate::atom::{Atom, Term};
use crate::database::{Combinator, Database, Rule};
use crate::error::{Error, Result};

type RawAtom<'a> = (&'a str, Vec<&'a str>);
type RawBody<'a> = (RawAtom<'a>, Option<(Combinator, RawAtom<'a>)>);
type RawClause<'a> = (RawAtom<'a>, Option<RawBody<'a>>);

/// One line of a database text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// `fact(a, b).`
    Fact(Atom),
    /// `head(X) :- body.`
    Rule(Rule),
}

/// Parses a query such as `grandMotherOf(X, GM)`, with an optional
/// trailing `.` or `?`
///
/// # Errors
///
/// [`Error::Parse`] for bad syntax, [`Error::MalformedAtom`] for an atom
/// with the wrong number of terms.
pub fn parse_query(input: &str) -> Result<Atom> {
    let (_, raw) = all_consuming(terminated(ws(atom), opt(ws(one_of(".?")))))(input)
        .finish()
        .map_err(|error| syntax_error(input, &error))?;
    build_atom(raw)
}

/// Parses a fact or a rule
///
/// # Errors
///
/// [`Error::Parse`] for bad syntax, otherwise the validation errors of
/// [`Atom::validate`] and [`Rule::validate`].
pub fn parse_clause(input: &str) -> Result<Clause> {
    let (_, (head, body)) = all_consuming(clause)(input)
        .finish()
        .map_err(|error| syntax_error(input, &error))?;

    let head = build_atom(head)?;
    let Some((first, rest)) = body else {
        return Ok(Clause::Fact(head));
    };

    let first = build_atom(first)?;
    let rule = match rest {
        None => Rule::single(head, first),
        Some((Combinator::And, second)) => Rule::and(head, first, build_atom(second)?),
        Some((Combinator::Or, second)) => Rule::or(head, first, build_atom(second)?),
    };
    rule.validate()?;
    Ok(Clause::Rule(rule))
}

impl Database {
    /// Builds a database from text holding one clause per line
    ///
    /// Blank lines are skipped and `%` starts a comment running to the end
    /// of the line.
    ///
    /// # Errors
    ///
    /// The first error of [`parse_clause`], [`Database::add_fact`] or
    /// [`Database::add_rule`].
    pub fn parse(text: &str) -> Result<Self> {
        let mut database = Self::new();
        for line in text.lines() {
            let line = line.split('%').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }
            match parse_clause(line)? {
                Clause::Fact(fact) => {
                    database.add_fact(fact)?;
                }
                Clause::Rule(rule) => {
                    database.add_rule(rule)?;
                }
            }
        }
        Ok(database)
    }
}

fn build_atom((predicate, names): RawAtom<'_>) -> Result<Atom> {
    let atom = Atom::new(predicate, names.into_iter().map(Term::classify));
    atom.validate()?;
    Ok(atom)
}

fn syntax_error(input: &str, error: &nom::error::Error<&str>) -> Error {
    let reason = if error.input.is_empty() {
        "unexpected end of input".to_string()
    } else {
        format!("unexpected `{}`", error.input)
    };
    Error::Parse {
        input: input.to_owned(),
        reason,
    }
}

fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-')(input)
}

fn atom(input: &str) -> IResult<&str, RawAtom<'_>> {
    pair(
        ws(name),
        delimited(pchar('('), separated_list1(pchar(','), ws(name)), pchar(')')),
    )(input)
}

fn combinator(input: &str) -> IResult<&str, Combinator> {
    alt((
        map(pchar(','), |_| Combinator::And),
        map(pchar(';'), |_| Combinator::Or),
    ))(input)
}

fn body(input: &str) -> IResult<&str, RawBody<'_>> {
    pair(ws(atom), opt(pair(ws(combinator), ws(atom))))(input)
}

fn clause(input: &str) -> IResult<&str, RawClause<'_>> {
    terminated(
        pair(ws(atom), opt(preceded(ws(tag(":-")), body))),
        opt(ws(pchar('.'))),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::LogicEngine;

    #[test]
    fn test_parse_query() {
        assert_eq!(
            parse_query("grandMotherOf(X, GM)").unwrap(),
            Atom::binary("grandMotherOf", "X", "GM")
        );
        assert_eq!(
            parse_query("  fruit( X )? ").unwrap(),
            Atom::unary("fruit", "X")
        );
        assert_eq!(
            parse_query("female-with-like-to(Female, Like).").unwrap(),
            Atom::binary("female-with-like-to", "Female", "Like")
        );
    }

    #[test]
    fn test_parse_query_rejects_bad_input() {
        assert!(matches!(parse_query("fruit(X"), Err(Error::Parse { .. })));
        assert!(matches!(parse_query("fruit()"), Err(Error::Parse { .. })));
        assert!(matches!(parse_query("fruit(X) extra"), Err(Error::Parse { .. })));
        assert!(matches!(
            parse_query("p(a, b, c)"),
            Err(Error::MalformedAtom { .. })
        ));
    }

    #[test]
    fn test_parse_fact_clause() {
        assert_eq!(
            parse_clause("motherOf(ann, marry).").unwrap(),
            Clause::Fact(Atom::binary("motherOf", "ann", "marry"))
        );
    }

    #[test]
    fn test_parse_rule_clauses() {
        assert_eq!(
            parse_clause("likes(john, X) :- likes(X, wine).").unwrap(),
            Clause::Rule(Rule::single(
                Atom::binary("likes", "john", "X"),
                Atom::binary("likes", "X", "wine"),
            ))
        );
        assert_eq!(
            parse_clause("grandMotherOf(X, GM) :- motherOf(X, F), motherOf(F, GM).").unwrap(),
            Clause::Rule(Rule::and(
                Atom::binary("grandMotherOf", "X", "GM"),
                Atom::binary("motherOf", "X", "F"),
                Atom::binary("motherOf", "F", "GM"),
            ))
        );
        assert_eq!(
            parse_clause("likes(john, X) :- likes(X, wine) ; isFruit(X).").unwrap(),
            Clause::Rule(Rule::or(
                Atom::binary("likes", "john", "X"),
                Atom::binary("likes", "X", "wine"),
                Atom::unary("isFruit", "X"),
            ))
        );
    }

    #[test]
    fn test_parse_rule_with_unbound_head_variable() {
        assert!(matches!(
            parse_clause("p(X, Y) :- q(X)."),
            Err(Error::MalformedRule { .. })
        ));
    }

    #[test]
    fn test_database_parse_skips_comments() {
        let database = Database::parse(
            "% fruit\n\nfruit(apple). % trailing\nedible(X) :- fruit(X).\n",
        )
        .unwrap();
        assert_eq!(database.fact_count(), 1);
        assert_eq!(database.rule_count(), 1);
    }

    #[test]
    fn test_database_parse_rejects_non_ground_fact() {
        assert!(Database::parse("fruit(X).").is_err());
    }

    #[test]
    fn test_family_fixture() {
        let database = Database::parse(include_str!("../demos/family.pl")).unwrap();
        assert_eq!(database.fact_count(), 12);
        assert_eq!(database.rule_count(), 7);

        let engine = LogicEngine::new(database);
        let query = parse_query("female-with-like-to(Female, Like)").unwrap();
        let result = engine.solve(&query).unwrap();
        let named = result.named(&query);
        assert_eq!(named.len(), 2);
        assert_eq!(named[0]["Female"], "ann");
        assert_eq!(named[0]["Like"], "wine");
        assert_eq!(named[1]["Female"], "madona");

        let query = parse_query("friend-with(tom, X)").unwrap();
        let result = engine.solve(&query).unwrap();
        assert_eq!(crate::format::render_result(&query, &result), "madona\nann");
    }
}
