//! SELECT/FROM/WHERE query text → canonical plan.
//!
//! ```text
//! SELECT persname, deptname
//! FROM Department, Project, Person
//! WHERE persid = manager, dept = deptid, persname = "Smith"
//! ```
//!
//! Keywords are case-insensitive. `SELECT *` keeps every attribute, WHERE
//! predicates may be separated by commas or `AND`, and literals are either
//! quoted strings (single or double) or bare numbers.
//!
//! The canonical plan is a left-deep Product of Scans in FROM order, one
//! Select per predicate (the first innermost), then a Project unless `*`.

use pest::error::{ErrorVariant, InputLocation, LineColLocation};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use relopt_core::catalog::Catalogue;
use relopt_core::dag::Operator;
use relopt_core::error::Error;
use relopt_core::expr::Predicate;
use relopt_core::schema::Attribute;

use super::ParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// `None` for `SELECT *`.
    pub select: Option<Vec<String>>,
    pub from: Vec<String>,
    pub predicates: Vec<Predicate>,
}

impl Query {
    pub fn parse(src: &str) -> Result<Self, ParseError> {
        let mut pairs =
            QueryParser::parse(Rule::query, src).map_err(|e| syntax_error(src, e))?;
        match pairs.next() {
            Some(top) => Query::from_parsed_rule(top),
            None => Err(ParseError::syntax(1, "empty query")),
        }
    }

    /// Build the canonical plan, checking every name against `catalogue`.
    pub fn to_plan(&self, catalogue: &dyn Catalogue) -> Result<Operator, ParseError> {
        let mut plan: Option<Operator> = None;
        for name in &self.from {
            let scan = Operator::scan_named(catalogue, name)?;
            plan = Some(match plan {
                None => scan,
                Some(left) => Operator::product(left, scan),
            });
        }
        let mut plan = plan.ok_or_else(|| ParseError::syntax(1, "FROM lists no relations"))?;

        for predicate in &self.predicates {
            if let Some(missing) = predicate
                .attributes()
                .find(|a| !plan.contains_attribute(&a.name))
            {
                return Err(Error::AttributeNotFound(missing.name.clone()).into());
            }
            plan = Operator::select(plan, predicate.clone());
        }

        if let Some(names) = &self.select {
            if let Some(missing) = names.iter().find(|n| !plan.contains_attribute(n)) {
                return Err(Error::AttributeNotFound(missing.clone()).into());
            }
            plan = Operator::project(plan, names.iter().map(Attribute::new).collect());
        }
        Ok(plan)
    }
}

/// Parse `src` and build its canonical plan against `catalogue`.
pub fn parse_query(src: &str, catalogue: &dyn Catalogue) -> Result<Operator, ParseError> {
    Query::parse(src)?.to_plan(catalogue)
}

#[derive(Parser)]
#[grammar = "dsl/query.pest"]
struct QueryParser;

impl Query {
    fn from_parsed_rule(parsed_rule: Pair<'_, Rule>) -> Result<Self, ParseError> {
        let mut query = Query {
            select: None,
            from: Vec::new(),
            predicates: Vec::new(),
        };
        for part in parsed_rule.into_inner() {
            match part.as_rule() {
                Rule::select_list => {
                    let names: Vec<String> = part
                        .into_inner()
                        .filter(|p| p.as_rule() == Rule::attribute)
                        .map(|p| p.as_str().to_string())
                        .collect();
                    // `*` leaves no attribute pairs behind.
                    query.select = (!names.is_empty()).then_some(names);
                }
                Rule::from_list => {
                    query.from = part
                        .into_inner()
                        .filter(|p| p.as_rule() == Rule::relation)
                        .map(|p| p.as_str().to_string())
                        .collect();
                }
                Rule::where_list => {
                    for pred in part.into_inner().filter(|p| p.as_rule() == Rule::predicate) {
                        query.predicates.push(predicate(pred)?);
                    }
                }
                _ => {}
            }
        }
        Ok(query)
    }
}

fn predicate(parsed_rule: Pair<'_, Rule>) -> Result<Predicate, ParseError> {
    let line = parsed_rule.as_span().start_pos().line_col().0;
    let mut parts = parsed_rule.into_inner().filter(|p| p.as_rule() != Rule::eq);
    let (left, right) = match (parts.next(), parts.next()) {
        (Some(left), Some(right)) => (left.as_str().to_string(), right),
        _ => return Err(ParseError::syntax(line, "incomplete predicate")),
    };
    Ok(match right.as_rule() {
        Rule::attribute => Predicate::attr_eq(left, right.as_str()),
        Rule::string => {
            let text = right
                .into_inner()
                .next()
                .map(|t| t.as_str().to_string())
                .unwrap_or_default();
            Predicate::value_eq(left, text)
        }
        _ => Predicate::value_eq(left, right.as_str()),
    })
}

/// Turn a pest failure into a line-numbered message naming what was
/// expected and what was found instead.
fn syntax_error(src: &str, err: pest::error::Error<Rule>) -> ParseError {
    let line = match err.line_col {
        LineColLocation::Pos((line, _)) | LineColLocation::Span((line, _), _) => line,
    };
    let offset = match err.location {
        InputLocation::Pos(pos) | InputLocation::Span((pos, _)) => pos,
    };
    let found = found_at(src.get(offset..).unwrap_or(""));
    let message = match &err.variant {
        ErrorVariant::ParsingError { positives, .. } if !positives.is_empty() => {
            let mut wanted: Vec<&str> = Vec::new();
            for rule in positives {
                let what = describe(*rule);
                if !wanted.contains(&what) {
                    wanted.push(what);
                }
            }
            format!("expected {}, found {}", wanted.join(" or "), found)
        }
        ErrorVariant::ParsingError { .. } => format!("unexpected {}", found),
        ErrorVariant::CustomError { message } => message.clone(),
    };
    ParseError::syntax(line, message)
}

fn describe(rule: Rule) -> &'static str {
    match rule {
        Rule::attribute => "attribute name",
        Rule::relation => "relation name",
        Rule::string | Rule::number => "literal",
        Rule::predicate => "predicate",
        Rule::kw_select => "SELECT",
        Rule::kw_from => "FROM",
        Rule::kw_where => "WHERE",
        Rule::kw_and => "AND",
        Rule::star => "`*`",
        Rule::comma => "`,`",
        Rule::eq => "`=`",
        Rule::EOI => "end of query",
        _ => "query",
    }
}

/// The token starting at `rest`, quoted for messages.
fn found_at(rest: &str) -> String {
    let rest = rest.trim_start();
    let word: String = rest
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    match rest.chars().next() {
        None => "end of input".to_string(),
        Some(c) if word.is_empty() => format!("`{}`", c),
        Some(_) => format!("`{}`", word),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_clauses() {
        let q = Query::parse(
            "select a, b\nFROM R, S\nwhere a = b and c = \"x\", d = 42",
        )
        .unwrap();
        assert_eq!(q.select, Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(q.from, vec!["R", "S"]);
        assert_eq!(
            q.predicates,
            vec![
                Predicate::attr_eq("a", "b"),
                Predicate::value_eq("c", "x"),
                Predicate::value_eq("d", "42"),
            ]
        );
    }

    #[test]
    fn star_and_no_where() {
        let q = Query::parse("SELECT * FROM R").unwrap();
        assert_eq!(q.select, None);
        assert!(q.predicates.is_empty());
    }

    #[test]
    fn keyword_prefixes_are_names() {
        let q = Query::parse("SELECT selection FROM fromage WHERE andrew = 'x y'").unwrap();
        assert_eq!(q.select, Some(vec!["selection".to_string()]));
        assert_eq!(q.from, vec!["fromage"]);
        assert_eq!(q.predicates, vec![Predicate::value_eq("andrew", "x y")]);
    }

    #[test]
    fn reports_what_was_expected() {
        match Query::parse("SELECT a FROM R\nWHERE a b") {
            Err(ParseError::Syntax { line, message }) => {
                assert_eq!(line, 2);
                assert_eq!(message, "expected `=`, found `b`");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn errors_carry_line_numbers() {
        match Query::parse("SELECT a\nFROM\nWHERE a = 1") {
            Err(ParseError::Syntax { line, message }) => {
                assert_eq!(line, 3);
                assert!(message.contains("relation name"), "{}", message);
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert!(matches!(
            Query::parse("SELECT a FROM R WHERE a = \"open"),
            Err(ParseError::Syntax { line: 1, .. })
        ));
        assert!(matches!(
            Query::parse("SELECT a FROM R WHERE a"),
            Err(ParseError::Syntax { .. })
        ));
    }
}
