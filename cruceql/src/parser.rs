//! Textual condition parser using nom
//!
//! Parses compact filter expressions into [`Condition`]s:
//!
//! ```text
//! Edad >= 40
//! Sexo IN [F, M]
//! "Presion Arterial (mmhg)" CONTAINS '140'
//! ```

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while1},
    character::complete::{char, multispace0, multispace1, none_of},
    combinator::{map, value},
    multi::{many0, separated_list0},
    sequence::{delimited, tuple},
};

use crate::ast::{Condition, OperatorKind, Test};
use crate::error::ParseError;

/// Parse a single condition
pub fn parse_condition(input: &str) -> Result<Condition, ParseError> {
    let input = input.trim();
    let (remaining, cond) = condition(input).map_err(|e| locate(input, e))?;

    let rest = remaining.trim();
    if !rest.is_empty() {
        return Err(ParseError::new(format!("Unexpected trailing content: {}", rest))
            .with_position(input.len() - remaining.len()));
    }

    Ok(cond)
}

/// Parse conditions separated by semicolons. Empty entries are skipped.
pub fn parse_conditions(input: &str) -> Result<Vec<Condition>, ParseError> {
    let mut conditions = Vec::new();
    let mut remaining = input.trim();

    while !remaining.is_empty() {
        remaining = remaining.trim_start_matches(|c: char| c == ';' || c.is_whitespace());
        if remaining.is_empty() {
            break;
        }

        let (rest, cond) = condition(remaining).map_err(|e| locate(input, e))?;
        conditions.push(cond);

        let rest = rest.trim_start();
        if !rest.is_empty() && !rest.starts_with(';') {
            return Err(ParseError::new(format!("Expected ';' before: {}", rest))
                .with_position(input.len() - rest.len()));
        }
        remaining = rest;
    }

    Ok(conditions)
}

fn locate(source: &str, err: nom::Err<nom::error::Error<&str>>) -> ParseError {
    let position = match &err {
        nom::Err::Error(e) | nom::Err::Failure(e) => Some(source.len() - e.input.len()),
        nom::Err::Incomplete(_) => None,
    };
    let parsed = ParseError::from(err);
    match position {
        Some(pos) => parsed.with_position(pos),
        None => parsed,
    }
}

// ============================================================================
// Conditions
// ============================================================================

fn condition(input: &str) -> IResult<&str, Condition> {
    let (input, field) = field_name(input)?;
    let (input, _) = multispace0(input)?;
    let (input, test) = alt((in_test, includes_test, comparison_test))(input)?;

    Ok((input, Condition { field, test }))
}

fn comparison_test(input: &str) -> IResult<&str, Test> {
    let (input, op) = alt((
        value(OperatorKind::GreaterThanOrEqual, tag(">=")),
        value(OperatorKind::LessThanOrEqual, tag("<=")),
        value(OperatorKind::Equals, tag("=")),
    ))(input)?;
    let (input, _) = multispace0(input)?;
    let (input, operand) = scalar(input)?;

    let test = match op {
        OperatorKind::GreaterThanOrEqual => Test::GreaterThanOrEqual(operand),
        OperatorKind::LessThanOrEqual => Test::LessThanOrEqual(operand),
        _ => Test::Equals(operand),
    };
    Ok((input, test))
}

fn in_test(input: &str) -> IResult<&str, Test> {
    let (input, _) = tag_no_case("IN")(input)?;
    let (input, _) = multispace0(input)?;
    let (input, candidates) = delimited(
        tuple((char('['), multispace0)),
        separated_list0(tuple((multispace0, char(','), multispace0)), scalar),
        tuple((multispace0, char(']'))),
    )(input)?;

    Ok((input, Test::In(candidates)))
}

fn includes_test(input: &str) -> IResult<&str, Test> {
    let (input, _) = tag_no_case("CONTAINS")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, needle) = scalar(input)?;

    Ok((input, Test::Includes(needle)))
}

// ============================================================================
// Primitives
// ============================================================================

fn field_name(input: &str) -> IResult<&str, String> {
    alt((string_literal, map(identifier, String::from)))(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '-')(input)
}

/// A quoted string or a bare word such as `40`, `12.5` or `F`
fn scalar(input: &str) -> IResult<&str, String> {
    alt((string_literal, map(bare_word, String::from)))(input)
}

fn bare_word(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | '+'))(input)
}

fn string_literal(input: &str) -> IResult<&str, String> {
    alt((
        delimited(
            char('\''),
            map(
                many0(alt((
                    value('\'', tag("''")),
                    none_of("'"),
                ))),
                |chars: Vec<char>| chars.into_iter().collect::<String>(),
            ),
            char('\''),
        ),
        delimited(
            char('"'),
            map(
                many0(alt((
                    value('"', tag("\\\"")),
                    value('\\', tag("\\\\")),
                    none_of("\"\\"),
                ))),
                |chars: Vec<char>| chars.into_iter().collect::<String>(),
            ),
            char('"'),
        ),
    ))(input)
}
