//! Reshaping results and composing grammars.

use anyhow::anyhow;
use nom::combinator::all_consuming;
use nom::number::complete::double;

use crate::error::Error;
use crate::parser::Parser;
use crate::primitives::concat_text;
use crate::value::{ParseResult, Value};

/// A single step of a `compose` pipeline.
pub type Step = Box<dyn Fn(Parser) -> Parser + Send + Sync>;

/// Replaces the value of each result of `parser` with what `f` returns. The
/// range is kept.
pub fn transform<F>(parser: Parser, f: F) -> Parser
where
    F: Fn(ParseResult) -> anyhow::Result<Value> + Send + Sync + 'static,
{
    parser.map_result(move |result| {
        let range = result.range;
        let value = f(result).map_err(Error::Transform)?;
        Ok(ParseResult::new(value, range))
    })
}

/// Like `transform`, but `f` receives the child results of a sequence. A
/// result that is not a sequence is passed as the only element.
///
/// Children are not flattened, so each index is one field of the grammar.
/// Wrap `parser` in `flatten` to receive the leaves instead.
pub fn transform_as_results<F>(parser: Parser, f: F) -> Parser
where
    F: Fn(Vec<ParseResult>) -> anyhow::Result<Value> + Send + Sync + 'static,
{
    transform(parser, move |result| match result.value {
        Value::Results(children) => f(children),
        value => f(vec![ParseResult::new(value, result.range)]),
    })
}

/// Rewrites nested sequences into one flat sequence of their leaves, in
/// order.
pub fn flatten(parser: Parser) -> Parser {
    parser.map_result(|result| match result.value {
        Value::Results(children) => {
            let mut leaves = Vec::with_capacity(children.len());
            flatten_into(children, &mut leaves);
            Ok(ParseResult::new(leaves, result.range))
        }
        _ => Ok(result),
    })
}

fn flatten_into(results: Vec<ParseResult>, out: &mut Vec<ParseResult>) {
    for result in results {
        match result.value {
            Value::Results(children) => flatten_into(children, out),
            _ => out.push(result),
        }
    }
}

/// Picks element `i` out of a sequence result.
pub fn index(parser: Parser, i: usize) -> Parser {
    parser.map_result(move |result| {
        let len = result.value.as_results().map(|rs| rs.len());
        match result.value {
            Value::Results(mut children) if i < children.len() => Ok(children.swap_remove(i)),
            _ => Err(anyhow!("index {} out of range for {:?} elements", i, len).into()),
        }
    })
}

/// Drops nil elements from a sequence result.
pub fn filter_nil(parser: Parser) -> Parser {
    parser.map_result(|result| match result.value {
        Value::Results(children) => {
            let kept: Vec<ParseResult> =
                children.into_iter().filter(|r| !r.value.is_nil()).collect();
            Ok(ParseResult::new(kept, result.range))
        }
        _ => Ok(result),
    })
}

/// Folds a sequence of string results into one string.
pub fn concat_string(parser: Parser) -> Parser {
    concat_text(parser)
}

/// Builds a pipeline out of parser-to-parser steps. The steps compose like
/// functions: `compose(vec![f, g])(p)` is `f(g(p))`.
///
/// See the `compose!` macro for a shorter form.
pub fn compose(steps: Vec<Step>) -> impl Fn(Parser) -> Parser {
    move |parser| steps.iter().rev().fold(parser, |parser, step| step(parser))
}

/// Defers building a parser until it is first used. `build` receives a
/// handle to the parser being defined, for grammars that refer to
/// themselves.
///
/// `build` runs at most once.
pub fn lazy<F>(build: F) -> Parser
where
    F: Fn(&Parser) -> Parser + Send + Sync + 'static,
{
    Parser::lazy(build)
}

/// Attaches a label and description to `parser` without changing what it
/// matches. Pattern-style rendering prints the label in place of the
/// parser's structure.
pub fn annotate(parser: Parser, label: &str, description: &str) -> Parser {
    parser.annotated(label, description)
}

/// Converts the numeric literal matched by `parser` into a number.
pub fn transform_to_number(parser: Parser) -> Parser {
    transform(parser, |result| {
        let literal = result
            .value
            .to_text()
            .ok_or_else(|| anyhow!("not a string value: {:?}", result.value))?;
        parse_number(&literal).map(Value::Number)
    })
}

fn parse_number(literal: &str) -> anyhow::Result<f64> {
    let parsed = all_consuming(double::<&str, nom::error::Error<&str>>)(literal);
    match parsed {
        Ok((_, n)) if n.is_finite() => Ok(n),
        Ok(_) => Err(anyhow!("number out of range: {:?}", literal)),
        Err(_) => Err(anyhow!("invalid number literal: {:?}", literal)),
    }
}
