//! Parsers that read characters directly from the reader.

use anyhow::anyhow;
use regex_automata::meta::Regex;
use regex_automata::{Anchored, Input, MatchKind};

use crate::combinators::{and, many, many_min_max_terminate};
use crate::error::{Error, Result};
use crate::parser::{Kind, Parser};
use crate::position::TextRange;
use crate::reader::Reader;
use crate::transaction::Transaction;
use crate::value::ParseResult;

/// Matches the character `r`.
pub fn rune(r: char) -> Parser {
    Parser::new(Kind::Rune(r))
}

/// Matches any character in `set`.
pub fn rune_in(set: &str) -> Parser {
    Parser::new(Kind::RuneIn(set.to_owned()))
}

/// Matches any character not in `set`.
pub fn rune_not_in(set: &str) -> Parser {
    Parser::new(Kind::RuneNotIn(set.to_owned()))
}

/// Matches a character between `lo` and `hi`, inclusive.
pub fn rune_in_range(lo: char, hi: char) -> Parser {
    Parser::new(Kind::RuneInRange(lo, hi))
}

/// Matches a character outside of `lo` to `hi`, inclusive.
pub fn rune_not_in_range(lo: char, hi: char) -> Parser {
    Parser::new(Kind::RuneNotInRange(lo, hi))
}

/// Matches any character. Fails with `EndOfInput` rather than `NotMatched`
/// once the input is exhausted.
pub fn any_rune() -> Parser {
    Parser::new(Kind::AnyRune)
}

/// Matches the longest text starting at the current position that the
/// regular expression accepts. Alternations do not stop at the first branch
/// that matches: `a|ab` reads `ab` from `abc`.
pub fn regexp(pattern: &str) -> Result<Parser> {
    Ok(Parser::new(Kind::Regexp(Pattern::new(pattern)?)))
}

/// Matches `s` exactly, all or nothing.
pub fn string(s: &str) -> Parser {
    Parser::new(Kind::String(s.to_owned()))
}

/// Runs `parsers` in sequence and concatenates their text.
pub fn string_by_and<I>(parsers: I) -> Parser
where
    I: IntoIterator<Item = Parser>,
{
    concat_text(and(parsers))
}

/// Zero or more repetitions of `parser`, concatenated.
pub fn string_by_many(parser: Parser) -> Parser {
    concat_text(many(parser))
}

/// One or more repetitions of `parser`, concatenated.
pub fn string_by_many1(parser: Parser) -> Parser {
    concat_text(many_min_max_terminate(parser, 1, 0, None))
}

pub(crate) fn concat_text(parser: Parser) -> Parser {
    parser.map_result(|result| {
        let text = result
            .value
            .to_text()
            .ok_or_else(|| anyhow!("not a string value: {:?}", result.value))?;
        Ok(ParseResult::new(text, result.range))
    })
}

/// Read one character if `accept` allows it.
pub(crate) fn read_matching<F>(reader: &mut dyn Reader, accept: F) -> Result<ParseResult>
where
    F: Fn(char) -> bool,
{
    let mut txn = Transaction::new(reader);
    let start = txn.current_position();
    match txn.read_rune() {
        Ok(c) if accept(c) => {
            let end = txn.current_position();
            txn.commit()?;
            Ok(ParseResult::new(c, TextRange::new(start, end)))
        }
        Ok(_) | Err(Error::EndOfInput) => Err(Error::NotMatched),
        Err(err) => Err(err),
    }
}

pub(crate) fn read_any(reader: &mut dyn Reader) -> Result<ParseResult> {
    let mut txn = Transaction::new(reader);
    let start = txn.current_position();
    let c = txn.read_rune()?;
    let end = txn.current_position();
    txn.commit()?;
    Ok(ParseResult::new(c, TextRange::new(start, end)))
}

pub(crate) fn read_string(reader: &mut dyn Reader, s: &str) -> Result<ParseResult> {
    let mut txn = Transaction::new(reader);
    let start = txn.current_position();
    for want in s.chars() {
        match txn.read_rune() {
            Ok(c) if c == want => {}
            Ok(_) | Err(Error::EndOfInput) => return Err(Error::NotMatched),
            Err(err) => return Err(err),
        }
    }
    let end = txn.current_position();
    txn.commit()?;
    Ok(ParseResult::new(s, TextRange::new(start, end)))
}

/// A compiled regular expression, anchored at the reader's position.
pub(crate) struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    fn new(source: &str) -> Result<Self> {
        let regex = Regex::builder()
            .configure(Regex::config().match_kind(MatchKind::All))
            .build(source)?;
        Ok(Pattern {
            source: source.to_owned(),
            regex,
        })
    }

    pub(crate) fn source(&self) -> &str {
        &self.source
    }

    pub(crate) fn parse(&self, reader: &mut dyn Reader) -> Result<ParseResult> {
        let matched = {
            let rest = reader.remaining();
            let input = Input::new(&*rest).anchored(Anchored::Yes);
            match self.regex.search(&input) {
                Some(m) => rest[..m.end()].to_owned(),
                None => return Err(Error::NotMatched),
            }
        };

        let mut txn = Transaction::new(reader);
        let start = txn.current_position();
        for _ in matched.chars() {
            txn.read_rune()?;
        }
        let end = txn.current_position();
        txn.commit()?;
        Ok(ParseResult::new(matched, TextRange::new(start, end)))
    }
}
