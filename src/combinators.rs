//! Parsers built out of other parsers.

use anyhow::anyhow;

use crate::error::{Error, Result};
use crate::parser::{Kind, Parser};
use crate::position::TextRange;
use crate::primitives::string;
use crate::reader::Reader;
use crate::transaction::Transaction;
use crate::value::{ParseResult, Value};

/// Runs `parsers` one after another. Succeeds only if all of them do, with
/// their results in order.
pub fn and<I>(parsers: I) -> Parser
where
    I: IntoIterator<Item = Parser>,
{
    Parser::new(Kind::And(parsers.into_iter().collect()))
}

/// Tries `parsers` in order and returns the first success.
pub fn or<I>(parsers: I) -> Parser
where
    I: IntoIterator<Item = Parser>,
{
    Parser::new(Kind::Or(parsers.into_iter().collect()))
}

/// Zero or more repetitions of `parser`. Never fails.
pub fn many(parser: Parser) -> Parser {
    many_min_max_terminate(parser, 0, 0, None)
}

/// Repeats `parser` at least `min` times and at most `max` times, where a
/// `max` of 0 is unbounded.
///
/// Before each attempt the `terminator` is looked ahead without consuming
/// anything. If it matches, the element read by that attempt is the last
/// one.
pub fn many_min_max_terminate(
    parser: Parser,
    min: usize,
    max: usize,
    terminator: Option<Parser>,
) -> Parser {
    Parser::new(Kind::Many(Many {
        parser,
        min,
        max,
        terminator,
    }))
}

/// Zero or one `parser`. Never fails; without a match the result is a
/// zero-width nil.
pub fn maybe(parser: Parser) -> Parser {
    many_min_max_terminate(parser, 0, 1, None).map_result(|result| {
        let range = result.range;
        let found = result.value.into_results().and_then(|mut rs| rs.pop());
        Ok(found.unwrap_or_else(|| ParseResult::new(Value::Nil, range)))
    })
}

/// Matches `parser` and replaces its value with `value`.
pub fn const_value<V: Into<Value>>(parser: Parser, value: V) -> Parser {
    let value = value.into();
    parser.map_result(move |result| Ok(ParseResult::new(value.clone(), result.range)))
}

/// One or more `parser` separated by `sep`. Only the results of `parser` are
/// kept.
pub fn separated(parser: Parser, sep: Parser) -> Parser {
    and(vec![parser.clone(), many(and(vec![sep, parser]))]).map_result(|result| {
        let range = result.range;
        let mut items = result.value.into_results().unwrap_or_default();
        let rest = items
            .pop()
            .and_then(|r| r.value.into_results())
            .unwrap_or_default();
        for pair in rest {
            if let Some(item) = pair.value.into_results().and_then(|mut rs| rs.pop()) {
                items.push(item);
            }
        }
        Ok(ParseResult::new(items, range))
    })
}

/// Text between `open` and `close`, each piece read with `inner`.
///
/// Inside the span, `escape` followed by `close` or by `escape` stands for
/// that literal text. An empty `escape` disables escaping.
pub fn surround(open: &str, inner: Parser, close: &str, escape: &str) -> Parser {
    let escapes = if escape.is_empty() {
        None
    } else {
        Some(Escapes {
            escape: escape.to_owned(),
            escaped_escape: string(&format!("{}{}", escape, escape)),
            escaped_close: string(&format!("{}{}", escape, close)),
        })
    };
    Parser::new(Kind::Surround(Surround {
        open: string(open),
        inner,
        close: string(close),
        close_text: close.to_owned(),
        escapes,
    }))
}

pub(crate) fn parse_and(reader: &mut dyn Reader, parsers: &[Parser]) -> Result<ParseResult> {
    let mut txn = Transaction::new(reader);
    let start = txn.current_position();
    let mut results = Vec::with_capacity(parsers.len());
    for parser in parsers {
        results.push(parser.parse(&mut *txn)?);
    }
    let end = txn.current_position();
    txn.commit()?;
    Ok(ParseResult::new(results, TextRange::new(start, end)))
}

pub(crate) fn parse_or(reader: &mut dyn Reader, parsers: &[Parser]) -> Result<ParseResult> {
    for parser in parsers {
        let mut txn = Transaction::new(&mut *reader);
        match parser.parse(&mut *txn) {
            Ok(result) => {
                txn.commit()?;
                return Ok(result);
            }
            Err(err) if err.is_backtrack() => txn.rollback()?,
            Err(err) => return Err(err),
        }
    }
    Err(Error::NotMatched)
}

pub(crate) struct Many {
    pub(crate) parser: Parser,
    pub(crate) min: usize,
    pub(crate) max: usize,
    pub(crate) terminator: Option<Parser>,
}

impl Many {
    pub(crate) fn parse(&self, reader: &mut dyn Reader) -> Result<ParseResult> {
        let mut txn = Transaction::new(reader);
        let start = txn.current_position();
        let mut results = Vec::new();
        while self.max == 0 || results.len() < self.max || results.len() < self.min {
            let terminated = match &self.terminator {
                Some(terminator) => terminator.lookahead(&mut *txn)?,
                None => false,
            };

            let before = txn.current_position();
            match self.parser.parse(&mut *txn) {
                Ok(result) => results.push(result),
                Err(err) if err.is_backtrack() && results.len() >= self.min => break,
                Err(err) => return Err(err),
            }

            let stalled = txn.current_position() == before;
            if (terminated || stalled) && results.len() >= self.min {
                break;
            }
        }
        let end = txn.current_position();
        txn.commit()?;
        Ok(ParseResult::new(results, TextRange::new(start, end)))
    }
}

pub(crate) struct Escapes {
    pub(crate) escape: String,
    escaped_escape: Parser,
    escaped_close: Parser,
}

pub(crate) struct Surround {
    pub(crate) open: Parser,
    pub(crate) inner: Parser,
    pub(crate) close: Parser,
    close_text: String,
    pub(crate) escapes: Option<Escapes>,
}

impl Surround {
    pub(crate) fn parse(&self, reader: &mut dyn Reader) -> Result<ParseResult> {
        let mut txn = Transaction::new(reader);
        let start = txn.current_position();
        self.open.parse(&mut *txn)?;

        let mut text = String::new();
        loop {
            if let Some(escapes) = &self.escapes {
                if escapes.escaped_escape.attempt(&mut *txn)?.is_some() {
                    text.push_str(&escapes.escape);
                    continue;
                }
                if escapes.escaped_close.attempt(&mut *txn)?.is_some() {
                    text.push_str(&self.close_text);
                    continue;
                }
            }
            if self.close.attempt(&mut *txn)?.is_some() {
                break;
            }

            let piece = self.inner.parse(&mut *txn)?;
            let piece_text = piece
                .value
                .to_text()
                .ok_or_else(|| anyhow!("not a string value: {:?}", piece.value))?;
            text.push_str(&piece_text);
        }

        let end = txn.current_position();
        txn.commit()?;
        Ok(ParseResult::new(text, TextRange::new(start, end)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::TextPosition;
    use crate::primitives::{any_rune, rune, rune_in};
    use crate::reader::InMemoryReader;
    use crate::transform::concat_string;

    fn pos(line: usize, column: usize) -> TextPosition {
        TextPosition::new(line, column)
    }

    fn range(start: (usize, usize), end: (usize, usize)) -> TextRange {
        TextRange::new(pos(start.0, start.1), pos(end.0, end.1))
    }

    #[test]
    fn and_sequence() {
        let result = and(vec![rune('a'), rune('b')]).parse_str("abc").unwrap();
        assert_eq!(
            result,
            ParseResult::new(
                vec![
                    ParseResult::new('a', range((1, 1), (1, 2))),
                    ParseResult::new('b', range((1, 2), (1, 3))),
                ],
                range((1, 1), (1, 3)),
            )
        );
    }

    #[test]
    fn and_all_or_nothing() {
        let mut reader = InMemoryReader::new("abd");
        let res = and(vec![rune('a'), rune('b'), rune('c')]).parse(&mut reader);
        assert!(matches!(res, Err(Error::NotMatched)));
        assert_eq!(reader.current_position(), pos(1, 1));
        assert_eq!(reader.depth(), 0);
    }

    #[test]
    fn or_order() {
        let p = or(vec![string("foo"), string("abc")]);
        assert_eq!(p.parse_str("abc").unwrap().value.as_str(), Some("abc"));

        let p = or(vec![string("ab"), string("abc")]);
        assert_eq!(p.parse_str("abc").unwrap().value.as_str(), Some("ab"));

        let mut reader = InMemoryReader::new("xyz");
        let res = or(vec![string("xa"), string("xyb")]).parse(&mut reader);
        assert!(matches!(res, Err(Error::NotMatched)));
        assert_eq!(reader.current_position(), pos(1, 1));
    }

    #[test]
    fn or_isolates_nested_alternatives() {
        // Each failing branch reads several characters at several depths
        // before giving up. The successful branch must start at 1:1.
        let p = or(vec![
            and(vec![rune('a'), or(vec![string("bx"), and(vec![rune('b'), rune('y')])])]),
            or(vec![
                and(vec![string("ab"), or(vec![rune('d'), string("cz")])]),
                and(vec![rune('a'), rune('b'), rune('c'), rune('e')]),
            ]),
            and(vec![string("abc"), or(vec![rune('q'), rune('d')])]),
        ]);
        let mut reader = InMemoryReader::new("abcd");
        let result = p.parse(&mut reader).unwrap();
        assert_eq!(result.range, range((1, 1), (1, 5)));
        assert_eq!(concat_string(p).parse_str("abcd").unwrap().value.as_str(), Some("abcd"));
        assert_eq!(reader.depth(), 0);
    }

    #[test]
    fn many_repetition() {
        let p = many(rune('a'));
        let result = p.parse_str("aaab").unwrap();
        assert_eq!(result.value.as_results().unwrap().len(), 3);
        assert_eq!(result.range, range((1, 1), (1, 4)));

        let result = p.parse_str("b").unwrap();
        assert_eq!(result.value, Value::Results(vec![]));
        assert!(result.range.is_empty());

        let result = p.parse_str("").unwrap();
        assert_eq!(result.value, Value::Results(vec![]));
    }

    #[test]
    fn many_bounds() {
        struct TestCase {
            min: usize,
            max: usize,
            input: &'static str,
            out: Option<&'static str>,
        }

        let tests = vec![
            TestCase {
                min: 2,
                max: 0,
                input: "aaab",
                out: Some("aaa"),
            },
            TestCase {
                min: 2,
                max: 0,
                input: "ab",
                out: None,
            },
            TestCase {
                min: 0,
                max: 2,
                input: "aaab",
                out: Some("aa"),
            },
            TestCase {
                min: 1,
                max: 1,
                input: "aa",
                out: Some("a"),
            },
            TestCase {
                min: 3,
                max: 3,
                input: "aaaa",
                out: Some("aaa"),
            },
            TestCase {
                min: 3,
                max: 3,
                input: "aa",
                out: None,
            },
        ];
        for t in tests {
            let p = concat_string(many_min_max_terminate(rune('a'), t.min, t.max, None));
            let mut reader = InMemoryReader::new(t.input);
            match (p.parse(&mut reader), t.out) {
                (Ok(result), Some(out)) => assert_eq!(result.value.as_str(), Some(out)),
                (Err(_), None) => assert_eq!(reader.current_position(), pos(1, 1)),
                (got, _) => panic!("min {} max {} on {:?}: {:?}", t.min, t.max, t.input, got),
            }
        }
    }

    #[test]
    fn many_terminator() {
        let p = concat_string(many_min_max_terminate(rune_in("abc"), 0, 0, Some(rune('b'))));
        let mut reader = InMemoryReader::new("abc");
        let result = p.parse(&mut reader).unwrap();
        assert_eq!(result.value.as_str(), Some("ab"));
        assert_eq!(reader.current_position(), pos(1, 3));
        assert_eq!(reader.depth(), 0);
    }

    #[test]
    fn many_of_empty_match_terminates() {
        let p = many(maybe(rune('x')));
        let result = p.parse_str("abc").unwrap();
        assert_eq!(result.value.as_results().unwrap().len(), 1);
        assert!(result.range.is_empty());
    }

    #[test]
    fn maybe_optional() {
        let result = maybe(rune('a')).parse_str("abc").unwrap();
        assert_eq!(result.value, Value::Char('a'));

        let result = maybe(rune('x')).parse_str("abc").unwrap();
        assert_eq!(result.value, Value::Nil);
        assert_eq!(result.range, range((1, 1), (1, 1)));
    }

    #[test]
    fn const_replaces_value() {
        let result = const_value(string("abc"), "foobar").parse_str("abc").unwrap();
        assert_eq!(result.value.as_str(), Some("foobar"));
        assert_eq!(result.range, range((1, 1), (1, 4)));

        let result = const_value(string("true"), true).parse_str("true").unwrap();
        assert_eq!(result.value, Value::Bool(true));
    }

    #[test]
    fn separated_list() {
        let p = separated(rune_in("0123456789"), and(vec![rune(','), many(rune(' '))]));
        let result = p.parse_str("1, 2,3 ;").unwrap();
        let items: Vec<Value> = result
            .value
            .into_results()
            .unwrap()
            .into_iter()
            .map(|r| r.value)
            .collect();
        assert_eq!(items, vec![Value::Char('1'), Value::Char('2'), Value::Char('3')]);
        assert_eq!(result.range, range((1, 1), (1, 7)));

        assert!(p.parse_str(",1").is_err());

        // A trailing separator is left unconsumed.
        let mut reader = InMemoryReader::new("1,2,");
        let result = p.parse(&mut reader).unwrap();
        assert_eq!(result.value.as_results().unwrap().len(), 2);
        assert_eq!(reader.current_position(), pos(1, 4));
    }

    #[test]
    fn surround_escapes() {
        let p = surround("\"", any_rune(), "\"", "\\");
        let result = p.parse_str("\"foo\\\\bar\\\"fizz\\buzz\"").unwrap();
        assert_eq!(result.value.as_str(), Some("foo\\bar\"fizz\\buzz"));
        assert_eq!(result.range, range((1, 1), (1, 22)));
    }

    #[test]
    fn surround_multi_character_delimiters() {
        let p = surround("foo", any_rune(), "foo", "\\");
        let result = p.parse_str("foo123barfoo456").unwrap();
        assert_eq!(result.value.as_str(), Some("123bar"));
    }

    #[test]
    fn surround_without_escape() {
        let p = surround("'", any_rune(), "'", "");
        let result = p.parse_str("'a\\'b'").unwrap();
        assert_eq!(result.value.as_str(), Some("a\\"));
    }

    #[test]
    fn surround_unterminated() {
        let p = surround("\"", any_rune(), "\"", "\\");
        let mut reader = InMemoryReader::new("\"abc");
        assert!(matches!(p.parse(&mut reader), Err(Error::EndOfInput)));
        assert_eq!(reader.current_position(), pos(1, 1));

        let p = surround("\"", rune_in("abc"), "\"", "\\");
        let mut reader = InMemoryReader::new("\"abxc\"");
        assert!(matches!(p.parse(&mut reader), Err(Error::NotMatched)));
        assert_eq!(reader.current_position(), pos(1, 1));
    }
}
