use std::sync::{Arc, Weak};

use once_cell::sync::OnceCell;

use crate::combinators::{Many, Surround};
use crate::error::{Error, Result};
use crate::primitives::{self, Pattern};
use crate::reader::{InMemoryReader, Reader};
use crate::transaction::Transaction;
use crate::value::ParseResult;

pub(crate) type TransformFn = dyn Fn(ParseResult) -> Result<ParseResult> + Send + Sync;

/// A parser built from combinators.
///
/// Parsers are immutable once built and cheap to clone. A parse either
/// returns a result with the reader advanced past the consumed text, or
/// fails with the reader left where it was.
#[derive(Clone)]
pub struct Parser(Arc<Kind>);

/// Every kind of combinator. Parsing and both renderings match on this
/// exhaustively.
pub(crate) enum Kind {
    Rune(char),
    RuneIn(String),
    RuneNotIn(String),
    RuneInRange(char, char),
    RuneNotInRange(char, char),
    AnyRune,
    Regexp(Pattern),
    String(String),
    And(Vec<Parser>),
    Or(Vec<Parser>),
    Many(Many),
    Surround(Surround),
    Transform(Transform),
    Annotate(Annotation),
    Lazy(Lazy),
}

pub(crate) struct Transform {
    pub(crate) parser: Parser,
    f: Box<TransformFn>,
}

pub(crate) struct Annotation {
    pub(crate) parser: Parser,
    pub(crate) label: String,
    pub(crate) description: String,
}

pub(crate) struct LazyCell {
    resolved: OnceCell<Parser>,
    build: Box<dyn Fn(&Parser) -> Parser + Send + Sync>,
}

/// A lazily built parser. The handle given to the build function holds a
/// weak reference so a recursive grammar does not keep itself alive.
pub(crate) enum Lazy {
    Owned(Arc<LazyCell>),
    Recursive(Weak<LazyCell>),
}

impl Lazy {
    pub(crate) fn cell(&self) -> Result<Arc<LazyCell>> {
        match self {
            Lazy::Owned(cell) => Ok(Arc::clone(cell)),
            Lazy::Recursive(weak) => weak.upgrade().ok_or(Error::DanglingRecursion),
        }
    }
}

/// The parser defined by `cell`, building it on first use.
pub(crate) fn resolve(cell: &Arc<LazyCell>) -> Parser {
    cell.resolved
        .get_or_init(|| {
            log::trace!("resolving lazy parser");
            let me = Parser::new(Kind::Lazy(Lazy::Recursive(Arc::downgrade(cell))));
            (cell.build)(&me)
        })
        .clone()
}

impl Parser {
    pub(crate) fn new(kind: Kind) -> Self {
        Parser(Arc::new(kind))
    }

    pub(crate) fn kind(&self) -> &Kind {
        &self.0
    }

    pub(crate) fn lazy<F>(build: F) -> Self
    where
        F: Fn(&Parser) -> Parser + Send + Sync + 'static,
    {
        Parser::new(Kind::Lazy(Lazy::Owned(Arc::new(LazyCell {
            resolved: OnceCell::new(),
            build: Box::new(build),
        }))))
    }

    pub(crate) fn annotated(self, label: &str, description: &str) -> Self {
        Parser::new(Kind::Annotate(Annotation {
            parser: self,
            label: label.to_owned(),
            description: description.to_owned(),
        }))
    }

    /// Wrap this parser, rewriting its successful result with `f`. An error
    /// from `f` fails the parse and restores the reader.
    pub(crate) fn map_result<F>(self, f: F) -> Self
    where
        F: Fn(ParseResult) -> Result<ParseResult> + Send + Sync + 'static,
    {
        Parser::new(Kind::Transform(Transform {
            parser: self,
            f: Box::new(f),
        }))
    }

    /// The label attached with `annotate`, if this parser is annotated.
    pub fn label(&self) -> Option<&str> {
        match self.kind() {
            Kind::Annotate(a) => Some(&a.label),
            _ => None,
        }
    }

    /// The description attached with `annotate`, if this parser is annotated.
    pub fn description(&self) -> Option<&str> {
        match self.kind() {
            Kind::Annotate(a) => Some(&a.description),
            _ => None,
        }
    }

    /// Parse from the reader's current position.
    pub fn parse(&self, reader: &mut dyn Reader) -> Result<ParseResult> {
        match self.kind() {
            Kind::Rune(r) => primitives::read_matching(reader, |c| c == *r),
            Kind::RuneIn(set) => primitives::read_matching(reader, |c| set.contains(c)),
            Kind::RuneNotIn(set) => primitives::read_matching(reader, |c| !set.contains(c)),
            Kind::RuneInRange(lo, hi) => {
                primitives::read_matching(reader, |c| *lo <= c && c <= *hi)
            }
            Kind::RuneNotInRange(lo, hi) => {
                primitives::read_matching(reader, |c| c < *lo || *hi < c)
            }
            Kind::AnyRune => primitives::read_any(reader),
            Kind::Regexp(pattern) => pattern.parse(reader),
            Kind::String(s) => primitives::read_string(reader, s),
            Kind::And(parsers) => crate::combinators::parse_and(reader, parsers),
            Kind::Or(parsers) => crate::combinators::parse_or(reader, parsers),
            Kind::Many(many) => many.parse(reader),
            Kind::Surround(surround) => surround.parse(reader),
            Kind::Transform(t) => {
                let mut txn = Transaction::new(reader);
                let result = t.parser.parse(&mut *txn)?;
                let result = (t.f)(result)?;
                txn.commit()?;
                Ok(result)
            }
            Kind::Annotate(a) => a.parser.parse(reader),
            Kind::Lazy(lazy) => resolve(&lazy.cell()?).parse(reader),
        }
    }

    /// Parse `input` from its start with a fresh reader.
    pub fn parse_str(&self, input: &str) -> Result<ParseResult> {
        let mut reader = InMemoryReader::new(input);
        self.parse(&mut reader).map_err(|err| {
            log::debug!("expected {}: {}", self, err);
            err
        })
    }

    /// Attempt a parse, turning the recoverable failures into `None`.
    pub(crate) fn attempt(&self, reader: &mut dyn Reader) -> Result<Option<ParseResult>> {
        match self.parse(reader) {
            Ok(result) => Ok(Some(result)),
            Err(err) if err.is_backtrack() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Whether this parser matches at the reader's position. Never consumes.
    pub(crate) fn lookahead(&self, reader: &mut dyn Reader) -> Result<bool> {
        let mut txn = Transaction::new(reader);
        let matched = self.attempt(&mut *txn)?.is_some();
        txn.rollback()?;
        Ok(matched)
    }
}
