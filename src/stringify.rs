//! Rendering parsers as text.
//!
//! Two styles are supported. The pattern style is a compact, regex-like
//! approximation of what a parser accepts, suitable for "expected ..."
//! messages. Annotated parsers are printed as their label.
//!
//! ```text
//! abc([def])?
//! ```
//!
//! The diagnostics style names every combinator and always expands the full
//! structure, annotations and transforms included.
//!
//! ```text
//! <And:<Rune:a><String:bc><Transform:<Many:(<RuneIn:[def]>)?>>>
//! ```

use std::fmt::{self, Display, Write};
use std::sync::Arc;

use crate::parser::{resolve, Kind, LazyCell, Parser};

/// How to render a parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Pattern,
    Diagnostics,
}

/// Render `parser` in the given style.
pub fn stringify(parser: &Parser, style: Style) -> String {
    let mut out = String::new();
    let mut renderer = Renderer {
        style,
        out: &mut out,
        lazies: Vec::new(),
    };
    // Writing to a String does not fail.
    let _ = renderer.render(parser);
    out
}

impl Display for Parser {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&stringify(self, Style::Pattern))
    }
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&stringify(self, Style::Diagnostics))
    }
}

struct Renderer<'a> {
    style: Style,
    out: &'a mut String,
    /// Lazy parsers currently being expanded, to cut off recursion.
    lazies: Vec<*const LazyCell>,
}

impl<'a> Renderer<'a> {
    fn render(&mut self, parser: &Parser) -> fmt::Result {
        match self.style {
            Style::Pattern => self.pattern(parser),
            Style::Diagnostics => self.diagnostics(parser),
        }
    }

    fn pattern(&mut self, parser: &Parser) -> fmt::Result {
        match parser.kind() {
            Kind::Rune(r) => self.literal(&r.to_string()),
            Kind::RuneIn(set) => self.class("", set),
            Kind::RuneNotIn(set) => self.class("^", set),
            Kind::RuneInRange(lo, hi) => self.range("", *lo, *hi),
            Kind::RuneNotInRange(lo, hi) => self.range("^", *lo, *hi),
            Kind::AnyRune => self.out.write_str("."),
            Kind::Regexp(pattern) => self.out.write_str(pattern.source()),
            Kind::String(s) => self.literal(s),
            Kind::And(parsers) => {
                for p in parsers {
                    self.pattern(p)?;
                }
                Ok(())
            }
            Kind::Or(parsers) => {
                self.out.write_char('(')?;
                for (i, p) in parsers.iter().enumerate() {
                    if i > 0 {
                        self.out.write_char('|')?;
                    }
                    self.pattern(p)?;
                }
                self.out.write_char(')')
            }
            Kind::Many(many) => {
                self.out.write_char('(')?;
                self.pattern(&many.parser)?;
                self.out.write_char(')')?;
                self.out.write_str(&quantifier(many.min, many.max))
            }
            Kind::Surround(surround) => {
                self.pattern(&surround.open)?;
                self.out.write_char('(')?;
                self.pattern(&surround.inner)?;
                self.out.write_str(")*")?;
                self.pattern(&surround.close)
            }
            Kind::Transform(t) => self.pattern(&t.parser),
            Kind::Annotate(a) => self.out.write_str(&a.label),
            Kind::Lazy(lazy) => self.lazy(lazy.cell().ok(), "..."),
        }
    }

    fn diagnostics(&mut self, parser: &Parser) -> fmt::Result {
        match parser.kind() {
            Kind::Rune(r) => {
                self.out.write_str("<Rune:")?;
                self.literal(&r.to_string())?;
                self.out.write_char('>')
            }
            Kind::RuneIn(set) => {
                self.out.write_str("<RuneIn:")?;
                self.class("", set)?;
                self.out.write_char('>')
            }
            Kind::RuneNotIn(set) => {
                self.out.write_str("<RuneNotIn:")?;
                self.class("^", set)?;
                self.out.write_char('>')
            }
            Kind::RuneInRange(lo, hi) => {
                self.out.write_str("<RuneInRange:")?;
                self.range("", *lo, *hi)?;
                self.out.write_char('>')
            }
            Kind::RuneNotInRange(lo, hi) => {
                self.out.write_str("<RuneNotInRange:")?;
                self.range("^", *lo, *hi)?;
                self.out.write_char('>')
            }
            Kind::AnyRune => self.out.write_str("<AnyRune:.>"),
            Kind::Regexp(pattern) => write!(self.out, "<Regexp:{}>", pattern.source()),
            Kind::String(s) => {
                self.out.write_str("<String:")?;
                self.literal(s)?;
                self.out.write_char('>')
            }
            Kind::And(parsers) => {
                self.out.write_str("<And:")?;
                for p in parsers {
                    self.diagnostics(p)?;
                }
                self.out.write_char('>')
            }
            Kind::Or(parsers) => {
                self.out.write_str("<Or:")?;
                for (i, p) in parsers.iter().enumerate() {
                    if i > 0 {
                        self.out.write_char('|')?;
                    }
                    self.diagnostics(p)?;
                }
                self.out.write_char('>')
            }
            Kind::Many(many) => {
                self.out.write_str("<Many:(")?;
                self.diagnostics(&many.parser)?;
                self.out.write_char(')')?;
                self.out.write_str(&quantifier(many.min, many.max))?;
                if let Some(terminator) = &many.terminator {
                    self.out.write_char('!')?;
                    self.diagnostics(terminator)?;
                }
                self.out.write_char('>')
            }
            Kind::Surround(surround) => {
                self.out.write_str("<Surround:")?;
                self.diagnostics(&surround.open)?;
                self.out.write_char('(')?;
                self.diagnostics(&surround.inner)?;
                self.out.write_str(")*")?;
                self.diagnostics(&surround.close)?;
                if let Some(escapes) = &surround.escapes {
                    self.out.write_str("\\")?;
                    self.literal(&escapes.escape)?;
                }
                self.out.write_char('>')
            }
            Kind::Transform(t) => {
                self.out.write_str("<Transform:")?;
                self.diagnostics(&t.parser)?;
                self.out.write_char('>')
            }
            Kind::Annotate(a) => {
                write!(self.out, "<Annotate:{}:", a.label)?;
                self.diagnostics(&a.parser)?;
                self.out.write_char('>')
            }
            Kind::Lazy(lazy) => {
                self.out.write_str("<Lazy:")?;
                self.lazy(lazy.cell().ok(), "...")?;
                self.out.write_char('>')
            }
        }
    }

    /// Expand a lazy parser unless it is already being expanded further up.
    fn lazy(&mut self, cell: Option<Arc<LazyCell>>, cut: &str) -> fmt::Result {
        let cell = match cell {
            Some(cell) => cell,
            None => return self.out.write_str(cut),
        };
        let ptr = Arc::as_ptr(&cell);
        if self.lazies.contains(&ptr) {
            return self.out.write_str(cut);
        }
        self.lazies.push(ptr);
        let res = self.render(&resolve(&cell));
        self.lazies.pop();
        res
    }

    fn literal(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            self.escaped(c)?;
        }
        Ok(())
    }

    fn class(&mut self, negate: &str, set: &str) -> fmt::Result {
        write!(self.out, "[{}", negate)?;
        self.literal(set)?;
        self.out.write_char(']')
    }

    fn range(&mut self, negate: &str, lo: char, hi: char) -> fmt::Result {
        write!(self.out, "[{}", negate)?;
        self.escaped(lo)?;
        self.out.write_char('-')?;
        self.escaped(hi)?;
        self.out.write_char(']')
    }

    fn escaped(&mut self, c: char) -> fmt::Result {
        match c {
            '\n' => self.out.write_str("\\n"),
            '\r' => self.out.write_str("\\r"),
            '\t' => self.out.write_str("\\t"),
            c => self.out.write_char(c),
        }
    }
}

fn quantifier(min: usize, max: usize) -> String {
    match (min, max) {
        (0, 0) => "*".to_owned(),
        (1, 0) => "+".to_owned(),
        (0, 1) => "?".to_owned(),
        (min, 0) => format!("{{{},}}", min),
        (min, max) if min == max => format!("{{{}}}", min),
        (min, max) => format!("{{{},{}}}", min, max),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::{and, many, many_min_max_terminate, maybe, or, separated, surround};
    use crate::primitives::{
        any_rune, regexp, rune, rune_in, rune_in_range, rune_not_in, rune_not_in_range, string,
    };
    use crate::transform::{annotate, lazy};

    #[test]
    fn pattern_via_display() {
        let p = and(vec![rune('a'), string("bc"), maybe(rune_in("def"))]);
        assert_eq!(p.to_string(), "abc([def])?");
    }

    #[test]
    fn diagnostics_style() {
        let p = and(vec![rune('a'), string("bc"), maybe(rune_in("def"))]);
        assert_eq!(
            stringify(&p, Style::Diagnostics),
            "<And:<Rune:a><String:bc><Transform:<Many:(<RuneIn:[def]>)?>>>"
        );
        assert_eq!(format!("{:?}", p), stringify(&p, Style::Diagnostics));
    }

    #[test]
    fn every_kind_in_both_styles() {
        struct TestCase {
            parser: Parser,
            pattern: &'static str,
            diagnostics: &'static str,
        }

        let tests = vec![
            TestCase {
                parser: rune_not_in(" \t\n"),
                pattern: "[^ \\t\\n]",
                diagnostics: "<RuneNotIn:[^ \\t\\n]>",
            },
            TestCase {
                parser: rune_in_range('0', '9'),
                pattern: "[0-9]",
                diagnostics: "<RuneInRange:[0-9]>",
            },
            TestCase {
                parser: rune_not_in_range('a', 'z'),
                pattern: "[^a-z]",
                diagnostics: "<RuneNotInRange:[^a-z]>",
            },
            TestCase {
                parser: or(vec![rune('x'), any_rune()]),
                pattern: "(x|.)",
                diagnostics: "<Or:<Rune:x>|<AnyRune:.>>",
            },
            TestCase {
                parser: regexp("[a-c]+").unwrap(),
                pattern: "[a-c]+",
                diagnostics: "<Regexp:[a-c]+>",
            },
            TestCase {
                parser: many(rune('a')),
                pattern: "(a)*",
                diagnostics: "<Many:(<Rune:a>)*>",
            },
            TestCase {
                parser: many_min_max_terminate(rune('a'), 1, 0, None),
                pattern: "(a)+",
                diagnostics: "<Many:(<Rune:a>)+>",
            },
            TestCase {
                parser: many_min_max_terminate(rune('a'), 2, 4, Some(rune(';'))),
                pattern: "(a){2,4}",
                diagnostics: "<Many:(<Rune:a>){2,4}!<Rune:;>>",
            },
            TestCase {
                parser: many_min_max_terminate(rune('a'), 3, 3, None),
                pattern: "(a){3}",
                diagnostics: "<Many:(<Rune:a>){3}>",
            },
            TestCase {
                parser: surround("\"", any_rune(), "\"", "\\"),
                pattern: "\"(.)*\"",
                diagnostics: "<Surround:<String:\">(<AnyRune:.>)*<String:\">\\\\>",
            },
            TestCase {
                parser: surround("<<", any_rune(), ">>", ""),
                pattern: "<<(.)*>>",
                diagnostics: "<Surround:<String:<<>(<AnyRune:.>)*<String:>>>>",
            },
            TestCase {
                parser: annotate(string("null"), "Null", "the null literal"),
                pattern: "Null",
                diagnostics: "<Annotate:Null:<String:null>>",
            },
            TestCase {
                parser: separated(rune('a'), rune(',')),
                pattern: "a(,a)*",
                diagnostics: "<Transform:<And:<Rune:a><Many:(<And:<Rune:,><Rune:a>>)*>>>",
            },
        ];

        for t in tests {
            assert_eq!(stringify(&t.parser, Style::Pattern), t.pattern);
            assert_eq!(stringify(&t.parser, Style::Diagnostics), t.diagnostics);
        }
    }

    #[test]
    fn recursive_grammar_terminates() {
        let parens = lazy(|me| and(vec![rune('('), maybe(me.clone()), rune(')')]));
        assert_eq!(stringify(&parens, Style::Pattern), "((...)?)");
        assert_eq!(
            stringify(&parens, Style::Diagnostics),
            "<Lazy:<And:<Rune:(><Transform:<Many:(<Lazy:...>)?>><Rune:)>>>"
        );
    }

    #[test]
    fn deterministic() {
        let value = lazy(|me| {
            let item = annotate(me.clone(), "Value", "a value");
            or(vec![
                string("null"),
                and(vec![rune('['), maybe(separated(item, rune(','))), rune(']')]),
            ])
        });
        for style in vec![Style::Pattern, Style::Diagnostics] {
            let first = stringify(&value, style);
            assert_eq!(first, stringify(&value, style));
            assert_eq!(first, stringify(&value, style));
        }
        assert_eq!(value.to_string(), "(null|[(Value(,Value)*)?])");
    }
}
