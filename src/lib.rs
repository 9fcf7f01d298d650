//! Backtracking parser combinators over character input.
//!
//! Grammars are built from small parsers with the functions in this crate
//! and run against a [`Reader`]. Every parser either succeeds with a
//! [`ParseResult`] and advances the reader, or fails and leaves the reader
//! exactly where it was.
//!
//! ```
//! use combinate::{and, maybe, rune, rune_in, string};
//!
//! let p = and(vec![rune('a'), string("bc"), maybe(rune_in("def"))]);
//! let result = p.parse_str("abce").unwrap();
//! assert_eq!(result.value.to_text().as_deref(), Some("abce"));
//! assert_eq!(p.to_string(), "abc([def])?");
//! ```

mod combinators;
mod error;
mod parser;
mod position;
mod primitives;
mod reader;
mod stringify;
mod transaction;
mod transform;
mod value;

pub use combinators::{
    and, const_value, many, many_min_max_terminate, maybe, or, separated, surround,
};
pub use error::{Error, Result};
pub use parser::Parser;
pub use position::{TextPosition, TextRange};
pub use primitives::{
    any_rune, regexp, rune, rune_in, rune_in_range, rune_not_in, rune_not_in_range, string,
    string_by_and, string_by_many, string_by_many1,
};
pub use reader::{InMemoryReader, Reader, Transactional, LINE_BREAK};
pub use stringify::{stringify, Style};
pub use transaction::Transaction;
pub use transform::{
    annotate, compose, concat_string, filter_nil, flatten, index, lazy, transform,
    transform_as_results, transform_to_number, Step,
};
pub use value::{ParseResult, Value};

/// Composes parser-to-parser steps right to left.
///
/// `compose![f, g, h](p)` is `f(g(h(p)))`.
#[macro_export]
macro_rules! compose {
    ($($step:expr),+ $(,)?) => {
        $crate::compose(vec![$(Box::new($step) as $crate::Step),+])
    };
}
