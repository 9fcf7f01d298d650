pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The ordinary backtracking signal. Nothing was consumed.
    #[error("not matched")]
    NotMatched,
    /// The reader has no characters left.
    #[error("end of input")]
    EndOfInput,
    /// Commit or rollback without an open transaction.
    #[error("no active transaction")]
    NoActiveTransaction,
    /// A transform function returned an error.
    #[error("transform failed: {0}")]
    Transform(anyhow::Error),
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex_automata::meta::BuildError),
    /// A lazy parser's self-reference outlived the parser it refers to.
    #[error("recursive parser used after its definition was dropped")]
    DanglingRecursion,
}

impl Error {
    /// Whether this error is a recoverable failure that alternation and
    /// repetition catch. Anything else aborts the whole parse.
    pub fn is_backtrack(&self) -> bool {
        matches!(self, Error::NotMatched | Error::EndOfInput)
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Error {
        Error::Transform(err)
    }
}
