//! Lexical analysis for the shell: splitting an input line into argument
//! tokens.
//!
//! The language here is deliberately tiny — words separated by runs of
//! ASCII whitespace, no quoting, no operators other than the trailing
//! background marker (which the launcher strips later). What the lexer
//! does guarantee is that no empty token is ever produced and that the
//! documented input bounds are enforced with an error instead of silent
//! truncation.

/// Maximum number of argument tokens accepted on one line.
pub const MAX_ARGS: usize = 64;

/// Maximum accepted length of one input line, in bytes.
pub const MAX_LINE: usize = 1024;

/// Errors that can occur while tokenizing an input line.
#[derive(Debug, PartialEq, Eq)]
pub enum LexError {
    /// The line contains more than [`MAX_ARGS`] tokens.
    TooManyArgs,
    /// The line is longer than [`MAX_LINE`] bytes.
    LineTooLong,
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LexError::TooManyArgs => write!(f, "too many arguments (limit {})", MAX_ARGS),
            LexError::LineTooLong => write!(f, "input line too long (limit {} bytes)", MAX_LINE),
        }
    }
}

impl std::error::Error for LexError {}

/// Split `line` into whitespace-delimited tokens.
///
/// Consecutive separators are collapsed; leading and trailing whitespace is
/// ignored. An empty or all-whitespace line yields an empty vector, which
/// callers treat as "no command".
pub fn tokenize(line: &str) -> Result<Vec<String>, LexError> {
    if line.len() > MAX_LINE {
        return Err(LexError::LineTooLong);
    }

    let mut tokens = Vec::new();
    for word in line.split_ascii_whitespace() {
        if tokens.len() == MAX_ARGS {
            return Err(LexError::TooManyArgs);
        }
        tokens.push(word.to_string());
    }
    Ok(tokens)
}
