//! Text front-ends: a YAML catalogue description and a tiny
//! SELECT/FROM/WHERE query language.

pub mod query;
pub mod yaml;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error(transparent)]
    Core(#[from] relopt_core::error::Error),
}

impl ParseError {
    /// Hints for the user; core errors keep their own.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            ParseError::Core(inner) => inner.suggestions(),
            ParseError::Syntax { .. } => {
                vec!["Queries read SELECT <attrs|*> FROM <relations> [WHERE a = b, ...]".into()]
            }
            ParseError::Yaml(_) => vec![
                "Each relation needs a name and tuples; attributes take a name and distinct".into(),
            ],
        }
    }

    pub(crate) fn syntax(line: usize, message: impl Into<String>) -> Self {
        ParseError::Syntax {
            line,
            message: message.into(),
        }
    }
}
