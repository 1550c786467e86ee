use thiserror::Error;

/// Canonical result for core.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A predicate or join attribute is not produced by any relevant input.
    #[error("Attribute not found: {0}")]
    AttributeNotFound(String),

    /// An equality attribute is produced by both inputs of a Product/Join.
    #[error("Ambiguous attribute: {0} is produced by both inputs")]
    AmbiguousAttribute(String),

    /// A distinct-value count of zero (or no count at all) used as a divisor.
    #[error("Empty domain: attribute {0} has no distinct values")]
    EmptyDomain(String),

    #[error("Unknown relation: {0}")]
    UnknownRelation(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Planning error: {0}")]
    Plan(String),

    #[error("Hashing error: {0}")]
    Hash(String),

    #[error("Internal invariant failed: {0}")]
    Invariant(String),

    /// Error with context chain for better debugging
    #[error("Error in {context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Error {
    /// Add context to an error, creating an error chain.
    ///
    /// # Example
    /// ```rust,no_run
    /// use relopt_core::error::Error;
    /// let err = Error::AttributeNotFound("persid".into());
    /// let err = err.with_context("while pushing down selections");
    /// ```
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Error::Context {
            context: context.into(),
            source: Box::new(self) as Box<dyn std::error::Error + Send + Sync>,
        }
    }

    /// Get suggestions for common errors.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Error::AttributeNotFound(name) => vec![
                format!("Check that '{}' is spelled correctly", name),
                "Verify that a relation in the FROM list declares the attribute".into(),
            ],
            Error::AmbiguousAttribute(name) => vec![
                format!("'{}' appears in more than one relation of the query", name),
                "Rename the attribute in one of the relations; aliases are not supported".into(),
            ],
            Error::EmptyDomain(name) => vec![format!(
                "Give '{}' a non-zero distinct-value count in the catalogue",
                name
            )],
            Error::UnknownRelation(_) => {
                vec!["Check that the relation is declared in the catalogue".into()]
            }
            Error::Context { source, .. } => source
                .downcast_ref::<Error>()
                .map(Error::suggestions)
                .unwrap_or_default(),
            _ => vec![],
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Hash(e.to_string())
    }
}
