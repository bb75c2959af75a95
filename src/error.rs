use thiserror::Error;

/// Every way a scoring run can fail.
///
/// `TokenNotFound` is the only variant the calculator recovers from, by
/// recording the token as out of vocabulary. The rest surface to the caller.
#[derive(Debug, Error)]
pub enum WeatError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("token '{0}' is not in the vocabulary")]
    TokenNotFound(String),

    #[error("all tokens in at least one lexicon are out of vocabulary (empty: {0})")]
    InsufficientVocabulary(String),

    #[error("association values have zero variance, effect size is undefined")]
    DegenerateInput,

    #[error("{failed} of {total} tests failed or missed their reference by more than {tolerance}")]
    TestsFailed { failed: usize, total: usize, tolerance: f64 },

    #[error("malformed vector file {path}: {reason}")]
    VectorFormat { path: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Npy(#[from] ndarray_npy::ReadNpyError),
}

impl WeatError {
    pub(crate) fn format(path: &str, reason: impl Into<String>) -> Self {
        WeatError::VectorFormat { path: path.to_owned(), reason: reason.into() }
    }
}
