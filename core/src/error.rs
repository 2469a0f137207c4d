use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Account '{account_id}' does not exist")]
    UnknownAccount { account_id: String },

    #[error("Self loop from/to '{account_id}' is not allowed for transaction networks")]
    SelfLoop { account_id: String },

    #[error("Candidate pool exhausted: no eligible subject after {retries} draws of {wanted} members")]
    CandidateExhausted { wanted: usize, retries: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type GenResult<T> = Result<T, GenError>;
