use err_derive::Error;
use infra::persistence::StorageError;

/// Everything the ordering, menu and account operations can fail with.
#[derive(Debug, Error)]
pub enum Error {
    #[error(display = "{}", _0)]
    Validation(String),
    #[error(display = "{} {:?} not found", kind, id)]
    NotFound { kind: &'static str, id: String },
    #[error(
        display = "only {} of {:?} in stock (requested {})",
        available,
        item_id,
        requested
    )]
    InsufficientStock {
        item_id: String,
        requested: u32,
        available: u32,
    },
    #[error(display = "{} {:?} already exists", kind, id)]
    DuplicateId { kind: &'static str, id: String },
    #[error(display = "invalid credentials")]
    InvalidCredentials,
    #[error(display = "no {} ids left after {}", kind, last)]
    IdsExhausted { kind: &'static str, last: u64 },
    #[error(display = "storage failure")]
    Storage(#[error(source)] #[error(from)] StorageError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn validation<S: Into<String>>(msg: S) -> Self {
        Error::Validation(msg.into())
    }

    /// Whether the interactive caller should report the problem and ask again.
    /// Storage failures end the current operation instead.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Storage(_) | Error::IdsExhausted { .. } => false,
            _ => true,
        }
    }
}
