use nucleon_primitives::encoding::DecodeError;
use nucleon_storage::StoreError;

#[derive(Debug)]
pub enum ChainDbError {
    /// Opening or re-initializing the store failed; startup cannot proceed.
    Open(String),
    Store(StoreError),
    Decode(DecodeError),
    /// A loaded record or derived invariant failed validation.
    Corrupt(String),
    ReadOnly,
    BatchActive,
    NoActiveBatch,
}

impl std::fmt::Display for ChainDbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChainDbError::Open(message) => write!(f, "{message}"),
            ChainDbError::Store(err) => write!(f, "{err}"),
            ChainDbError::Decode(err) => write!(f, "{err}"),
            ChainDbError::Corrupt(message) => write!(f, "{message}"),
            ChainDbError::ReadOnly => write!(f, "handle is read-only"),
            ChainDbError::BatchActive => write!(f, "a batch is already active"),
            ChainDbError::NoActiveBatch => write!(f, "no active batch"),
        }
    }
}

impl std::error::Error for ChainDbError {}

impl From<StoreError> for ChainDbError {
    fn from(err: StoreError) -> Self {
        ChainDbError::Store(err)
    }
}

impl From<DecodeError> for ChainDbError {
    fn from(err: DecodeError) -> Self {
        ChainDbError::Decode(err)
    }
}
