use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("call error: {0}")]
    Call(String),

    #[error("oneway call error: {0}")]
    Oneway(String),

    #[error("no pending response attached to the call context")]
    NoPendingResponse,

    #[error("pending response does not match the requested type")]
    PendingTypeMismatch,

    #[error("pending response dropped before completion")]
    ResponseDropped,

    #[error("{0}")]
    Custom(String),
}

pub type Result<T> = std::result::Result<T, Error>;
