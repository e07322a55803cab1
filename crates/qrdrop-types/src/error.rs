use thiserror::Error;

/// Why an authorization check refused a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Denial {
    #[error("please log in")]
    LoginRequired,
    #[error("restricted to authorized managers")]
    ManagerRequired,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A persisted transfer string failed the shape or timestamp checks.
    #[error("malformed transfer record: {0}")]
    MalformedRecord(&'static str),

    #[error("no account exists with id {0}")]
    NotFound(i64),

    #[error("unauthorized: {0}")]
    Unauthorized(Denial),

    #[error("account is already marked as premium")]
    AlreadyPremium,

    #[error("account is not marked as premium")]
    NotPremium,

    #[error("unable to save transfer of unknown type: {0}")]
    UnknownKind(String),
}
