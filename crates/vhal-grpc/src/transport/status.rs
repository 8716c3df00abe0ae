//! Transport-level call outcomes

use thiserror::Error;

/// Result of a call to the remote vehicle server
pub type RpcResult<T> = Result<T, RpcStatus>;

/// gRPC status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcCode {
    Ok,
    Cancelled,
    Unknown,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    ResourceExhausted,
    FailedPrecondition,
    Aborted,
    OutOfRange,
    /// The server does not implement the method
    Unimplemented,
    Internal,
    Unavailable,
    DataLoss,
    Unauthenticated,
}

impl From<tonic::Code> for RpcCode {
    fn from(code: tonic::Code) -> Self {
        match code {
            tonic::Code::Ok => RpcCode::Ok,
            tonic::Code::Cancelled => RpcCode::Cancelled,
            tonic::Code::Unknown => RpcCode::Unknown,
            tonic::Code::InvalidArgument => RpcCode::InvalidArgument,
            tonic::Code::DeadlineExceeded => RpcCode::DeadlineExceeded,
            tonic::Code::NotFound => RpcCode::NotFound,
            tonic::Code::AlreadyExists => RpcCode::AlreadyExists,
            tonic::Code::PermissionDenied => RpcCode::PermissionDenied,
            tonic::Code::ResourceExhausted => RpcCode::ResourceExhausted,
            tonic::Code::FailedPrecondition => RpcCode::FailedPrecondition,
            tonic::Code::Aborted => RpcCode::Aborted,
            tonic::Code::OutOfRange => RpcCode::OutOfRange,
            tonic::Code::Unimplemented => RpcCode::Unimplemented,
            tonic::Code::Internal => RpcCode::Internal,
            tonic::Code::Unavailable => RpcCode::Unavailable,
            tonic::Code::DataLoss => RpcCode::DataLoss,
            tonic::Code::Unauthenticated => RpcCode::Unauthenticated,
        }
    }
}

/// A failed call, as reported by the transport
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code:?}: {message}")]
pub struct RpcStatus {
    pub code: RpcCode,
    pub message: String,
}

impl RpcStatus {
    pub fn new(code: RpcCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn unimplemented(message: impl Into<String>) -> Self {
        Self::new(RpcCode::Unimplemented, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(RpcCode::Unavailable, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(RpcCode::Internal, message)
    }

    pub fn is_unimplemented(&self) -> bool {
        self.code == RpcCode::Unimplemented
    }
}

impl From<tonic::Status> for RpcStatus {
    fn from(status: tonic::Status) -> Self {
        Self::new(status.code().into(), status.message())
    }
}
