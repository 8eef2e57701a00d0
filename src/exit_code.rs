use crate::error::ForensicsError;

pub fn exit_code_for_error(err: &ForensicsError) -> i32 {
    match err {
        ForensicsError::Config(_) => 2,
        ForensicsError::FileNotFound(_) => 3,
        ForensicsError::PermissionDenied(_) => 4,
        ForensicsError::Sink(_) => 5,
        ForensicsError::Cancelled => 130,
        ForensicsError::Io(_) => 23,
        ForensicsError::Json(_) => 26,
        ForensicsError::Oracle(_) => 43,
        ForensicsError::Sqlite(_)
        | ForensicsError::Snapshot(_)
        | ForensicsError::TableAbsent(_)
        | ForensicsError::MalformedRow(_) => 1,
    }
}
