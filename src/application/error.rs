use crate::domain::error::DomainError;
use crate::domain::port::{PublisherError, RepositoryError};
use std::fmt;

/// アプリケーション層のエラー
#[derive(Debug, Clone, PartialEq)]
pub enum ApplicationError {
    /// ドメインルール違反
    DomainError(DomainError),
    /// リポジトリ操作の失敗
    RepositoryError(RepositoryError),
    /// イベント発行の失敗
    EventPublishingFailed(String),
    /// 対象が見つからない
    NotFound(String),
}

impl fmt::Display for ApplicationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplicationError::DomainError(e) => write!(f, "Domain error: {}", e),
            ApplicationError::RepositoryError(e) => write!(f, "Repository error: {}", e),
            ApplicationError::EventPublishingFailed(msg) => {
                write!(f, "Event publishing failed: {}", msg)
            }
            ApplicationError::NotFound(msg) => write!(f, "Not found: {}", msg),
        }
    }
}

impl std::error::Error for ApplicationError {}

impl From<DomainError> for ApplicationError {
    fn from(error: DomainError) -> Self {
        ApplicationError::DomainError(error)
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(error: RepositoryError) -> Self {
        ApplicationError::RepositoryError(error)
    }
}

impl From<PublisherError> for ApplicationError {
    fn from(error: PublisherError) -> Self {
        ApplicationError::EventPublishingFailed(error.to_string())
    }
}
