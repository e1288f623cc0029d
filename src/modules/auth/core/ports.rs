use async_trait::async_trait;
use thiserror::Error;

use crate::modules::auth::core::account::{Account, NewAccount, Role};

#[derive(Debug, Error)]
pub enum AccountStoreError {
    #[error("email already registered")]
    DuplicateEmail,

    #[error("backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn insert(&self, account: NewAccount) -> Result<Account, AccountStoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountStoreError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, AccountStoreError>;
    async fn list_by_role(&self, role: Role) -> Result<Vec<Account>, AccountStoreError>;
    async fn issue_session(&self, account_id: i64) -> Result<String, AccountStoreError>;
    async fn resolve_session(&self, token: &str) -> Result<Option<Account>, AccountStoreError>;
}
