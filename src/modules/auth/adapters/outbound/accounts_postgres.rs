// PostgreSQL implementation of the AccountRepository port.
//
// Purpose
// - Persist accounts and bearer sessions in the `users` and `sessions` tables.
//
// Responsibilities
// - Map the unique email constraint onto `DuplicateEmail`.
// - Rebuild domain accounts from stored rows, rejecting unknown roles and
//   malformed password hashes.

use crate::modules::auth::core::account::{Account, NewAccount, Role};
use crate::modules::auth::core::password::PasswordHash;
use crate::modules::auth::core::ports::{AccountRepository, AccountStoreError};
use crate::shared::infrastructure::database::is_unique_violation;
use sqlx::PgPool;
use uuid::Uuid;

const ACCOUNT_COLUMNS: &str = "id, name, email, password_hash, role";

#[derive(Debug, Clone, sqlx::FromRow)]
struct AccountRow {
    id: i64,
    name: String,
    email: String,
    password_hash: String,
    role: String,
}

impl TryFrom<AccountRow> for Account {
    type Error = AccountStoreError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse::<Role>()
            .map_err(|e| AccountStoreError::Backend(e.to_string()))?;
        let password = PasswordHash::from_phc(row.password_hash)
            .map_err(|e| AccountStoreError::Backend(e.to_string()))?;
        Ok(Account {
            id: row.id,
            name: row.name,
            email: row.email,
            password,
            role,
        })
    }
}

fn backend(error: sqlx::Error) -> AccountStoreError {
    AccountStoreError::Backend(error.to_string())
}

fn into_accounts(rows: Vec<AccountRow>) -> Result<Vec<Account>, AccountStoreError> {
    rows.into_iter().map(Account::try_from).collect()
}

pub struct PostgresAccounts {
    pool: PgPool,
}

impl PostgresAccounts {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AccountRepository for PostgresAccounts {
    async fn insert(&self, account: NewAccount) -> Result<Account, AccountStoreError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "INSERT INTO users (name, email, password_hash, role) VALUES ($1, $2, $3, $4) \
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(&account.name)
        .bind(&account.email)
        .bind(account.password.as_phc())
        .bind(account.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AccountStoreError::DuplicateEmail
            } else {
                backend(e)
            }
        })?;
        Account::try_from(row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountStoreError> {
        sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?
        .map(Account::try_from)
        .transpose()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, AccountStoreError> {
        sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?
        .map(Account::try_from)
        .transpose()
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<Account>, AccountStoreError> {
        let rows = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM users WHERE role = $1 ORDER BY id"
        ))
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        into_accounts(rows)
    }

    async fn issue_session(&self, account_id: i64) -> Result<String, AccountStoreError> {
        let token = Uuid::now_v7().simple().to_string();
        sqlx::query("INSERT INTO sessions (token, user_id) VALUES ($1, $2)")
            .bind(&token)
            .bind(account_id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(token)
    }

    async fn resolve_session(&self, token: &str) -> Result<Option<Account>, AccountStoreError> {
        sqlx::query_as::<_, AccountRow>(
            "SELECT u.id, u.name, u.email, u.password_hash, u.role \
             FROM sessions s JOIN users u ON u.id = s.user_id WHERE s.token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?
        .map(Account::try_from)
        .transpose()
    }
}

#[cfg(test)]
mod postgres_accounts_tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn row() -> AccountRow {
        AccountRow {
            id: 4,
            name: "Dr. Grey".into(),
            email: "grey@clinic.org".into(),
            password_hash: PasswordHash::hash("scalpel").unwrap().as_phc().to_string(),
            role: "doctor".into(),
        }
    }

    #[rstest]
    fn it_should_rebuild_an_account_from_its_row(row: AccountRow) {
        let account = Account::try_from(row).unwrap();
        assert_eq!(account.id, 4);
        assert_eq!(account.role, Role::Doctor);
        assert!(account.password.verify("scalpel"));
    }

    #[rstest]
    fn it_should_refuse_a_row_with_an_unknown_role(mut row: AccountRow) {
        row.role = "janitor".into();
        let result = Account::try_from(row);
        assert!(matches!(result, Err(AccountStoreError::Backend(_))));
    }

    #[rstest]
    fn it_should_refuse_a_row_with_a_legacy_password_digest(mut row: AccountRow) {
        row.password_hash = "0f1e2d$a3b4c5".into();
        let result = Account::try_from(row);
        assert!(matches!(result, Err(AccountStoreError::Backend(_))));
    }

    #[rstest]
    fn it_should_map_other_sqlx_errors_to_backend() {
        let error = backend(sqlx::Error::PoolTimedOut);
        assert!(matches!(error, AccountStoreError::Backend(_)));
    }
}
