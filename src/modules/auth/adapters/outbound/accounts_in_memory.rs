// In memory implementation of the AccountRepository port.
//
// Purpose
// - Serve the auth, patient and admin route groups without a database.
//
// Responsibilities
// - Assign sequential account ids and keep emails unique.
// - Map bearer tokens to account ids.

use crate::modules::auth::core::account::{Account, NewAccount, Role};
use crate::modules::auth::core::ports::{AccountRepository, AccountStoreError};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct AccountsState {
    accounts: BTreeMap<i64, Account>,
    sessions: HashMap<String, i64>,
    next_id: i64,
}

#[derive(Default)]
pub struct InMemoryAccounts {
    inner: RwLock<AccountsState>,
    offline: bool,
}

impl InMemoryAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_offline(&mut self) {
        self.offline = !self.offline;
    }

    fn ensure_online(&self) -> Result<(), AccountStoreError> {
        if self.offline {
            return Err(AccountStoreError::Backend("Account store offline".into()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl AccountRepository for InMemoryAccounts {
    async fn insert(&self, account: NewAccount) -> Result<Account, AccountStoreError> {
        self.ensure_online()?;
        let mut g = self.inner.write().await;
        if g.accounts.values().any(|a| a.email == account.email) {
            return Err(AccountStoreError::DuplicateEmail);
        }
        g.next_id += 1;
        let stored = Account {
            id: g.next_id,
            name: account.name,
            email: account.email,
            password: account.password,
            role: account.role,
        };
        g.accounts.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountStoreError> {
        self.ensure_online()?;
        let g = self.inner.read().await;
        Ok(g.accounts.values().find(|a| a.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, AccountStoreError> {
        self.ensure_online()?;
        Ok(self.inner.read().await.accounts.get(&id).cloned())
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<Account>, AccountStoreError> {
        self.ensure_online()?;
        let g = self.inner.read().await;
        Ok(g.accounts
            .values()
            .filter(|a| a.role == role)
            .cloned()
            .collect())
    }

    async fn issue_session(&self, account_id: i64) -> Result<String, AccountStoreError> {
        self.ensure_online()?;
        let token = Uuid::now_v7().simple().to_string();
        self.inner
            .write()
            .await
            .sessions
            .insert(token.clone(), account_id);
        Ok(token)
    }

    async fn resolve_session(&self, token: &str) -> Result<Option<Account>, AccountStoreError> {
        self.ensure_online()?;
        let g = self.inner.read().await;
        Ok(g.sessions
            .get(token)
            .and_then(|id| g.accounts.get(id))
            .cloned())
    }
}

#[cfg(test)]
mod in_memory_accounts_tests {
    use super::*;
    use crate::modules::auth::core::password::PasswordHash;
    use rstest::{fixture, rstest};

    #[fixture]
    fn new_doctor() -> NewAccount {
        NewAccount {
            name: "Dr. Grey".into(),
            email: "grey@clinic.org".into(),
            password: PasswordHash::hash("scalpel").unwrap(),
            role: Role::Doctor,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_assign_sequential_ids(new_doctor: NewAccount) {
        let store = InMemoryAccounts::new();
        let first = store.insert(new_doctor).await.unwrap();
        let second = store
            .insert(NewAccount {
                name: "Pat".into(),
                email: "pat@home.org".into(),
                password: PasswordHash::hash("secret1").unwrap(),
                role: Role::Patient,
            })
            .await
            .unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_reject_a_duplicate_email(new_doctor: NewAccount) {
        let store = InMemoryAccounts::new();
        store.insert(new_doctor.clone()).await.unwrap();
        let result = store.insert(new_doctor).await;
        assert!(matches!(result, Err(AccountStoreError::DuplicateEmail)));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_find_accounts_by_email_id_and_role(new_doctor: NewAccount) {
        let store = InMemoryAccounts::new();
        let stored = store.insert(new_doctor).await.unwrap();

        let by_email = store.find_by_email("grey@clinic.org").await.unwrap();
        let by_id = store.find_by_id(stored.id).await.unwrap();
        let doctors = store.list_by_role(Role::Doctor).await.unwrap();
        let admins = store.list_by_role(Role::Admin).await.unwrap();

        assert_eq!(by_email.as_ref(), Some(&stored));
        assert_eq!(by_id.as_ref(), Some(&stored));
        assert_eq!(doctors, vec![stored]);
        assert!(admins.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_resolve_an_issued_session(new_doctor: NewAccount) {
        let store = InMemoryAccounts::new();
        let stored = store.insert(new_doctor).await.unwrap();
        let token = store.issue_session(stored.id).await.unwrap();

        let resolved = store.resolve_session(&token).await.unwrap();
        let unknown = store.resolve_session("not-a-token").await.unwrap();

        assert_eq!(resolved, Some(stored));
        assert_eq!(unknown, None);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_fail_when_offline(new_doctor: NewAccount) {
        let mut store = InMemoryAccounts::new();
        store.toggle_offline();
        let result = store.insert(new_doctor).await;
        assert!(matches!(result, Err(AccountStoreError::Backend(_))));
    }
}
