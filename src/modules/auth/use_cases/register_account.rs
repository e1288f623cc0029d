use serde::Deserialize;

use crate::modules::auth::core::account::{
    AccountView, AuthError, MIN_PASSWORD_LEN, NewAccount, Role, normalize_email, validate_email,
};
use crate::modules::auth::core::password::PasswordHash;
use crate::modules::auth::core::ports::AccountRepository;

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterAccount {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

pub async fn register_account(
    accounts: &dyn AccountRepository,
    command: RegisterAccount,
) -> Result<AccountView, AuthError> {
    let name = command.name.trim();
    if name.is_empty() {
        return Err(AuthError::Invalid("name is required".into()));
    }
    let email = normalize_email(&command.email);
    validate_email(&email)?;
    if command.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::Invalid(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let account = accounts
        .insert(NewAccount {
            name: name.to_string(),
            email,
            password: PasswordHash::hash(&command.password)?,
            role: command.role.unwrap_or_default(),
        })
        .await?;

    tracing::info!(account_id = account.id, role = ?account.role, "account registered");
    Ok(AccountView::from(&account))
}

#[cfg(test)]
mod register_account_tests {
    use super::*;
    use crate::modules::auth::adapters::outbound::accounts_in_memory::InMemoryAccounts;
    use rstest::{fixture, rstest};

    #[fixture]
    fn command() -> RegisterAccount {
        RegisterAccount {
            name: " Jane Doe ".into(),
            email: "Jane@Example.com".into(),
            password: "hunter22".into(),
            role: None,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_register_a_patient_by_default(command: RegisterAccount) {
        let accounts = InMemoryAccounts::new();
        let view = register_account(&accounts, command).await.unwrap();
        assert_eq!(view.name, "Jane Doe");
        assert_eq!(view.email, "jane@example.com");
        assert_eq!(view.role, Role::Patient);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_store_an_argon2_hash_of_the_password(command: RegisterAccount) {
        let accounts = InMemoryAccounts::new();
        register_account(&accounts, command).await.unwrap();

        let stored = accounts
            .find_by_email("jane@example.com")
            .await
            .unwrap()
            .unwrap();
        assert!(stored.password.as_phc().starts_with("$argon2id$"));
        assert!(stored.password.verify("hunter22"));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_keep_an_explicit_role(mut command: RegisterAccount) {
        command.role = Some(Role::Pharmacist);
        let accounts = InMemoryAccounts::new();
        let view = register_account(&accounts, command).await.unwrap();
        assert_eq!(view.role, Role::Pharmacist);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_reject_a_blank_name(mut command: RegisterAccount) {
        command.name = "   ".into();
        let result = register_account(&InMemoryAccounts::new(), command).await;
        assert!(matches!(result, Err(AuthError::Invalid(_))));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_reject_a_short_password(mut command: RegisterAccount) {
        command.password = "abc".into();
        let result = register_account(&InMemoryAccounts::new(), command).await;
        assert!(matches!(result, Err(AuthError::Invalid(_))));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_reject_an_email_registered_with_other_casing(command: RegisterAccount) {
        let accounts = InMemoryAccounts::new();
        register_account(&accounts, command.clone()).await.unwrap();
        let mut again = command;
        again.email = "JANE@example.COM".into();
        let result = register_account(&accounts, again).await;
        assert!(matches!(result, Err(AuthError::EmailTaken)));
    }
}
