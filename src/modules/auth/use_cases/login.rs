use serde::{Deserialize, Serialize};

use crate::modules::auth::core::account::{AccountView, AuthError, Role, normalize_email};
use crate::modules::auth::core::ports::AccountRepository;

pub const TOKEN_TYPE: &str = "bearer";

#[derive(Debug, Clone, Deserialize)]
pub struct Login {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginSession {
    pub access_token: String,
    pub token_type: String,
    pub user_id: i64,
    pub name: String,
    pub role: Role,
}

/// Checks credentials and opens a session. Unknown emails and wrong passwords
/// fail identically.
pub async fn login(
    accounts: &dyn AccountRepository,
    command: Login,
) -> Result<LoginSession, AuthError> {
    let email = normalize_email(&command.email);
    let account = accounts
        .find_by_email(&email)
        .await?
        .filter(|account| account.password.verify(&command.password))
        .ok_or(AuthError::InvalidCredentials)?;

    let access_token = accounts.issue_session(account.id).await?;
    tracing::info!(account_id = account.id, "login succeeded");

    Ok(LoginSession {
        access_token,
        token_type: TOKEN_TYPE.to_string(),
        user_id: account.id,
        name: account.name,
        role: account.role,
    })
}

pub async fn resolve_bearer(
    accounts: &dyn AccountRepository,
    token: Option<&str>,
) -> Result<AccountView, AuthError> {
    let token = token.ok_or(AuthError::Unauthenticated)?;
    accounts
        .resolve_session(token)
        .await?
        .map(|account| AccountView::from(&account))
        .ok_or(AuthError::Unauthenticated)
}

#[cfg(test)]
mod login_tests {
    use super::*;
    use crate::modules::auth::adapters::outbound::accounts_in_memory::InMemoryAccounts;
    use crate::modules::auth::use_cases::register_account::{RegisterAccount, register_account};
    use rstest::{fixture, rstest};

    #[fixture]
    async fn accounts() -> InMemoryAccounts {
        let accounts = InMemoryAccounts::new();
        register_account(
            &accounts,
            RegisterAccount {
                name: "Nurse Joy".into(),
                email: "joy@clinic.org".into(),
                password: "pokecenter".into(),
                role: Some(Role::Admin),
            },
        )
        .await
        .unwrap();
        accounts
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_open_a_session_for_valid_credentials(
        #[future] accounts: InMemoryAccounts,
    ) {
        let accounts = accounts.await;
        let session = login(
            &accounts,
            Login {
                email: " JOY@clinic.org".into(),
                password: "pokecenter".into(),
            },
        )
        .await
        .unwrap();

        assert_eq!(session.token_type, "bearer");
        assert_eq!(session.user_id, 1);
        assert_eq!(session.role, Role::Admin);

        let me = resolve_bearer(&accounts, Some(&session.access_token))
            .await
            .unwrap();
        assert_eq!(me.email, "joy@clinic.org");
    }

    #[rstest]
    #[case("joy@clinic.org", "wrong")]
    #[case("nobody@clinic.org", "pokecenter")]
    #[tokio::test]
    async fn it_should_reject_bad_credentials(
        #[future] accounts: InMemoryAccounts,
        #[case] email: &str,
        #[case] password: &str,
    ) {
        let accounts = accounts.await;
        let result = login(
            &accounts,
            Login {
                email: email.into(),
                password: password.into(),
            },
        )
        .await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_reject_missing_or_unknown_tokens(#[future] accounts: InMemoryAccounts) {
        let accounts = accounts.await;
        assert!(matches!(
            resolve_bearer(&accounts, None).await,
            Err(AuthError::Unauthenticated)
        ));
        assert!(matches!(
            resolve_bearer(&accounts, Some("forged")).await,
            Err(AuthError::Unauthenticated)
        ));
    }
}
