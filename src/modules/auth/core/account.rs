use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::modules::auth::core::password::{PasswordError, PasswordHash};
use crate::modules::auth::core::ports::AccountStoreError;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Patient,
    Doctor,
    Lab,
    Pharmacist,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Doctor => "doctor",
            Role::Lab => "lab",
            Role::Pharmacist => "pharmacist",
            Role::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "patient" => Ok(Role::Patient),
            "doctor" => Ok(Role::Doctor),
            "lab" => Ok(Role::Lab),
            "pharmacist" => Ok(Role::Pharmacist),
            "admin" => Ok(Role::Admin),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: PasswordHash,
    pub role: Role,
}

/// An account before the store has assigned it an id.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: PasswordHash,
    pub role: Role,
}

/// Public projection of an account; never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountView {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            name: account.name.clone(),
            email: account.email.clone(),
            role: account.role,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Invalid(String),

    #[error("email already registered")]
    EmailTaken,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("not authenticated")]
    Unauthenticated,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Store(AccountStoreError),
}

impl From<AccountStoreError> for AuthError {
    fn from(error: AccountStoreError) -> Self {
        match error {
            AccountStoreError::DuplicateEmail => AuthError::EmailTaken,
            other => AuthError::Store(other),
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_email(email: &str) -> Result<(), AuthError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(AuthError::Invalid(format!("invalid email address: {email}")))
    }
}

#[cfg(test)]
mod account_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn it_should_default_to_the_patient_role() {
        assert_eq!(Role::default(), Role::Patient);
    }

    #[rstest]
    #[case(Role::Patient, "\"patient\"")]
    #[case(Role::Pharmacist, "\"pharmacist\"")]
    #[case(Role::Lab, "\"lab\"")]
    fn it_should_serialize_roles_in_lowercase(#[case] role: Role, #[case] expected: &str) {
        assert_eq!(serde_json::to_string(&role).unwrap(), expected);
    }

    #[rstest]
    #[case("doctor", Role::Doctor)]
    #[case(" Pharmacist ", Role::Pharmacist)]
    fn it_should_parse_stored_roles(#[case] raw: &str, #[case] expected: Role) {
        assert_eq!(raw.parse::<Role>(), Ok(expected));
        assert_eq!(expected.as_str().parse::<Role>(), Ok(expected));
    }

    #[rstest]
    fn it_should_reject_unknown_roles() {
        assert_eq!("nurse".parse::<Role>(), Err(UnknownRole("nurse".into())));
    }

    #[rstest]
    fn it_should_normalize_emails() {
        assert_eq!(normalize_email("  Jane.Doe@Clinic.ORG "), "jane.doe@clinic.org");
    }

    #[rstest]
    #[case("jane@clinic.org", true)]
    #[case("jane", false)]
    #[case("@clinic.org", false)]
    #[case("jane@", false)]
    #[case("ja ne@clinic.org", false)]
    #[case("jane@@clinic.org", false)]
    fn it_should_validate_emails(#[case] email: &str, #[case] valid: bool) {
        assert_eq!(validate_email(email).is_ok(), valid);
    }

    #[rstest]
    fn it_should_not_expose_the_password_in_the_view() {
        let account = Account {
            id: 1,
            name: "Jane".into(),
            email: "jane@clinic.org".into(),
            password: PasswordHash::hash("secret1").unwrap(),
            role: Role::Doctor,
        };
        let json = serde_json::to_value(AccountView::from(&account)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "id": 1, "name": "Jane", "email": "jane@clinic.org", "role": "doctor" })
        );
    }

    #[rstest]
    fn it_should_map_duplicate_emails_to_email_taken() {
        let error: AuthError = AccountStoreError::DuplicateEmail.into();
        assert!(matches!(error, AuthError::EmailTaken));
    }
}
