use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pasar_core::{DomainError, DomainResult, UserId};

/// The two account populations of the marketplace.
///
/// Buyers place orders; sellers own catalog entries. The populations are
/// registered and authenticated separately, so an email may exist once per
/// kind.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Buyer,
    Seller,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Buyer => "buyer",
            AccountKind::Seller => "seller",
        }
    }
}

impl core::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buyer" => Ok(AccountKind::Buyer),
            "seller" => Ok(AccountKind::Seller),
            other => Err(DomainError::validation(format!(
                "unknown account kind '{other}'"
            ))),
        }
    }
}

/// A registered account. The credential hash is stored alongside this record
/// by the persistence layer; it is never part of the domain type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: UserId,
    pub kind: AccountKind,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
}

/// Registration input, validated before an account is created.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone_number: String,
    pub address: String,
}

impl NewAccount {
    /// Validate registration input.
    pub fn validate(&self) -> DomainResult<()> {
        let name_len = self.name.trim().chars().count();
        if !(3..=30).contains(&name_len) {
            return Err(DomainError::validation("name must be 3 to 30 characters"));
        }
        if !is_plausible_email(&self.email) {
            return Err(DomainError::validation("email must be a valid email address"));
        }
        if self.password.chars().count() < 10 {
            return Err(DomainError::validation(
                "password must be at least 10 characters long",
            ));
        }
        if self.phone_number.trim().is_empty() {
            return Err(DomainError::validation("phone number is required"));
        }
        if self.address.trim().is_empty() {
            return Err(DomainError::validation("address is required"));
        }
        Ok(())
    }
}

impl Account {
    /// Build an account record from validated registration input.
    ///
    /// The plaintext password in `new` is deliberately dropped here; hashing
    /// happens in the caller before the record reaches storage.
    pub fn register(id: UserId, kind: AccountKind, new: NewAccount, at: DateTime<Utc>) -> Self {
        Self {
            id,
            kind,
            name: new.name,
            email: new.email,
            phone_number: new.phone_number,
            address: new.address,
            created_at: at,
        }
    }
}

/// Minimal shape check: one '@' with non-empty local part and a dotted domain.
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> NewAccount {
        NewAccount {
            name: "Siti Rahma".to_string(),
            email: "siti@example.com".to_string(),
            password: "correct horse battery".to_string(),
            phone_number: "+62 812 0000 0000".to_string(),
            address: "Jl. Merdeka 1, Jakarta".to_string(),
        }
    }

    #[test]
    fn valid_registration_passes() {
        assert!(valid_input().validate().is_ok());
    }

    #[test]
    fn short_name_is_rejected() {
        let mut input = valid_input();
        input.name = "ab".to_string();
        assert!(matches!(
            input.validate().unwrap_err(),
            DomainError::Validation(_)
        ));
    }

    #[test]
    fn malformed_email_is_rejected() {
        for email in ["not-an-email", "@example.com", "a@b", "a@.com"] {
            let mut input = valid_input();
            input.email = email.to_string();
            assert!(input.validate().is_err(), "accepted {email}");
        }
    }

    #[test]
    fn short_password_is_rejected() {
        let mut input = valid_input();
        input.password = "tooshort".to_string();
        assert!(input.validate().is_err());
    }

    #[test]
    fn register_drops_the_plaintext_password() {
        let input = valid_input();
        let account = Account::register(UserId::new(), AccountKind::Buyer, input.clone(), Utc::now());
        assert_eq!(account.email, input.email);
        assert_eq!(account.kind, AccountKind::Buyer);
        // The account record has no password field at all; this is a type-level
        // guarantee, the assertion just documents the intent.
        assert_eq!(account.name, input.name);
    }

    #[test]
    fn account_kind_round_trips_as_str() {
        assert_eq!("buyer".parse::<AccountKind>().unwrap(), AccountKind::Buyer);
        assert_eq!("seller".parse::<AccountKind>().unwrap(), AccountKind::Seller);
        assert!("admin".parse::<AccountKind>().is_err());
    }
}
