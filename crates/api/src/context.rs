use pasar_auth::AccountKind;
use pasar_core::UserId;

/// Authenticated caller context for a request.
///
/// This is immutable and is present for all routes behind the credential
/// boundary.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AuthContext {
    user_id: UserId,
    kind: AccountKind,
}

impl AuthContext {
    pub fn new(user_id: UserId, kind: AccountKind) -> Self {
        Self { user_id, kind }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn kind(&self) -> AccountKind {
        self.kind
    }
}
