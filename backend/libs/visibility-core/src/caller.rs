use serde::{Deserialize, Serialize};

use crate::models::AccountId;

/// Who is asking. Derived per request, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "account_id", rename_all = "snake_case")]
pub enum CallerContext {
    #[default]
    Anonymous,
    Authenticated(AccountId),
}

impl CallerContext {
    pub fn account_id(&self) -> Option<AccountId> {
        match self {
            CallerContext::Anonymous => None,
            CallerContext::Authenticated(id) => Some(*id),
        }
    }

    /// True when the caller is authenticated as `id`
    pub fn is(&self, id: AccountId) -> bool {
        self.account_id() == Some(id)
    }
}
