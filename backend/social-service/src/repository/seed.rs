//! Fixture data for the in-memory repository
//!
//! A seed file is a JSON document `{"accounts": [...], "posts": [...]}` using
//! the same field names as the API. Follow edges may be listed on either side
//! (`followers` of the followee or `following` of the follower); loading
//! makes them symmetric.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{info, warn};
use visibility_core::{Account, AccountId, Post};

use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub posts: Vec<Post>,
}

impl SeedData {
    pub async fn from_file(path: &Path) -> ServiceResult<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ServiceError::Seed(format!("{}: {e}", path.display())))?;
        let seed: SeedData = serde_json::from_str(&raw)?;

        info!(
            path = %path.display(),
            accounts = seed.accounts.len(),
            posts = seed.posts.len(),
            "Loaded seed file"
        );
        Ok(seed)
    }

    /// Reject duplicate ids or handles, drop self edges and edges to unknown
    /// accounts, and make every remaining edge appear on both sides.
    pub fn normalize(mut self) -> ServiceResult<Self> {
        let mut handles = HashSet::new();
        let mut ids = HashSet::new();
        for account in &self.accounts {
            if !ids.insert(account.id) {
                return Err(ServiceError::Seed(format!("duplicate account id {}", account.id)));
            }
            if !handles.insert(account.handle.as_str()) {
                return Err(ServiceError::Seed(format!(
                    "duplicate handle {:?}",
                    account.handle
                )));
            }
        }

        // (follower, followee)
        let mut edges: HashSet<(AccountId, AccountId)> = HashSet::new();
        for account in &self.accounts {
            for follower in &account.followers {
                edges.insert((*follower, account.id));
            }
            for followee in &account.following {
                edges.insert((account.id, *followee));
            }
        }
        edges.retain(|(follower, followee)| {
            let keep = follower != followee && ids.contains(follower) && ids.contains(followee);
            if !keep {
                warn!(%follower, %followee, "Dropping invalid follow edge from seed");
            }
            keep
        });

        let index: HashMap<AccountId, usize> = self
            .accounts
            .iter()
            .enumerate()
            .map(|(i, a)| (a.id, i))
            .collect();
        for account in &mut self.accounts {
            account.followers.clear();
            account.following.clear();
        }
        for (follower, followee) in edges {
            self.accounts[index[&follower]].following.insert(followee);
            self.accounts[index[&followee]].followers.insert(follower);
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_symmetrizes_and_drops_bad_edges() {
        let mut jimi = Account::new("jimi", "Jimi");
        let mut wolfie = Account::new("wolfie", "Wolfie");
        let ghost = AccountId::new();

        // only one side recorded for each edge
        jimi.followers.insert(wolfie.id);
        wolfie.following.insert(ghost);
        jimi.following.insert(jimi.id);
        wolfie.followers.insert(jimi.id);

        let seed = SeedData {
            accounts: vec![jimi.clone(), wolfie.clone()],
            posts: vec![],
        }
        .normalize()
        .unwrap();

        let jimi = &seed.accounts[0];
        let wolfie = &seed.accounts[1];
        assert!(jimi.has_follower(wolfie.id));
        assert!(wolfie.follows(jimi.id));
        assert!(wolfie.has_follower(jimi.id));
        assert!(jimi.follows(wolfie.id));
        assert!(!jimi.follows(jimi.id));
        assert!(!wolfie.follows(ghost));
        assert_eq!(jimi.following.len(), 1);
        assert_eq!(wolfie.following.len(), 1);
    }

    #[test]
    fn test_normalize_rejects_duplicate_handles() {
        let seed = SeedData {
            accounts: vec![Account::new("same", "A"), Account::new("same", "B")],
            posts: vec![],
        };
        assert!(matches!(seed.normalize(), Err(ServiceError::Seed(_))));
    }
}
