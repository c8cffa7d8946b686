//! Data models
//!
//! Rust structs representing stored rows and the page models derived from them.

use serde::{Deserialize, Serialize};

use crate::graph::Account;

/// Placeholder shown when a lookup or list comes back empty
pub const EMPTY_MARKER: &str = "Empty";

/// Separator between names in a stored relation list
pub const LIST_SEPARATOR: char = ',';

// =============================================================================
// Account record
// =============================================================================

/// One row of the `connections` table
///
/// Relation lists are kept exactly as submitted. Field order matches the
/// four-column import format: graph, account, followers, following.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AccountRecord {
    pub graph: String,
    #[sqlx(rename = "user")]
    pub account: String,
    pub followers: String,
    pub following: String,
}

impl AccountRecord {
    pub fn new(
        graph: impl Into<String>,
        account: impl Into<String>,
        followers: impl Into<String>,
        following: impl Into<String>,
    ) -> Self {
        Self {
            graph: graph.into(),
            account: account.into(),
            followers: followers.into(),
            following: following.into(),
        }
    }

    /// Row written into a freshly created store
    pub fn seed() -> Self {
        Self::new("graph", "test", "test", "test")
    }

    /// Split the stored lists into an analysable account.
    pub fn to_account(&self) -> Account {
        Account::new(
            &self.account,
            split_relation_list(&self.followers),
            split_relation_list(&self.following),
        )
    }
}

/// Split a stored relation list on `LIST_SEPARATOR`, trimming each name and
/// dropping empty ones.
pub fn split_relation_list(raw: &str) -> Vec<String> {
    raw.split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

// =============================================================================
// Overview
// =============================================================================

/// Graph and account pickers shown on every page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Overview {
    /// Distinct graph names, sorted
    pub graphs: Vec<String>,
    /// Every stored account name in insertion order, duplicates included
    pub accounts: Vec<String>,
}

impl Overview {
    pub fn from_records(records: &[AccountRecord]) -> Self {
        let mut graphs: Vec<String> = records.iter().map(|r| r.graph.clone()).collect();
        graphs.sort();
        graphs.dedup();

        Self {
            graphs,
            accounts: records.iter().map(|r| r.account.clone()).collect(),
        }
    }

    pub fn first_graph(&self) -> &str {
        self.graphs.first().map_or(EMPTY_MARKER, String::as_str)
    }

    pub fn first_account(&self) -> &str {
        self.accounts.first().map_or(EMPTY_MARKER, String::as_str)
    }
}

/// Stored lists for one account, or the empty markers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountDetails {
    pub followers: String,
    pub following: String,
}

impl AccountDetails {
    pub fn empty() -> Self {
        Self {
            followers: EMPTY_MARKER.to_string(),
            following: EMPTY_MARKER.to_string(),
        }
    }
}

impl From<AccountRecord> for AccountDetails {
    fn from(record: AccountRecord) -> Self {
        Self {
            followers: record.followers,
            following: record.following,
        }
    }
}
