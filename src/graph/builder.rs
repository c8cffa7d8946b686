//! Edge list construction

use super::Relation;

/// A tracked account with its relation lists already split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub name: String,
    pub followers: Vec<String>,
    pub following: Vec<String>,
}

impl Account {
    pub fn new(name: impl Into<String>, followers: Vec<String>, following: Vec<String>) -> Self {
        Self {
            name: name.into(),
            followers,
            following,
        }
    }

    pub fn relation(&self, relation: Relation) -> &[String] {
        match relation {
            Relation::Followers => &self.followers,
            Relation::Following => &self.following,
        }
    }
}

/// Directed (source, target) pair. Not deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    pub source: String,
    pub target: String,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

impl From<(&str, &str)> for Edge {
    fn from((source, target): (&str, &str)) -> Self {
        Self::new(source, target)
    }
}

/// Emit `(account, name)` for every name in the selected relation list.
///
/// Output follows account order, then list order within each account.
pub fn build_edges(accounts: &[Account], relation: Relation) -> Vec<Edge> {
    accounts
        .iter()
        .flat_map(|account| {
            account
                .relation(relation)
                .iter()
                .map(move |name| Edge::new(&account.name, name))
        })
        .collect()
}
