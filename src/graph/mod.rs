//! Social graph analysis
//!
//! Turns stored account records into recommendations and a drawable network:
//!
//! ```text
//! accounts ──build_edges──▶ edges ──filter_edges──▶ edges
//!                                                     │
//!                                              SocialGraph
//!                                          ┌──────────┴──────────┐
//!                              compute_layout + render    rank_recommendations
//! ```
//!
//! Everything here is pure and recomputed per request.

mod builder;
mod filter;
mod layout;
mod rank;
mod render;
mod selectors;

use std::collections::HashSet;

pub use builder::{Account, Edge, build_edges};
pub use filter::{DEFAULT_THRESHOLD, filter_edges};
pub use layout::{LAYOUT_SCALE, Position, compute_layout};
pub use rank::{SocialGraph, rank_combined, rank_recommendations};
pub use render::{
    DEFAULT_EDGE_COLOR, MAJOR_EDGE_COLOR, MAJOR_NODE_COLOR, OTHER_NODE_COLOR, render_network,
};
pub use selectors::{FilterMode, Layout, Relation, SelectorError};

/// Names of the accounts explicitly tracked in a graph.
pub fn major_accounts(accounts: &[Account]) -> HashSet<String> {
    accounts.iter().map(|account| account.name.clone()).collect()
}
