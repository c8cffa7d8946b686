//! Degree-based recommendation ranking

use std::collections::{HashMap, HashSet};

use petgraph::graphmap::UnGraphMap;

use super::Edge;

/// Undirected simple graph over account names
///
/// Repeated edges (in either direction) collapse into one. Nodes keep the
/// order in which they were first seen in the edge list.
pub struct SocialGraph<'a> {
    graph: UnGraphMap<&'a str, ()>,
}

impl<'a> SocialGraph<'a> {
    pub fn from_edges(edges: &'a [Edge]) -> Self {
        let mut graph = UnGraphMap::with_capacity(edges.len(), edges.len());
        for edge in edges {
            graph.add_edge(edge.source.as_str(), edge.target.as_str(), ());
        }
        Self { graph }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.graph.nodes()
    }

    pub fn edges(&self) -> impl Iterator<Item = (&'a str, &'a str)> + '_ {
        self.graph.all_edges().map(|(a, b, _)| (a, b))
    }

    /// Degree of every node, in node order. A self loop counts twice.
    pub fn degrees(&self) -> Vec<(&'a str, usize)> {
        let mut degrees: Vec<(&'a str, usize)> = self.nodes().map(|node| (node, 0)).collect();
        let index: HashMap<&'a str, usize> = degrees
            .iter()
            .enumerate()
            .map(|(position, (node, _))| (*node, position))
            .collect();

        for (a, b) in self.edges() {
            degrees[index[a]].1 += 1;
            degrees[index[b]].1 += 1;
        }

        degrees
    }
}

/// Non-major accounts with a positive degree, highest degree first.
///
/// The sort is stable, so ties keep node order.
pub fn rank_recommendations(
    graph: &SocialGraph<'_>,
    major_accounts: &HashSet<String>,
) -> Vec<(String, usize)> {
    let mut ranked: Vec<(String, usize)> = graph
        .degrees()
        .into_iter()
        .filter(|(name, degree)| !major_accounts.contains(*name) && *degree > 0)
        .map(|(name, degree)| (name.to_string(), degree))
        .collect();

    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

/// Merge a following-derived and a follower-derived ranking.
///
/// `score = weight * following_degree + follower_degree`. Accounts are taken
/// from the following side first, then any new ones from the follower side.
pub fn rank_combined(
    following: &SocialGraph<'_>,
    followers: &SocialGraph<'_>,
    major_accounts: &HashSet<String>,
    weight: f64,
) -> Vec<(String, f64)> {
    let following_ranked = rank_recommendations(following, major_accounts);
    let follower_ranked = rank_recommendations(followers, major_accounts);

    let following_degree: HashMap<&str, usize> = following_ranked
        .iter()
        .map(|(name, degree)| (name.as_str(), *degree))
        .collect();
    let follower_degree: HashMap<&str, usize> = follower_ranked
        .iter()
        .map(|(name, degree)| (name.as_str(), *degree))
        .collect();

    let mut seen: HashSet<&str> = HashSet::new();
    let mut combined: Vec<(String, f64)> = following_ranked
        .iter()
        .chain(follower_ranked.iter())
        .map(|(name, _)| name.as_str())
        .filter(|name| seen.insert(*name))
        .map(|name| {
            let following_score = following_degree.get(name).copied().unwrap_or(0) as f64;
            let follower_score = follower_degree.get(name).copied().unwrap_or(0) as f64;
            (name.to_string(), weight * following_score + follower_score)
        })
        .collect();

    combined.sort_by(|a, b| b.1.total_cmp(&a.1));
    combined
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edges(pairs: &[(&str, &str)]) -> Vec<Edge> {
        pairs.iter().copied().map(Edge::from).collect()
    }

    fn major(names: &[&str]) -> HashSet<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn ranks_by_degree() {
        let edges = edges(&[("A", "B"), ("B", "C")]);
        let graph = SocialGraph::from_edges(&edges);

        assert_eq!(
            rank_recommendations(&graph, &major(&["A"])),
            vec![("B".to_string(), 2), ("C".to_string(), 1)]
        );
    }

    #[test]
    fn repeated_edges_collapse() {
        let edges = edges(&[("A", "B"), ("A", "B"), ("B", "A")]);
        let graph = SocialGraph::from_edges(&edges);

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.degrees(), vec![("A", 1), ("B", 1)]);
    }

    #[test]
    fn self_loop_counts_twice() {
        let edges = edges(&[("A", "A"), ("A", "B")]);
        let graph = SocialGraph::from_edges(&edges);
        assert_eq!(graph.degrees(), vec![("A", 3), ("B", 1)]);
    }

    #[test]
    fn ties_keep_node_order() {
        let edges = edges(&[("A", "x"), ("A", "y"), ("A", "z"), ("B", "z")]);
        let graph = SocialGraph::from_edges(&edges);

        let ranked = rank_recommendations(&graph, &major(&["A", "B"]));
        assert_eq!(
            ranked,
            vec![
                ("z".to_string(), 2),
                ("x".to_string(), 1),
                ("y".to_string(), 1)
            ]
        );
    }

    #[test]
    fn never_recommends_major_accounts() {
        let edges = edges(&[("A", "B"), ("B", "C"), ("C", "A"), ("A", "d")]);
        let graph = SocialGraph::from_edges(&edges);
        let major = major(&["A", "B", "C"]);

        let ranked = rank_recommendations(&graph, &major);
        assert_eq!(ranked, vec![("d".to_string(), 1)]);
        assert!(ranked.iter().all(|(name, degree)| !major.contains(name) && *degree > 0));
    }

    #[test]
    fn empty_graph_ranks_nothing() {
        let graph = SocialGraph::from_edges(&[]);
        assert!(rank_recommendations(&graph, &major(&["A"])).is_empty());
    }

    #[test]
    fn combines_weighted_rankings() {
        let following_edges = edges(&[("A", "B"), ("B", "C")]);
        let follower_edges = edges(&[("A", "D"), ("D", "E")]);
        let following = SocialGraph::from_edges(&following_edges);
        let followers = SocialGraph::from_edges(&follower_edges);

        let combined = rank_combined(&following, &followers, &major(&["A"]), 0.5);
        assert_eq!(
            combined,
            vec![
                ("D".to_string(), 2.0),
                ("B".to_string(), 1.0),
                ("E".to_string(), 1.0),
                ("C".to_string(), 0.5),
            ]
        );
    }

    #[test]
    fn combined_ranking_lists_shared_accounts_once() {
        let following_edges = edges(&[("A", "x"), ("B", "x")]);
        let follower_edges = edges(&[("A", "x"), ("A", "y")]);
        let following = SocialGraph::from_edges(&following_edges);
        let followers = SocialGraph::from_edges(&follower_edges);

        let combined = rank_combined(&following, &followers, &major(&["A", "B"]), 2.0);
        assert_eq!(
            combined,
            vec![("x".to_string(), 5.0), ("y".to_string(), 1.0)]
        );
    }
}
