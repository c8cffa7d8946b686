//! Destination frequency filter

use std::collections::{HashMap, HashSet};

use super::{Edge, FilterMode};

/// Threshold used when the caller does not configure one
pub const DEFAULT_THRESHOLD: usize = 1;

/// Keep edges whose destination appears a qualifying number of times.
///
/// Destinations are tallied only when they are not major accounts, and an
/// edge survives only if its destination is in the qualifying tally. Edges
/// pointing at a major account are therefore never kept. Relative edge order
/// is preserved.
pub fn filter_edges(
    edges: &[Edge],
    major_accounts: &HashSet<String>,
    mode: FilterMode,
    threshold: usize,
) -> Vec<Edge> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for edge in edges
        .iter()
        .filter(|edge| !major_accounts.contains(edge.target.as_str()))
    {
        *counts.entry(edge.target.as_str()).or_default() += 1;
    }

    let kept: HashSet<&str> = counts
        .into_iter()
        .filter(|(_, count)| mode.keeps(*count, threshold))
        .map(|(name, _)| name)
        .collect();

    edges
        .iter()
        .filter(|edge| kept.contains(edge.target.as_str()))
        .cloned()
        .collect()
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

    fn literal_pairs() -> Vec<Edge> {
        edges(&[("A", "1"), ("B", "2"), ("C", "2"), ("D", "3")])
    }

    #[test]
    fn unique_keeps_single_occurrences() {
        let result = filter_edges(
            &literal_pairs(),
            &major(&["A"]),
            FilterMode::Unique,
            DEFAULT_THRESHOLD,
        );
        assert_eq!(result, edges(&[("A", "1"), ("D", "3")]));
    }

    #[test]
    fn common_keeps_repeated_destinations() {
        let result = filter_edges(
            &literal_pairs(),
            &major(&["A"]),
            FilterMode::Common,
            DEFAULT_THRESHOLD,
        );
        // count > threshold gives [(B,2),(C,2)]; [(A,1),(D,3)] is the unique-mode result.
        assert_eq!(result, edges(&[("B", "2"), ("C", "2")]));
    }

    #[test]
    fn edges_into_major_accounts_are_dropped() {
        let input = edges(&[("A", "B"), ("B", "A"), ("A", "x"), ("B", "x"), ("A", "y")]);
        let major = major(&["A", "B"]);

        let common = filter_edges(&input, &major, FilterMode::Common, 1);
        assert_eq!(common, edges(&[("A", "x"), ("B", "x")]));

        let unique = filter_edges(&input, &major, FilterMode::Unique, 1);
        assert_eq!(unique, edges(&[("A", "y")]));
    }

    #[test]
    fn respects_custom_threshold() {
        let input = edges(&[("A", "x"), ("B", "x"), ("C", "x"), ("A", "y"), ("B", "y")]);
        let result = filter_edges(&input, &major(&[]), FilterMode::Common, 2);
        assert_eq!(result, edges(&[("A", "x"), ("B", "x"), ("C", "x")]));
    }

    #[test]
    fn filtering_is_idempotent() {
        let input = edges(&[
            ("A", "x"),
            ("B", "x"),
            ("A", "y"),
            ("C", "z"),
            ("B", "z"),
            ("C", "A"),
            ("A", "w"),
        ]);
        let major = major(&["A", "B", "C"]);

        for mode in [FilterMode::Common, FilterMode::Unique] {
            let once = filter_edges(&input, &major, mode, 1);
            let twice = filter_edges(&once, &major, mode, 1);
            assert_eq!(once, twice, "mode {mode}");
        }
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(filter_edges(&[], &major(&["A"]), FilterMode::Common, 1).is_empty());
    }
}
