//! Display ordering of littles and the weight/activity fold.
//!
//! Littles are stable-sorted heaviest first and then woven center-out, so the
//! heaviest subtree sits in the middle of a row and the lightest ones at the
//! edges.

use std::cmp::Ordering;
use std::collections::VecDeque;

use crate::models::Node;

/// Result of sequencing one node's littles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequenced {
    pub littles: Vec<Node>,
    pub weight: u32,
    pub active_branch: bool,
}

/// Heavier subtrees sort first. Equal weights compare equal so a stable sort keeps insertion order.
pub fn by_descending_weight(a: &Node, b: &Node) -> Ordering {
    b.weight.cmp(&a.weight)
}

/// Order `littles` for display and fold their weight and activity into the parent's.
///
/// `littles` must already be built and arrive in insertion order.
pub fn sequence(own_year: i32, current_year: i32, mut littles: Vec<Node>) -> Sequenced {
    let weight = 1 + littles.iter().map(|little| little.weight).sum::<u32>();
    let active_branch =
        own_year == current_year || littles.iter().any(|little| little.active_branch);

    // slice::sort_by is stable
    littles.sort_by(by_descending_weight);

    Sequenced {
        littles: weave(littles),
        weight,
        active_branch,
    }
}

/// Weave a heaviest-first list center-out.
///
/// An odd-length list seeds the result with its heaviest element. Then, until
/// the list is drained: the next heaviest is prepended, the next heaviest
/// appended, and while anything is left the lightest is prepended and the new
/// lightest appended.
pub fn weave<T>(sorted: Vec<T>) -> Vec<T> {
    let mut remaining: VecDeque<T> = sorted.into();
    let mut woven = VecDeque::with_capacity(remaining.len());

    if remaining.len() % 2 == 1 {
        if let Some(heaviest) = remaining.pop_front() {
            woven.push_back(heaviest);
        }
    }

    while !remaining.is_empty() {
        if let Some(next) = remaining.pop_front() {
            woven.push_front(next);
        }
        if let Some(next) = remaining.pop_front() {
            woven.push_back(next);
        }
        if remaining.is_empty() {
            break;
        }
        if let Some(lightest) = remaining.pop_back() {
            woven.push_front(lightest);
        }
        if let Some(lightest) = remaining.pop_back() {
            woven.push_back(lightest);
        }
    }

    woven.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(nickname: &str, weight: u32, active_branch: bool) -> Node {
        Node {
            name: nickname.to_string(),
            nickname: nickname.to_string(),
            big: Some("Vaporizer".to_string()),
            year: 2013,
            littles: vec![],
            active_branch,
            weight,
        }
    }

    fn nicknames(nodes: &[Node]) -> Vec<&str> {
        nodes.iter().map(|n| n.nickname.as_str()).collect()
    }

    #[test]
    fn test_four_littles_weave() {
        let littles = vec![
            node("Sanctus", 1, false),
            node("Karu", 1, false),
            node("Dishficks", 2, false),
            node("DoubleAgent", 1, false),
        ];

        let result = sequence(2014, 2099, littles);

        assert_eq!(
            nicknames(&result.littles),
            vec!["DoubleAgent", "Dishficks", "Sanctus", "Karu"]
        );
        assert_eq!(result.weight, 6);
        assert!(!result.active_branch);
    }

    #[test]
    fn test_no_littles() {
        let result = sequence(2014, 2014, vec![]);
        assert!(result.littles.is_empty());
        assert_eq!(result.weight, 1);
        assert!(result.active_branch);

        let result = sequence(2014, 2015, vec![]);
        assert!(!result.active_branch);
    }

    #[test]
    fn test_weave_odd_lengths() {
        assert_eq!(weave(vec!['a']), vec!['a']);
        // a seeds; b prepended, c appended
        assert_eq!(weave(vec!['a', 'b', 'c']), vec!['b', 'a', 'c']);
        // a seeds; b prepended, c appended; e prepended, d appended
        assert_eq!(
            weave(vec!['a', 'b', 'c', 'd', 'e']),
            vec!['e', 'b', 'a', 'c', 'd']
        );
    }

    #[test]
    fn test_weave_even_lengths() {
        assert_eq!(weave(Vec::<char>::new()), Vec::<char>::new());
        assert_eq!(weave(vec!['a', 'b']), vec!['a', 'b']);
        assert_eq!(
            weave(vec!['a', 'b', 'c', 'd', 'e', 'f']),
            vec!['c', 'f', 'a', 'b', 'e', 'd']
        );
    }

    #[test]
    fn test_weave_is_permutation() {
        for len in 0..12 {
            let input: Vec<usize> = (0..len).collect();
            let mut output = weave(input.clone());
            assert_eq!(output.len(), len);
            output.sort();
            assert_eq!(output, input);
        }
    }

    #[test]
    fn test_equal_weights_keep_insertion_order() {
        let littles = vec![
            node("A", 3, false),
            node("B", 1, false),
            node("C", 3, false),
            node("D", 1, false),
        ];
        // sorted: A(3), C(3), B(1), D(1)
        let result = sequence(2014, 2099, littles);
        assert_eq!(nicknames(&result.littles), vec!["D", "A", "C", "B"]);
    }

    #[test]
    fn test_active_branch_from_any_little() {
        let littles = vec![node("Karu", 1, false), node("Sanctus", 4, true)];
        let result = sequence(2014, 2099, littles);
        assert!(result.active_branch);
        assert_eq!(result.weight, 6);
    }
}
