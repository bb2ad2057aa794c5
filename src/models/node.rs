//! Response shapes for brothers and their subtrees.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::Member;

/// A brother with littles fully expanded, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub name: String,
    pub nickname: String,
    pub big: Option<String>,
    pub year: i32,
    pub littles: Vec<Node>,
    pub active_branch: bool,
    /// Size of this subtree, self included
    #[serde(skip)]
    pub weight: u32,
}

/// Flat view of a brother: littles are listed by nickname in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberView {
    pub name: String,
    pub nickname: String,
    pub big: Option<String>,
    pub year: i32,
    pub littles: Vec<String>,
}

impl MemberView {
    pub fn new(member: Member, littles: Vec<String>) -> Self {
        Self {
            name: member.name,
            nickname: member.nickname,
            big: member.big,
            year: member.year,
            littles,
        }
    }

    /// Build flat views for a set of brothers, resolving littles against `roster`.
    ///
    /// `roster` must be in insertion order; littles keep that order.
    pub fn collect(members: Vec<Member>, roster: &[Member]) -> Vec<Self> {
        let mut littles_by_big: HashMap<&str, Vec<String>> = HashMap::new();
        for member in roster {
            if let Some(big) = member.big.as_deref() {
                littles_by_big
                    .entry(big)
                    .or_default()
                    .push(member.nickname.clone());
            }
        }

        members
            .into_iter()
            .map(|member| {
                let littles = littles_by_big
                    .get(member.nickname.as_str())
                    .cloned()
                    .unwrap_or_default();
                Self::new(member, littles)
            })
            .collect()
    }
}

/// Which shape `GET /api/brothers/{nickname}` responds with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    #[default]
    Tree,
    Flat,
}

/// Query string for single-brother reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrotherQuery {
    #[serde(default)]
    pub shape: Shape,
}

/// Body of a single-brother read in whichever shape was requested.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum BrotherBody {
    Tree(Node),
    Flat(MemberView),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(nickname: &str, big: Option<&str>) -> Member {
        Member {
            nickname: nickname.to_string(),
            name: format!("{} Name", nickname),
            big: big.map(str::to_string),
            year: 2014,
        }
    }

    #[test]
    fn test_node_wire_shape() {
        let node = Node {
            name: "Kyle Halstead".to_string(),
            nickname: "Karu".to_string(),
            big: None,
            year: 2012,
            littles: vec![],
            active_branch: false,
            weight: 1,
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "Kyle Halstead",
                "nickname": "Karu",
                "big": null,
                "year": 2012,
                "littles": [],
                "activeBranch": false
            })
        );
    }

    #[test]
    fn test_collect_littles_in_insertion_order() {
        let roster = vec![
            member("Vaporizer", None),
            member("Karu", Some("Vaporizer")),
            member("Sanctus", Some("Vaporizer")),
            member("Dishficks", None),
        ];
        let views = MemberView::collect(roster.clone(), &roster);

        assert_eq!(views[0].littles, vec!["Karu", "Sanctus"]);
        assert!(views[1].littles.is_empty());
        assert!(views[3].littles.is_empty());
    }
}
