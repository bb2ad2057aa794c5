//! Subtree materialization.
//!
//! A brother's subtree is rebuilt from the store on every read: littles are
//! built depth-first, then sequenced into display order with their weight and
//! active-branch flag folded into the parent.

pub mod sequencer;

use std::collections::HashSet;
use std::future::Future;

use crate::errors::AppError;
use crate::models::{Member, Node};

use sequencer::sequence;

/// Deepest subtree a build will materialize unless configured otherwise.
pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// The two reads the subtree builder needs from persistence.
pub trait MemberStore {
    fn get_member(
        &self,
        nickname: &str,
    ) -> impl Future<Output = Result<Option<Member>, AppError>> + Send;

    /// Littles of `big`, in insertion order.
    fn get_littles(&self, big: &str)
        -> impl Future<Output = Result<Vec<Member>, AppError>> + Send;
}

/// A member on the current root-to-node path whose littles are still being built.
struct Frame {
    member: Member,
    pending: std::vec::IntoIter<Member>,
    built: Vec<Node>,
}

impl Frame {
    fn finish(self, current_year: i32) -> Node {
        let sequenced = sequence(self.member.year, current_year, self.built);
        Node {
            name: self.member.name,
            nickname: self.member.nickname,
            big: self.member.big,
            year: self.member.year,
            littles: sequenced.littles,
            active_branch: sequenced.active_branch,
            weight: sequenced.weight,
        }
    }
}

/// Builds fully annotated subtrees against a store.
pub struct TreeBuilder<'s, S> {
    store: &'s S,
    current_year: i32,
    max_depth: usize,
}

impl<'s, S: MemberStore + Sync> TreeBuilder<'s, S> {
    /// `current_year` decides which cohort counts as active for this build.
    pub fn new(store: &'s S, current_year: i32) -> Self {
        Self {
            store,
            current_year,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Limit the number of levels, root included, a build may descend.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Build the subtree rooted at `nickname`.
    ///
    /// The walk is post-order over an explicit stack of frames, one per
    /// member on the current path, so depth costs heap rather than call stack.
    pub async fn build(&self, nickname: &str) -> Result<Node, AppError> {
        let root = self
            .store
            .get_member(nickname)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Brother {} not found", nickname)))?;

        let mut on_path = HashSet::new();
        let mut stack = Vec::new();
        self.descend(root, &mut stack, &mut on_path).await?;

        while let Some(top) = stack.last_mut() {
            if let Some(little) = top.pending.next() {
                self.descend(little, &mut stack, &mut on_path).await?;
                continue;
            }

            let Some(frame) = stack.pop() else { break };
            on_path.remove(&frame.member.nickname);
            let node = frame.finish(self.current_year);
            match stack.last_mut() {
                Some(parent) => parent.built.push(node),
                None => {
                    tracing::debug!(
                        "Built subtree for {} ({} brothers, active: {})",
                        nickname,
                        node.weight,
                        node.active_branch
                    );
                    return Ok(node);
                }
            }
        }

        Err(AppError::Internal(format!(
            "Subtree build for {} ended without a root",
            nickname
        )))
    }

    /// Push a frame for `member` after checking it extends the path legally.
    async fn descend(
        &self,
        member: Member,
        stack: &mut Vec<Frame>,
        on_path: &mut HashSet<String>,
    ) -> Result<(), AppError> {
        if on_path.contains(&member.nickname) {
            let path = path_of(stack);
            tracing::warn!("Big/little cycle through {} (path: {})", member.nickname, path);
            return Err(AppError::Cycle(format!(
                "Brother {} is their own ancestor: {} -> {}",
                member.nickname, path, member.nickname
            )));
        }
        if stack.len() >= self.max_depth {
            tracing::warn!(
                "Subtree below {} is deeper than {} levels",
                stack.first().map_or(member.nickname.as_str(), |f| f.member.nickname.as_str()),
                self.max_depth
            );
            return Err(AppError::TooDeep(format!(
                "Subtree is deeper than {} levels at {}",
                self.max_depth, member.nickname
            )));
        }

        let littles = self.store.get_littles(&member.nickname).await?;
        on_path.insert(member.nickname.clone());
        stack.push(Frame {
            member,
            pending: littles.into_iter(),
            built: Vec::new(),
        });
        Ok(())
    }
}

fn path_of(stack: &[Frame]) -> String {
    stack
        .iter()
        .map(|frame| frame.member.nickname.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Store backed by a vector; order of the vector is insertion order.
    struct MemoryStore {
        members: Vec<Member>,
    }

    impl MemoryStore {
        fn new(rows: &[(&str, Option<&str>, i32)]) -> Self {
            let members = rows
                .iter()
                .map(|(nickname, big, year)| Member {
                    nickname: nickname.to_string(),
                    name: format!("{} Name", nickname),
                    big: big.map(str::to_string),
                    year: *year,
                })
                .collect();
            Self { members }
        }
    }

    impl MemberStore for MemoryStore {
        async fn get_member(&self, nickname: &str) -> Result<Option<Member>, AppError> {
            Ok(self
                .members
                .iter()
                .find(|m| m.nickname == nickname)
                .cloned())
        }

        async fn get_littles(&self, big: &str) -> Result<Vec<Member>, AppError> {
            Ok(self
                .members
                .iter()
                .filter(|m| m.big.as_deref() == Some(big))
                .cloned()
                .collect())
        }
    }

    fn nicknames(node: &Node) -> Vec<&str> {
        node.littles.iter().map(|n| n.nickname.as_str()).collect()
    }

    fn assert_weights(node: &Node) {
        let expected = 1 + node.littles.iter().map(|l| l.weight).sum::<u32>();
        assert_eq!(node.weight, expected, "weight of {}", node.nickname);
        for little in &node.littles {
            assert_weights(little);
        }
    }

    fn vaporizer_family() -> MemoryStore {
        MemoryStore::new(&[
            ("McLovin", None, 2011),
            ("Vaporizer", Some("McLovin"), 2014),
            ("Sanctus", Some("Vaporizer"), 2013),
            ("Karu", Some("Vaporizer"), 2012),
            ("Dishficks", Some("Vaporizer"), 2017),
            ("DoubleAgent", Some("Vaporizer"), 2015),
            ("Ficklet", Some("Dishficks"), 2019),
        ])
    }

    #[tokio::test]
    async fn test_leaf_node() {
        let store = MemoryStore::new(&[("Karu", None, 2012)]);

        let node = TreeBuilder::new(&store, 2012).build("Karu").await.unwrap();
        assert_eq!(node.nickname, "Karu");
        assert!(node.littles.is_empty());
        assert_eq!(node.weight, 1);
        assert!(node.active_branch);

        let node = TreeBuilder::new(&store, 2026).build("Karu").await.unwrap();
        assert!(!node.active_branch);
    }

    #[tokio::test]
    async fn test_littles_in_display_order() {
        let store = vaporizer_family();

        let node = TreeBuilder::new(&store, 2099)
            .build("Vaporizer")
            .await
            .unwrap();

        assert_eq!(
            nicknames(&node),
            vec!["DoubleAgent", "Dishficks", "Sanctus", "Karu"]
        );
        assert_eq!(node.weight, 6);
        assert_weights(&node);
    }

    #[tokio::test]
    async fn test_active_branch_propagates_from_any_depth() {
        let store = vaporizer_family();

        let root = TreeBuilder::new(&store, 2019)
            .build("McLovin")
            .await
            .unwrap();
        assert!(root.active_branch);

        let vaporizer = &root.littles[0];
        assert!(vaporizer.active_branch);
        for little in &vaporizer.littles {
            assert_eq!(
                little.active_branch,
                little.nickname == "Dishficks",
                "{}",
                little.nickname
            );
        }

        let inactive = TreeBuilder::new(&store, 2030)
            .build("McLovin")
            .await
            .unwrap();
        assert!(!inactive.active_branch);
    }

    #[tokio::test]
    async fn test_unknown_nickname() {
        let store = vaporizer_family();
        let err = TreeBuilder::new(&store, 2026)
            .build("unknown-key")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_cycle_is_reported() {
        let store = MemoryStore::new(&[
            ("A", Some("C"), 2014),
            ("B", Some("A"), 2014),
            ("C", Some("B"), 2014),
        ]);
        let err = TreeBuilder::new(&store, 2026).build("A").await.unwrap_err();
        assert!(matches!(err, AppError::Cycle(_)));
    }

    #[tokio::test]
    async fn test_build_is_deterministic() {
        let store = vaporizer_family();
        let builder = TreeBuilder::new(&store, 2017);
        let first = builder.build("McLovin").await.unwrap();
        let second = builder.build("McLovin").await.unwrap();
        assert_eq!(first, second);
    }

    /// Single-child chain `m0 -> m1 -> ...`, answered without storing rows.
    struct ChainStore {
        length: usize,
    }

    impl ChainStore {
        fn member(&self, index: usize) -> Member {
            Member {
                nickname: format!("m{}", index),
                name: format!("Member {}", index),
                big: index.checked_sub(1).map(|big| format!("m{}", big)),
                year: 2000,
            }
        }

        fn index_of(&self, nickname: &str) -> Option<usize> {
            nickname
                .strip_prefix('m')?
                .parse()
                .ok()
                .filter(|index| *index < self.length)
        }
    }

    impl MemberStore for ChainStore {
        async fn get_member(&self, nickname: &str) -> Result<Option<Member>, AppError> {
            Ok(self.index_of(nickname).map(|index| self.member(index)))
        }

        async fn get_littles(&self, big: &str) -> Result<Vec<Member>, AppError> {
            Ok(self
                .index_of(big)
                .map(|index| index + 1)
                .filter(|little| *little < self.length)
                .map(|little| vec![self.member(little)])
                .unwrap_or_default())
        }
    }

    #[tokio::test]
    async fn test_deep_chain_builds_without_recursion() {
        let store = ChainStore { length: 6000 };

        let root = TreeBuilder::new(&store, 2026)
            .max_depth(10_000)
            .build("m0")
            .await
            .unwrap();
        assert_eq!(root.weight, 6000);
        assert!(!root.active_branch);

        // Unwind level by level so dropping the chain stays shallow too.
        let mut depth = 1;
        let mut node = root;
        while let Some(little) = node.littles.pop() {
            assert_eq!(little.big.as_deref(), Some(node.nickname.as_str()));
            node = little;
            depth += 1;
        }
        assert_eq!(depth, 6000);
        assert_eq!(node.nickname, "m5999");
    }

    #[tokio::test]
    async fn test_depth_ceiling_is_an_error() {
        let store = ChainStore { length: 6000 };

        let err = TreeBuilder::new(&store, 2026).build("m0").await.unwrap_err();
        assert!(matches!(err, AppError::TooDeep(_)));

        let err = TreeBuilder::new(&store, 2026)
            .max_depth(3)
            .build("m5996")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::TooDeep(_)));

        let node = TreeBuilder::new(&store, 2026)
            .max_depth(3)
            .build("m5997")
            .await
            .unwrap();
        assert_eq!(node.weight, 3);
    }
}
