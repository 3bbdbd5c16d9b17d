//! Forest-level addressing: paths, lookup and pre-order traversal
//!
//! Nodes own their children and never point back at their parent. Anything
//! that needs to know where a node lives works with a [`ChunkPath`] found by
//! a depth-first search.

use std::fmt;
use std::str::FromStr;

use super::node::ChunkNode;
use crate::error::{Error, Result};

/// Address of a node: a root index followed by child indices
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkPath {
    pub root: usize,
    pub children: Vec<usize>,
}

impl ChunkPath {
    #[must_use]
    pub fn root(index: usize) -> Self {
        Self {
            root: index,
            children: Vec::new(),
        }
    }

    /// Path of this node's `index`-th child
    #[must_use]
    pub fn child(&self, index: usize) -> Self {
        let mut path = self.clone();
        path.children.push(index);
        path
    }

    /// Path of the parent, `None` for a root
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let mut path = self.clone();
        path.children.pop().map(|_| path)
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.children.len()
    }
}

impl fmt::Display for ChunkPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)?;
        for index in &self.children {
            write!(f, "/{index}")?;
        }
        Ok(())
    }
}

impl FromStr for ChunkPath {
    type Err = Error;

    /// Parse the `0/2/1` form produced by `Display`
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.trim().split('/').map(|part| {
            part.parse::<usize>()
                .map_err(|_| Error::InvalidFormat(format!("invalid chunk path: {s}")))
        });
        let root = parts
            .next()
            .ok_or_else(|| Error::InvalidFormat(format!("invalid chunk path: {s}")))??;
        let children = parts.collect::<Result<Vec<_>>>()?;
        Ok(Self { root, children })
    }
}

/// The parsed chunk table: an ordered list of root nodes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChunkForest {
    pub roots: Vec<ChunkNode>,
}

impl ChunkForest {
    #[must_use]
    pub fn new(roots: Vec<ChunkNode>) -> Self {
        Self { roots }
    }

    #[must_use]
    pub fn get(&self, path: &ChunkPath) -> Option<&ChunkNode> {
        let mut node = self.roots.get(path.root)?;
        for &index in &path.children {
            node = node.children().get(index)?;
        }
        Some(node)
    }

    pub fn get_mut(&mut self, path: &ChunkPath) -> Option<&mut ChunkNode> {
        let mut node = self.roots.get_mut(path.root)?;
        for &index in &path.children {
            node = node.children_mut()?.get_mut(index)?;
        }
        Some(node)
    }

    /// Like [`ChunkForest::get`], failing with [`Error::NodeNotFound`]
    pub fn resolve(&self, path: &ChunkPath) -> Result<&ChunkNode> {
        self.get(path).ok_or_else(|| Error::NodeNotFound {
            path: path.to_string(),
        })
    }

    /// Every node with its path, depth-first pre-order
    #[must_use]
    pub fn walk(&self) -> Vec<(ChunkPath, &ChunkNode)> {
        let mut out = Vec::new();
        for (index, root) in self.roots.iter().enumerate() {
            walk_node(ChunkPath::root(index), root, &mut out);
        }
        out
    }

    /// Path of the first node (pre-order) matching the predicate
    pub fn find_path<F>(&self, mut predicate: F) -> Option<ChunkPath>
    where
        F: FnMut(&ChunkNode) -> bool,
    {
        self.walk()
            .into_iter()
            .find(|(_, node)| predicate(node))
            .map(|(path, _)| path)
    }

    /// Number of nodes in the forest
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.walk().len()
    }
}

fn walk_node<'a>(path: ChunkPath, node: &'a ChunkNode, out: &mut Vec<(ChunkPath, &'a ChunkNode)>) {
    let children = node.children();
    out.push((path.clone(), node));
    for (index, child) in children.iter().enumerate() {
        walk_node(path.child(index), child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> ChunkForest {
        ChunkForest::new(vec![
            ChunkNode::leaf(0x1, 0, 0, vec![1; 8]),
            ChunkNode::container(
                0x5000,
                0,
                0,
                vec![
                    ChunkNode::leaf(0x5013, 0, 8, vec![2; 8]),
                    ChunkNode::container(0x5001, 0, 0, vec![ChunkNode::leaf(0x5014, 0, 16, vec![3; 4])]),
                ],
            ),
        ])
    }

    #[test]
    fn test_walk_is_preorder() {
        let forest = sample();
        let paths: Vec<String> = forest.walk().iter().map(|(p, _)| p.to_string()).collect();
        assert_eq!(paths, vec!["0", "1", "1/0", "1/1", "1/1/0"]);
    }

    #[test]
    fn test_find_path_and_get() {
        let forest = sample();
        let path = forest.find_path(|n| n.type_id == 0x5014).unwrap();
        assert_eq!(path.to_string(), "1/1/0");
        assert_eq!(forest.get(&path).unwrap().size, 4);
        assert_eq!(path.parent().unwrap().to_string(), "1/1");
        assert!(ChunkPath::root(0).parent().is_none());
    }

    #[test]
    fn test_missing_path() {
        let forest = sample();
        let err = forest.resolve(&"1/5".parse().unwrap()).unwrap_err();
        assert!(matches!(err, Error::NodeNotFound { path } if path == "1/5"));
        // leaves have no children to descend into
        assert!(forest.get(&"0/0".parse().unwrap()).is_none());
    }

    #[test]
    fn test_path_parse() {
        let path: ChunkPath = "3/0/12".parse().unwrap();
        assert_eq!(path, ChunkPath { root: 3, children: vec![0, 12] });
        assert!("".parse::<ChunkPath>().is_err());
        assert!("1/x".parse::<ChunkPath>().is_err());
    }
}
