//! The emotion taxonomy: an immutable forest of [`EmotionNode`]s.
//!
//! Structural checks happen once, when the taxonomy is built. A `Navigator`
//! can only be constructed from a validated `Taxonomy`.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::domain::entities::EmotionNode;
use crate::domain::error::{DomainError, DomainResult};

/// Built-in Plutchik-style wheel: 7 core emotions, 3 levels deep.
const BUILTIN_TAXONOMY: &str = include_str!("../../assets/plutchik.json");

/// Raw node for intermediate parsing.
///
/// `children` may be omitted or empty; both mean "leaf".
#[derive(Debug, Clone, Deserialize)]
pub struct RawEmotionNode {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub children: Vec<RawEmotionNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxonomy {
    roots: Vec<Arc<EmotionNode>>,
    node_count: usize,
}

impl Taxonomy {
    /// The taxonomy shipped with the crate.
    pub fn builtin() -> DomainResult<Self> {
        Self::from_json(BUILTIN_TAXONOMY)
    }

    /// Parse a JSON array of root nodes.
    pub fn from_json(content: &str) -> DomainResult<Self> {
        let raw: Vec<RawEmotionNode> = serde_json::from_str(content)
            .map_err(|e| DomainError::InvalidTaxonomy(e.to_string()))?;
        Self::from_nodes(raw)
    }

    /// Validate and freeze a raw forest.
    pub fn from_nodes(raw: Vec<RawEmotionNode>) -> DomainResult<Self> {
        if raw.is_empty() {
            return Err(DomainError::EmptyTaxonomy);
        }
        let mut seen = HashSet::new();
        let roots = raw
            .into_iter()
            .map(|node| freeze(node, &mut seen))
            .collect::<DomainResult<Vec<_>>>()?;
        debug!(
            "taxonomy loaded: {} roots, {} nodes",
            roots.len(),
            seen.len()
        );
        Ok(Self {
            roots,
            node_count: seen.len(),
        })
    }

    /// The top level, as browsed when navigation starts.
    pub fn roots(&self) -> &[Arc<EmotionNode>] {
        &self.roots
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Deepest level reachable from the roots (1 for a flat taxonomy).
    pub fn max_depth(&self) -> usize {
        self.roots.iter().map(|n| n.depth()).max().unwrap_or(0)
    }

    /// Depth-first lookup by id.
    pub fn find(&self, id: &str) -> Option<Arc<EmotionNode>> {
        let mut stack: Vec<&Arc<EmotionNode>> = self.roots.iter().rev().collect();
        while let Some(node) = stack.pop() {
            if node.id == id {
                return Some(Arc::clone(node));
            }
            stack.extend(node.children.iter().rev());
        }
        None
    }

    /// All leaves in depth-first order.
    pub fn leaves(&self) -> Vec<Arc<EmotionNode>> {
        let mut leaves = Vec::new();
        let mut stack: Vec<&Arc<EmotionNode>> = self.roots.iter().rev().collect();
        while let Some(node) = stack.pop() {
            if node.is_leaf() {
                leaves.push(Arc::clone(node));
            } else {
                stack.extend(node.children.iter().rev());
            }
        }
        leaves
    }
}

fn freeze(raw: RawEmotionNode, seen: &mut HashSet<String>) -> DomainResult<Arc<EmotionNode>> {
    if raw.id.trim().is_empty() {
        return Err(DomainError::MalformedNode {
            id: raw.id,
            reason: format!("blank id (name {:?})", raw.name),
        });
    }
    if raw.name.trim().is_empty() {
        return Err(DomainError::MalformedNode {
            id: raw.id,
            reason: "blank name".to_string(),
        });
    }
    if !seen.insert(raw.id.clone()) {
        return Err(DomainError::DuplicateNodeId(raw.id));
    }

    let children = raw
        .children
        .into_iter()
        .map(|child| freeze(child, seen))
        .collect::<DomainResult<Vec<_>>>()?;

    Ok(Arc::new(EmotionNode {
        id: raw.id,
        name: raw.name,
        color: raw.color,
        definition: raw.definition,
        children,
    }))
}
