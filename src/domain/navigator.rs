//! Taxonomy navigator: descends the emotion tree one gesture at a time.
//!
//! Two states:
//! - `Browsing`: looking at one sibling level with a cursor
//! - `AwaitingContext`: a leaf was committed and needs intensity/trigger
//!
//! `Skip` cycles siblings, `Advance` descends or commits a leaf,
//! `CancelContext` drops the pending leaf, `Reset` returns to the roots.
//! There is no "up one level" input.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::domain::entities::{EmotionNode, PendingSelection};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::taxonomy::Taxonomy;

/// Gesture outcomes fed to the navigator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavInput {
    Advance,
    Skip,
    CancelContext,
    Reset,
}

impl NavInput {
    fn name(self) -> &'static str {
        match self {
            Self::Advance => "advance",
            Self::Skip => "skip",
            Self::CancelContext => "cancel",
            Self::Reset => "reset",
        }
    }
}

impl fmt::Display for NavInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Position while browsing one level of the taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalState {
    level: Vec<Arc<EmotionNode>>,
    cursor: usize,
    path: Vec<Arc<EmotionNode>>,
}

impl TraversalState {
    fn at_roots(taxonomy: &Taxonomy) -> Self {
        Self {
            level: taxonomy.roots().to_vec(),
            cursor: 0,
            path: Vec::new(),
        }
    }

    /// Siblings currently being browsed. Never empty.
    pub fn level(&self) -> &[Arc<EmotionNode>] {
        &self.level
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Nodes chosen by `Advance` so far, excluding the current one.
    pub fn path(&self) -> &[Arc<EmotionNode>] {
        &self.path
    }

    /// 1-based level number, for progress display.
    pub fn depth(&self) -> usize {
        self.path.len() + 1
    }

    pub fn current(&self) -> &Arc<EmotionNode> {
        &self.level[self.cursor]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavState {
    Browsing(TraversalState),
    AwaitingContext {
        pending: PendingSelection,
        /// Where the leaf was committed from; restored on cancel.
        origin: TraversalState,
    },
}

impl NavState {
    fn name(&self) -> &'static str {
        match self {
            Self::Browsing(_) => "browsing",
            Self::AwaitingContext { .. } => "awaiting context",
        }
    }
}

/// What a successful transition did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEvent {
    /// Cursor moved to another sibling (or stayed, for a single-member level)
    Skipped { cursor: usize },
    /// Went one level down into the children of the advanced node
    Descended { depth: usize },
    /// A leaf was committed; context is required to finalize
    SelectionPending(PendingSelection),
    ContextCancelled,
    Reset,
}

/// One navigation session over a taxonomy.
///
/// Not shared: each logging session owns its own navigator.
#[derive(Debug, Clone)]
pub struct Navigator {
    taxonomy: Arc<Taxonomy>,
    state: NavState,
}

impl Navigator {
    pub fn new(taxonomy: Arc<Taxonomy>) -> Self {
        let state = NavState::Browsing(TraversalState::at_roots(&taxonomy));
        Self { taxonomy, state }
    }

    pub fn state(&self) -> &NavState {
        &self.state
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// The traversal state, if browsing.
    pub fn browsing(&self) -> Option<&TraversalState> {
        match &self.state {
            NavState::Browsing(traversal) => Some(traversal),
            NavState::AwaitingContext { .. } => None,
        }
    }

    /// The committed leaf, if awaiting context.
    pub fn pending(&self) -> Option<&PendingSelection> {
        match &self.state {
            NavState::AwaitingContext { pending, .. } => Some(pending),
            NavState::Browsing(_) => None,
        }
    }

    /// Apply one input. Inputs that do not fit the current state are
    /// rejected and leave the state untouched.
    pub fn apply(&mut self, input: NavInput) -> DomainResult<NavEvent> {
        let event = match input {
            NavInput::Skip => self.skip()?,
            NavInput::Advance => self.advance()?,
            NavInput::CancelContext => self.cancel_context()?,
            NavInput::Reset => self.reset(),
        };
        debug!("navigator: {} -> {:?}", input, event);
        Ok(event)
    }

    pub fn skip(&mut self) -> DomainResult<NavEvent> {
        let traversal = self.browsing_mut(NavInput::Skip)?;
        traversal.cursor = (traversal.cursor + 1) % traversal.level.len();
        Ok(NavEvent::Skipped {
            cursor: traversal.cursor,
        })
    }

    pub fn advance(&mut self) -> DomainResult<NavEvent> {
        let traversal = self.browsing_mut(NavInput::Advance)?;
        let node = Arc::clone(traversal.current());

        if node.is_leaf() {
            let pending = PendingSelection::new(&traversal.path, node);
            let origin = traversal.clone();
            self.state = NavState::AwaitingContext {
                pending: pending.clone(),
                origin,
            };
            return Ok(NavEvent::SelectionPending(pending));
        }

        traversal.level = node.children.clone();
        traversal.cursor = 0;
        traversal.path.push(node);
        Ok(NavEvent::Descended {
            depth: traversal.depth(),
        })
    }

    pub fn cancel_context(&mut self) -> DomainResult<NavEvent> {
        let origin = match &self.state {
            NavState::AwaitingContext { origin, .. } => origin.clone(),
            state => {
                return Err(DomainError::InvalidTransition {
                    input: NavInput::CancelContext.name(),
                    state: state.name(),
                })
            }
        };
        self.state = NavState::Browsing(origin);
        Ok(NavEvent::ContextCancelled)
    }

    /// Back to the taxonomy roots from any state.
    pub fn reset(&mut self) -> NavEvent {
        self.state = NavState::Browsing(TraversalState::at_roots(&self.taxonomy));
        NavEvent::Reset
    }

    fn browsing_mut(&mut self, input: NavInput) -> DomainResult<&mut TraversalState> {
        match &mut self.state {
            NavState::Browsing(traversal) => Ok(traversal),
            state => Err(DomainError::InvalidTransition {
                input: input.name(),
                state: state.name(),
            }),
        }
    }
}
