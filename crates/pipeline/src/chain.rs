//! Pipeline chain nodes
//!
//! A chain is a backward-linked list of immutable nodes:
//!
//! ```text
//! Root("Pipeline Start") ◄── Node(A) ◄── Node(B) ◄── Node(C)
//!                                     ▲
//!                                     └── Node(D)   (second chain sharing A)
//! ```
//!
//! Each node owns an `Arc` to its ancestor and nothing else, so no cycle can
//! form and a prefix can be shared by any number of chains.
//!
//! ## Transition
//!
//! Appending stage S to node N (available contract C, flag OK):
//! - `compatible = OK && S.input ⊆ C`
//! - `available = C ∪ S.output` when compatible, otherwise `Invalid`
//!
//! A union conflict while extending C also makes the new node incompatible.

use std::sync::Arc;

use morph_core::{AvailableContract, Contract, Error, Result};
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::stage::{Action, Stage};

/// Name reported for the root of every chain
pub const ROOT_NAME: &str = "Pipeline Start";

pub(crate) enum Link {
    Root { seed: Contract },
    Stage { stage: Stage, action: Action },
}

/// One immutable position in a pipeline
pub struct ChainNode {
    ancestor: Option<Arc<ChainNode>>,
    link: Link,
    available: AvailableContract,
    compatible: bool,
    depth: usize,
}

impl ChainNode {
    /// Root node whose available contract is `seed`
    pub(crate) fn root(seed: Contract) -> Arc<Self> {
        Arc::new(Self {
            ancestor: None,
            available: AvailableContract::root(seed.clone()),
            link: Link::Root { seed },
            compatible: true,
            depth: 0,
        })
    }

    /// New node placing `stage` after `ancestor`
    pub(crate) fn append(ancestor: &Arc<ChainNode>, stage: Stage, action: Action) -> Arc<Self> {
        let satisfied = ancestor.compatible && ancestor.available.satisfies(stage.input());
        let (compatible, available) = if satisfied {
            match ancestor.available.extend(stage.output()) {
                Ok(available) => (true, available),
                Err(e) => {
                    warn!(
                        stage = stage.name(),
                        ancestor = ancestor.name(),
                        error = %e,
                        "stage output conflicts with available contract"
                    );
                    (false, AvailableContract::Invalid)
                }
            }
        } else {
            if ancestor.compatible {
                let missing = ancestor
                    .available
                    .contract()
                    .map(|c| stage.input().missing_from(c))
                    .unwrap_or_default();
                warn!(
                    stage = stage.name(),
                    ancestor = ancestor.name(),
                    missing = ?missing.iter().map(|d| d.name()).collect::<Vec<_>>(),
                    "stage input not satisfied by ancestor contract"
                );
            }
            (false, AvailableContract::Invalid)
        };

        debug!(stage = stage.name(), depth = ancestor.depth + 1, compatible, "stage appended");

        Arc::new(Self {
            ancestor: Some(Arc::clone(ancestor)),
            link: Link::Stage { stage, action },
            available,
            compatible,
            depth: ancestor.depth + 1,
        })
    }

    /// Stage name, or [`ROOT_NAME`] for the root
    pub fn name(&self) -> &str {
        match &self.link {
            Link::Root { .. } => ROOT_NAME,
            Link::Stage { stage, .. } => stage.name(),
        }
    }

    /// Stage placed at this node; `None` for the root
    pub fn stage(&self) -> Option<&Stage> {
        match &self.link {
            Link::Root { .. } => None,
            Link::Stage { stage, .. } => Some(stage),
        }
    }

    /// Cumulative available contract at this node
    pub fn available(&self) -> &AvailableContract {
        &self.available
    }

    /// Whether this node and all its ancestors are compatible
    pub fn is_compatible(&self) -> bool {
        self.compatible
    }

    /// Number of stages from the root up to and including this node
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Immediate ancestor; `None` for the root
    pub fn ancestor(&self) -> Option<&ChainNode> {
        self.ancestor.as_deref()
    }

    /// The fields a caller must place in the store before running
    pub fn seed(&self) -> &Contract {
        let mut node = self;
        while let Some(ancestor) = node.ancestor() {
            node = ancestor;
        }
        match &node.link {
            Link::Root { seed } => seed,
            Link::Stage { .. } => unreachable!("only the root has no ancestor"),
        }
    }

    pub(crate) fn action(&self) -> Option<&Action> {
        match &self.link {
            Link::Root { .. } => None,
            Link::Stage { action, .. } => Some(action),
        }
    }

    /// Nodes from the root up to and including this one
    pub(crate) fn path(&self) -> SmallVec<[&ChainNode; 8]> {
        let mut path: SmallVec<[&ChainNode; 8]> = SmallVec::with_capacity(self.depth + 1);
        let mut node = Some(self);
        while let Some(current) = node {
            path.push(current);
            node = current.ancestor();
        }
        path.reverse();
        path
    }

    /// Earliest incompatible node on the path to the root
    ///
    /// That is the node whose own stage broke the chain, as opposed to the
    /// nodes after it that merely inherited the invalid marker.
    pub fn first_incompatible(&self) -> Option<&ChainNode> {
        if self.compatible {
            return None;
        }
        let mut node = self;
        while let Some(ancestor) = node.ancestor() {
            if ancestor.compatible {
                return Some(node);
            }
            node = ancestor;
        }
        None
    }

    /// Diagnose why this chain is incompatible
    ///
    /// Returns `Ok(())` for a compatible chain. Otherwise the error names
    /// the first breaking stage, its ancestor, and the missing fields; or
    /// the conflicting field if the breaking stage redefined one.
    pub fn diagnose(&self) -> Result<()> {
        let (node, stage, ancestor) = match self.first_incompatible() {
            Some(node) => match (node.stage(), node.ancestor()) {
                (Some(stage), Some(ancestor)) => (node, stage, ancestor),
                _ => return Ok(()),
            },
            None => return Ok(()),
        };

        let Some(available) = ancestor.available.contract() else {
            return Err(Error::IncompatiblePipeline {
                stage: node.name().to_string(),
            });
        };

        let missing = stage.input().missing_from(available);
        if !missing.is_empty() {
            return Err(Error::ContractViolation {
                stage: node.name().to_string(),
                ancestor: ancestor.name().to_string(),
                missing: missing.iter().map(|d| d.name().to_string()).collect(),
            });
        }
        // Input satisfied, so the output union must have conflicted
        available.union(stage.output()).map(|_| ())
    }
}

impl Drop for ChainNode {
    // Unlink iteratively so dropping a long chain does not recurse per node
    fn drop(&mut self) {
        let mut next = self.ancestor.take();
        while let Some(node) = next {
            match Arc::try_unwrap(node) {
                Ok(mut owned) => next = owned.ancestor.take(),
                Err(_) => break,
            }
        }
    }
}
