use std::collections::BTreeMap;

use rand::Rng;

use crate::api::types::{BodyId, SceneRng};
use crate::components::block::BlockInstance;
use crate::error::LinkError;

/// Longest owner chain [`LinkTable::resolve`] will walk.
pub const MAX_OWNER_DEPTH: usize = 16;

/// Anything that can report the owning body of a body or part.
pub trait OwnerChain {
    /// Parent of `id`, or `None` when `id` is a root.
    fn parent_of(&self, id: BodyId) -> Option<BodyId>;
}

/// Maps body ids to the block instances that own them.
///
/// Entries are keyed by the body's id and the stored instance's `link`
/// always equals that key. Iteration is in ascending id order, which is
/// also body creation order.
#[derive(Debug, Default)]
pub struct LinkTable {
    entries: BTreeMap<BodyId, BlockInstance>,
}

impl LinkTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link `instance` to body `id`, replacing any previous entry.
    pub fn insert(&mut self, id: BodyId, mut instance: BlockInstance) -> Option<BlockInstance> {
        instance.link = Some(id);
        self.entries.insert(id, instance)
    }

    pub fn remove(&mut self, id: BodyId) -> Option<BlockInstance> {
        self.entries.remove(&id)
    }

    pub fn get(&self, id: BodyId) -> Option<&BlockInstance> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut BlockInstance> {
        self.entries.get_mut(&id)
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn ids(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &BlockInstance)> {
        self.entries.iter().map(|(id, block)| (*id, block))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (BodyId, &mut BlockInstance)> {
        self.entries.iter_mut().map(|(id, block)| (*id, block))
    }

    /// A uniformly random linked id, `None` when the table is empty.
    pub fn pick_random(&self, rng: &mut SceneRng) -> Option<BodyId> {
        if self.entries.is_empty() {
            return None;
        }
        let index = rng.random_range(0..self.entries.len());
        self.entries.keys().nth(index).copied()
    }

    /// Walk up the owner chain from `start` until a linked id is found.
    ///
    /// Stops at the root with [`LinkError::Unresolved`] and gives up with
    /// [`LinkError::TooDeep`] after [`MAX_OWNER_DEPTH`] hops, so a cyclic
    /// chain cannot hang the frame.
    pub fn resolve<C: OwnerChain + ?Sized>(&self, start: BodyId, chain: &C) -> Result<BodyId, LinkError> {
        let mut current = start;
        for _ in 0..=MAX_OWNER_DEPTH {
            if self.entries.contains_key(&current) {
                return Ok(current);
            }
            match chain.parent_of(current) {
                Some(parent) => current = parent,
                None => return Err(LinkError::Unresolved { start, root: current }),
            }
        }
        Err(LinkError::TooDeep {
            start,
            depth: MAX_OWNER_DEPTH,
        })
    }
}
