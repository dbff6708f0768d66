use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Identifier handed out by the physics world for bodies and their parts.
///
/// Bodies and parts share one namespace. A body id doubles as the link id
/// of the block instance that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u32);

/// The scene's single random source. Seeded once per process.
pub type SceneRng = Pcg32;

/// An ordered (source, other) pair of linked bodies that touched this tick.
/// `source` is the block whose collision hook fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollisionPair {
    pub source: BodyId,
    pub other: BodyId,
}

impl CollisionPair {
    pub fn new(source: BodyId, other: BodyId) -> Self {
        Self { source, other }
    }

    /// The same contact seen from the other side.
    pub fn flipped(self) -> Self {
        Self {
            source: self.other,
            other: self.source,
        }
    }
}
