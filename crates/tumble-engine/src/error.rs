//! Error taxonomy for scene construction and link resolution.
//!
//! Configuration problems (bad shapes, dangling constraint indices) abort the
//! level transition that hit them. Link-resolution failures mean the link
//! table and the physics world disagree, which is a programming error; they
//! are surfaced rather than looped on.

use thiserror::Error;

use crate::api::types::BodyId;

/// A polygon the physics world refuses to build.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    #[error("polygon needs at least 3 distinct points, got {count}")]
    TooFewPoints { count: usize },
    #[error("polygon has zero area")]
    ZeroArea,
    #[error("polygon edges {first} and {second} intersect")]
    SelfIntersecting { first: usize, second: usize },
    #[error("polygon point {index} is not finite")]
    NonFinite { index: usize },
    #[error("convex decomposition produced no usable parts")]
    NoParts,
    #[error("block has no physics definition")]
    MissingPhysics,
}

/// A level description that cannot be turned into a wired world.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LevelError {
    #[error("layout entry {entry} references template {key}, but the level only has {available}")]
    UnknownTemplate {
        entry: usize,
        key: usize,
        available: usize,
    },
    #[error("layout entry {entry} could not be built: {source}")]
    Shape {
        entry: usize,
        #[source]
        source: ShapeError,
    },
    #[error("constraint {constraint} references layout entry {entry}, but the layout has {available}")]
    DanglingConstraint {
        constraint: usize,
        entry: usize,
        available: usize,
    },
    #[error("constraint {constraint} references layout entry {entry}, which has no body")]
    BodylessEndpoint { constraint: usize, entry: usize },
}

/// The owner chain of a body or part never reached a linked body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("body {start:?} has no link anywhere up to its root {root:?}")]
    Unresolved { start: BodyId, root: BodyId },
    #[error("owner chain of body {start:?} is deeper than {depth}")]
    TooDeep { start: BodyId, depth: usize },
}

/// Umbrella error for scene-level operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error(transparent)]
    Shape(#[from] ShapeError),
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error(transparent)]
    Link(#[from] LinkError),
    #[error("invalid scene configuration: {0}")]
    Config(String),
}

impl From<serde_json::Error> for SceneError {
    fn from(err: serde_json::Error) -> Self {
        SceneError::Config(err.to_string())
    }
}
