//! Level descriptions and the instantiator that turns them into a wired
//! physics world.
//!
//! A transition is built entirely off to the side: [`instantiate`] returns a
//! fresh [`PhysicsWorld`] and [`LinkTable`] or an error, and never touches
//! the level that is currently running.

use std::fmt;
use std::rc::Rc;

use glam::Vec2;
use log::{debug, info};
use serde::Deserialize;

use crate::api::types::{BodyId, SceneRng};
use crate::components::block::{BlockInputs, BlockTemplate, Position};
use crate::core::links::LinkTable;
use crate::core::physics::{BodyOptions, ConstraintDesc, PhysicsSettings, PhysicsWorld};
use crate::core::shape::load_block;
use crate::error::{LevelError, SceneError};

/// One placed instance in a level.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LayoutEntry {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    /// Index into the level's template key.
    pub key: usize,
    #[serde(default)]
    pub options: BodyOptions,
    #[serde(default)]
    pub inputs: Option<BlockInputs>,
}

impl LayoutEntry {
    pub fn new(x: f32, y: f32, scale: f32, key: usize) -> Self {
        Self {
            x,
            y,
            scale,
            key,
            options: BodyOptions::default(),
            inputs: None,
        }
    }

    pub fn with_options(mut self, options: BodyOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_inputs(mut self, inputs: BlockInputs) -> Self {
        self.inputs = Some(inputs);
        self
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y, self.scale)
    }
}

fn full_stiffness() -> f32 {
    1.0
}

/// A spring between two layout entries, by layout index.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConstraintSpec {
    pub body_a: usize,
    pub body_b: usize,
    #[serde(default)]
    pub point_a: Vec2,
    #[serde(default)]
    pub point_b: Vec2,
    /// Rest length; the current anchor distance when absent.
    #[serde(default)]
    pub length: Option<f32>,
    #[serde(default = "full_stiffness")]
    pub stiffness: f32,
    #[serde(default)]
    pub damping: f32,
}

impl ConstraintSpec {
    pub fn new(body_a: usize, body_b: usize) -> Self {
        Self {
            body_a,
            body_b,
            point_a: Vec2::ZERO,
            point_b: Vec2::ZERO,
            length: None,
            stiffness: 1.0,
            damping: 0.0,
        }
    }

    pub fn with_length(mut self, length: f32) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_stiffness(mut self, stiffness: f32) -> Self {
        self.stiffness = stiffness;
        self
    }

    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_points(mut self, point_a: Vec2, point_b: Vec2) -> Self {
        self.point_a = point_a;
        self.point_b = point_b;
        self
    }
}

/// The parts of a level a setup function may rewrite.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct LevelPlan {
    pub layout: Vec<LayoutEntry>,
    pub constraints: Vec<ConstraintSpec>,
}

impl LevelPlan {
    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Procedural generator run once per transition, before instancing.
pub type LevelSetup = Rc<dyn Fn(&mut LevelPlan, &mut SceneRng)>;

/// A level: the templates it uses plus where to put them.
#[derive(Clone)]
pub struct Level {
    pub name: String,
    pub key: Vec<Rc<BlockTemplate>>,
    pub plan: LevelPlan,
    setup: Option<LevelSetup>,
}

impl Level {
    pub fn new(name: impl Into<String>, key: Vec<Rc<BlockTemplate>>) -> Self {
        Self {
            name: name.into(),
            key,
            plan: LevelPlan::default(),
            setup: None,
        }
    }

    pub fn with_plan(mut self, plan: LevelPlan) -> Self {
        self.plan = plan;
        self
    }

    pub fn with_layout(mut self, layout: Vec<LayoutEntry>) -> Self {
        self.plan.layout = layout;
        self
    }

    pub fn with_constraints(mut self, constraints: Vec<ConstraintSpec>) -> Self {
        self.plan.constraints = constraints;
        self
    }

    pub fn with_setup(mut self, setup: impl Fn(&mut LevelPlan, &mut SceneRng) + 'static) -> Self {
        self.setup = Some(Rc::new(setup));
        self
    }

    /// The plan to build this time: a copy of the static plan, run through
    /// the setup function when there is one. The level itself is untouched,
    /// so reloading it starts from the same static layout.
    pub fn plan_for(&self, rng: &mut SceneRng) -> LevelPlan {
        let mut plan = self.plan.clone();
        if let Some(setup) = &self.setup {
            setup(&mut plan, rng);
        }
        plan
    }
}

impl fmt::Debug for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Level")
            .field("name", &self.name)
            .field("key", &self.key.iter().map(|t| t.name.as_str()).collect::<Vec<_>>())
            .field("layout", &self.plan.layout.len())
            .field("constraints", &self.plan.constraints.len())
            .field("setup", &self.setup.is_some())
            .finish()
    }
}

/// What a transition actually built.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedLevel {
    pub name: String,
    /// The plan after setup ran.
    pub plan: LevelPlan,
    /// Body of each layout entry, aligned with `plan.layout`. `None` for
    /// entries whose block has no physics.
    pub data: Vec<Option<BodyId>>,
}

impl LoadedLevel {
    pub fn body(&self, entry: usize) -> Option<BodyId> {
        self.data.get(entry).copied().flatten()
    }

    pub fn body_count(&self) -> usize {
        self.data.iter().flatten().count()
    }
}

/// A complete replacement world.
pub struct BuiltLevel {
    pub physics: PhysicsWorld,
    pub links: LinkTable,
    pub level: LoadedLevel,
}

impl fmt::Debug for BuiltLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltLevel")
            .field("level", &self.level.name)
            .field("bodies", &self.physics.body_ids().len())
            .field("links", &self.links.len())
            .finish_non_exhaustive()
    }
}

/// Expand `level` into a fresh physics world and link table whose ids start
/// at `first_id`.
///
/// Every layout entry gets its own copy of its template. The block's
/// configure hook sees the entry's inputs before the body is built. Blocks
/// without physics are configured and then dropped. Any bad entry or
/// constraint aborts the whole build.
pub fn instantiate(
    level: &Level,
    settings: &PhysicsSettings,
    first_id: u32,
    rng: &mut SceneRng,
) -> Result<BuiltLevel, LevelError> {
    let plan = level.plan_for(rng);
    let mut physics = PhysicsWorld::with_first_id(*settings, first_id);
    let mut links = LinkTable::new();
    let mut data = Vec::with_capacity(plan.layout.len());

    for (index, entry) in plan.layout.iter().enumerate() {
        let template = level.key.get(entry.key).ok_or(LevelError::UnknownTemplate {
            entry: index,
            key: entry.key,
            available: level.key.len(),
        })?;

        let mut block = template.instantiate(entry.position());
        if let Some(hook) = block.hooks.inputs.clone() {
            hook.configure(entry.inputs.as_ref(), &mut block);
        }
        if block.data.physics.is_none() {
            data.push(None);
            continue;
        }

        let loaded = load_block(&mut physics, &block, &entry.options)
            .map_err(|source| LevelError::Shape { entry: index, source })?;
        block.offset = loaded.offset;
        links.insert(loaded.id, block);
        data.push(Some(loaded.id));
    }

    for (index, spec) in plan.constraints.iter().enumerate() {
        let endpoint = |entry: usize| match data.get(entry) {
            None => Err(LevelError::DanglingConstraint {
                constraint: index,
                entry,
                available: data.len(),
            }),
            Some(None) => Err(LevelError::BodylessEndpoint {
                constraint: index,
                entry,
            }),
            Some(Some(id)) => Ok(*id),
        };
        let body_a = endpoint(spec.body_a)?;
        let body_b = endpoint(spec.body_b)?;

        physics
            .create_constraint(&ConstraintDesc {
                body_a,
                body_b,
                point_a: spec.point_a,
                point_b: spec.point_b,
                length: spec.length,
                stiffness: spec.stiffness,
                damping: spec.damping,
            })
            .ok_or(LevelError::BodylessEndpoint {
                constraint: index,
                entry: spec.body_a,
            })?;
    }

    debug!(
        "level {}: {} layout entries, {} inert",
        level.name,
        plan.layout.len(),
        plan.layout.len() - links.len()
    );
    info!(
        "built level {} with {} bodies and {} constraints",
        level.name,
        links.len(),
        physics.constraints().len()
    );

    Ok(BuiltLevel {
        physics,
        links,
        level: LoadedLevel {
            name: level.name.clone(),
            plan,
            data,
        },
    })
}
