use std::collections::{HashMap, HashSet};

use glam::Vec2;
use rapier2d::parry::query;
use rapier2d::prelude::*;
use serde::Deserialize;

use crate::api::types::BodyId;
use crate::core::links::OwnerChain;
use crate::error::ShapeError;

/// Step rate the content-level tuning numbers (air friction, constraint
/// stiffness) are expressed against.
pub const REFERENCE_HZ: f32 = 60.0;

// ---------------------------------------------------------------------------
// Conversion helpers (private): glam to nalgebra and back
// ---------------------------------------------------------------------------

fn vec2_to_na(v: Vec2) -> nalgebra::Vector2<f32> {
    nalgebra::Vector2::new(v.x, v.y)
}

fn na_to_vec2(v: &nalgebra::Vector2<f32>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

fn point_to_vec2(p: &nalgebra::Point2<f32>) -> Vec2 {
    Vec2::new(p.x, p.y)
}

fn part_isometry(body: &RigidBody, collider: &Collider) -> nalgebra::Isometry2<f32> {
    let local = collider
        .position_wrt_parent()
        .copied()
        .unwrap_or_else(nalgebra::Isometry2::identity);
    body.position() * local
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// World-level physics tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsSettings {
    /// Gravity in world units per second squared. Positive Y is down.
    pub gravity: Vec2,
    /// Length of one simulation step in seconds.
    pub dt: f32,
    /// World units per solver metre. Pixel-scale scenes want ~100.
    pub length_unit: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, 1000.0),
            dt: 1.0 / REFERENCE_HZ,
            length_unit: 100.0,
        }
    }
}

/// Per-body overrides a layout entry may carry.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct BodyOptions {
    pub is_static: bool,
    /// Fraction of velocity lost per reference step, linear and angular.
    pub air_friction: f32,
    pub friction: f32,
    pub restitution: f32,
    pub density: f32,
}

impl Default for BodyOptions {
    fn default() -> Self {
        Self {
            is_static: false,
            air_friction: 0.01,
            friction: 0.1,
            restitution: 0.0,
            density: 0.001,
        }
    }
}

impl BodyOptions {
    pub fn fixed() -> Self {
        Self {
            is_static: true,
            ..Self::default()
        }
    }

    pub fn with_air_friction(mut self, air_friction: f32) -> Self {
        self.air_friction = air_friction;
        self
    }
}

/// Axis-aligned bounds, also used for the per-corner bounds offset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Bounds of a point set. `None` when the set is empty.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec2>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        Some(iter.fold(Self::new(first, first), |b, p| Self {
            min: b.min.min(*p),
            max: b.max.max(*p),
        }))
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Corner-wise difference `self - other`.
    pub fn offset_from(self, other: Self) -> Self {
        Self {
            min: self.min - other.min,
            max: self.max - other.max,
        }
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }
}

/// One convex piece of a body, in world space.
#[derive(Debug, Clone, PartialEq)]
pub struct PartSnapshot {
    pub id: BodyId,
    pub vertices: Vec<Vec2>,
}

/// Read-only view of a body at the current pose.
#[derive(Debug, Clone, PartialEq)]
pub struct BodySnapshot {
    pub id: BodyId,
    /// Center of mass in world space.
    pub position: Vec2,
    /// Rotation in radians.
    pub angle: f32,
    pub bounds: Bounds,
    pub parts: Vec<PartSnapshot>,
    pub is_static: bool,
}

/// A narrow-phase hit between two parts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub part_a: BodyId,
    pub part_b: BodyId,
    /// Unit contact normal pointing from `part_a` toward `part_b`.
    pub normal: Vec2,
    /// Penetration depth, never negative.
    pub depth: f32,
}

impl Contact {
    pub fn penetration(&self) -> Vec2 {
        self.normal * self.depth
    }
}

/// Description of a spring constraint between two bodies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstraintDesc {
    pub body_a: BodyId,
    pub body_b: BodyId,
    /// Anchor relative to body A's center of mass, rotating with it.
    pub point_a: Vec2,
    pub point_b: Vec2,
    /// Rest length. `None` takes the current anchor distance.
    pub length: Option<f32>,
    /// Per-reference-step correction fraction, 0..=1.
    pub stiffness: f32,
    pub damping: f32,
}

/// A constraint living in the world.
#[derive(Debug, Clone, Copy)]
pub struct ConstraintRecord {
    pub body_a: BodyId,
    pub body_b: BodyId,
    pub point_a: Vec2,
    pub point_b: Vec2,
    pub length: f32,
    pub stiffness: f32,
    pub damping: f32,
}

#[derive(Debug, Clone)]
struct BodyRecord {
    handle: RigidBodyHandle,
    parts: Vec<BodyId>,
}

#[derive(Debug, Clone, Copy)]
struct PartRecord {
    handle: ColliderHandle,
    owner: BodyId,
}

// ---------------------------------------------------------------------------
// Polygon preparation
// ---------------------------------------------------------------------------

const POINT_EPSILON: f32 = 1e-6;

/// Drop repeated points and reject polygons the solver cannot use.
pub fn clean_polygon(vertices: &[Vec2]) -> Result<Vec<Vec2>, ShapeError> {
    if let Some(index) = vertices.iter().position(|p| !p.is_finite()) {
        return Err(ShapeError::NonFinite { index });
    }

    let mut points: Vec<Vec2> = Vec::with_capacity(vertices.len());
    for &p in vertices {
        if points
            .last()
            .map_or(true, |last| last.distance(p) > POINT_EPSILON)
        {
            points.push(p);
        }
    }
    while points.len() > 1 && points[0].distance(points[points.len() - 1]) <= POINT_EPSILON {
        points.pop();
    }

    if points.len() < 3 {
        return Err(ShapeError::TooFewPoints {
            count: points.len(),
        });
    }

    let extent = Bounds::from_points(&points)
        .map(|b| b.size().x * b.size().y)
        .unwrap_or(0.0);
    if extent <= 0.0 || signed_area(&points).abs() <= f32::EPSILON * extent {
        return Err(ShapeError::ZeroArea);
    }

    let n = points.len();
    for i in 0..n {
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            if segments_intersect(points[i], points[(i + 1) % n], points[j], points[(j + 1) % n]) {
                return Err(ShapeError::SelfIntersecting {
                    first: i,
                    second: j,
                });
            }
        }
    }

    Ok(points)
}

fn signed_area(points: &[Vec2]) -> f32 {
    let n = points.len();
    (0..n)
        .map(|i| points[i].perp_dot(points[(i + 1) % n]))
        .sum::<f32>()
        * 0.5
}

/// Area-weighted centroid of a simple polygon.
pub fn polygon_centroid(points: &[Vec2]) -> Vec2 {
    let n = points.len();
    let mut area = 0.0;
    let mut sum = Vec2::ZERO;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let cross = a.perp_dot(b);
        area += cross;
        sum += (a + b) * cross;
    }
    if area.abs() <= f32::EPSILON {
        return points.iter().copied().sum::<Vec2>() / n.max(1) as f32;
    }
    sum / (3.0 * area)
}

fn is_convex(points: &[Vec2]) -> bool {
    let n = points.len();
    let mut sign = 0.0f32;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let c = points[(i + 2) % n];
        let cross = (b - a).perp_dot(c - b);
        if cross.abs() <= POINT_EPSILON {
            continue;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
    }
    true
}

fn segments_intersect(p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2) -> bool {
    let orient = |a: Vec2, b: Vec2, c: Vec2| (b - a).perp_dot(c - a);
    let on_segment = |a: Vec2, b: Vec2, p: Vec2| {
        p.x >= a.x.min(b.x) - POINT_EPSILON
            && p.x <= a.x.max(b.x) + POINT_EPSILON
            && p.y >= a.y.min(b.y) - POINT_EPSILON
            && p.y <= a.y.max(b.y) + POINT_EPSILON
    };

    let d1 = orient(p3, p4, p1);
    let d2 = orient(p3, p4, p2);
    let d3 = orient(p1, p2, p3);
    let d4 = orient(p1, p2, p4);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1.abs() <= POINT_EPSILON && on_segment(p3, p4, p1))
        || (d2.abs() <= POINT_EPSILON && on_segment(p3, p4, p2))
        || (d3.abs() <= POINT_EPSILON && on_segment(p1, p2, p3))
        || (d4.abs() <= POINT_EPSILON && on_segment(p1, p2, p4))
}

/// Convex pieces for a centered polygon. Convex input stays one piece.
fn part_shapes(local: &[Vec2]) -> Result<Vec<(nalgebra::Isometry2<f32>, SharedShape)>, ShapeError> {
    let points: Vec<nalgebra::Point2<f32>> = local
        .iter()
        .map(|p| nalgebra::Point2::new(p.x, p.y))
        .collect();

    if is_convex(local) {
        let hull = SharedShape::convex_hull(&points).ok_or(ShapeError::ZeroArea)?;
        return Ok(vec![(nalgebra::Isometry2::identity(), hull)]);
    }

    let n = points.len() as u32;
    let indices: Vec<[u32; 2]> = (0..n).map(|i| [i, (i + 1) % n]).collect();
    let decomposed = SharedShape::convex_decomposition(&points, &indices);

    let parts: Vec<_> = match decomposed.as_compound() {
        Some(compound) => compound
            .shapes()
            .iter()
            .filter(|(_, shape)| shape.as_convex_polygon().is_some())
            .cloned()
            .collect(),
        None if decomposed.as_convex_polygon().is_some() => {
            vec![(nalgebra::Isometry2::identity(), decomposed.clone())]
        }
        None => Vec::new(),
    };

    if parts.is_empty() {
        Err(ShapeError::NoParts)
    } else {
        Ok(parts)
    }
}

// ---------------------------------------------------------------------------
// PhysicsWorld
// ---------------------------------------------------------------------------

/// Wraps the Rapier2D sets and pipeline behind the calls the scene needs.
///
/// Every body gets a [`BodyId`]; every convex part of a body gets its own id
/// whose parent is the body. Bodies are listed in creation order.
pub struct PhysicsWorld {
    gravity: nalgebra::Vector2<f32>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    order: Vec<BodyId>,
    records: HashMap<BodyId, BodyRecord>,
    parts: HashMap<BodyId, PartRecord>,
    constraints: Vec<ConstraintRecord>,
    next_id: u32,
}

impl PhysicsWorld {
    pub fn new(settings: PhysicsSettings) -> Self {
        Self::with_first_id(settings, 1)
    }

    /// A world whose ids start at `first_id`, so ids from a world it
    /// replaces are never handed out again.
    pub fn with_first_id(settings: PhysicsSettings, first_id: u32) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = settings.dt;
        integration_parameters.length_unit = settings.length_unit;
        Self {
            gravity: vec2_to_na(settings.gravity),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            order: Vec::new(),
            records: HashMap::new(),
            parts: HashMap::new(),
            constraints: Vec::new(),
            next_id: first_id.max(1),
        }
    }

    /// The id the next body or part will get.
    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    fn allocate_id(&mut self) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        id
    }

    fn rigid_body(&self, id: BodyId) -> Option<&RigidBody> {
        self.bodies.get(self.records.get(&id)?.handle)
    }

    fn rigid_body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        let handle = self.records.get(&id)?.handle;
        self.bodies.get_mut(handle)
    }

    /// Build a body from a polygon.
    ///
    /// The polygon is re-centered on its area-weighted centroid and that
    /// centroid is placed at `position`, so the resulting bounds are shifted
    /// relative to the raw vertices. Concave polygons are split into convex
    /// parts.
    pub fn create_polygon_body(
        &mut self,
        position: Vec2,
        vertices: &[Vec2],
        options: &BodyOptions,
    ) -> Result<BodyId, ShapeError> {
        let points = clean_polygon(vertices)?;
        let centroid = polygon_centroid(&points);
        let local: Vec<Vec2> = points.iter().map(|p| *p - centroid).collect();
        let shapes = part_shapes(&local)?;

        let id = self.allocate_id();
        let body_type = if options.is_static {
            RigidBodyType::Fixed
        } else {
            RigidBodyType::Dynamic
        };
        let damping = options.air_friction.max(0.0) * REFERENCE_HZ;
        let rb = RigidBodyBuilder::new(body_type)
            .translation(vec2_to_na(position))
            .linear_damping(damping)
            .angular_damping(damping)
            .user_data(id.0 as u128)
            .build();
        let handle = self.bodies.insert(rb);

        let mut part_ids = Vec::with_capacity(shapes.len());
        for (iso, shape) in shapes {
            let part = self.allocate_id();
            let collider = ColliderBuilder::new(shape)
                .position(iso)
                .density(options.density)
                .friction(options.friction)
                .restitution(options.restitution)
                .user_data(part.0 as u128)
                .build();
            let collider_handle =
                self.colliders
                    .insert_with_parent(collider, handle, &mut self.bodies);
            self.parts.insert(
                part,
                PartRecord {
                    handle: collider_handle,
                    owner: id,
                },
            );
            part_ids.push(part);
        }

        self.records.insert(
            id,
            BodyRecord {
                handle,
                parts: part_ids,
            },
        );
        self.order.push(id);
        Ok(id)
    }

    /// Teleport a body's center of mass.
    pub fn set_position(&mut self, id: BodyId, position: Vec2) {
        if let Some(rb) = self.rigid_body_mut(id) {
            rb.set_translation(vec2_to_na(position), true);
        }
    }

    /// Rotate a body about its center of mass by `radians`.
    pub fn rotate(&mut self, id: BodyId, radians: f32) {
        if let Some(rb) = self.rigid_body_mut(id) {
            let angle = rb.rotation().angle() + radians;
            rb.set_rotation(nalgebra::UnitComplex::new(angle), true);
        }
    }

    /// Apply a force for the next step only.
    pub fn apply_force(&mut self, id: BodyId, force: Vec2) {
        if let Some(rb) = self.rigid_body_mut(id) {
            rb.add_force(vec2_to_na(force), true);
        }
    }

    /// Angular velocity in radians per second.
    pub fn set_angular_velocity(&mut self, id: BodyId, velocity: f32) {
        if let Some(rb) = self.rigid_body_mut(id) {
            rb.set_angvel(velocity, true);
        }
    }

    pub fn angular_velocity(&self, id: BodyId) -> f32 {
        self.rigid_body(id).map(|rb| rb.angvel()).unwrap_or(0.0)
    }

    pub fn velocity(&self, id: BodyId) -> Vec2 {
        self.rigid_body(id)
            .map(|rb| na_to_vec2(rb.linvel()))
            .unwrap_or(Vec2::ZERO)
    }

    pub fn is_static(&self, id: BodyId) -> bool {
        self.rigid_body(id).map(|rb| rb.is_fixed()).unwrap_or(false)
    }

    /// Center of mass and rotation of a body.
    pub fn body_pose(&self, id: BodyId) -> Option<(Vec2, f32)> {
        self.rigid_body(id)
            .map(|rb| (na_to_vec2(rb.translation()), rb.rotation().angle()))
    }

    /// Snapshot of one body; `None` for unknown ids and part ids.
    pub fn body(&self, id: BodyId) -> Option<BodySnapshot> {
        let record = self.records.get(&id)?;
        let rb = self.bodies.get(record.handle)?;

        let mut parts = Vec::with_capacity(record.parts.len());
        for part in &record.parts {
            let Some(collider) = self
                .parts
                .get(part)
                .and_then(|p| self.colliders.get(p.handle))
            else {
                continue;
            };
            let iso = part_isometry(rb, collider);
            let vertices = collider
                .shape()
                .as_convex_polygon()
                .map(|poly| poly.points().iter().map(|p| point_to_vec2(&(iso * p))).collect())
                .unwrap_or_default();
            parts.push(PartSnapshot {
                id: *part,
                vertices,
            });
        }

        let position = na_to_vec2(rb.translation());
        let bounds = parts
            .iter()
            .filter_map(|p| Bounds::from_points(&p.vertices))
            .reduce(Bounds::union)
            .unwrap_or(Bounds::new(position, position));

        Some(BodySnapshot {
            id,
            position,
            angle: rb.rotation().angle(),
            bounds,
            parts,
            is_static: rb.is_fixed(),
        })
    }

    /// Every body in creation order.
    pub fn bodies(&self) -> Vec<BodySnapshot> {
        self.order.iter().filter_map(|id| self.body(*id)).collect()
    }

    pub fn body_ids(&self) -> &[BodyId] {
        &self.order
    }

    pub fn body_count(&self) -> usize {
        self.order.len()
    }

    /// Part ids of a body, in construction order.
    pub fn parts_of(&self, id: BodyId) -> &[BodyId] {
        self.records
            .get(&id)
            .map(|r| r.parts.as_slice())
            .unwrap_or(&[])
    }

    /// World position of a point given relative to a body's center of mass.
    pub fn world_anchor(&self, id: BodyId, local: Vec2) -> Option<Vec2> {
        let rb = self.rigid_body(id)?;
        Some(point_to_vec2(
            &(rb.position() * nalgebra::Point2::new(local.x, local.y)),
        ))
    }

    // -- Constraints --

    /// Link two bodies with a spring. `None` if either body is unknown.
    pub fn create_constraint(&mut self, desc: &ConstraintDesc) -> Option<usize> {
        let handle_a = self.records.get(&desc.body_a)?.handle;
        let handle_b = self.records.get(&desc.body_b)?.handle;
        let anchor_a = self.world_anchor(desc.body_a, desc.point_a)?;
        let anchor_b = self.world_anchor(desc.body_b, desc.point_b)?;
        let length = desc
            .length
            .unwrap_or_else(|| anchor_a.distance(anchor_b))
            .max(0.0);

        let stiffness = desc.stiffness.max(0.0) * REFERENCE_HZ * REFERENCE_HZ;
        let damping = desc.damping.max(0.0) * REFERENCE_HZ;
        let joint = SpringJointBuilder::new(length, stiffness, damping)
            .spring_model(MotorModel::AccelerationBased)
            .local_anchor1(nalgebra::Point2::new(desc.point_a.x, desc.point_a.y))
            .local_anchor2(nalgebra::Point2::new(desc.point_b.x, desc.point_b.y))
            .build();
        self.impulse_joints.insert(handle_a, handle_b, joint, true);

        self.constraints.push(ConstraintRecord {
            body_a: desc.body_a,
            body_b: desc.body_b,
            point_a: desc.point_a,
            point_b: desc.point_b,
            length,
            stiffness: desc.stiffness,
            damping: desc.damping,
        });
        Some(self.constraints.len() - 1)
    }

    pub fn constraints(&self) -> &[ConstraintRecord] {
        &self.constraints
    }

    /// Current world positions of a constraint's two anchors.
    pub fn constraint_anchors(&self, record: &ConstraintRecord) -> Option<(Vec2, Vec2)> {
        Some((
            self.world_anchor(record.body_a, record.point_a)?,
            self.world_anchor(record.body_b, record.point_b)?,
        ))
    }

    // -- Queries --

    /// Narrow-phase contacts among the parts of the given bodies.
    ///
    /// Candidate part pairs come from a sort-and-sweep over part bounds.
    /// Parts of the same body never collide with each other, and two static
    /// bodies are never tested.
    pub fn detect_collisions(&self, ids: &[BodyId]) -> Vec<Contact> {
        struct Candidate<'a> {
            part: BodyId,
            owner: BodyId,
            fixed: bool,
            iso: nalgebra::Isometry2<f32>,
            shape: &'a dyn Shape,
            min: Vec2,
            max: Vec2,
        }

        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        for &id in ids {
            if !seen.insert(id) {
                continue;
            }
            let Some(record) = self.records.get(&id) else {
                continue;
            };
            let Some(rb) = self.bodies.get(record.handle) else {
                continue;
            };
            for &part in &record.parts {
                let Some(collider) = self
                    .parts
                    .get(&part)
                    .and_then(|p| self.colliders.get(p.handle))
                else {
                    continue;
                };
                let iso = part_isometry(rb, collider);
                let aabb = collider.shape().compute_aabb(&iso);
                candidates.push(Candidate {
                    part,
                    owner: id,
                    fixed: rb.is_fixed(),
                    iso,
                    shape: collider.shape(),
                    min: point_to_vec2(&aabb.mins),
                    max: point_to_vec2(&aabb.maxs),
                });
            }
        }

        candidates.sort_by(|a, b| a.min.x.total_cmp(&b.min.x));

        let mut contacts = Vec::new();
        for i in 0..candidates.len() {
            let a = &candidates[i];
            for b in &candidates[i + 1..] {
                if b.min.x > a.max.x {
                    break;
                }
                if a.owner == b.owner || (a.fixed && b.fixed) {
                    continue;
                }
                if b.min.y > a.max.y || a.min.y > b.max.y {
                    continue;
                }
                if let Ok(Some(hit)) = query::contact(&a.iso, a.shape, &b.iso, b.shape, 0.0) {
                    contacts.push(Contact {
                        part_a: a.part,
                        part_b: b.part,
                        normal: Vec2::new(hit.normal1.x, hit.normal1.y),
                        depth: (-hit.dist).max(0.0),
                    });
                }
            }
        }
        contacts
    }

    // -- Simulation --

    /// Advance the simulation by `dt` seconds. Forces applied before the
    /// step are consumed by it.
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );

        for (_, rb) in self.bodies.iter_mut() {
            rb.reset_forces(false);
            rb.reset_torques(false);
        }
    }
}

impl OwnerChain for PhysicsWorld {
    fn parent_of(&self, id: BodyId) -> Option<BodyId> {
        self.parts.get(&id).map(|p| p.owner)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
