//! Lyon-backed [`Surface`] that tessellates fills and strokes into a flat
//! triangle buffer.
//!
//! The buffer is split into [`ClipBatch`]es. Each batch carries the scissor
//! rectangle that was active when its triangles were emitted, so the host can
//! draw every batch with one scissored draw call. A clip path is reduced to its
//! bounding box, which is exact for the rectangular viewport clip.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use log::warn;
use lyon::math::point;
use lyon::path::{FillRule, Path};
use lyon::tessellation::{
    BuffersBuilder, FillOptions, FillTessellator, FillVertex, FillVertexConstructor,
    StrokeOptions, StrokeTessellator, StrokeVertex, StrokeVertexConstructor, VertexBuffers,
};

use crate::components::color::Rgba;
use crate::core::physics::Bounds;
use crate::renderer::surface::Surface;

/// Per-vertex data: position then color. 6 floats = 24 bytes per vertex.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct VectorVertex {
    pub x: f32,
    pub y: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl VectorVertex {
    pub const FLOATS: usize = 6;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;
}

/// A run of vertices sharing one scissor rectangle.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct ClipBatch {
    pub first_vertex: u32,
    pub vertex_count: u32,
    /// 1 when the scissor rectangle applies, 0 for the full surface.
    pub clipped: u32,
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl ClipBatch {
    fn starting_at(first_vertex: u32, scissor: Option<Bounds>) -> Self {
        let rect = scissor.unwrap_or_default();
        Self {
            first_vertex,
            vertex_count: 0,
            clipped: scissor.is_some() as u32,
            min_x: rect.min.x,
            min_y: rect.min.y,
            max_x: rect.max.x,
            max_y: rect.max.y,
        }
    }

    pub fn scissor(&self) -> Option<Bounds> {
        (self.clipped != 0).then(|| {
            Bounds::new(Vec2::new(self.min_x, self.min_y), Vec2::new(self.max_x, self.max_y))
        })
    }
}

struct ColorCtor {
    color: Rgba,
}

impl ColorCtor {
    fn vertex(&self, at: lyon::math::Point) -> VectorVertex {
        VectorVertex {
            x: at.x,
            y: at.y,
            r: self.color.r,
            g: self.color.g,
            b: self.color.b,
            a: self.color.a,
        }
    }
}

impl FillVertexConstructor<VectorVertex> for ColorCtor {
    fn new_vertex(&mut self, vertex: FillVertex) -> VectorVertex {
        self.vertex(vertex.position())
    }
}

impl StrokeVertexConstructor<VectorVertex> for ColorCtor {
    fn new_vertex(&mut self, vertex: StrokeVertex) -> VectorVertex {
        self.vertex(vertex.position())
    }
}

#[derive(Debug, Clone, Default)]
struct SubPath {
    points: Vec<Vec2>,
    closed: bool,
}

/// Surface that tessellates into a CPU-side triangle list.
pub struct TessellatingSurface {
    fill_tess: FillTessellator,
    stroke_tess: StrokeTessellator,
    geometry: VertexBuffers<VectorVertex, u32>,
    buffer: Vec<f32>,
    path: Vec<SubPath>,
    scissor: Option<Bounds>,
    batches: Vec<ClipBatch>,
    rejected: usize,
}

impl TessellatingSurface {
    pub fn new() -> Self {
        Self {
            fill_tess: FillTessellator::new(),
            stroke_tess: StrokeTessellator::new(),
            geometry: VertexBuffers::new(),
            buffer: Vec::with_capacity(16384 * VectorVertex::FLOATS),
            path: Vec::new(),
            scissor: None,
            batches: vec![ClipBatch::starting_at(0, None)],
            rejected: 0,
        }
    }

    /// Drop last frame's triangles and clip state.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.path.clear();
        self.scissor = None;
        self.batches.clear();
        self.batches.push(ClipBatch::starting_at(0, None));
        self.rejected = 0;
    }

    /// Paths dropped since the last [`clear`](Self::clear) because they could
    /// not be tessellated.
    pub fn rejected_paths(&self) -> usize {
        self.rejected
    }

    pub fn vertex_count(&self) -> usize {
        self.buffer.len() / VectorVertex::FLOATS
    }

    pub fn vertices(&self) -> &[f32] {
        &self.buffer
    }

    /// Raw pointer to the flat float buffer, for the host to copy from.
    pub fn buffer_ptr(&self) -> *const f32 {
        self.buffer.as_ptr()
    }

    /// Batches in draw order. Empty batches are dropped.
    pub fn batches(&self) -> Vec<ClipBatch> {
        self.batches
            .iter()
            .filter(|b| b.vertex_count > 0)
            .copied()
            .collect()
    }

    fn start_batch(&mut self) {
        let first = self.vertex_count() as u32;
        match self.batches.last_mut() {
            Some(last) if last.vertex_count == 0 => {
                *last = ClipBatch::starting_at(first, self.scissor);
            }
            _ => self.batches.push(ClipBatch::starting_at(first, self.scissor)),
        }
    }

    fn build_path(&mut self, op: &str) -> Option<Path> {
        if self.path.iter().flat_map(|s| s.points.iter()).any(|p| !p.is_finite()) {
            warn!("{op} skipped: path has a non-finite point");
            self.rejected += 1;
            return None;
        }
        let mut builder = Path::builder();
        let mut any = false;
        for sub in &self.path {
            let Some(first) = sub.points.first() else {
                continue;
            };
            builder.begin(point(first.x, first.y));
            for p in &sub.points[1..] {
                builder.line_to(point(p.x, p.y));
            }
            builder.end(sub.closed);
            any = true;
        }
        any.then(|| builder.build())
    }

    fn flush_geometry(&mut self) {
        for idx in &self.geometry.indices {
            let v = &self.geometry.vertices[*idx as usize];
            self.buffer.extend_from_slice(&[v.x, v.y, v.r, v.g, v.b, v.a]);
        }
        let added = self.geometry.indices.len() as u32;
        if let Some(batch) = self.batches.last_mut() {
            batch.vertex_count += added;
        }
        self.geometry.vertices.clear();
        self.geometry.indices.clear();
    }

    fn finish<E: std::fmt::Debug>(&mut self, op: &str, result: Result<(), E>) {
        match result {
            Ok(()) => self.flush_geometry(),
            Err(err) => {
                warn!("{op} tessellation failed: {err:?}");
                self.rejected += 1;
                self.geometry.vertices.clear();
                self.geometry.indices.clear();
            }
        }
    }
}

impl Default for TessellatingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for TessellatingSurface {
    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, at: Vec2) {
        self.path.push(SubPath {
            points: vec![at],
            closed: false,
        });
    }

    fn line_to(&mut self, at: Vec2) {
        let restart = match self.path.last_mut() {
            Some(sub) if !sub.closed => {
                sub.points.push(at);
                return;
            }
            Some(sub) => sub.points.first().copied(),
            None => None,
        };
        // after a close, a new subpath starts where the closed one began
        self.path.push(SubPath {
            points: restart.into_iter().chain(Some(at)).collect(),
            closed: false,
        });
    }

    fn close_path(&mut self) {
        if let Some(sub) = self.path.last_mut() {
            sub.closed = true;
        }
    }

    fn fill(&mut self, color: Rgba) {
        let Some(path) = self.build_path("fill") else {
            return;
        };
        let options = FillOptions::tolerance(0.5).with_fill_rule(FillRule::NonZero);
        let result = self.fill_tess.tessellate_path(
            &path,
            &options,
            &mut BuffersBuilder::new(&mut self.geometry, ColorCtor { color }),
        );
        self.finish("fill", result);
    }

    fn stroke(&mut self, color: Rgba, width: f32) {
        if width.is_nan() || width <= 0.0 {
            return;
        }
        let Some(path) = self.build_path("stroke") else {
            return;
        };
        let result = self.stroke_tess.tessellate_path(
            &path,
            &StrokeOptions::tolerance(0.5).with_line_width(width),
            &mut BuffersBuilder::new(&mut self.geometry, ColorCtor { color }),
        );
        self.finish("stroke", result);
    }

    fn clip(&mut self) {
        let Some(bounds) = Bounds::from_points(self.path.iter().flat_map(|s| s.points.iter())) else {
            return;
        };
        let next = match self.scissor {
            Some(current) => Bounds::new(current.min.max(bounds.min), current.max.min(bounds.max)),
            None => bounds,
        };
        // an empty intersection clips everything
        self.scissor = Some(Bounds::new(next.min, next.max.max(next.min)));
        self.start_batch();
    }

    fn reset_clip(&mut self) {
        if self.scissor.take().is_some() {
            self.start_batch();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    fn polygon(surface: &mut TessellatingSurface, points: &[Vec2]) {
        surface.begin_path();
        surface.move_to(points[0]);
        for p in &points[1..] {
            surface.line_to(*p);
        }
        surface.close_path();
    }

    fn rect(min: Vec2, max: Vec2) -> [Vec2; 4] {
        [min, Vec2::new(max.x, min.y), max, Vec2::new(min.x, max.y)]
    }

    #[test]
    fn pod_layouts() {
        assert_eq!(size_of::<VectorVertex>(), VectorVertex::STRIDE_BYTES);
        assert_eq!(size_of::<ClipBatch>(), 28);
    }

    #[test]
    fn triangle_fill_is_three_vertices() {
        let mut surface = TessellatingSurface::new();
        polygon(&mut surface, &[Vec2::ZERO, Vec2::new(100.0, 0.0), Vec2::new(50.0, 100.0)]);
        surface.fill(Rgba::RED);
        assert_eq!(surface.vertex_count(), 3);
        assert_eq!(surface.vertices()[2..6], [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn non_finite_paths_are_rejected_and_counted() {
        let mut surface = TessellatingSurface::new();
        polygon(&mut surface, &[Vec2::ZERO, Vec2::new(f32::NAN, 0.0), Vec2::new(50.0, 100.0)]);
        surface.fill(Rgba::RED);
        surface.stroke(Rgba::RED, 2.0);
        assert_eq!(surface.vertex_count(), 0);
        assert_eq!(surface.rejected_paths(), 2);

        polygon(&mut surface, &[Vec2::ZERO, Vec2::new(100.0, 0.0), Vec2::new(50.0, 100.0)]);
        surface.fill(Rgba::RED);
        assert_eq!(surface.vertex_count(), 3);
        assert_eq!(surface.rejected_paths(), 2);

        surface.clear();
        assert_eq!(surface.rejected_paths(), 0);
    }

    #[test]
    fn rect_fill_is_two_triangles() {
        let mut surface = TessellatingSurface::new();
        polygon(&mut surface, &rect(Vec2::ZERO, Vec2::new(100.0, 50.0)));
        surface.fill(Rgba::WHITE);
        assert_eq!(surface.vertex_count(), 6);
    }

    #[test]
    fn stroke_produces_vertices_and_zero_width_does_not() {
        let mut surface = TessellatingSurface::new();
        surface.begin_path();
        surface.move_to(Vec2::ZERO);
        surface.line_to(Vec2::new(100.0, 100.0));
        surface.stroke(Rgba::WHITE, 0.0);
        assert_eq!(surface.vertex_count(), 0);
        surface.stroke(Rgba::WHITE, 5.0);
        assert!(surface.vertex_count() > 0);
    }

    #[test]
    fn empty_path_draws_nothing() {
        let mut surface = TessellatingSurface::new();
        surface.begin_path();
        surface.fill(Rgba::RED);
        surface.clip();
        assert_eq!(surface.vertex_count(), 0);
        assert!(surface.batches().is_empty());
    }

    #[test]
    fn clip_splits_batches_with_scissor() {
        let mut surface = TessellatingSurface::new();
        polygon(&mut surface, &rect(Vec2::ZERO, Vec2::splat(500.0)));
        surface.fill(Rgba::BLACK);

        polygon(&mut surface, &rect(Vec2::new(10.0, 20.0), Vec2::new(110.0, 220.0)));
        surface.clip();
        polygon(&mut surface, &rect(Vec2::ZERO, Vec2::splat(500.0)));
        surface.fill(Rgba::WHITE);

        let batches = surface.batches();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].scissor(), None);
        assert_eq!(batches[1].first_vertex, 6);
        assert_eq!(batches[1].vertex_count, 6);
        assert_eq!(
            batches[1].scissor(),
            Some(Bounds::new(Vec2::new(10.0, 20.0), Vec2::new(110.0, 220.0)))
        );
    }

    #[test]
    fn nested_clips_intersect_and_reset_clears() {
        let mut surface = TessellatingSurface::new();
        polygon(&mut surface, &rect(Vec2::ZERO, Vec2::splat(100.0)));
        surface.clip();
        polygon(&mut surface, &rect(Vec2::splat(50.0), Vec2::splat(200.0)));
        surface.clip();
        polygon(&mut surface, &rect(Vec2::ZERO, Vec2::splat(10.0)));
        surface.fill(Rgba::RED);
        surface.reset_clip();
        surface.fill(Rgba::GREEN);

        let batches = surface.batches();
        assert_eq!(batches.len(), 2);
        assert_eq!(
            batches[0].scissor(),
            Some(Bounds::new(Vec2::splat(50.0), Vec2::splat(100.0)))
        );
        assert_eq!(batches[1].scissor(), None);
    }

    #[test]
    fn clear_resets_everything() {
        let mut surface = TessellatingSurface::new();
        polygon(&mut surface, &rect(Vec2::ZERO, Vec2::ONE * 10.0));
        surface.clip();
        surface.fill(Rgba::RED);
        surface.clear();
        assert_eq!(surface.vertex_count(), 0);
        assert!(surface.batches().is_empty());
        polygon(&mut surface, &rect(Vec2::ZERO, Vec2::ONE * 10.0));
        surface.fill(Rgba::RED);
        assert_eq!(surface.batches()[0].scissor(), None);
    }
}
