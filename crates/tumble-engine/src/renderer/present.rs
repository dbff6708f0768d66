//! Turns the staged draw list into surface calls.

use std::f64::consts::PI;

use glam::Vec2;
use rand::Rng;

use crate::api::types::SceneRng;
use crate::components::color::Rgba;
use crate::renderer::camera::CameraController;
use crate::renderer::draw_list::{
    rect_path, Anchor, DrawItem, DrawList, DrawMode, PathOp, PathPoint, BACKGROUND_STAGE,
};
use crate::renderer::surface::Surface;
use crate::renderer::transform::{SurfaceGeometry, SurfaceTransform};

/// Color outside the viewport.
pub const SURFACE_BACKGROUND: Rgba = Rgba::rgb(15.0 / 255.0, 15.0 / 255.0, 15.0 / 255.0);
/// Color of the viewport itself.
pub const VIEWPORT_BACKGROUND: Rgba = Rgba::rgb(30.0 / 255.0, 30.0 / 255.0, 30.0 / 255.0);

/// Odds that a session starts in chaos mode.
pub const CHAOS_ODDS: f64 = 1e-6;
/// Chance per point and axis of a jitter jump.
pub const CHAOS_JITTER_CHANCE: f64 = 0.01;
/// Size of a jitter jump in viewport units.
pub const CHAOS_JITTER: f32 = 50.0;

/// Session-long visual corruption: world geometry spins about a wandering
/// center, points jump at random, colors invert and pulse, clipping is off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Chaos {
    enabled: bool,
}

impl Chaos {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Decide once for the whole session.
    pub fn roll(rng: &mut SceneRng) -> Self {
        Self::new(rng.random::<f64>() < CHAOS_ODDS)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Center of rotation at `time_ms`, in viewport units. Sits near 500 and
    /// flicks out by 1000 only when the slow sine nears its peaks.
    pub fn center(time_ms: f64) -> Vec2 {
        let sharp = |s: f64| s.signum() * s.abs().powi(1000) * 1000.0;
        let phase = time_ms / 10_000.0;
        Vec2::new(
            (500.0 + sharp(phase.sin())) as f32,
            (500.0 + sharp(phase.cos())) as f32,
        )
    }

    /// Rotation angle at `time_ms`, in radians.
    pub fn angle(time_ms: f64) -> f32 {
        (PI / 360.0 * ((time_ms / 1000.0).cos() * 360.0 + (time_ms / 2500.0).sin() * 360.0)) as f32
    }

    /// Alpha applied to every inverted color at `time_ms`, clamped to 0..=1.
    pub fn alpha(time_ms: f64) -> f32 {
        let period = (time_ms / 10_000.0).cos().powi(2) * 10_000.0;
        let pulse = if period.abs() > f64::EPSILON {
            (time_ms / period).sin().abs()
        } else {
            0.0
        };
        (1.0 - pulse + 0.1).clamp(0.0, 1.0) as f32
    }

    /// Distort a viewport-relative point.
    pub fn distort(local: Vec2, time_ms: f64, rng: &mut SceneRng) -> Vec2 {
        let center = Self::center(time_ms);
        let (sin, cos) = Self::angle(time_ms).sin_cos();
        let d = local - center;
        let mut out = Vec2::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos) + center;
        out.x += Self::jitter(rng);
        out.y += Self::jitter(rng);
        out
    }

    fn jitter(rng: &mut SceneRng) -> f32 {
        if rng.random::<f64>() < CHAOS_JITTER_CHANCE {
            if rng.random::<bool>() {
                CHAOS_JITTER
            } else {
                -CHAOS_JITTER
            }
        } else {
            0.0
        }
    }

    fn recolor(color: Rgba, time_ms: f64) -> Rgba {
        color.inverted().with_alpha(Self::alpha(time_ms))
    }
}

/// What one presentation pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PresentStats {
    pub items: usize,
    pub clips_applied: usize,
}

/// Background items for stage 0: the whole surface, the viewport clip and
/// the viewport fill, in that order.
pub fn background_items(geometry: &SurfaceGeometry, camera: &CameraController) -> [DrawItem; 3] {
    let view = camera.viewport();
    [
        DrawItem::fill(
            SURFACE_BACKGROUND,
            rect_path(Vec2::ZERO, geometry.size(), Anchor::Surface),
        ),
        DrawItem::clip(rect_path(view.min, view.max, Anchor::World)),
        DrawItem::fill(VIEWPORT_BACKGROUND, rect_path(view.min, view.max, Anchor::World)),
    ]
}

/// Draw the frame.
///
/// Prepends the background items to stage 0, then walks every stage in
/// order. Outside chaos mode the clip region is reset first so the viewport
/// clip of the previous frame does not stack.
pub fn present(
    draw_list: &mut DrawList,
    camera: &CameraController,
    geometry: &SurfaceGeometry,
    chaos: Chaos,
    time_ms: f64,
    rng: &mut SceneRng,
    surface: &mut dyn Surface,
) -> PresentStats {
    if !chaos.is_enabled() {
        surface.reset_clip();
    }
    draw_list.prepend(BACKGROUND_STAGE, background_items(geometry, camera));

    let transform = SurfaceTransform::new(geometry, camera.origin, camera.size);
    let mut stats = PresentStats::default();

    for (_, item) in draw_list.iter() {
        let corrupt = chaos.is_enabled() && item.has_world_points();
        let mut map = |p: &PathPoint| match p.anchor {
            Anchor::Surface => p.at,
            Anchor::World => {
                let local = transform.to_viewport(p.at);
                let local = if corrupt {
                    Chaos::distort(local, time_ms, rng)
                } else {
                    local
                };
                transform.viewport_to_surface(local)
            }
        };

        surface.begin_path();
        for op in &item.path {
            match op {
                PathOp::MoveTo(p) => surface.move_to(map(p)),
                PathOp::LineTo(p) => surface.line_to(map(p)),
                PathOp::Close => surface.close_path(),
            }
        }

        let tint = |color: Rgba| {
            if corrupt {
                Chaos::recolor(color, time_ms)
            } else {
                color
            }
        };
        match item.mode {
            DrawMode::Fill(color) => surface.fill(tint(color)),
            DrawMode::Outline { color, width } => {
                surface.stroke(tint(color), width * transform.stroke_scale())
            }
            DrawMode::Clip => {
                if !chaos.is_enabled() {
                    surface.clip();
                    stats.clips_applied += 1;
                }
            }
        }
        stats.items += 1;
    }
    stats
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::renderer::camera::FollowMode;
    use crate::renderer::draw_list::{closed_path, WORLD_STAGE};
    use crate::renderer::surface::{CommandRecorder, SurfaceCommand};

    fn setup() -> (CameraController, SurfaceGeometry, SceneRng) {
        let mut camera = CameraController::new(1000.0, FollowMode::Snap);
        camera.origin = Vec2::new(100.0, 200.0);
        (camera, SurfaceGeometry::new(500.0, 500.0, true), SceneRng::seed_from_u64(1))
    }

    #[test]
    fn background_then_world_items() {
        let (camera, geometry, mut rng) = setup();
        let mut list = DrawList::new();
        list.push(WORLD_STAGE, DrawItem::fill(Rgba::RED, closed_path([Vec2::ZERO, Vec2::X, Vec2::Y])));
        list.push(BACKGROUND_STAGE, DrawItem::fill(Rgba::GREEN, closed_path([Vec2::ZERO, Vec2::X, Vec2::Y])));

        let mut surface = CommandRecorder::new();
        let stats = present(&mut list, &camera, &geometry, Chaos::default(), 0.0, &mut rng, &mut surface);

        assert_eq!(stats.items, 5);
        assert_eq!(stats.clips_applied, 1);
        assert_eq!(surface.commands()[0], SurfaceCommand::ResetClip);
        assert_eq!(
            surface.fills(),
            vec![SURFACE_BACKGROUND, VIEWPORT_BACKGROUND, Rgba::GREEN, Rgba::RED]
        );
    }

    #[test]
    fn surface_points_skip_the_camera() {
        let (camera, geometry, mut rng) = setup();
        let mut list = DrawList::new();
        let mut surface = CommandRecorder::new();
        present(&mut list, &camera, &geometry, Chaos::default(), 0.0, &mut rng, &mut surface);

        // first path is the surface-anchored backdrop
        assert_eq!(surface.commands()[1], SurfaceCommand::BeginPath);
        assert_eq!(surface.commands()[2], SurfaceCommand::MoveTo(Vec2::ZERO));
        assert_eq!(surface.commands()[4], SurfaceCommand::LineTo(Vec2::new(500.0, 500.0)));
    }

    #[test]
    fn world_points_map_through_the_viewport() {
        let (camera, geometry, mut rng) = setup();
        let mut list = DrawList::new();
        list.push(
            WORLD_STAGE,
            DrawItem::outline(Rgba::WHITE, 4.0, closed_path([Vec2::new(600.0, 700.0)])),
        );
        let mut surface = CommandRecorder::new();
        present(&mut list, &camera, &geometry, Chaos::default(), 0.0, &mut rng, &mut surface);

        let tail = &surface.commands()[surface.commands().len() - 4..];
        assert_eq!(tail[1], SurfaceCommand::MoveTo(Vec2::new(250.0, 250.0)));
        assert_eq!(
            tail[3],
            SurfaceCommand::Stroke {
                color: Rgba::WHITE,
                width: 2.0
            }
        );
    }

    #[test]
    fn chaos_skips_clipping_and_inverts_world_colors_once() {
        let (camera, geometry, mut rng) = setup();
        let mut list = DrawList::new();
        let color = Rgba::new(0.2, 0.4, 0.6, 1.0);
        list.push(
            WORLD_STAGE,
            DrawItem::fill(color, closed_path([Vec2::ZERO, Vec2::X, Vec2::Y, Vec2::ONE])),
        );
        let mut surface = CommandRecorder::new();
        let stats = present(&mut list, &camera, &geometry, Chaos::new(true), 1234.0, &mut rng, &mut surface);

        assert_eq!(stats.clips_applied, 0);
        assert_eq!(surface.count(|c| matches!(c, SurfaceCommand::Clip | SurfaceCommand::ResetClip)), 0);

        let fills = surface.fills();
        // the surface backdrop is anchored, so it keeps its color
        assert_eq!(fills[0], SURFACE_BACKGROUND);
        let inverted = fills[2];
        let expected = color.inverted();
        assert!((inverted.r - expected.r).abs() < 1e-6);
        assert!((inverted.b - expected.b).abs() < 1e-6);
        assert_eq!(inverted.a, Chaos::alpha(1234.0));
    }

    #[test]
    fn chaos_functions_stay_finite() {
        for t in [0.0, 1.0, 5_000.0, 15_707.963, 1.0e9] {
            assert!(Chaos::center(t).is_finite());
            assert!(Chaos::angle(t).is_finite());
            let a = Chaos::alpha(t);
            assert!((0.0..=1.0).contains(&a), "alpha {a} at {t}");
        }
        // cos(t / 10000) == 0 would divide by zero
        let a = Chaos::alpha(10_000.0 * std::f64::consts::FRAC_PI_2);
        assert!(a.is_finite());
    }

    #[test]
    fn chaos_center_rests_near_500() {
        let c = Chaos::center(5_000.0);
        assert!((c.x - 500.0).abs() < 1e-3);
        assert!((c.y - 500.0).abs() < 1e-3);
    }

    #[test]
    fn chaos_is_rare() {
        let mut rng = SceneRng::seed_from_u64(99);
        let hits = (0..10_000).filter(|_| Chaos::roll(&mut rng).is_enabled()).count();
        assert!(hits <= 1);
    }
}
