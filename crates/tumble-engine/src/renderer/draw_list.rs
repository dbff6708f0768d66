use std::collections::BTreeMap;

use glam::Vec2;

use crate::components::color::Rgba;

/// Stage holding the surface background, viewport clip and viewport fill.
pub const BACKGROUND_STAGE: i32 = 0;
/// Stage holding block artwork and debug geometry.
pub const WORLD_STAGE: i32 = 5;

/// Which space a path point lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    /// World coordinates; mapped through the camera.
    #[default]
    World,
    /// Already in surface coordinates; drawn as-is.
    Surface,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathPoint {
    pub at: Vec2,
    pub anchor: Anchor,
}

impl PathPoint {
    pub fn world(at: Vec2) -> Self {
        Self {
            at,
            anchor: Anchor::World,
        }
    }

    pub fn surface(at: Vec2) -> Self {
        Self {
            at,
            anchor: Anchor::Surface,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathOp {
    MoveTo(PathPoint),
    LineTo(PathPoint),
    Close,
}

impl PathOp {
    pub fn point(&self) -> Option<&PathPoint> {
        match self {
            PathOp::MoveTo(p) | PathOp::LineTo(p) => Some(p),
            PathOp::Close => None,
        }
    }
}

/// Closed world-space polygon.
pub fn closed_path(points: impl IntoIterator<Item = Vec2>) -> Vec<PathOp> {
    let mut path = open_path(points);
    if !path.is_empty() {
        path.push(PathOp::Close);
    }
    path
}

/// Open world-space polyline.
pub fn open_path(points: impl IntoIterator<Item = Vec2>) -> Vec<PathOp> {
    points
        .into_iter()
        .enumerate()
        .map(|(i, p)| {
            let point = PathPoint::world(p);
            if i == 0 {
                PathOp::MoveTo(point)
            } else {
                PathOp::LineTo(point)
            }
        })
        .collect()
}

/// Axis-aligned rectangle with every corner in the given space.
pub fn rect_path(min: Vec2, max: Vec2, anchor: Anchor) -> Vec<PathOp> {
    let corner = |x: f32, y: f32| PathPoint {
        at: Vec2::new(x, y),
        anchor,
    };
    vec![
        PathOp::MoveTo(corner(min.x, min.y)),
        PathOp::LineTo(corner(max.x, min.y)),
        PathOp::LineTo(corner(max.x, max.y)),
        PathOp::LineTo(corner(min.x, max.y)),
        PathOp::Close,
    ]
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawMode {
    Fill(Rgba),
    /// `width` is in world units.
    Outline { color: Rgba, width: f32 },
    /// Restrict later drawing to the path, until the next clip reset.
    Clip,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub mode: DrawMode,
    pub path: Vec<PathOp>,
}

impl DrawItem {
    pub fn fill(color: Rgba, path: Vec<PathOp>) -> Self {
        Self {
            mode: DrawMode::Fill(color),
            path,
        }
    }

    pub fn outline(color: Rgba, width: f32, path: Vec<PathOp>) -> Self {
        Self {
            mode: DrawMode::Outline { color, width },
            path,
        }
    }

    pub fn clip(path: Vec<PathOp>) -> Self {
        Self {
            mode: DrawMode::Clip,
            path,
        }
    }

    pub fn color(&self) -> Option<Rgba> {
        match self.mode {
            DrawMode::Fill(color) | DrawMode::Outline { color, .. } => Some(color),
            DrawMode::Clip => None,
        }
    }

    pub fn has_world_points(&self) -> bool {
        self.path
            .iter()
            .filter_map(PathOp::point)
            .any(|p| p.anchor == Anchor::World)
    }
}

/// Per-frame draw items bucketed by stage.
///
/// Stages draw in ascending numeric order; items within a stage draw in
/// insertion order.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    stages: BTreeMap<i32, Vec<DrawItem>>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stage: i32, item: DrawItem) {
        self.stages.entry(stage).or_default().push(item);
    }

    /// Insert items ahead of everything already in `stage`, keeping their order.
    pub fn prepend(&mut self, stage: i32, items: impl IntoIterator<Item = DrawItem>) {
        let bucket = self.stages.entry(stage).or_default();
        let existing = std::mem::take(bucket);
        bucket.extend(items);
        bucket.extend(existing);
    }

    pub fn clear(&mut self) {
        self.stages.clear();
    }

    pub fn stage(&self, stage: i32) -> &[DrawItem] {
        self.stages.get(&stage).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn stages(&self) -> impl Iterator<Item = i32> + '_ {
        self.stages.keys().copied()
    }

    /// Every item in draw order, with its stage.
    pub fn iter(&self) -> impl Iterator<Item = (i32, &DrawItem)> {
        self.stages
            .iter()
            .flat_map(|(stage, items)| items.iter().map(move |item| (*stage, item)))
    }

    pub fn len(&self) -> usize {
        self.stages.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn tagged(tag: f32) -> DrawItem {
        DrawItem::fill(Rgba::rgb(tag, 0.0, 0.0), closed_path([Vec2::ZERO]))
    }

    #[test]
    fn stages_draw_in_numeric_order() {
        let mut list = DrawList::new();
        list.push(0, tagged(0.0));
        list.push(5, tagged(5.0));
        list.push(2, tagged(2.0));
        list.push(10, tagged(10.0));

        let order: Vec<i32> = list.iter().map(|(stage, _)| stage).collect();
        assert_eq!(order, vec![0, 2, 5, 10]);
    }

    #[test]
    fn prepend_goes_first_in_its_stage() {
        let mut list = DrawList::new();
        list.push(0, tagged(0.3));
        list.prepend(0, [tagged(0.1), tagged(0.2)]);
        let reds: Vec<f32> = list.stage(0).iter().filter_map(|i| i.color()).map(|c| c.r).collect();
        assert_eq!(reds, vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn clear_empties_every_stage() {
        let mut list = DrawList::new();
        list.push(WORLD_STAGE, tagged(1.0));
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.stages().count(), 0);
    }

    #[test]
    fn path_helpers() {
        let closed = closed_path([Vec2::ZERO, Vec2::X, Vec2::Y]);
        assert_eq!(closed.len(), 4);
        assert!(matches!(closed[0], PathOp::MoveTo(_)));
        assert_eq!(closed[3], PathOp::Close);
        assert!(closed_path(std::iter::empty()).is_empty());

        let rect = DrawItem::fill(Rgba::BLACK, rect_path(Vec2::ZERO, Vec2::ONE, Anchor::Surface));
        assert!(!rect.has_world_points());
        assert!(DrawItem::clip(open_path([Vec2::ZERO])).has_world_points());
    }

    proptest! {
        #[test]
        fn insertion_order_survives_within_each_stage(
            stages in prop::collection::vec(prop_oneof![Just(0i32), Just(2), Just(5)], 1..60)
        ) {
            let mut list = DrawList::new();
            for (seq, stage) in stages.iter().enumerate() {
                list.push(*stage, tagged(seq as f32));
            }

            let drawn: Vec<(i32, f32)> = list
                .iter()
                .map(|(stage, item)| (stage, item.color().map(|c| c.r).unwrap_or(-1.0)))
                .collect();
            prop_assert_eq!(drawn.len(), stages.len());

            for pair in drawn.windows(2) {
                let (s0, seq0) = pair[0];
                let (s1, seq1) = pair[1];
                prop_assert!(s0 <= s1, "stage {} drawn before {}", s0, s1);
                if s0 == s1 {
                    prop_assert!(seq0 < seq1, "stage {} reordered {} after {}", s0, seq1, seq0);
                }
            }
        }
    }
}
