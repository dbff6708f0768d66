use glam::Vec2;

/// Size of the drawing surface and how the square viewport is fitted to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceGeometry {
    pub width: f32,
    pub height: f32,
    /// Stretch the viewport to cover the whole surface. Otherwise it is kept
    /// square and centered.
    pub fill: bool,
}

impl SurfaceGeometry {
    pub fn new(width: f32, height: f32, fill: bool) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
            fill,
        }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Surface pixels covered by the viewport on each axis.
    pub fn edges(&self) -> Vec2 {
        if self.fill {
            self.size()
        } else {
            Vec2::splat(self.width.min(self.height))
        }
    }

    /// Top-left corner of the viewport on the surface.
    pub fn offset(&self) -> Vec2 {
        (self.size() - self.edges()) / 2.0
    }
}

/// World to surface mapping for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceTransform {
    /// World position of the viewport's top-left corner.
    pub origin: Vec2,
    /// Surface pixels per world unit on each axis.
    pub scale: Vec2,
    pub offset: Vec2,
}

impl SurfaceTransform {
    pub fn new(geometry: &SurfaceGeometry, origin: Vec2, viewport_size: f32) -> Self {
        let scale = if viewport_size > 0.0 {
            geometry.edges() / viewport_size
        } else {
            Vec2::ZERO
        };
        Self {
            origin,
            scale,
            offset: geometry.offset(),
        }
    }

    /// World point relative to the viewport corner.
    pub fn to_viewport(&self, world: Vec2) -> Vec2 {
        world - self.origin
    }

    /// Viewport-relative point to surface pixels.
    pub fn viewport_to_surface(&self, local: Vec2) -> Vec2 {
        local * self.scale + self.offset
    }

    pub fn apply(&self, world: Vec2) -> Vec2 {
        self.viewport_to_surface(self.to_viewport(world))
    }

    /// Factor applied to stroke widths.
    pub fn stroke_scale(&self) -> f32 {
        (self.scale.x + self.scale.y) / 2.0
    }
}
