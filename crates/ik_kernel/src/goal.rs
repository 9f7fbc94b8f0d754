use glam::Vec2;

/// Target the end-effector is steered toward.
///
/// `orientation` (degrees) travels with the position so a renderer can draw
/// the target marker rotated, but the positional solver never reads it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Goal {
    pub position: Vec2,
    pub orientation: f32,
}

impl Goal {
    pub const fn new(position: Vec2, orientation: f32) -> Self {
        Self {
            position,
            orientation,
        }
    }

    pub fn at(x: f32, y: f32) -> Self {
        Self::new(Vec2::new(x, y), 0.0)
    }
}
