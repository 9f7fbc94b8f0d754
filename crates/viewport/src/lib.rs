//! Mapping between window pixels and the chain's coordinate space.
//!
//! The chain lives in a plane whose origin sits at the center of the render
//! area. Window systems report pixels from the top-left corner with y growing
//! downward, so the vertical axis is flipped on the way in and out.

use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisSign {
    Positive,
    Negative,
}

impl AxisSign {
    pub const fn scalar(self) -> f32 {
        match self {
            AxisSign::Positive => 1.0,
            AxisSign::Negative => -1.0,
        }
    }

    pub const fn invert(self) -> Self {
        match self {
            AxisSign::Positive => AxisSign::Negative,
            AxisSign::Negative => AxisSign::Positive,
        }
    }
}

/// How screen axes line up with chain axes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreenConvention {
    /// Pixel y grows downward (winit, most window systems).
    #[default]
    YDown,
    /// Pixel y grows upward (GL-style framebuffers).
    YUp,
}

impl ScreenConvention {
    pub const fn axes(self) -> ScreenAxes {
        match self {
            ScreenConvention::YDown => ScreenAxes::new(AxisSign::Positive, AxisSign::Negative),
            ScreenConvention::YUp => ScreenAxes::new(AxisSign::Positive, AxisSign::Positive),
        }
    }
}

/// Sign of each screen axis relative to the matching chain axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenAxes {
    horizontal: AxisSign,
    vertical: AxisSign,
}

impl ScreenAxes {
    pub const fn new(horizontal: AxisSign, vertical: AxisSign) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    pub const fn horizontal(&self) -> AxisSign {
        self.horizontal
    }

    pub const fn vertical(&self) -> AxisSign {
        self.vertical
    }

    fn signs(&self) -> Vec2 {
        Vec2::new(self.horizontal.scalar(), self.vertical.scalar())
    }
}

impl Default for ScreenAxes {
    fn default() -> Self {
        ScreenConvention::default().axes()
    }
}

impl From<ScreenConvention> for ScreenAxes {
    fn from(value: ScreenConvention) -> Self {
        value.axes()
    }
}

/// Render area in pixels plus the axis convention used to reach it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    size: Vec2,
    axes: ScreenAxes,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_axes(width, height, ScreenAxes::default())
    }

    pub fn with_axes(width: u32, height: u32, axes: ScreenAxes) -> Self {
        Self {
            size: Vec2::new(width as f32, height as f32),
            axes,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.size = Vec2::new(width as f32, height as f32);
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Pixel position of the chain origin.
    pub fn center(&self) -> Vec2 {
        self.size * 0.5
    }

    pub fn axes(&self) -> ScreenAxes {
        self.axes
    }

    /// Pixel position → chain coordinates.
    pub fn to_chain(&self, screen: Vec2) -> Vec2 {
        (screen - self.center()) * self.axes.signs()
    }

    /// Chain coordinates → pixel position.
    pub fn to_screen(&self, chain: Vec2) -> Vec2 {
        self.center() + chain * self.axes.signs()
    }

    /// Chain-space angle (degrees, counter-clockwise) as seen on screen.
    pub fn screen_angle(&self, degrees: f32) -> f32 {
        degrees * self.axes.horizontal.scalar() * self.axes.vertical.scalar()
    }
}
