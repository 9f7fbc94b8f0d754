//! Software rasterizer for `FrameSnapshot`s.
//!
//! Planks are filled rectangles rotated about their joint with a pin at each
//! link end. The target is a square with a pointer showing its orientation,
//! and the end-effector is a dot. The pixmap is copied into a softbuffer
//! surface for display.

use std::num::NonZeroU32;
use std::rc::Rc;

use anyhow::{anyhow, Result};
use softbuffer::Surface;
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Rect, Transform};
use winit::window::Window;

use crate::frame::FrameSnapshot;

const PLANK_THICKNESS: f32 = 10.0;
const TARGET_HALF_SIZE: f32 = 8.0;
const TARGET_POINTER_LENGTH: f32 = 24.0;
const TARGET_POINTER_WIDTH: f32 = 4.0;
const END_MARKER_RADIUS: f32 = 6.0;
const JOINT_PIN_RADIUS: f32 = 3.0;

#[derive(Debug, Clone, Copy)]
pub struct FrameStyle {
    pub background: [u8; 3],
    pub plank: [u8; 3],
    pub target: [u8; 3],
    pub end_marker: [u8; 3],
    pub joint_pin: [u8; 3],
}

impl Default for FrameStyle {
    fn default() -> Self {
        Self {
            background: [0, 0, 132],
            plank: [222, 184, 135],
            target: [220, 40, 40],
            end_marker: [250, 220, 60],
            joint_pin: [90, 60, 30],
        }
    }
}

fn paint(rgb: [u8; 3]) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(rgb[0], rgb[1], rgb[2], 255);
    paint.anti_alias = true;
    paint
}

/// Rasterize one frame into `pixmap`.
pub fn draw_frame(frame: &FrameSnapshot, pixmap: &mut Pixmap, style: &FrameStyle) {
    let [r, g, b] = style.background;
    pixmap.fill(Color::from_rgba8(r, g, b, 255));

    let target = paint(style.target);
    let target_transform =
        Transform::from_rotate(frame.goal_angle).post_translate(frame.goal.x, frame.goal.y);
    if let Some(square) = Rect::from_xywh(
        -TARGET_HALF_SIZE,
        -TARGET_HALF_SIZE,
        TARGET_HALF_SIZE * 2.0,
        TARGET_HALF_SIZE * 2.0,
    ) {
        pixmap.fill_rect(square, &target, target_transform, None);
    }
    if let Some(pointer) = Rect::from_xywh(
        0.0,
        -TARGET_POINTER_WIDTH * 0.5,
        TARGET_POINTER_LENGTH,
        TARGET_POINTER_WIDTH,
    ) {
        pixmap.fill_rect(pointer, &target, target_transform, None);
    }

    let plank = paint(style.plank);
    for link in &frame.links {
        let Some(rect) = Rect::from_xywh(0.0, -PLANK_THICKNESS * 0.5, link.length, PLANK_THICKNESS)
        else {
            continue;
        };
        let transform =
            Transform::from_rotate(link.angle).post_translate(link.start.x, link.start.y);
        pixmap.fill_rect(rect, &plank, transform, None);
    }

    let pin = paint(style.joint_pin);
    for link in &frame.links {
        if let Some(dot) = PathBuilder::from_circle(link.end.x, link.end.y, JOINT_PIN_RADIUS) {
            pixmap.fill_path(&dot, &pin, FillRule::Winding, Transform::identity(), None);
        }
    }

    if let Some(dot) =
        PathBuilder::from_circle(frame.end_effector.x, frame.end_effector.y, END_MARKER_RADIUS)
    {
        pixmap.fill_path(
            &dot,
            &paint(style.end_marker),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }
}

/// Copy an RGBA pixmap into a `0RGB` framebuffer.
pub fn blit(pixmap: &Pixmap, buffer: &mut [u32]) {
    for (dst, px) in buffer.iter_mut().zip(pixmap.pixels()) {
        let c = px.demultiply();
        *dst = (u32::from(c.red()) << 16) | (u32::from(c.green()) << 8) | u32::from(c.blue());
    }
}

/// Owns the window surface and a reusable pixmap.
pub struct Painter {
    _context: softbuffer::Context<Rc<Window>>,
    surface: Surface<Rc<Window>, Rc<Window>>,
    pixmap: Option<Pixmap>,
    style: FrameStyle,
}

impl Painter {
    pub fn new(window: Rc<Window>, style: FrameStyle) -> Result<Self> {
        let context = softbuffer::Context::new(window.clone())
            .map_err(|err| anyhow!("failed to create softbuffer context: {err}"))?;
        let surface = Surface::new(&context, window)
            .map_err(|err| anyhow!("failed to create softbuffer surface: {err}"))?;
        Ok(Self {
            _context: context,
            surface,
            pixmap: None,
            style,
        })
    }

    pub fn paint(&mut self, width: u32, height: u32, frame: &FrameSnapshot) -> Result<()> {
        let (Some(w), Some(h)) = (NonZeroU32::new(width), NonZeroU32::new(height)) else {
            return Ok(());
        };
        self.surface
            .resize(w, h)
            .map_err(|err| anyhow!("failed to resize surface: {err}"))?;

        let reuse = self
            .pixmap
            .as_ref()
            .is_some_and(|p| p.width() == width && p.height() == height);
        if !reuse {
            self.pixmap = Some(
                Pixmap::new(width, height)
                    .ok_or_else(|| anyhow!("cannot allocate {width}x{height} pixmap"))?,
            );
        }
        let Some(pixmap) = self.pixmap.as_mut() else {
            return Ok(());
        };
        draw_frame(frame, pixmap, &self.style);

        let mut buffer = self
            .surface
            .buffer_mut()
            .map_err(|err| anyhow!("failed to map surface buffer: {err}"))?;
        blit(pixmap, &mut buffer);
        buffer
            .present()
            .map_err(|err| anyhow!("failed to present frame: {err}"))?;
        Ok(())
    }
}
