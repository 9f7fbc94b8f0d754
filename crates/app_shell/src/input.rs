use glam::Vec2;
use viewport::Viewport;
use winit::{
    event::{ElementState, MouseButton, WindowEvent},
    keyboard::{Key, NamedKey},
};

/// What the shell should do in response to a window event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputAction {
    /// Retarget the chain to this chain-space point.
    SetGoal(Vec2),
    /// Put the chain back in its start-up pose.
    Reset,
    Quit,
}

/// Tracks the pointer so clicks can be placed in chain space.
#[derive(Debug, Default)]
pub struct PointerInput {
    cursor: Option<Vec2>,
}

impl PointerInput {
    pub fn handle_event(&mut self, event: &WindowEvent, viewport: &Viewport) -> Option<InputAction> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Some(Vec2::new(position.x as f32, position.y as f32));
                None
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                None
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => self
                .cursor
                .map(|cursor| InputAction::SetGoal(click_to_chain(viewport, cursor))),
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                match &event.logical_key {
                    Key::Named(NamedKey::Escape) => Some(InputAction::Quit),
                    Key::Character(c) if c.eq_ignore_ascii_case("r") => Some(InputAction::Reset),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

pub fn click_to_chain(viewport: &Viewport, cursor: Vec2) -> Vec2 {
    viewport.to_chain(cursor)
}

/// Fresh marker orientation for a clicked goal, in degrees.
pub fn random_orientation() -> f32 {
    rand::random_range(0.0..360.0)
}
