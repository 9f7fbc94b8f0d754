use std::{
    rc::Rc,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use ik_kernel::IkSolver;
use settings::UserSettings;
use tracing::{debug, error, info, trace};
use viewport::Viewport;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    frame::FrameSnapshot,
    input::{random_orientation, InputAction, PointerInput},
    render::{FrameStyle, Painter},
};

/// Window shell: paces solver ticks and turns clicks into goals.
pub struct ArmApp {
    solver: IkSolver,
    viewport: Viewport,
    pointer: PointerInput,
    window: Option<Rc<Window>>,
    window_id: Option<WindowId>,
    painter: Option<Painter>,
    style: FrameStyle,
    title: String,
    initial_size: PhysicalSize<u32>,
    tick_period: Duration,
    last_tick: Option<Instant>,
    frame: Option<FrameSnapshot>,
}

impl ArmApp {
    pub fn new(solver: IkSolver, settings: &UserSettings) -> Result<Self> {
        let window = &settings.window;
        let tick_period = tick_period(solver.config().steps_per_second)?;
        Ok(Self {
            solver,
            viewport: Viewport::with_axes(
                window.width,
                window.height,
                window.screen_convention.axes(),
            ),
            pointer: PointerInput::default(),
            window: None,
            window_id: None,
            painter: None,
            style: FrameStyle {
                background: window.background,
                ..FrameStyle::default()
            },
            title: window.title.clone(),
            initial_size: PhysicalSize::new(window.width.max(1), window.height.max(1)),
            tick_period,
            last_tick: None,
            frame: None,
        })
    }

    fn tick(&mut self) {
        self.solver.step();
        self.frame = Some(FrameSnapshot::capture(&self.solver, &self.viewport));
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }

    fn present(&mut self) {
        let (Some(window), Some(frame)) = (self.window.as_ref(), self.frame.as_ref()) else {
            return;
        };
        window.set_title(&frame.title(&self.title));
        trace!(?frame, "frame");

        let Some(painter) = self.painter.as_mut() else {
            return;
        };
        let size = window.inner_size();
        if let Err(err) = painter.paint(size.width, size.height, frame) {
            error!("failed to draw frame: {err:#}");
        }
    }

    fn apply(&mut self, action: InputAction, event_loop: &ActiveEventLoop) {
        match action {
            InputAction::SetGoal(position) => {
                let orientation = random_orientation();
                info!(
                    "New goal ({:.1}, {:.1}) at {:.0} degrees",
                    position.x, position.y, orientation
                );
                self.solver.set_goal(position, orientation);
            }
            InputAction::Reset => {
                info!("Chain reset to start-up pose");
                self.solver.reset();
            }
            InputAction::Quit => event_loop.exit(),
        }
    }
}

impl ApplicationHandler for ArmApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            WindowAttributes::default()
                .with_title(self.title.clone())
                .with_inner_size(self.initial_size),
        ) {
            Ok(window) => window,
            Err(err) => {
                error!("failed to create window: {err}");
                event_loop.exit();
                return;
            }
        };

        let window = Rc::new(window);
        let painter = match Painter::new(window.clone(), self.style) {
            Ok(painter) => painter,
            Err(err) => {
                error!("failed to initialize painter: {err:#}");
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        self.viewport.resize(size.width.max(1), size.height.max(1));
        self.window_id = Some(window.id());
        self.painter = Some(painter);
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if Some(window_id) != self.window_id {
            return;
        }

        if let Some(action) = self.pointer.handle_event(&event, &self.viewport) {
            self.apply(action, event_loop);
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                debug!(width = size.width, height = size.height, "viewport resized");
                self.viewport.resize(size.width.max(1), size.height.max(1));
                self.frame = Some(FrameSnapshot::capture(&self.solver, &self.viewport));
                if let Some(window) = self.window.as_ref() {
                    window.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => self.present(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if let Some(last) = self.last_tick {
            let next = last + self.tick_period;
            if now < next {
                event_loop.set_control_flow(ControlFlow::WaitUntil(next));
                return;
            }
        }

        self.tick();
        self.last_tick = Some(now);
        event_loop.set_control_flow(ControlFlow::WaitUntil(now + self.tick_period));
    }
}

/// Wall-clock time between solver ticks.
fn tick_period(steps_per_second: f32) -> Result<Duration> {
    Duration::try_from_secs_f32(1.0 / steps_per_second)
        .with_context(|| format!("tick rate {steps_per_second} Hz gives no usable tick period"))
}
