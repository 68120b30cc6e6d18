//! Output surfaces the renderer presents to.
//!
//! The renderer only needs an extent, a resize flag and a place to read input
//! from, so both a winit window and an offscreen target (used by the
//! integration tests) implement the same [`RenderSurface`] trait. The resize
//! flag stays up for the whole frame in which the resize happened and is
//! cleared by the renderer once all passes have observed it.

use std::collections::HashSet;
use std::sync::Arc;

use winit::{
    event::{ElementState, KeyEvent, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

/// Input snapshot a surface accumulated since creation: currently held keys
/// and the pointer position normalized to -1..1 with y up.
#[derive(Clone, Debug, Default)]
pub struct SurfaceInput {
    pub keys: HashSet<KeyCode>,
    pub pointer: (f32, f32),
}

impl SurfaceInput {
    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }
}

pub trait RenderSurface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// True from the moment the surface changed size until the renderer
    /// finishes the next frame.
    fn resized(&self) -> bool;
    fn clear_resized(&mut self);
    fn input(&self) -> &SurfaceInput;
    /// Per-frame surface-side bookkeeping. False once the surface asked to
    /// shut down; the caller's loop should stop then.
    fn present(&mut self) -> bool;
}

/// A winit window acting as render surface. Window events are funneled in
/// through [`Self::handle_window_event`] from the event loop.
#[derive(Debug)]
pub struct WindowSurface {
    window: Arc<Window>,
    width: u32,
    height: u32,
    resized: bool,
    alive: bool,
    input: SurfaceInput,
}

impl WindowSurface {
    pub fn new(window: Arc<Window>) -> Self {
        let size = window.inner_size();
        Self {
            window,
            width: size.width,
            height: size.height,
            // The first frame always configures from scratch.
            resized: true,
            alive: true,
            input: SurfaceInput::default(),
        }
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::Resized(size) => {
                self.width = size.width;
                self.height = size.height;
                self.resized = true;
            }
            WindowEvent::CloseRequested => self.alive = false,
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => {
                match state {
                    ElementState::Pressed => self.input.keys.insert(*code),
                    ElementState::Released => self.input.keys.remove(code),
                };
            }
            WindowEvent::CursorMoved { position, .. } => {
                let w = self.width.max(1) as f64;
                let h = self.height.max(1) as f64;
                self.input.pointer = (
                    (position.x / w * 2.0 - 1.0) as f32,
                    (1.0 - position.y / h * 2.0) as f32,
                );
            }
            _ => (),
        }
    }
}

impl RenderSurface for WindowSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn resized(&self) -> bool {
        self.resized
    }

    fn clear_resized(&mut self) {
        self.resized = false;
    }

    fn input(&self) -> &SurfaceInput {
        &self.input
    }

    fn present(&mut self) -> bool {
        self.window.request_redraw();
        self.alive
    }
}

/// Fixed-size surface with no window behind it. Used together with
/// [`crate::context::Context::headless`] for offscreen rendering and tests.
#[derive(Debug)]
pub struct OffscreenSurface {
    width: u32,
    height: u32,
    resized: bool,
    input: SurfaceInput,
}

impl OffscreenSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            resized: true,
            input: SurfaceInput::default(),
        }
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.resized = true;
    }
}

impl RenderSurface for OffscreenSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn resized(&self) -> bool {
        self.resized
    }

    fn clear_resized(&mut self) {
        self.resized = false;
    }

    fn input(&self) -> &SurfaceInput {
        &self.input
    }

    fn present(&mut self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offscreen_surface_raises_resize_flag_until_cleared() {
        let mut surface = OffscreenSurface::new(64, 64);
        assert!(surface.resized(), "first frame must configure everything");
        surface.clear_resized();
        assert!(!surface.resized());

        surface.set_size(128, 32);
        assert!(surface.resized());
        assert_eq!((surface.width(), surface.height()), (128, 32));
        surface.clear_resized();
        assert!(!surface.resized());
    }

    #[test]
    fn input_defaults_to_nothing_pressed() {
        let surface = OffscreenSurface::new(8, 8);
        assert!(!surface.input().is_pressed(KeyCode::KeyW));
        assert_eq!(surface.input().pointer, (0.0, 0.0));
    }
}
