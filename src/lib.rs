//! ember-ngin
//!
//! A compact rendering engine built around pooled scene data and a fixed
//! HDR post-processing pipeline. Scenes are plain CPU-side pools of
//! textures, meshes, materials and instanced objects; the renderer uploads
//! them on demand and runs every frame through the same pass sequence:
//! HDR capture, bloom mip chain, tone-mapped composite.
//!
//! High-level modules
//! - `camera`: view/projection math and the per-frame camera uniform
//! - `context`: GPU device/queue plus the window or offscreen output target
//! - `data_structures`: entity pools, handles and the scene/stage model
//! - `pipelines`: render pipeline construction and the embedded shaders
//! - `render`: the frame orchestrator running the fixed pass pipeline
//! - `resources`: glTF import into scene pools with per-import deduplication
//! - `slots`: the bounded table of screen-sized GPU resources
//! - `surface`: window and offscreen surfaces the renderer presents to
//!

pub mod camera;
pub mod context;
pub mod data_structures;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod slots;
pub mod surface;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use winit::event::WindowEvent;
pub use winit::keyboard::KeyCode;

pub use data_structures::{Scene, Stage};
pub use render::{Renderer, RendererDesc};
pub use resources::{ImportCache, import_scene};
