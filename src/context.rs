//! Central GPU context owning device, queue and the final output target.
//!
//! The context knows nothing about scenes or passes; it hands out a
//! [`Frame`] view to draw the composited image into and presents it when the
//! target is a real window.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use winit::window::Window;

enum RenderTarget {
    Window {
        surface: wgpu::Surface<'static>,
        config: wgpu::SurfaceConfiguration,
    },
    Offscreen {
        texture: wgpu::Texture,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    },
}

pub struct Context {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    target: RenderTarget,
}

/// One acquired output image. Dropping it without [`Frame::present`] skips
/// presentation for window targets.
pub struct Frame {
    pub view: wgpu::TextureView,
    surface_texture: Option<wgpu::SurfaceTexture>,
}

impl Frame {
    pub fn present(self) {
        if let Some(texture) = self.surface_texture {
            texture.present();
        }
    }
}

impl Context {
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();

        log::info!("[RENDERER] wgpu setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("failed to create window surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no compatible GPU adapter")?;

        let (device, queue) = request_device(&adapter).await?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shaders assume an sRGB swapchain; the composite pass writes
        // linear values and lets the format conversion handle gamma.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            device,
            queue,
            target: RenderTarget::Window { surface, config },
        })
    }

    /// Device and queue without a window; the output lands in an offscreen
    /// texture of the given extent. This is what the integration tests run
    /// against.
    pub async fn headless(width: u32, height: u32) -> Result<Self> {
        log::info!("[RENDERER] headless wgpu setup at {width}x{height}");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .context("no compatible GPU adapter")?;

        let (device, queue) = request_device(&adapter).await?;

        let format = wgpu::TextureFormat::Rgba8UnormSrgb;
        let texture = create_offscreen_texture(&device, width, height, format);

        Ok(Self {
            device,
            queue,
            target: RenderTarget::Offscreen {
                texture,
                format,
                width,
                height,
            },
        })
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        match &self.target {
            RenderTarget::Window { config, .. } => config.format,
            RenderTarget::Offscreen { format, .. } => *format,
        }
    }

    pub fn extent(&self) -> (u32, u32) {
        match &self.target {
            RenderTarget::Window { config, .. } => (config.width, config.height),
            RenderTarget::Offscreen { width, height, .. } => (*width, *height),
        }
    }

    /// Reconfigure the output for a new extent. Zero extents are clamped so
    /// the swapchain stays valid while a window is minimized.
    pub fn resize(&mut self, width: u32, height: u32) {
        let width = width.max(1);
        let height = height.max(1);
        match &mut self.target {
            RenderTarget::Window { surface, config } => {
                config.width = width;
                config.height = height;
                surface.configure(&self.device, config);
            }
            RenderTarget::Offscreen {
                texture,
                format,
                width: w,
                height: h,
            } => {
                if (*w, *h) != (width, height) {
                    *texture = create_offscreen_texture(&self.device, width, height, *format);
                    *w = width;
                    *h = height;
                }
            }
        }
        log::info!("[RENDERER] output resized to {width}x{height}");
    }

    /// Acquire the output image for this frame.
    pub fn begin_frame(&mut self) -> Result<Frame> {
        match &self.target {
            RenderTarget::Window { surface, .. } => {
                let surface_texture = surface
                    .get_current_texture()
                    .context("failed to acquire swapchain image")?;
                let view = surface_texture
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                Ok(Frame {
                    view,
                    surface_texture: Some(surface_texture),
                })
            }
            RenderTarget::Offscreen { texture, .. } => Ok(Frame {
                view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
                surface_texture: None,
            }),
        }
    }

    /// The offscreen output texture, for readback in tests. None for window
    /// targets.
    pub fn offscreen_texture(&self) -> Option<&wgpu::Texture> {
        match &self.target {
            RenderTarget::Window { .. } => None,
            RenderTarget::Offscreen { texture, .. } => Some(texture),
        }
    }
}

async fn request_device(adapter: &wgpu::Adapter) -> Result<(wgpu::Device, wgpu::Queue)> {
    adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: Default::default(),
            trace: wgpu::Trace::Off,
        })
        .await
        .context("failed to request GPU device")
}

fn create_offscreen_texture(
    device: &wgpu::Device,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("offscreen output"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    })
}
