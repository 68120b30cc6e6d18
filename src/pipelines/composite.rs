//! Final composite: tone-mapped mix of scene color and bloom onto the
//! output surface.

use crate::pipelines::mk_render_pipeline;

/// Composite constants; only the bloom mix factor today.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CompositeUniform {
    pub bloom_strength: f32,
    pub _pad: [f32; 3],
}

impl Default for CompositeUniform {
    fn default() -> Self {
        Self {
            bloom_strength: 0.04,
            _pad: [0.0; 3],
        }
    }
}

pub fn mk_composite_pipeline(
    device: &wgpu::Device,
    composite_layout: &wgpu::BindGroupLayout,
    surface_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Composite Pipeline Layout"),
        bind_group_layouts: &[composite_layout],
        push_constant_ranges: &[],
    });

    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Composite Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("composite.wgsl").into()),
    };

    mk_render_pipeline(
        device,
        &layout,
        &[Some(wgpu::ColorTargetState {
            format: surface_format,
            blend: Some(wgpu::BlendState::REPLACE),
            write_mask: wgpu::ColorWrites::ALL,
        })],
        None,
        &[],
        None,
        shader,
        "Composite Pipeline",
    )
}
