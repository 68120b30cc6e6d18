//! HDR capture pass pipelines: instanced geometry and the sky backdrop.
//!
//! Both write two color attachments at once, the full-range scene color and
//! the bright extraction that seeds the bloom chain.

use std::mem;

use crate::pipelines::{DEPTH_FORMAT, HDR_FORMAT, mk_render_pipeline};

/// Interleaved vertex as uploaded from the mesh pool: position, normal, uv.
pub fn vertex_desc() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: (mem::size_of::<f32>() * 8) as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            wgpu::VertexAttribute {
                offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
            wgpu::VertexAttribute {
                offset: mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x2,
            },
        ],
    }
}

/// One world matrix per instance, fed from the group's transform list.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
}

impl InstanceRaw {
    /// A mat4 takes four vertex slots, one per column vector.
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 8,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// GPU-side material constants; `albedo.w` doubles as the texture flag.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub albedo: [f32; 4],
    pub emission: [f32; 4],
    // roughness, metallic, fresnel, unused
    pub params: [f32; 4],
}

fn hdr_targets(blend: Option<wgpu::BlendState>) -> [Option<wgpu::ColorTargetState>; 2] {
    [
        Some(wgpu::ColorTargetState {
            format: HDR_FORMAT,
            blend,
            write_mask: wgpu::ColorWrites::ALL,
        }),
        Some(wgpu::ColorTargetState {
            format: HDR_FORMAT,
            blend,
            write_mask: wgpu::ColorWrites::ALL,
        }),
    ]
}

pub fn mk_geometry_pipeline(
    device: &wgpu::Device,
    camera_layout: &wgpu::BindGroupLayout,
    material_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Geometry Pipeline Layout"),
        bind_group_layouts: &[camera_layout, material_layout],
        push_constant_ranges: &[],
    });

    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Geometry Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("geometry.wgsl").into()),
    };

    mk_render_pipeline(
        device,
        &layout,
        &hdr_targets(Some(wgpu::BlendState::REPLACE)),
        Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        &[vertex_desc(), InstanceRaw::desc()],
        Some(wgpu::Face::Back),
        shader,
        "Geometry Pipeline",
    )
}

/// Fullscreen backdrop drawn before the geometry, with depth writes off so
/// every scene fragment lands in front of it.
pub fn mk_sky_pipeline(
    device: &wgpu::Device,
    sky_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Sky Pipeline Layout"),
        bind_group_layouts: &[sky_layout],
        push_constant_ranges: &[],
    });

    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Sky Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("sky.wgsl").into()),
    };

    mk_render_pipeline(
        device,
        &layout,
        &hdr_targets(Some(wgpu::BlendState::REPLACE)),
        Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: false,
            depth_compare: wgpu::CompareFunction::Always,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        &[],
        None,
        shader,
        "Sky Pipeline",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layout_covers_the_interleaved_stride() {
        let desc = vertex_desc();
        assert_eq!(desc.array_stride, 32);
        let last = desc.attributes.last().unwrap();
        assert_eq!(last.offset, 24);
        assert_eq!(last.shader_location, 2);
    }

    #[test]
    fn instance_layout_spans_four_vec4_slots() {
        let desc = InstanceRaw::desc();
        assert_eq!(desc.array_stride, 64);
        assert_eq!(desc.attributes.len(), 4);
        assert_eq!(desc.attributes[0].shader_location, 5);
        assert_eq!(desc.attributes[3].shader_location, 8);
    }
}
