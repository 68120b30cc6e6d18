//! Bloom mip-chain pipelines.
//!
//! The bright extraction is filtered down a chain of progressively halved
//! mips with a 13-tap downsample, then walked back up with a 3x3 tent
//! upsample that blends additively into the next finer mip. Mip 0 of the
//! chain holds the finished bloom the composite pass reads.

use crate::pipelines::{HDR_FORMAT, mk_render_pipeline};

/// Per-stage filter constants: source texel size and the tent radius.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FilterUniform {
    pub texel: [f32; 2],
    pub radius: f32,
    pub _pad: f32,
}

/// Extents of the bloom chain for a given surface size: mip `i` is the
/// surface halved `i + 1` times, floored. Extents clamp at one texel;
/// strict halving past that would yield a zero extent, which is not a
/// valid slot size.
pub fn mip_chain_extents(width: u32, height: u32, chain_length: usize) -> Vec<(u32, u32)> {
    let mut extents = Vec::with_capacity(chain_length);
    let (mut w, mut h) = (width, height);
    for _ in 0..chain_length {
        w = (w / 2).max(1);
        h = (h / 2).max(1);
        extents.push((w, h));
    }
    extents
}

pub fn mk_downsample_pipeline(
    device: &wgpu::Device,
    filter_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Bloom Downsample Pipeline Layout"),
        bind_group_layouts: &[filter_layout],
        push_constant_ranges: &[],
    });

    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Bloom Downsample Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("downsample.wgsl").into()),
    };

    mk_render_pipeline(
        device,
        &layout,
        &[Some(wgpu::ColorTargetState {
            format: HDR_FORMAT,
            blend: Some(wgpu::BlendState::REPLACE),
            write_mask: wgpu::ColorWrites::ALL,
        })],
        None,
        &[],
        None,
        shader,
        "Bloom Downsample Pipeline",
    )
}

/// Upsample blends additively so each coarser mip accumulates into the finer
/// one it is drawn onto.
pub fn mk_upsample_pipeline(
    device: &wgpu::Device,
    filter_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Bloom Upsample Pipeline Layout"),
        bind_group_layouts: &[filter_layout],
        push_constant_ranges: &[],
    });

    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Bloom Upsample Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("upsample.wgsl").into()),
    };

    mk_render_pipeline(
        device,
        &layout,
        &[Some(wgpu::ColorTargetState {
            format: HDR_FORMAT,
            blend: Some(wgpu::BlendState {
                color: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::One,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
                alpha: wgpu::BlendComponent::OVER,
            }),
            write_mask: wgpu::ColorWrites::ALL,
        })],
        None,
        &[],
        None,
        shader,
        "Bloom Upsample Pipeline",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_halves_the_surface_at_every_mip() {
        let extents = mip_chain_extents(640, 480, 5);
        assert_eq!(
            extents,
            vec![(320, 240), (160, 120), (80, 60), (40, 30), (20, 15)]
        );
    }

    #[test]
    fn odd_extents_floor() {
        let extents = mip_chain_extents(641, 479, 2);
        assert_eq!(extents, vec![(320, 239), (160, 119)]);
    }

    #[test]
    fn tiny_surfaces_clamp_at_one_texel() {
        let extents = mip_chain_extents(8, 2, 5);
        assert_eq!(extents, vec![(4, 1), (2, 1), (1, 1), (1, 1), (1, 1)]);
    }

    #[test]
    fn chain_length_zero_yields_no_mips() {
        assert!(mip_chain_extents(640, 480, 0).is_empty());
    }
}
