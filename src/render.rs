//! Frame orchestration: scene upload and the fixed pass pipeline.
//!
//! Every frame runs the same sequence. The capture pass draws sky and
//! instanced geometry into two HDR attachments, the bright one feeds the
//! bloom chain (downsample to the coarsest mip, tent-upsample back with
//! additive blending), and the composite pass tone-maps scene color plus
//! bloom onto the output surface. Screen-sized resources live in the
//! [`SlotTable`] and reallocate lazily when the surface resized; the flag is
//! cleared exactly once, at the end of the frame, so every pass within one
//! frame sees the same state.

use anyhow::Result;
use wgpu::util::DeviceExt;

use crate::camera::CameraUniform;
use crate::context::Context;
use crate::data_structures::{Handle, MeshKind, Scene, Stage};
use crate::pipelines::{
    HDR_FORMAT, Programs,
    bloom::{FilterUniform, mip_chain_extents},
    composite::CompositeUniform,
    geometry::{InstanceRaw, MaterialUniform},
};
use crate::slots::{SlotId, SlotTable};
use crate::surface::RenderSurface;

/// Renderer configuration fixed at creation time.
#[derive(Clone, Copy, Debug)]
pub struct RendererDesc {
    pub width: u32,
    pub height: u32,
    pub bloom_chain_length: usize,
    pub bloom_filter_radius: f32,
}

impl Default for RendererDesc {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            bloom_chain_length: 5,
            bloom_filter_radius: 3.0,
        }
    }
}

/// Counters of what the last frame actually did, mostly for tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub draw_calls: u32,
    pub downsample_passes: u32,
    pub upsample_passes: u32,
    pub composite_passes: u32,
    pub slots_reconfigured: u32,
    /// The two slots the composite pass read from, when it ran.
    pub composite_inputs: Option<(SlotId, SlotId)>,
}

struct GpuTexture {
    view: wgpu::TextureView,
    use_nearest: bool,
}

struct GpuMesh {
    vertex: wgpu::Buffer,
    index: wgpu::Buffer,
    index_count: u32,
}

struct GpuMaterial {
    bind_group: wgpu::BindGroup,
}

/// Per-group draw data gathered before any render pass begins, so buffer
/// creation never races an open pass.
struct DrawItem {
    mesh: usize,
    material: usize,
    instances: wgpu::Buffer,
    transform_count: u32,
}

pub struct Renderer {
    ctx: Context,
    programs: Programs,
    slots: SlotTable,
    desc: RendererDesc,

    // Realized GPU resources, indexed like the scene pools.
    textures: Vec<Option<GpuTexture>>,
    meshes: Vec<Option<GpuMesh>>,
    materials: Vec<Option<GpuMaterial>>,

    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    composite_buffer: wgpu::Buffer,
    default_texture: GpuTexture,

    stats: FrameStats,
}

impl Renderer {
    pub fn new(ctx: Context, desc: RendererDesc) -> Self {
        let programs = Programs::new(&ctx.device, ctx.surface_format());
        let slots = SlotTable::new(desc.bloom_chain_length);

        let camera_buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Buffer"),
                contents: bytemuck::cast_slice(&[CameraUniform::default()]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let camera_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &programs.camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        let composite_buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Composite Buffer"),
                contents: bytemuck::cast_slice(&[CompositeUniform::default()]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });

        let default_texture = upload_pixels(&ctx, 1, 1, &[255, 255, 255, 255], false);

        Self {
            ctx,
            programs,
            slots,
            desc,
            textures: Vec::new(),
            meshes: Vec::new(),
            materials: Vec::new(),
            camera_buffer,
            camera_bind_group,
            composite_buffer,
            default_texture,
            stats: FrameStats::default(),
        }
    }

    pub fn desc(&self) -> &RendererDesc {
        &self.desc
    }

    pub fn last_frame_stats(&self) -> FrameStats {
        self.stats
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Realize every scene entity that has no GPU counterpart yet. Pools are
    /// append-only, so already-realized entries never need revisiting.
    pub fn upload(&mut self, scene: &Scene) {
        self.textures.resize_with(scene.textures.len(), || None);
        for i in 0..scene.textures.len() {
            if self.textures[i].is_some() {
                continue;
            }
            let texture = scene.textures.get(Handle::new(i));
            // A zero-extent texture cannot back GPU storage; materials
            // referencing it bind the 1x1 stand-in instead.
            if texture.width == 0 || texture.height == 0 {
                continue;
            }
            let rgba = expand_to_rgba(texture.channels, texture.width, texture.height, &texture.pixels);
            self.textures[i] = Some(upload_pixels(
                &self.ctx,
                texture.width,
                texture.height,
                &rgba,
                texture.use_nearest,
            ));
            log::info!("[RENDERER] texture uploaded {i}");
        }

        self.meshes.resize_with(scene.meshes.len(), || None);
        for i in 0..scene.meshes.len() {
            if self.meshes[i].is_some() {
                continue;
            }
            let MeshKind::Custom {
                vertices, indices, ..
            } = &scene.meshes.get(Handle::new(i)).kind;
            // Degenerate meshes get zero-size buffers; drawing them emits
            // zero indices and is harmless.
            let vertex = self
                .ctx
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("mesh vertex buffer"),
                    contents: bytemuck::cast_slice(vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
            let index = self
                .ctx
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("mesh index buffer"),
                    contents: bytemuck::cast_slice(indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
            self.meshes[i] = Some(GpuMesh {
                vertex,
                index,
                index_count: indices.len() as u32,
            });
            log::info!("[RENDERER] mesh uploaded {i}");
        }

        self.materials.resize_with(scene.materials.len(), || None);
        for i in 0..scene.materials.len() {
            if self.materials[i].is_some() {
                continue;
            }
            let material = scene.materials.get(Handle::new(i));

            // Resolving every handle through the pool makes a dangling
            // reference fatal before it reaches a bind group.
            for handle in [
                material.albedo_texture,
                material.roughness_texture,
                material.metallic_texture,
                material.normal_texture,
                material.emission_texture,
                material.specular_texture,
            ]
            .into_iter()
            .flatten()
            {
                scene.textures.get(handle);
            }
            // The textured branch follows the handle, not the GPU table: a
            // zero-extent source texture still counts as textured and
            // samples the white stand-in.
            let textured = if material.albedo_texture.is_some() { 1.0 } else { 0.0 };
            let albedo = material
                .albedo_texture
                .and_then(|handle| self.textures[handle.index()].as_ref());
            let (view, use_nearest) = match albedo {
                Some(gpu) => (&gpu.view, gpu.use_nearest),
                None => (&self.default_texture.view, false),
            };
            let sampler = if use_nearest {
                &self.programs.nearest_sampler
            } else {
                &self.programs.linear_sampler
            };

            let uniform = MaterialUniform {
                albedo: [material.albedo.x, material.albedo.y, material.albedo.z, textured],
                emission: [material.emission.x, material.emission.y, material.emission.z, 0.0],
                params: [material.roughness, material.metallic, material.fresnel, 0.0],
            };
            let buffer = self
                .ctx
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("material buffer"),
                    contents: bytemuck::cast_slice(&[uniform]),
                    usage: wgpu::BufferUsages::UNIFORM,
                });
            let bind_group = self.ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                layout: &self.programs.material_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    },
                ],
                label: Some("material_bind_group"),
            });
            self.materials[i] = Some(GpuMaterial { bind_group });
            log::info!("[RENDERER] material uploaded {i}");
        }
    }

    /// Draw the scene's current stage onto the surface.
    ///
    /// A zero-extent surface (minimized window) skips the frame entirely.
    /// The surface's resize flag is cleared exactly once, after all passes
    /// have run against it.
    pub fn render(&mut self, scene: &Scene, surface: &mut impl RenderSurface) -> Result<()> {
        let (width, height) = (surface.width(), surface.height());
        if width == 0 || height == 0 {
            return Ok(());
        }
        let resized = surface.resized();
        if resized {
            self.ctx.resize(width, height);
        }
        self.upload(scene);

        let mut stats = FrameStats::default();
        let stage = scene.current_stage();
        let chain_length = self.slots.chain_length();

        // Screen-sized resources first; every later pass reads fixed views.
        for id in [SlotId::HdrColor, SlotId::HdrBright] {
            if self
                .slots
                .ensure_screen_texture(&self.ctx.device, id, width, height, HDR_FORMAT, resized)
            {
                stats.slots_reconfigured += 1;
            }
        }
        if self
            .slots
            .ensure_depth_buffer(&self.ctx.device, SlotId::HdrDepth, width, height, resized)
        {
            stats.slots_reconfigured += 1;
        }
        let mip_extents = mip_chain_extents(width, height, chain_length);
        for (i, &(w, h)) in mip_extents.iter().enumerate() {
            if self.slots.ensure_screen_texture(
                &self.ctx.device,
                SlotId::BloomMip(i),
                w,
                h,
                HDR_FORMAT,
                resized,
            ) {
                stats.slots_reconfigured += 1;
            }
        }

        let camera = CameraUniform::new(stage.cam_pos, stage.cam_dir, width, height);
        self.ctx
            .queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[camera]));

        let draws = self.collect_draws(stage);
        let sky_bind_group = self.mk_sky_bind_group(scene, stage);
        let filter_stages = self.mk_filter_stages(&mip_extents);
        let composite_bind_group = self.mk_composite_bind_group();

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });

        // Capture pass: sky backdrop, then instanced geometry, into both HDR
        // attachments.
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("hdr capture pass"),
                color_attachments: &[
                    Some(color_attachment(self.slots.view(SlotId::HdrColor), wgpu::LoadOp::Clear(wgpu::Color::BLACK))),
                    Some(color_attachment(self.slots.view(SlotId::HdrBright), wgpu::LoadOp::Clear(wgpu::Color::BLACK))),
                ],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.slots.view(SlotId::HdrDepth),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(0),
                        store: wgpu::StoreOp::Discard,
                    }),
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(sky) = &sky_bind_group {
                pass.set_pipeline(&self.programs.sky);
                pass.set_bind_group(0, sky, &[]);
                pass.draw(0..3, 0..1);
            }

            pass.set_pipeline(&self.programs.geometry);
            pass.set_bind_group(0, &self.camera_bind_group, &[]);
            for item in &draws {
                let mesh = self.meshes[item.mesh]
                    .as_ref()
                    .unwrap_or_else(|| panic!("mesh {} was never uploaded", item.mesh));
                let material = self.materials[item.material]
                    .as_ref()
                    .unwrap_or_else(|| panic!("material {} was never uploaded", item.material));

                pass.set_bind_group(1, &material.bind_group, &[]);
                pass.set_vertex_buffer(0, mesh.vertex.slice(..));
                pass.set_vertex_buffer(1, item.instances.slice(..));
                pass.set_index_buffer(mesh.index.slice(..), wgpu::IndexFormat::Uint32);
                // One draw per transform, sharing the bound mesh/material.
                for t in 0..item.transform_count {
                    pass.draw_indexed(0..mesh.index_count, 0, t..t + 1);
                    stats.draw_calls += 1;
                }
            }
        }

        // Downsample the bright extraction to the coarsest mip.
        for (i, stage_bind) in filter_stages.downsample.iter().enumerate() {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("bloom downsample pass"),
                color_attachments: &[Some(color_attachment(
                    self.slots.view(SlotId::BloomMip(i)),
                    wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                ))],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.programs.downsample);
            pass.set_bind_group(0, &stage_bind.bind_group, &[]);
            pass.draw(0..3, 0..1);
            stats.downsample_passes += 1;
        }

        // Walk back up, accumulating into each finer mip.
        for (offset, stage_bind) in filter_stages.upsample.iter().enumerate() {
            let dest = chain_length - 2 - offset;
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("bloom upsample pass"),
                color_attachments: &[Some(color_attachment(
                    self.slots.view(SlotId::BloomMip(dest)),
                    wgpu::LoadOp::Load,
                ))],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.programs.upsample);
            pass.set_bind_group(0, &stage_bind.bind_group, &[]);
            pass.draw(0..3, 0..1);
            stats.upsample_passes += 1;
        }

        // Composite onto the output surface. Reading and writing the same
        // storage in one pass is undefined, so the inputs must not alias.
        let composite_inputs = (SlotId::HdrColor, SlotId::BloomMip(0));
        assert_ne!(
            composite_inputs.0, composite_inputs.1,
            "composite inputs alias"
        );
        let frame = self.ctx.begin_frame()?;
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("composite pass"),
                color_attachments: &[Some(color_attachment(
                    &frame.view,
                    wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                ))],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.programs.composite);
            pass.set_bind_group(0, &composite_bind_group, &[]);
            pass.set_viewport(0.0, 0.0, width as f32, height as f32, 0.0, 1.0);
            pass.draw(0..3, 0..1);
            stats.composite_passes += 1;
            stats.composite_inputs = Some(composite_inputs);
        }

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        frame.present();

        surface.clear_resized();
        self.stats = stats;
        Ok(())
    }

    fn collect_draws(&self, stage: &Stage) -> Vec<DrawItem> {
        let mut draws = Vec::with_capacity(stage.instances.len());
        for group in stage.instances.iter() {
            if group.transforms.is_empty() {
                continue;
            }
            let object = stage.objects.get(group.object);
            let raw: Vec<InstanceRaw> = group
                .transforms
                .iter()
                .map(|m| InstanceRaw { model: (*m).into() })
                .collect();
            let instances = self
                .ctx
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("instance buffer"),
                    contents: bytemuck::cast_slice(&raw),
                    usage: wgpu::BufferUsages::VERTEX,
                });
            draws.push(DrawItem {
                mesh: object.mesh.index(),
                material: object.material.index(),
                instances,
                transform_count: group.transforms.len() as u32,
            });
        }
        draws
    }

    fn mk_sky_bind_group(&self, scene: &Scene, stage: &Stage) -> Option<wgpu::BindGroup> {
        let handle = stage.sky_texture?;
        // Pool access makes an out-of-range sky handle fatal.
        scene.textures.get(handle);
        let gpu = self.textures[handle.index()]
            .as_ref()
            .unwrap_or_else(|| panic!("sky texture {} was never uploaded", handle.index()));
        Some(self.ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.programs.sky_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&gpu.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.programs.linear_sampler),
                },
            ],
            label: Some("sky_bind_group"),
        }))
    }

    fn mk_filter_stages(&self, mip_extents: &[(u32, u32)]) -> FilterStages {
        let chain_length = mip_extents.len();
        let mut downsample = Vec::with_capacity(chain_length);
        for i in 0..chain_length {
            let source = if i == 0 {
                SlotId::HdrBright
            } else {
                SlotId::BloomMip(i - 1)
            };
            downsample.push(self.mk_filter_stage(source, 1.0));
        }

        let mut upsample = Vec::with_capacity(chain_length.saturating_sub(1));
        // Coarsest first: mip K-1 accumulates into K-2, down to mip 0.
        for dest in (0..chain_length.saturating_sub(1)).rev() {
            upsample.push(self.mk_filter_stage(SlotId::BloomMip(dest + 1), self.desc.bloom_filter_radius));
        }

        FilterStages {
            downsample,
            upsample,
        }
    }

    fn mk_filter_stage(&self, source: SlotId, radius: f32) -> FilterStage {
        let (w, h) = self.slots.extent(source);
        let uniform = FilterUniform {
            texel: [1.0 / w as f32, 1.0 / h as f32],
            radius,
            _pad: 0.0,
        };
        let buffer = self
            .ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("filter buffer"),
                contents: bytemuck::cast_slice(&[uniform]),
                usage: wgpu::BufferUsages::UNIFORM,
            });
        let bind_group = self.ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.programs.filter_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(self.slots.view(source)),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.programs.linear_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: buffer.as_entire_binding(),
                },
            ],
            label: Some("filter_bind_group"),
        });
        FilterStage {
            _buffer: buffer,
            bind_group,
        }
    }

    fn mk_composite_bind_group(&self) -> wgpu::BindGroup {
        self.ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.programs.composite_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(self.slots.view(SlotId::HdrColor)),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(self.slots.view(SlotId::BloomMip(0))),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.programs.linear_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: self.composite_buffer.as_entire_binding(),
                },
            ],
            label: Some("composite_bind_group"),
        })
    }
}

struct FilterStage {
    // Kept alive for the frame; the bind group references it.
    _buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

struct FilterStages {
    downsample: Vec<FilterStage>,
    upsample: Vec<FilterStage>,
}

fn color_attachment(
    view: &wgpu::TextureView,
    load: wgpu::LoadOp<wgpu::Color>,
) -> wgpu::RenderPassColorAttachment<'_> {
    wgpu::RenderPassColorAttachment {
        view,
        resolve_target: None,
        ops: wgpu::Operations {
            load,
            store: wgpu::StoreOp::Store,
        },
        depth_slice: None,
    }
}

fn upload_pixels(ctx: &Context, width: u32, height: u32, rgba: &[u8], use_nearest: bool) -> GpuTexture {
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("scene texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    ctx.queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            aspect: wgpu::TextureAspect::All,
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
        },
        rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(width * 4),
            rows_per_image: Some(height),
        },
        size,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    GpuTexture { view, use_nearest }
}

/// Expand 1/2/3-channel pixel data to tightly packed RGBA.
fn expand_to_rgba(channels: u32, width: u32, height: u32, pixels: &[u8]) -> Vec<u8> {
    let count = (width * height) as usize;
    assert!(
        pixels.len() >= count * channels as usize,
        "pixel buffer too short for {width}x{height} with {channels} channels"
    );
    match channels {
        4 => pixels.to_vec(),
        3 => pixels
            .chunks_exact(3)
            .take(count)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        2 => pixels
            .chunks_exact(2)
            .take(count)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        1 => pixels
            .iter()
            .take(count)
            .flat_map(|&p| [p, p, p, 255])
            .collect(),
        other => panic!("unsupported channel count {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desc_defaults_match_the_reference_configuration() {
        let desc = RendererDesc::default();
        assert_eq!((desc.width, desc.height), (640, 480));
        assert_eq!(desc.bloom_chain_length, 5);
        assert_eq!(desc.bloom_filter_radius, 3.0);
    }

    #[test]
    fn frame_stats_start_at_zero() {
        assert_eq!(FrameStats::default().draw_calls, 0);
        assert_eq!(FrameStats::default().composite_passes, 0);
    }

    #[test]
    fn rgb_pixels_expand_with_opaque_alpha() {
        let rgba = expand_to_rgba(3, 2, 1, &[1, 2, 3, 4, 5, 6]);
        assert_eq!(rgba, vec![1, 2, 3, 255, 4, 5, 6, 255]);
    }

    #[test]
    #[should_panic(expected = "pixel buffer too short")]
    fn short_pixel_buffer_is_fatal() {
        expand_to_rgba(4, 2, 2, &[0; 8]);
    }
}
