//! Loading of external assets into a [`Scene`].
//!
//! The importer walks a glTF document depth-first, parent before children,
//! and fills the scene's entity pools through an [`ImportCache`] so that
//! every source mesh, material and image is materialized at most once per
//! import. Each mesh reference on a node becomes one [`Object`] plus one
//! [`InstanceGroup`] in the scene's current stage.

use std::path::Path;

use anyhow::{Context as _, Result, bail};
use cgmath::{Matrix4, SquareMatrix, Vector3};

use crate::data_structures::{
    Handle, Material, Mesh, MeshFormat, MeshKind, Object, Scene, Texture,
};

pub mod cache;

pub use cache::ImportCache;

/// Import every scene of the glTF file at `path` into `scene`'s current
/// stage.
///
/// The cache is cleared up front, scoping all deduplication to this one
/// call. An unreadable or malformed file is reported as an error; it is the
/// caller's decision whether to stop or continue.
pub fn import_scene(
    path: impl AsRef<Path>,
    scene: &mut Scene,
    cache: &mut ImportCache,
) -> Result<()> {
    let path = path.as_ref();
    cache.clear();

    let (document, buffers, images) = gltf::import(path)
        .with_context(|| format!("failed to import scene from {}", path.display()))?;

    for source_scene in document.scenes() {
        for node in source_scene.nodes() {
            process_node(&node, Matrix4::identity(), &buffers, &images, scene, cache)?;
        }
    }

    log::info!("[LOADER] scene processing successful for {}", path.display());
    Ok(())
}

/// Depth-first traversal. The per-node transform accumulates
/// multiplicatively from the root; only its translation component is
/// carried into the emitted instance transform (matching the source
/// engine's behavior, which decomposes but discards rotation and scale).
fn process_node(
    node: &gltf::Node,
    parent_transform: Matrix4<f32>,
    buffers: &[gltf::buffer::Data],
    images: &[gltf::image::Data],
    scene: &mut Scene,
    cache: &mut ImportCache,
) -> Result<()> {
    let node_transform = parent_transform * Matrix4::from(node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        let mesh_handle = process_mesh(&mesh, buffers, scene, cache)?;
        let material_handle = process_material(&mesh, images, scene, cache)?;

        let translation = Vector3::new(node_transform.w.x, node_transform.w.y, node_transform.w.z);

        let stage = scene.current_stage_mut();
        let object = stage.add_object();
        *stage.objects.get_mut(object) = Object {
            mesh: mesh_handle,
            material: material_handle,
            mesh_lod: Vec::new(),
        };

        let group = stage.add_instance_group();
        let group = stage.instances.get_mut(group);
        group.object = object;
        group.transforms.push(Matrix4::from_translation(translation));

        log::info!("[LOADER] object created {}", object.index());
    }

    for child in node.children() {
        process_node(&child, node_transform, buffers, images, scene, cache)?;
    }
    Ok(())
}

/// Get-or-create a mesh pool entry for a source mesh, keyed by its native
/// index. All primitives are concatenated into one interleaved buffer in
/// the default format.
fn process_mesh(
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    scene: &mut Scene,
    cache: &mut ImportCache,
) -> Result<Handle<Mesh>> {
    if let Some(handle) = cache.mesh(mesh.index()) {
        return Ok(handle);
    }

    let format = MeshFormat::PositionNormalUv;
    let mut vertices: Vec<f32> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();
    let mut vertex_count = 0usize;

    for primitive in mesh.primitives() {
        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

        let positions: Vec<[f32; 3]> = reader
            .read_positions()
            .map(|iter| iter.collect())
            .unwrap_or_default();
        let normals: Vec<[f32; 3]> = reader
            .read_normals()
            .map(|iter| iter.collect())
            .unwrap_or_default();
        let uvs: Vec<[f32; 2]> = reader
            .read_tex_coords(0)
            .map(|coords| coords.into_f32().collect())
            .unwrap_or_default();

        let base = vertex_count as u32;
        for (i, position) in positions.iter().enumerate() {
            vertices.extend_from_slice(position);
            vertices.extend_from_slice(normals.get(i).unwrap_or(&[0.0, 0.0, 0.0]));
            vertices.extend_from_slice(uvs.get(i).unwrap_or(&[0.0, 0.0]));
        }
        vertex_count += positions.len();

        if let Some(raw) = reader.read_indices() {
            indices.extend(raw.into_u32().map(|index| base + index));
        }
    }

    if vertices.len() != vertex_count * format.stride() {
        bail!("vertex buffer overflow in mesh {}", mesh.index());
    }

    let handle = scene.add_mesh();
    *scene.meshes.get_mut(handle) = Mesh {
        kind: MeshKind::Custom {
            vertex_count,
            index_count: indices.len(),
            vertices,
            indices,
            format,
        },
    };
    cache.record_mesh(mesh.index(), handle);
    log::info!("[LOADER] mesh created {}", handle.index());
    Ok(handle)
}

/// Get-or-create a material pool entry from the source mesh's first
/// primitive material, resolving its base-color and normal textures through
/// the cache.
fn process_material(
    mesh: &gltf::Mesh,
    images: &[gltf::image::Data],
    scene: &mut Scene,
    cache: &mut ImportCache,
) -> Result<Handle<Material>> {
    let material = mesh
        .primitives()
        .next()
        .map(|primitive| primitive.material())
        .context("mesh without primitives has no material")?;
    let source_index = material.index().unwrap_or(0);

    if let Some(handle) = cache.material(source_index) {
        return Ok(handle);
    }

    let pbr = material.pbr_metallic_roughness();
    let base_color = pbr.base_color_factor();
    let albedo = Vector3::new(base_color[0], base_color[1], base_color[2]);
    let emissive = material.emissive_factor();

    let albedo_texture = match pbr.base_color_texture() {
        Some(info) => Some(process_texture(&info.texture(), images, scene, cache)?),
        None => None,
    };
    let normal_texture = match material.normal_texture() {
        Some(info) => Some(process_texture(&info.texture(), images, scene, cache)?),
        None => None,
    };

    let handle = scene.add_material();
    let entry = scene.materials.get_mut(handle);
    entry.albedo = albedo;
    entry.emission = Vector3::new(emissive[0], emissive[1], emissive[2]);
    entry.roughness = pbr.roughness_factor();
    entry.metallic = pbr.metallic_factor();
    entry.albedo_texture = albedo_texture;
    entry.normal_texture = normal_texture;
    // The legacy shading mode reads kd; mirror the base color there.
    entry.kd = albedo;

    cache.record_material(source_index, handle);
    log::info!("[LOADER] material created {}", handle.index());
    Ok(handle)
}

/// Get-or-create a texture pool entry, keyed by the image URI (embedded
/// images key on their image index). The decoded pixels come from the glTF
/// importer; the pool owns them until upload.
fn process_texture(
    texture: &gltf::texture::Texture,
    images: &[gltf::image::Data],
    scene: &mut Scene,
    cache: &mut ImportCache,
) -> Result<Handle<Texture>> {
    let image = texture.source();
    let key = match image.source() {
        gltf::image::Source::Uri { uri, .. } => uri.to_string(),
        gltf::image::Source::View { .. } => format!("embedded#{}", image.index()),
    };

    if let Some(handle) = cache.texture(&key) {
        return Ok(handle);
    }

    let data = &images[image.index()];
    let channels = match data.format {
        gltf::image::Format::R8 => 1,
        gltf::image::Format::R8G8 => 2,
        gltf::image::Format::R8G8B8 => 3,
        gltf::image::Format::R8G8B8A8 => 4,
        other => bail!("unsupported image format {:?} for {}", other, key),
    };

    let use_nearest = texture
        .sampler()
        .mag_filter()
        .map(|filter| filter == gltf::texture::MagFilter::Nearest)
        .unwrap_or(false);
    let use_mipmaps = matches!(
        texture.sampler().min_filter(),
        Some(
            gltf::texture::MinFilter::NearestMipmapNearest
                | gltf::texture::MinFilter::LinearMipmapNearest
                | gltf::texture::MinFilter::NearestMipmapLinear
                | gltf::texture::MinFilter::LinearMipmapLinear
        )
    );

    let handle = scene.add_texture(Texture {
        width: data.width,
        height: data.height,
        channels,
        use_nearest,
        use_mipmaps,
        pixels: data.pixels.clone(),
    });
    cache.record_texture(&key, handle);
    log::info!("[LOADER] texture created {} ({})", handle.index(), key);
    Ok(handle)
}
