//! Scene data model: textures, meshes, materials, objects, instance groups
//! and stages, all stored in append-only pools and referenced by handles.
//!
//! Nothing in here touches the GPU. The [`crate::render::Renderer`] uploads
//! pool contents on demand and resolves handles at draw time.

use cgmath::{Matrix4, Vector3, Zero};

use crate::data_structures::pool::{Handle, Pool};

/// CPU-side texture record. Pixel data is owned here until the renderer
/// uploads it.
#[derive(Clone, Debug, Default)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    pub channels: u32,
    pub use_nearest: bool,
    pub use_mipmaps: bool,
    pub pixels: Vec<u8>,
}

/// Interleaving layout of a custom vertex buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MeshFormat {
    /// 8 floats per vertex: position (3), normal (3), uv (2).
    #[default]
    PositionNormalUv,
}

impl MeshFormat {
    /// Floats per vertex for this layout.
    pub fn stride(self) -> usize {
        match self {
            MeshFormat::PositionNormalUv => 8,
        }
    }
}

/// Tagged union over mesh representations. Only custom buffers exist today;
/// the enum leaves the geometry-pass dispatch untouched when more arrive.
#[derive(Clone, Debug)]
pub enum MeshKind {
    Custom {
        vertices: Vec<f32>,
        indices: Vec<u32>,
        vertex_count: usize,
        index_count: usize,
        format: MeshFormat,
    },
}

#[derive(Clone, Debug)]
pub struct Mesh {
    pub kind: MeshKind,
}

impl Default for Mesh {
    fn default() -> Self {
        Self {
            kind: MeshKind::Custom {
                vertices: Vec::new(),
                indices: Vec::new(),
                vertex_count: 0,
                index_count: 0,
                format: MeshFormat::PositionNormalUv,
            },
        }
    }
}

/// Material record for the PBR pipeline, with the legacy scalar fields the
/// secondary shading mode still reads.
#[derive(Clone, Debug)]
pub struct Material {
    pub albedo: Vector3<f32>,
    pub emission: Vector3<f32>,
    pub roughness: f32,
    pub metallic: f32,
    pub fresnel: f32,

    pub albedo_texture: Option<Handle<Texture>>,
    pub roughness_texture: Option<Handle<Texture>>,
    pub metallic_texture: Option<Handle<Texture>>,
    pub normal_texture: Option<Handle<Texture>>,
    pub emission_texture: Option<Handle<Texture>>,

    // Legacy shading mode.
    pub kd: Vector3<f32>,
    pub ka: Vector3<f32>,
    pub ks: Vector3<f32>,
    pub shininess: f32,
    pub specular_texture: Option<Handle<Texture>>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            albedo: Vector3::new(1.0, 1.0, 1.0),
            emission: Vector3::zero(),
            roughness: 1.0,
            metallic: 0.0,
            fresnel: 0.04,
            albedo_texture: None,
            roughness_texture: None,
            metallic_texture: None,
            normal_texture: None,
            emission_texture: None,
            kd: Vector3::zero(),
            ka: Vector3::zero(),
            ks: Vector3::zero(),
            shininess: 0.0,
            specular_texture: None,
        }
    }
}

/// A renderable pairing of mesh and material, with optional LOD meshes.
#[derive(Clone, Debug, Default)]
pub struct Object {
    pub mesh: Handle<Mesh>,
    pub material: Handle<Material>,
    pub mesh_lod: Vec<Handle<Mesh>>,
}

/// One object drawn once per world transform, sharing one bound
/// mesh/material across the whole group.
#[derive(Clone, Debug, Default)]
pub struct InstanceGroup {
    pub object: Handle<Object>,
    pub transforms: Vec<Matrix4<f32>>,
}

/// One renderable scene state: objects, instances, camera and environment.
#[derive(Clone, Debug)]
pub struct Stage {
    pub objects: Pool<Object>,
    pub instances: Pool<InstanceGroup>,
    pub sky_texture: Option<Handle<Texture>>,
    pub cam_pos: Vector3<f32>,
    pub cam_dir: Vector3<f32>,
}

impl Default for Stage {
    fn default() -> Self {
        Self {
            objects: Pool::new(),
            instances: Pool::new(),
            sky_texture: None,
            cam_pos: Vector3::zero(),
            cam_dir: Vector3::new(0.0, 0.0, -1.0),
        }
    }
}

impl Stage {
    pub fn add_object(&mut self) -> Handle<Object> {
        self.objects.add()
    }

    pub fn add_instance_group(&mut self) -> Handle<InstanceGroup> {
        self.instances.add()
    }
}

/// Global asset tables plus the stage list. A scene always owns at least
/// one stage so that `current_stage()` can uphold its contract.
#[derive(Clone, Debug)]
pub struct Scene {
    pub textures: Pool<Texture>,
    pub meshes: Pool<Mesh>,
    pub materials: Pool<Material>,
    pub stages: Pool<Stage>,
    current_stage: usize,
}

impl Scene {
    pub fn new() -> Self {
        let mut stages = Pool::new();
        stages.add();
        Self {
            textures: Pool::new(),
            meshes: Pool::new(),
            materials: Pool::new(),
            stages,
            current_stage: 0,
        }
    }

    pub fn add_texture(&mut self, texture: Texture) -> Handle<Texture> {
        self.textures.push(texture)
    }

    pub fn add_mesh(&mut self) -> Handle<Mesh> {
        self.meshes.add()
    }

    pub fn add_material(&mut self) -> Handle<Material> {
        self.materials.add()
    }

    pub fn add_stage(&mut self) -> Handle<Stage> {
        self.stages.add()
    }

    pub fn current_stage_index(&self) -> usize {
        self.current_stage
    }

    pub fn set_current_stage(&mut self, handle: Handle<Stage>) {
        self.current_stage = handle.index();
    }

    /// The stage the renderer draws this frame. Aborts if the current-stage
    /// index no longer points at a stage.
    pub fn current_stage(&self) -> &Stage {
        assert!(
            self.current_stage < self.stages.len(),
            "invalid current stage {} of {}",
            self.current_stage,
            self.stages.len()
        );
        self.stages.get(Handle::new(self.current_stage))
    }

    pub fn current_stage_mut(&mut self) -> &mut Stage {
        assert!(
            self.current_stage < self.stages.len(),
            "invalid current stage {} of {}",
            self.current_stage,
            self.stages.len()
        );
        self.stages.get_mut(Handle::new(self.current_stage))
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience constructor for a unit quad in the X/Z plane, interleaved in
/// the default mesh format. Handy for tests and simple ground planes.
pub fn unit_quad_mesh() -> Mesh {
    #[rustfmt::skip]
    let vertices: Vec<f32> = vec![
        0.0, 0.0, 0.0,  0.0, 1.0, 0.0,  0.0, 0.0,
        0.0, 0.0, 1.0,  0.0, 1.0, 0.0,  0.0, 1.0,
        1.0, 0.0, 1.0,  0.0, 1.0, 0.0,  1.0, 1.0,
        1.0, 0.0, 0.0,  0.0, 1.0, 0.0,  1.0, 0.0,
    ];
    let indices: Vec<u32> = vec![0, 1, 2, 2, 3, 0];
    Mesh {
        kind: MeshKind::Custom {
            vertex_count: 4,
            index_count: 6,
            vertices,
            indices,
            format: MeshFormat::PositionNormalUv,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_scene_has_one_stage_and_current_index_zero() {
        let scene = Scene::new();
        assert_eq!(scene.stages.len(), 1);
        assert_eq!(scene.current_stage_index(), 0);
        // Must not abort on a fresh scene.
        let stage = scene.current_stage();
        assert!(stage.objects.is_empty());
        assert!(stage.sky_texture.is_none());
    }

    #[test]
    fn entities_keep_creation_time_values() {
        let mut scene = Scene::new();
        let tex = scene.add_texture(Texture {
            width: 2,
            height: 2,
            channels: 3,
            pixels: vec![0; 12],
            ..Default::default()
        });
        let mat = scene.add_material();
        scene.materials.get_mut(mat).albedo_texture = Some(tex);

        for _ in 0..10 {
            scene.add_material();
            scene.add_mesh();
        }

        assert_eq!(scene.textures.get(tex).width, 2);
        assert_eq!(scene.materials.get(mat).albedo_texture, Some(tex));
        assert_eq!(scene.materials.get(mat).albedo.x, 1.0);
    }

    #[test]
    fn unit_quad_matches_default_format() {
        let mesh = unit_quad_mesh();
        let MeshKind::Custom {
            vertices,
            indices,
            vertex_count,
            index_count,
            format,
        } = mesh.kind;
        assert_eq!(format, MeshFormat::PositionNormalUv);
        assert_eq!(vertices.len(), vertex_count * format.stride());
        assert_eq!(indices.len(), index_count);
    }
}
