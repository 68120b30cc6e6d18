//! Import-time deduplication cache.
//!
//! During one import, a source asset may reference the same image or mesh
//! from many nodes. The cache maps source keys to the pool handles already
//! created for them so each source entity is materialized at most once.
//!
//! The cache is an explicit object owned by the caller and scoped to one
//! import: [`crate::resources::import_scene`] clears it before traversal,
//! so handles from a previous, unrelated import can never leak into cache
//! hits for a new one.

use std::collections::HashMap;

use crate::data_structures::{Handle, Material, Mesh, Texture};

#[derive(Debug, Default)]
pub struct ImportCache {
    textures: HashMap<String, Handle<Texture>>,
    materials: HashMap<usize, Handle<Material>>,
    meshes: HashMap<usize, Handle<Mesh>>,
}

impl ImportCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all mappings. Must run before a new import begins.
    pub fn clear(&mut self) {
        self.textures.clear();
        self.materials.clear();
        self.meshes.clear();
    }

    pub fn texture(&self, key: &str) -> Option<Handle<Texture>> {
        self.textures.get(key).copied()
    }

    pub fn record_texture(&mut self, key: &str, handle: Handle<Texture>) {
        self.textures.insert(key.to_string(), handle);
    }

    pub fn material(&self, source_index: usize) -> Option<Handle<Material>> {
        self.materials.get(&source_index).copied()
    }

    pub fn record_material(&mut self, source_index: usize, handle: Handle<Material>) {
        self.materials.insert(source_index, handle);
    }

    pub fn mesh(&self, source_index: usize) -> Option<Handle<Mesh>> {
        self.meshes.get(&source_index).copied()
    }

    pub fn record_mesh(&mut self, source_index: usize, handle: Handle<Mesh>) {
        self.meshes.insert(source_index, handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::Scene;

    // Get-or-create as the importer drives it, with an observable decode.
    fn fetch_texture(
        cache: &mut ImportCache,
        scene: &mut Scene,
        key: &str,
        decodes: &mut u32,
    ) -> Handle<Texture> {
        if let Some(handle) = cache.texture(key) {
            return handle;
        }
        *decodes += 1;
        let handle = scene.add_texture(Texture::default());
        cache.record_texture(key, handle);
        handle
    }

    #[test]
    fn repeated_key_returns_same_handle_and_decodes_once() {
        let mut cache = ImportCache::new();
        let mut scene = Scene::new();
        let mut decodes = 0;

        let first = fetch_texture(&mut cache, &mut scene, "x.png", &mut decodes);
        let second = fetch_texture(&mut cache, &mut scene, "x.png", &mut decodes);

        assert_eq!(first, second);
        assert_eq!(decodes, 1);
        assert_eq!(scene.textures.len(), 1);
    }

    #[test]
    fn clear_isolates_imports() {
        let mut cache = ImportCache::new();
        let mut scene = Scene::new();
        let mut decodes = 0;

        fetch_texture(&mut cache, &mut scene, "x.png", &mut decodes);
        assert_eq!(decodes, 1);

        // New import: the old mapping must not leak in.
        cache.clear();
        let fresh = fetch_texture(&mut cache, &mut scene, "x.png", &mut decodes);
        assert_eq!(decodes, 2);
        assert_eq!(fresh.index(), 1);
    }

    #[test]
    fn mesh_and_material_keys_are_independent() {
        let mut cache = ImportCache::new();
        let mut scene = Scene::new();

        let mesh = scene.add_mesh();
        let material = scene.add_material();
        cache.record_mesh(0, mesh);
        cache.record_material(0, material);

        assert_eq!(cache.mesh(0), Some(mesh));
        assert_eq!(cache.material(0), Some(material));
        assert_eq!(cache.mesh(1), None);
    }
}
