//! Engine data models: entity pools, handles and the scene/stage graph.

pub mod pool;
pub mod scene;

pub use pool::{Handle, Pool};
pub use scene::{
    InstanceGroup, Material, Mesh, MeshFormat, MeshKind, Object, Scene, Stage, Texture,
};
