//! # Bevy Shader Replacement
//!
//! Per-camera replacement shaders for Bevy 0.18.
//!
//! Add a [`ShaderReplacement`] to a camera and every mesh whose [`RenderTags`]
//! match one of the replacement shader's sub-shaders is drawn by that camera
//! with the sub-shader's material instead of its own. Disable or remove the
//! component to go back to the meshes' own materials.
//!
//! ## Quick Start
//!
//! ```no_run
//! use bevy::prelude::*;
//! use bevy_shader_replacement::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins((
//!             DefaultPlugins,
//!             RenderTypeMaterialPlugin,
//!             ShaderReplacementPlugin::<RenderTypeMaterial>::default(),
//!         ))
//!         .add_systems(Startup, setup)
//!         .run();
//! }
//!
//! fn setup(
//!     mut commands: Commands,
//!     mut meshes: ResMut<Assets<Mesh>>,
//!     mut materials: ResMut<Assets<StandardMaterial>>,
//!     mut flat: ResMut<Assets<RenderTypeMaterial>>,
//!     mut shaders: ResMut<Assets<ReplacementShader<RenderTypeMaterial>>>,
//! ) {
//!     // An opaque cube
//!     commands.spawn((
//!         Mesh3d(meshes.add(Cuboid::default())),
//!         MeshMaterial3d(materials.add(Color::srgb(0.8, 0.2, 0.2))),
//!         RenderTags::render_type("Opaque"),
//!     ));
//!
//!     // Draw opaque meshes flat red
//!     let shader = shaders.add(ReplacementShader::new().with_subshader(
//!         RenderTags::render_type("Opaque"),
//!         flat.add(RenderTypeMaterial::new(LinearRgba::RED)),
//!     ));
//!
//!     commands.spawn((
//!         Camera3d::default(),
//!         Transform::from_xyz(0.0, 2.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
//!         ShaderReplacement::new(shader),
//!     ));
//! }
//! ```

mod camera;
mod components;
mod plugin;
mod proxy;
mod render_type_material;
mod shader;
mod toggle;

pub mod prelude {
    pub use crate::camera::ReplacementShaderSlot;
    pub use crate::components::{RenderTags, ShaderReplacement, RENDER_TYPE_TAG};
    pub use crate::plugin::ShaderReplacementPlugin;
    pub use crate::render_type_material::{RenderTypeMaterial, RenderTypeMaterialPlugin};
    pub use crate::shader::ReplacementShader;
}

pub use camera::{ActiveReplacement, ReplacementShaderSlot};
pub use components::*;
pub use plugin::{ShaderReplacementPlugin, ShaderReplacementSystems};
pub use proxy::{
    ReplacementLayers, ReplacementProxy, ReplacementView, DEFAULT_REPLACEMENT_LAYER_BASE,
};
pub use render_type_material::{RenderTypeMaterial, RenderTypeMaterialPlugin};
pub use shader::{ReplacementShader, SubShader};
pub use toggle::{ReplacementError, ToggleState};
