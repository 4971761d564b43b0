//! Flat-colour material for replacement sub-shaders.
//!
//! Skips lighting entirely, so it renders the same on a replacement layer that
//! no light reaches. Handy for visualising which meshes carry which render type.

use bevy::{asset::embedded_asset, prelude::*, render::render_resource::AsBindGroup, shader::ShaderRef};

/// Unlit material with a constant colour, shaded slightly by the surface normal.
#[derive(Asset, TypePath, AsBindGroup, Clone, Debug)]
pub struct RenderTypeMaterial {
    #[uniform(0)]
    pub color: LinearRgba,
}

impl Default for RenderTypeMaterial {
    fn default() -> Self {
        Self {
            color: LinearRgba::WHITE,
        }
    }
}

impl RenderTypeMaterial {
    pub fn new(color: impl Into<LinearRgba>) -> Self {
        Self {
            color: color.into(),
        }
    }
}

impl Material for RenderTypeMaterial {
    fn fragment_shader() -> ShaderRef {
        "embedded://bevy_shader_replacement/shaders/render_type.wgsl".into()
    }

    fn alpha_mode(&self) -> AlphaMode {
        if self.color.alpha < 1.0 {
            AlphaMode::Blend
        } else {
            AlphaMode::Opaque
        }
    }
}

/// Registers [`RenderTypeMaterial`] and its embedded shader.
pub struct RenderTypeMaterialPlugin;

impl Plugin for RenderTypeMaterialPlugin {
    fn build(&self, app: &mut App) {
        embedded_asset!(app, "shaders/render_type.wgsl");
        app.add_plugins(MaterialPlugin::<RenderTypeMaterial>::default());
    }
}
