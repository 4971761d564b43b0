use bevy::prelude::*;

use crate::shader::ReplacementShader;

/// Substitution rule installed on a camera.
pub struct ActiveReplacement<M: Material> {
    pub shader: Handle<ReplacementShader<M>>,
    pub tag: String,
}

impl<M: Material> PartialEq for ActiveReplacement<M> {
    fn eq(&self, other: &Self) -> bool {
        self.shader == other.shader && self.tag == other.tag
    }
}

impl<M: Material> std::fmt::Debug for ActiveReplacement<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveReplacement")
            .field("shader", &self.shader.id())
            .field("tag", &self.tag)
            .finish()
    }
}

/// Replacement-shader state of a camera.
///
/// Inserted on cameras carrying a [`ShaderReplacement`](crate::ShaderReplacement).
/// While a rule is installed the camera draws every matching mesh with the
/// replacement shader instead of the mesh's own material.
#[derive(Component)]
pub struct ReplacementShaderSlot<M: Material> {
    active: Option<ActiveReplacement<M>>,
}

impl<M: Material> Default for ReplacementShaderSlot<M> {
    fn default() -> Self {
        Self { active: None }
    }
}

impl<M: Material> ReplacementShaderSlot<M> {
    /// Render every mesh whose `tag` value matches one of the shader's
    /// sub-shaders with that sub-shader. Replaces any previous rule.
    pub fn set_replacement_shader(&mut self, shader: Handle<ReplacementShader<M>>, tag: impl Into<String>) {
        self.active = Some(ActiveReplacement {
            shader,
            tag: tag.into(),
        });
    }

    /// Go back to each mesh's own material.
    pub fn reset_replacement_shader(&mut self) {
        self.active = None;
    }

    pub fn active(&self) -> Option<&ActiveReplacement<M>> {
        self.active.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }
}
