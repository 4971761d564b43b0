use bevy::{platform::collections::HashMap, prelude::*};

use crate::{shader::ReplacementShader, toggle::ToggleState};

/// Tag key used to pair meshes with replacement sub-shaders.
pub const RENDER_TYPE_TAG: &str = "RenderType";

/// Tags declared by the material of a mesh entity.
///
/// The replacing camera compares the value stored under its tag key with the
/// values declared by each sub-shader. A mesh that does not declare the tag is
/// not drawn by that camera.
#[derive(Component, Clone, Debug, Default, PartialEq, Reflect)]
#[reflect(Component, Default)]
pub struct RenderTags(pub HashMap<String, String>);

impl RenderTags {
    /// Tags with a single `RenderType` value.
    pub fn render_type(value: impl Into<String>) -> Self {
        Self::default().with(RENDER_TYPE_TAG, value)
    }

    /// Add or overwrite a tag.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Value declared for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

/// Camera component that swaps the shader of every matching mesh for a
/// replacement shader while enabled.
///
/// Add this to a camera entity. It activates on the first `PostUpdate` after
/// being added. [`set_enabled`](Self::set_enabled) switches it on or off
/// immediately; disabling it or removing the component reverts the camera to
/// each mesh's own material.
#[derive(Component)]
pub struct ShaderReplacement<M: Material> {
    /// The replacement shader. `None` installs nothing on activation.
    pub shader: Option<Handle<ReplacementShader<M>>>,
    /// Tag key used to match meshes against sub-shaders.
    pub tag: String,
    pub(crate) enabled: bool,
    pub(crate) state: ToggleState,
}

impl<M: Material> Default for ShaderReplacement<M> {
    fn default() -> Self {
        Self {
            shader: None,
            tag: RENDER_TYPE_TAG.to_string(),
            enabled: true,
            state: ToggleState::Inactive,
        }
    }
}

impl<M: Material> ShaderReplacement<M> {
    /// Create an enabled toggle for the given replacement shader.
    pub fn new(shader: Handle<ReplacementShader<M>>) -> Self {
        Self {
            shader: Some(shader),
            ..Default::default()
        }
    }

    /// Start disabled. Nothing is installed until [`set_enabled`](Self::set_enabled).
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Match meshes on a tag key other than `RenderType`.
    ///
    /// An empty key renders every mesh with the first sub-shader.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Set the shader used by the next activation.
    pub fn configure(&mut self, shader: Option<Handle<ReplacementShader<M>>>) {
        self.shader = shader;
    }

    /// Whether the toggle wants the replacement installed.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Lifecycle state last applied to the camera.
    pub fn state(&self) -> ToggleState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tag_is_undeclared() {
        let tags = RenderTags::render_type("Opaque");
        assert_eq!(tags.get(RENDER_TYPE_TAG), Some("Opaque"));
        assert_eq!(tags.get("Queue"), None);
        assert_eq!(RenderTags::default().get(RENDER_TYPE_TAG), None);
    }

    #[test]
    fn toggle_defaults_to_render_type_and_enabled() {
        let toggle = ShaderReplacement::<StandardMaterial>::default();
        assert!(toggle.shader.is_none());
        assert!(toggle.is_enabled());
        assert!(!ShaderReplacement::<StandardMaterial>::default().disabled().is_enabled());
        assert_eq!(toggle.tag, RENDER_TYPE_TAG);
        assert_eq!(toggle.state(), ToggleState::Inactive);
    }
}
