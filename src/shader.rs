//! The replacement shader asset.
//!
//! A replacement shader is a list of sub-shaders. Each sub-shader declares its
//! own tags and the material that renders meshes paired with it.

use bevy::prelude::*;

use crate::components::{RenderTags, RENDER_TYPE_TAG};

/// One pass of a [`ReplacementShader`].
pub struct SubShader<M: Material> {
    pub tags: RenderTags,
    pub material: Handle<M>,
}

/// Shader swapped in by a camera with an active [`ShaderReplacement`](crate::ShaderReplacement).
#[derive(Asset, TypePath)]
pub struct ReplacementShader<M: Material> {
    pub subshaders: Vec<SubShader<M>>,
}

impl<M: Material> Default for ReplacementShader<M> {
    fn default() -> Self {
        Self {
            subshaders: Vec::new(),
        }
    }
}

impl<M: Material> ReplacementShader<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A shader with one untagged sub-shader, for cameras matching on an empty
    /// tag key.
    pub fn single(material: Handle<M>) -> Self {
        Self::new().with_subshader(RenderTags::default(), material)
    }

    /// Append a sub-shader. Earlier sub-shaders win ties.
    pub fn with_subshader(mut self, tags: RenderTags, material: Handle<M>) -> Self {
        self.subshaders.push(SubShader { tags, material });
        self
    }

    /// Sub-shader that renders a mesh carrying `mesh_tags` under `tag_key`.
    ///
    /// An empty key selects the first sub-shader for every mesh. Otherwise the
    /// first sub-shader declaring the same value as the mesh is returned. A mesh
    /// that does not declare the tag matches nothing.
    pub fn subshader_for(&self, tag_key: &str, mesh_tags: Option<&RenderTags>) -> Option<&SubShader<M>> {
        if tag_key.is_empty() {
            return self.subshaders.first();
        }
        let value = mesh_tags?.get(tag_key)?;
        self.subshaders
            .iter()
            .find(|subshader| subshader.tags.get(tag_key) == Some(value))
    }

    /// The `RenderType` values this shader declares, in sub-shader order.
    pub fn render_types(&self) -> impl Iterator<Item = &str> {
        self.subshaders
            .iter()
            .filter_map(|subshader| subshader.tags.get(RENDER_TYPE_TAG))
    }
}
