use std::marker::PhantomData;

use bevy::{prelude::*, transform::TransformSystems};

use crate::{
    proxy::{
        release_replacement_layers, sync_replacement_proxies, sync_replacement_views,
        ReplacementLayers, DEFAULT_REPLACEMENT_LAYER_BASE,
    },
    shader::ReplacementShader,
    toggle::{apply_inserted_toggles, deactivate_removed_toggles, init_replacement_cameras},
};

/// Systems that apply [`ShaderReplacement`](crate::ShaderReplacement) toggles and
/// keep replacement proxies in sync. Runs in `PostUpdate` after transform propagation.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShaderReplacementSystems;

/// Plugin that enables camera shader replacement with materials of type `M`.
///
/// Add one per material type used by replacement sub-shaders. `M` must
/// already be registered, e.g. through [`MaterialPlugin`].
pub struct ShaderReplacementPlugin<M: Material> {
    /// First render layer handed to replacing cameras. Only the first plugin
    /// added sets it.
    pub layer_base: usize,
    _marker: PhantomData<fn() -> M>,
}

impl<M: Material> Default for ShaderReplacementPlugin<M> {
    fn default() -> Self {
        Self {
            layer_base: DEFAULT_REPLACEMENT_LAYER_BASE,
            _marker: PhantomData,
        }
    }
}

impl<M: Material> ShaderReplacementPlugin<M> {
    pub fn with_layer_base(layer_base: usize) -> Self {
        Self {
            layer_base,
            ..Default::default()
        }
    }
}

impl<M: Material> Plugin for ShaderReplacementPlugin<M> {
    fn build(&self, app: &mut App) {
        app.init_asset::<ReplacementShader<M>>();

        // Shared by every material type.
        if !app.world().contains_resource::<ReplacementLayers>() {
            app.insert_resource(ReplacementLayers::new(self.layer_base))
                .configure_sets(
                    PostUpdate,
                    ShaderReplacementSystems.after(TransformSystems::Propagate),
                )
                .add_systems(
                    PostUpdate,
                    release_replacement_layers.in_set(ShaderReplacementSystems),
                );
        }

        app.add_systems(
            PostUpdate,
            (
                deactivate_removed_toggles::<M>,
                init_replacement_cameras::<M>,
                apply_inserted_toggles::<M>,
                sync_replacement_views::<M>,
                sync_replacement_proxies::<M>,
            )
                .chain()
                .in_set(ShaderReplacementSystems),
        );
    }
}
