//! Puts an active replacement on screen.
//!
//! Bevy materials are bound per mesh, so a camera cannot swap shaders on its
//! own. Instead each replacing camera is moved onto a dedicated render layer,
//! and every mesh it would have drawn gets a proxy copy on that layer using
//! the material of the matching sub-shader. Meshes with no matching
//! sub-shader get no proxy and disappear from that camera.
//!
//! Proxies carry the source's `SkinnedMesh` and `MeshMorphWeights`, so skinned
//! and morphed meshes keep their pose. Anything else on the source, such as
//! shadow settings, is not copied.

use bevy::{
    camera::visibility::RenderLayers,
    mesh::{morph::MeshMorphWeights, skinning::SkinnedMesh},
    platform::collections::{HashMap, HashSet},
    prelude::*,
};

use crate::{camera::ReplacementShaderSlot, components::RenderTags, shader::ReplacementShader};

/// First render layer handed to replacing cameras.
pub const DEFAULT_REPLACEMENT_LAYER_BASE: usize = 24;

/// Hands out one render layer per replacing camera.
#[derive(Resource, Debug)]
pub struct ReplacementLayers {
    base: usize,
    next: usize,
    free: Vec<usize>,
    assigned: HashMap<Entity, usize>,
}

impl Default for ReplacementLayers {
    fn default() -> Self {
        Self::new(DEFAULT_REPLACEMENT_LAYER_BASE)
    }
}

impl ReplacementLayers {
    pub fn new(base: usize) -> Self {
        Self {
            base,
            next: base,
            free: Vec::new(),
            assigned: HashMap::default(),
        }
    }

    pub fn base(&self) -> usize {
        self.base
    }

    /// Layer for `camera`, allocating one if it has none.
    pub fn acquire(&mut self, camera: Entity) -> usize {
        if let Some(&layer) = self.assigned.get(&camera) {
            return layer;
        }
        let layer = self.free.pop().unwrap_or_else(|| {
            let layer = self.next;
            self.next += 1;
            layer
        });
        self.assigned.insert(camera, layer);
        layer
    }

    /// Return the camera's layer to the pool.
    pub fn release(&mut self, camera: Entity) -> Option<usize> {
        let layer = self.assigned.remove(&camera)?;
        self.free.push(layer);
        Some(layer)
    }

    pub fn layer_of(&self, camera: Entity) -> Option<usize> {
        self.assigned.get(&camera).copied()
    }
}

/// Realized replacement on a camera.
#[derive(Component, Debug)]
pub struct ReplacementView {
    pub layer: usize,
    original_layers: Option<RenderLayers>,
    /// Source mesh -> proxy.
    proxies: HashMap<Entity, Entity>,
}

impl ReplacementView {
    pub fn proxy_of(&self, source: Entity) -> Option<Entity> {
        self.proxies.get(&source).copied()
    }

    pub fn proxy_count(&self) -> usize {
        self.proxies.len()
    }
}

/// Marker for proxy meshes drawn by a replacing camera.
#[derive(Component, Debug, Clone, Copy)]
pub struct ReplacementProxy {
    pub source: Entity,
    pub camera: Entity,
}

fn despawn_proxy(commands: &mut Commands, proxy: Entity) {
    if let Ok(mut proxy) = commands.get_entity(proxy) {
        proxy.try_despawn();
    }
}

fn copy_deformation(
    commands: &mut Commands,
    proxy: Entity,
    skin: Option<&SkinnedMesh>,
    morph: Option<&MeshMorphWeights>,
) {
    if skin.is_none() && morph.is_none() {
        return;
    }
    let mut proxy = commands.entity(proxy);
    if let Some(skin) = skin {
        proxy.insert(skin.clone());
    }
    if let Some(morph) = morph {
        proxy.insert(morph.clone());
    }
}

/// Moves cameras onto or off their replacement layer when their slot changes.
pub fn sync_replacement_views<M: Material>(
    mut commands: Commands,
    mut layers: ResMut<ReplacementLayers>,
    cameras: Query<
        (
            Entity,
            &ReplacementShaderSlot<M>,
            Option<&RenderLayers>,
            Option<&ReplacementView>,
        ),
        Changed<ReplacementShaderSlot<M>>,
    >,
) {
    for (camera, slot, render_layers, view) in cameras.iter() {
        match (slot.is_active(), view) {
            (true, None) => {
                let layer = layers.acquire(camera);
                commands.entity(camera).insert((
                    RenderLayers::layer(layer),
                    ReplacementView {
                        layer,
                        original_layers: render_layers.cloned(),
                        proxies: HashMap::default(),
                    },
                ));
                info!("Camera {camera} rendering with replacement shader on layer {layer}");
            }
            (false, Some(view)) => {
                for &proxy in view.proxies.values() {
                    despawn_proxy(&mut commands, proxy);
                }
                let mut entity = commands.entity(camera);
                match &view.original_layers {
                    Some(original) => entity.insert(original.clone()),
                    None => entity.remove::<RenderLayers>(),
                };
                entity.remove::<ReplacementView>();
                layers.release(camera);
                info!("Camera {camera} back to default shaders");
            }
            _ => {}
        }
    }
}

/// Keeps one proxy per matching mesh for every replacing camera.
pub fn sync_replacement_proxies<M: Material>(
    mut commands: Commands,
    shaders: Res<Assets<ReplacementShader<M>>>,
    mut cameras: Query<(Entity, &ReplacementShaderSlot<M>, &mut ReplacementView)>,
    sources: Query<
        (
            Entity,
            &Mesh3d,
            Ref<GlobalTransform>,
            Option<&RenderTags>,
            Option<&RenderLayers>,
            Option<&InheritedVisibility>,
            Option<Ref<SkinnedMesh>>,
            Option<Ref<MeshMorphWeights>>,
        ),
        Without<ReplacementProxy>,
    >,
    mut proxies: Query<
        (&mut Mesh3d, &mut MeshMaterial3d<M>, &mut Transform, &mut GlobalTransform),
        With<ReplacementProxy>,
    >,
) {
    let default_layers = RenderLayers::default();

    for (camera, slot, mut view) in cameras.iter_mut() {
        let Some(active) = slot.active() else {
            continue;
        };
        // Not loaded yet, or removed: draw nothing rather than stale materials.
        let Some(shader) = shaders.get(&active.shader) else {
            for (_, proxy) in view.proxies.drain() {
                despawn_proxy(&mut commands, proxy);
            }
            continue;
        };

        let original_layers = view.original_layers.clone().unwrap_or_default();
        let mut matched: HashSet<Entity> = HashSet::default();

        for (source, mesh, global, tags, layers, visibility, skin, morph) in sources.iter() {
            if visibility.is_some_and(|visibility| !visibility.get()) {
                continue;
            }
            if !layers.unwrap_or(&default_layers).intersects(&original_layers) {
                continue;
            }
            let Some(subshader) = shader.subshader_for(&active.tag, tags) else {
                continue;
            };
            matched.insert(source);

            let Some(proxy) = view.proxy_of(source) else {
                let proxy = commands
                    .spawn((
                        ReplacementProxy { source, camera },
                        Mesh3d(mesh.0.clone()),
                        MeshMaterial3d(subshader.material.clone()),
                        global.compute_transform(),
                        *global,
                        RenderLayers::layer(view.layer),
                    ))
                    .id();
                copy_deformation(&mut commands, proxy, skin.as_deref(), morph.as_deref());
                view.proxies.insert(source, proxy);
                continue;
            };

            let Ok((mut proxy_mesh, mut material, mut transform, mut proxy_global)) =
                proxies.get_mut(proxy)
            else {
                // Despawned behind our back; respawn next frame.
                view.proxies.remove(&source);
                continue;
            };
            if proxy_mesh.0 != mesh.0 {
                proxy_mesh.0 = mesh.0.clone();
            }
            if material.0 != subshader.material {
                material.0 = subshader.material.clone();
            }
            if global.is_changed() {
                *transform = global.compute_transform();
                *proxy_global = *global;
            }
            copy_deformation(
                &mut commands,
                proxy,
                skin.as_ref().filter(|skin| skin.is_changed()).map(|skin| &**skin),
                morph.as_ref().filter(|morph| morph.is_changed()).map(|morph| &**morph),
            );
        }

        view.proxies.retain(|source, proxy| {
            let keep = matched.contains(source);
            if !keep {
                despawn_proxy(&mut commands, *proxy);
            }
            keep
        });
    }
}

/// Frees the layer and proxies of cameras despawned while replacing.
pub fn release_replacement_layers(
    mut commands: Commands,
    mut layers: ResMut<ReplacementLayers>,
    mut removed: RemovedComponents<ReplacementView>,
    views: Query<(), With<ReplacementView>>,
    proxies: Query<(Entity, &ReplacementProxy)>,
) {
    let mut released = false;
    for camera in removed.read() {
        if views.contains(camera) {
            continue;
        }
        released |= layers.release(camera).is_some();
    }
    if !released {
        return;
    }

    for (proxy, link) in proxies.iter() {
        if !views.contains(link.camera) {
            despawn_proxy(&mut commands, proxy);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{components::ShaderReplacement, plugin::ShaderReplacementPlugin};

    type Toggle = ShaderReplacement<StandardMaterial>;

    #[test]
    fn freed_layers_are_reused() {
        let mut world = World::new();
        let (a, b, c) = (world.spawn_empty().id(), world.spawn_empty().id(), world.spawn_empty().id());

        let mut layers = ReplacementLayers::new(24);
        assert_eq!(layers.acquire(a), 24);
        assert_eq!(layers.acquire(a), 24);
        assert_eq!(layers.acquire(b), 25);

        assert_eq!(layers.release(a), Some(24));
        assert_eq!(layers.release(a), None);
        assert_eq!(layers.acquire(c), 24);
        assert_eq!(layers.layer_of(b), Some(25));
        assert_eq!(layers.layer_of(a), None);
    }

    struct Scene {
        camera: Entity,
        opaque: Entity,
        transparent: Entity,
        untagged: Entity,
        other_layer: Entity,
        opaque_material: Handle<StandardMaterial>,
        shader: Handle<ReplacementShader<StandardMaterial>>,
    }

    fn mesh_entity(app: &mut App, mesh: &Handle<Mesh>, extra: impl Bundle) -> Entity {
        let transform = Transform::from_xyz(1.0, 2.0, 3.0);
        app.world_mut()
            .spawn((
                Mesh3d(mesh.clone()),
                transform,
                GlobalTransform::from(transform),
                InheritedVisibility::VISIBLE,
                extra,
            ))
            .id()
    }

    fn setup() -> (App, Scene) {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .init_asset::<Mesh>()
            .init_asset::<StandardMaterial>()
            .add_plugins(ShaderReplacementPlugin::<StandardMaterial>::default());

        let mesh = app.world_mut().resource_mut::<Assets<Mesh>>().add(Cuboid::default());
        let opaque_material = app
            .world_mut()
            .resource_mut::<Assets<StandardMaterial>>()
            .add(StandardMaterial::default());
        let shader = app
            .world_mut()
            .resource_mut::<Assets<ReplacementShader<StandardMaterial>>>()
            .add(
                ReplacementShader::new()
                    .with_subshader(RenderTags::render_type("Opaque"), opaque_material.clone()),
            );

        let opaque = mesh_entity(&mut app, &mesh, RenderTags::render_type("Opaque"));
        let transparent = mesh_entity(&mut app, &mesh, RenderTags::render_type("Transparent"));
        let untagged = mesh_entity(&mut app, &mesh, ());
        let other_layer = mesh_entity(
            &mut app,
            &mesh,
            (RenderTags::render_type("Opaque"), RenderLayers::layer(3)),
        );
        let camera = app
            .world_mut()
            .spawn((Camera::default(), Toggle::new(shader.clone())))
            .id();

        (
            app,
            Scene {
                camera,
                opaque,
                transparent,
                untagged,
                other_layer,
                opaque_material,
                shader,
            },
        )
    }

    fn proxies(app: &mut App) -> Vec<ReplacementProxy> {
        app.world_mut()
            .query::<&ReplacementProxy>()
            .iter(app.world())
            .copied()
            .collect()
    }

    #[test]
    fn proxies_follow_matching_visible_meshes() {
        let (mut app, scene) = setup();
        app.update();

        let layer = app
            .world()
            .resource::<ReplacementLayers>()
            .layer_of(scene.camera)
            .expect("layer assigned");
        assert_eq!(
            app.world().get::<RenderLayers>(scene.camera),
            Some(&RenderLayers::layer(layer))
        );

        let view = app.world().get::<ReplacementView>(scene.camera).expect("view");
        assert_eq!(view.proxy_count(), 1);
        let proxy = view.proxy_of(scene.opaque).expect("opaque mesh replaced");
        assert!(view.proxy_of(scene.transparent).is_none());
        assert!(view.proxy_of(scene.untagged).is_none());
        assert!(view.proxy_of(scene.other_layer).is_none());

        let world = app.world();
        assert_eq!(
            world.get::<MeshMaterial3d<StandardMaterial>>(proxy).map(|m| m.0.id()),
            Some(scene.opaque_material.id())
        );
        assert_eq!(world.get::<RenderLayers>(proxy), Some(&RenderLayers::layer(layer)));
        assert_eq!(
            world.get::<Transform>(proxy).map(|t| t.translation),
            Some(Vec3::new(1.0, 2.0, 3.0))
        );
    }

    #[test]
    fn retagging_and_despawning_sources_updates_proxies() {
        let (mut app, scene) = setup();
        app.update();
        assert_eq!(proxies(&mut app).len(), 1);

        app.world_mut()
            .entity_mut(scene.transparent)
            .insert(RenderTags::render_type("Opaque"));
        app.update();
        assert_eq!(proxies(&mut app).len(), 2);

        app.world_mut().entity_mut(scene.opaque).despawn();
        app.update();
        let remaining = proxies(&mut app);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].source, scene.transparent);
        assert_eq!(remaining[0].camera, scene.camera);
    }

    #[test]
    fn disabling_restores_the_camera() {
        let (mut app, scene) = setup();
        app.world_mut()
            .entity_mut(scene.camera)
            .insert(RenderLayers::layer(0).with(3));
        app.update();
        assert_eq!(proxies(&mut app).len(), 2);

        {
            let world = app.world_mut();
            let mut query = world.query::<(&mut Toggle, &mut ReplacementShaderSlot<StandardMaterial>)>();
            let (mut toggle, mut slot) = query.get_mut(world, scene.camera).expect("camera");
            toggle.set_enabled(false, &mut slot);
        }
        app.update();

        assert!(proxies(&mut app).is_empty());
        assert!(app.world().get::<ReplacementView>(scene.camera).is_none());
        assert_eq!(
            app.world().get::<RenderLayers>(scene.camera),
            Some(&RenderLayers::layer(0).with(3))
        );
        assert_eq!(
            app.world().resource::<ReplacementLayers>().layer_of(scene.camera),
            None
        );
    }

    #[test]
    fn despawned_camera_releases_its_layer() {
        let (mut app, scene) = setup();
        app.update();
        assert_eq!(proxies(&mut app).len(), 1);

        app.world_mut().entity_mut(scene.camera).despawn();
        app.update();

        assert!(proxies(&mut app).is_empty());
        assert_eq!(
            app.world().resource::<ReplacementLayers>().layer_of(scene.camera),
            None
        );
    }

    #[test]
    fn removed_shader_asset_drops_proxies() {
        let (mut app, scene) = setup();
        app.update();
        assert_eq!(proxies(&mut app).len(), 1);

        app.world_mut()
            .resource_mut::<Assets<ReplacementShader<StandardMaterial>>>()
            .remove(&scene.shader);
        app.update();

        assert!(proxies(&mut app).is_empty());
        let view = app.world().get::<ReplacementView>(scene.camera).expect("still replacing");
        assert_eq!(view.proxy_count(), 0);
    }

    #[test]
    fn skinned_sources_share_their_skin_with_the_proxy() {
        let (mut app, scene) = setup();
        let joint = app.world_mut().spawn(Transform::default()).id();
        app.world_mut().entity_mut(scene.opaque).insert(SkinnedMesh {
            joints: vec![joint],
            ..default()
        });
        app.update();

        let proxy = app
            .world()
            .get::<ReplacementView>(scene.camera)
            .and_then(|view| view.proxy_of(scene.opaque))
            .expect("opaque mesh replaced");
        assert_eq!(
            app.world().get::<SkinnedMesh>(proxy).map(|skin| skin.joints.clone()),
            Some(vec![joint])
        );
    }
}
