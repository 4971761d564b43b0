//! Example showing bevy_shader_replacement driven from an egui panel.
//!
//! Run with: cargo run --example with_egui

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPlugin, EguiPrimaryContextPass};
use bevy_shader_replacement::prelude::*;

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins,
            EguiPlugin::default(),
            RenderTypeMaterialPlugin,
            ShaderReplacementPlugin::<RenderTypeMaterial>::default(),
        ))
        .init_resource::<ReplacementConfig>()
        .add_systems(Startup, setup)
        .add_systems(EguiPrimaryContextPass, ui_system)
        .add_systems(Update, (update_replacement, rotate_cube))
        .run();
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Choice {
    None,
    RenderTypes,
    Everything,
}

#[derive(Resource)]
struct ReplacementConfig {
    enabled: bool,
    choice: Choice,
}

impl Default for ReplacementConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            choice: Choice::RenderTypes,
        }
    }
}

#[derive(Resource)]
struct Shaders {
    render_types: Handle<ReplacementShader<RenderTypeMaterial>>,
    everything: Handle<ReplacementShader<RenderTypeMaterial>>,
}

#[derive(Component)]
struct SpinningCube;

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut flat: ResMut<Assets<RenderTypeMaterial>>,
    mut shaders: ResMut<Assets<ReplacementShader<RenderTypeMaterial>>>,
) {
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(2.0, 2.0, 2.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.8, 0.2, 0.2))),
        Transform::from_xyz(0.0, 1.0, 0.0),
        RenderTags::render_type("Opaque"),
        SpinningCube,
    ));

    // Ground plane, untagged
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(10.0, 10.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.3, 0.3, 0.3))),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 10000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 8.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let render_types = shaders.add(ReplacementShader::new().with_subshader(
        RenderTags::render_type("Opaque"),
        flat.add(RenderTypeMaterial::new(LinearRgba::new(1.0, 0.5, 0.0, 1.0))),
    ));
    let everything = shaders.add(ReplacementShader::single(
        flat.add(RenderTypeMaterial::new(LinearRgba::new(0.8, 0.8, 0.8, 1.0))),
    ));

    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 5.0, 8.0).looking_at(Vec3::ZERO, Vec3::Y),
        ShaderReplacement::new(render_types.clone()),
    ));

    commands.insert_resource(Shaders {
        render_types,
        everything,
    });
}

fn ui_system(mut contexts: EguiContexts, mut config: ResMut<ReplacementConfig>) -> Result {
    egui::Window::new("Shader Replacement").show(contexts.ctx_mut()?, |ui| {
        ui.checkbox(&mut config.enabled, "Enable Replacement");
        ui.radio_value(&mut config.choice, Choice::RenderTypes, "By RenderType");
        ui.radio_value(&mut config.choice, Choice::Everything, "Everything (empty tag)");
        ui.radio_value(&mut config.choice, Choice::None, "No shader");
    });
    Ok(())
}

fn update_replacement(
    config: Res<ReplacementConfig>,
    shaders: Option<Res<Shaders>>,
    mut cameras: Query<(
        &mut ShaderReplacement<RenderTypeMaterial>,
        &mut ReplacementShaderSlot<RenderTypeMaterial>,
    )>,
) {
    if !config.is_changed() {
        return;
    }
    let Some(shaders) = shaders else {
        return;
    };

    let (shader, tag) = match config.choice {
        Choice::None => (None, RENDER_TYPE_TAG),
        Choice::RenderTypes => (Some(shaders.render_types.clone()), RENDER_TYPE_TAG),
        Choice::Everything => (Some(shaders.everything.clone()), ""),
    };

    for (mut replacement, mut slot) in cameras.iter_mut() {
        if replacement.shader != shader || replacement.tag != tag {
            // A new shader only applies on activation, so cycle the toggle.
            replacement.configure(shader.clone());
            replacement.tag = tag.to_string();
            replacement.set_enabled(false, &mut slot);
        }
        replacement.set_enabled(config.enabled, &mut slot);
    }
}

fn rotate_cube(time: Res<Time>, mut query: Query<&mut Transform, With<SpinningCube>>) {
    for mut transform in query.iter_mut() {
        transform.rotate_y(time.delta_secs() * 0.5);
    }
}
