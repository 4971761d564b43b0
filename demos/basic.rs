//! Basic example showing how to use bevy_shader_replacement.
//!
//! Press Space to toggle the replacement shader.
//!
//! Run with: cargo run --example basic

use bevy::prelude::*;
use bevy_shader_replacement::prelude::*;

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins,
            RenderTypeMaterialPlugin,
            ShaderReplacementPlugin::<RenderTypeMaterial>::default(),
        ))
        .add_systems(Startup, setup)
        .add_systems(Update, (toggle_replacement, rotate_cubes))
        .run();
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut flat: ResMut<Assets<RenderTypeMaterial>>,
    mut shaders: ResMut<Assets<ReplacementShader<RenderTypeMaterial>>>,
) {
    // Opaque cubes
    for x in [-2.0, 0.0] {
        commands.spawn((
            Mesh3d(meshes.add(Cuboid::new(1.0, 1.0, 1.0))),
            MeshMaterial3d(materials.add(Color::srgb(0.8, 0.2, 0.2))),
            Transform::from_xyz(x, 0.5, 0.0),
            RenderTags::render_type("Opaque"),
            Rotates,
        ));
    }

    // Transparent cube
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(1.0, 1.0, 1.0))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgba(0.2, 0.4, 1.0, 0.5),
            alpha_mode: AlphaMode::Blend,
            ..default()
        })),
        Transform::from_xyz(2.0, 0.5, 0.0),
        RenderTags::render_type("Transparent"),
        Rotates,
    ));

    // Untagged cube, hidden while the replacement is active
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(1.0, 1.0, 1.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.5, 0.5, 0.5))),
        Transform::from_xyz(4.0, 0.5, 0.0),
    ));

    // Ground plane
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(20.0, 20.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.3, 0.3, 0.3))),
        RenderTags::render_type("Opaque"),
    ));

    // Light
    commands.spawn((
        DirectionalLight {
            illuminance: 10000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 8.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let shader = shaders.add(
        ReplacementShader::new()
            .with_subshader(
                RenderTags::render_type("Opaque"),
                flat.add(RenderTypeMaterial::new(LinearRgba::new(1.0, 0.5, 0.0, 1.0))),
            )
            .with_subshader(
                RenderTags::render_type("Transparent"),
                flat.add(RenderTypeMaterial::new(LinearRgba::new(0.2, 0.8, 1.0, 0.5))),
            ),
    );

    // Camera with shader replacement
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 5.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
        ShaderReplacement::new(shader),
    ));
}

fn toggle_replacement(
    keys: Res<ButtonInput<KeyCode>>,
    mut cameras: Query<(
        &mut ShaderReplacement<RenderTypeMaterial>,
        &mut ReplacementShaderSlot<RenderTypeMaterial>,
    )>,
) {
    if !keys.just_pressed(KeyCode::Space) {
        return;
    }
    for (mut replacement, mut slot) in cameras.iter_mut() {
        let enabled = !replacement.is_enabled();
        replacement.set_enabled(enabled, &mut slot);
    }
}

#[derive(Component)]
struct Rotates;

fn rotate_cubes(time: Res<Time>, mut query: Query<&mut Transform, With<Rotates>>) {
    for mut transform in query.iter_mut() {
        transform.rotate_y(time.delta_secs() * 0.5);
    }
}
