use bevy::prelude::*;

/// Fixed daylight rig: soft white ambient plus one directional key light
/// angled across the campus. Shadows stay off; the scene is rendered on
/// demand and never animates its lighting.
pub fn spawn_lighting(mut commands: Commands) {
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 300.0,
        ..default()
    });

    commands.spawn((
        DirectionalLight {
            illuminance: 6_000.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(10.0, 20.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}
