use bevy::prelude::*;
use constants::camera::{DEFAULT_PART_PADDING, FLY_FRAMES};

use crate::engine::camera::navigator::{FlyKind, FlyTarget, FlyToBuilding, FlyToEvent};
use crate::tools::selection::{ActivePopup, DismissPopup, FlyRef, PopupContent};

#[derive(Component)]
pub struct InfoPanel;

#[derive(Component)]
pub struct InfoPanelTitle;

#[derive(Component)]
pub struct InfoPanelDepartment;

#[derive(Component)]
pub struct InfoPanelBody;

/// Build the (initially hidden) info panel pinned to the top-left edge.
pub fn spawn_info_panel(mut commands: Commands) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(10.0),
                top: Val::Px(10.0),
                width: Val::Px(320.0),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(6.0),
                padding: UiRect::all(Val::Px(12.0)),
                ..default()
            },
            BackgroundColor(Color::srgba(1.0, 1.0, 1.0, 0.95)),
            Visibility::Hidden,
            InfoPanel,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(""),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(0.1, 0.1, 0.1)),
                InfoPanelTitle,
            ));
            parent.spawn((
                Text::new(""),
                TextFont {
                    font_size: 13.0,
                    ..default()
                },
                TextColor(Color::srgb(0.4, 0.4, 0.4)),
                InfoPanelDepartment,
            ));
            parent.spawn((
                Text::new(""),
                TextFont {
                    font_size: 13.0,
                    ..default()
                },
                TextColor(Color::srgb(0.2, 0.2, 0.2)),
                InfoPanelBody,
            ));
            parent.spawn((
                Text::new("F: fly to   Esc: close"),
                TextFont {
                    font_size: 11.0,
                    ..default()
                },
                TextColor(Color::srgb(0.55, 0.55, 0.55)),
            ));
        });
}

/// Mirror the popup resource into the panel whenever it changes.
pub fn update_info_panel(
    popup: Res<ActivePopup>,
    mut panels: Query<&mut Visibility, With<InfoPanel>>,
    mut titles: Query<
        &mut Text,
        (
            With<InfoPanelTitle>,
            Without<InfoPanelDepartment>,
            Without<InfoPanelBody>,
        ),
    >,
    mut departments: Query<
        &mut Text,
        (
            With<InfoPanelDepartment>,
            Without<InfoPanelTitle>,
            Without<InfoPanelBody>,
        ),
    >,
    mut bodies: Query<
        &mut Text,
        (
            With<InfoPanelBody>,
            Without<InfoPanelTitle>,
            Without<InfoPanelDepartment>,
        ),
    >,
) {
    let Ok(mut visibility) = panels.single_mut() else {
        return;
    };

    let Some(popup) = &popup.0 else {
        *visibility = Visibility::Hidden;
        return;
    };
    *visibility = Visibility::Visible;

    if let Ok(mut text) = titles.single_mut() {
        text.0 = popup.title().to_string();
    }
    if let Ok(mut text) = departments.single_mut() {
        text.0 = popup
            .department()
            .map(|d| format!("Department: {d}"))
            .unwrap_or_default();
    }
    if let Ok(mut text) = bodies.single_mut() {
        let mut body = popup.body().unwrap_or_default().to_string();
        if let PopupContent::Role {
            events: Some(events),
            ..
        } = &popup.content
        {
            if !body.is_empty() {
                body.push('\n');
            }
            body.push_str(&format!("Happenings: {events}"));
        }
        if !body.is_empty() {
            body.push('\n');
        }
        body.push_str(&format!("Parts: {}", popup.part_count()));
        text.0 = body;
    }
}

/// Escape dismisses the popup, F flies to whatever it describes.
pub fn popup_keyboard_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    popup: Res<ActivePopup>,
    mut dismiss: EventWriter<DismissPopup>,
    mut fly_building: EventWriter<FlyToBuilding>,
    mut fly: EventWriter<FlyToEvent>,
) {
    if keyboard.just_pressed(KeyCode::Escape) && popup.0.is_some() {
        dismiss.write(DismissPopup);
    }

    if keyboard.just_pressed(KeyCode::KeyF) {
        let Some(popup) = &popup.0 else {
            return;
        };
        match &popup.fly {
            FlyRef::Group(id) => {
                fly_building.write(FlyToBuilding { id: id.clone() });
            }
            FlyRef::Part {
                entity,
                center,
                radius,
            } => {
                let padding = if *radius > 0.0 {
                    *radius
                } else {
                    DEFAULT_PART_PADDING
                };
                fly.write(FlyToEvent {
                    target: FlyTarget {
                        center: *center,
                        radius: *radius,
                        vertical_offset: 0.0,
                        kind: FlyKind::Part {
                            exclude: *entity,
                            padding,
                        },
                    },
                    animate: true,
                    frames: FLY_FRAMES,
                    direction: None,
                });
            }
            FlyRef::None => {}
        }
    }
}
