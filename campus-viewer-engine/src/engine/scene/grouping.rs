use std::collections::HashMap;

use bevy::gltf::GltfExtras;
use bevy::prelude::*;
use bevy::render::primitives::Aabb;
use constants::grouping::{
    BUILDING_NAME_EXTRA, FALLBACK_GROUP_RADIUS, GENERIC_NAME_EXTRA, MICRO_GEOMETRY_THRESHOLD,
    SYNTHESIZED_LABEL_PREFIX,
};

use crate::engine::assets::building_registry::{BuildingGroup, BuildingRegistry};
use crate::engine::core::app_state::AppState;
use crate::engine::loading::model_loader::ModelRoot;
use crate::engine::render::schedule::RenderSchedule;
use crate::engine::scene::bounds::WorldBounds;
use crate::engine::scene::hierarchy::is_descendant_of;
use crate::rpc::web_rpc::WebRpcInterface;

/// One leaf geometry node considered for clustering, with every label source
/// it carries and its cached world bounds.
#[derive(Debug, Clone)]
pub struct MeshCandidate {
    pub entity: Entity,
    /// Explicitly authored building-name attribute from the asset's extras.
    pub authored_building: Option<String>,
    /// Generic authored name attribute from the asset's extras.
    pub authored_name: Option<String>,
    /// The scene node's own name.
    pub node_name: Option<String>,
    pub bounds: WorldBounds,
}

/// Resolve the clustering label for a candidate. First non-empty source wins;
/// nameless meshes get a synthesized label from a counter shared across the
/// whole traversal.
pub fn resolve_label(candidate: &MeshCandidate, auto_index: &mut u32) -> String {
    let sources = [
        candidate.authored_building.as_deref(),
        candidate.authored_name.as_deref(),
        candidate.node_name.as_deref(),
    ];
    for source in sources.into_iter().flatten() {
        if !source.is_empty() {
            return source.to_string();
        }
    }
    let label = format!("{SYNTHESIZED_LABEL_PREFIX} {auto_index}");
    *auto_index += 1;
    label
}

/// Cluster candidates into building groups.
///
/// Micro geometry (diagonal below the threshold) is dropped before label
/// resolution so clutter never consumes a synthesized index. Groups come out
/// in first-seen order with union bounds, centre, enclosing radius and the
/// vertical aim offset precomputed.
pub fn cluster(candidates: Vec<MeshCandidate>) -> Vec<BuildingGroup> {
    let mut auto_index = 1u32;
    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, Vec<(Entity, WorldBounds)>> = HashMap::new();

    for candidate in candidates {
        if candidate.bounds.diagonal() < MICRO_GEOMETRY_THRESHOLD {
            continue;
        }
        let label = resolve_label(&candidate, &mut auto_index);
        if !buckets.contains_key(&label) {
            order.push(label.clone());
        }
        buckets
            .entry(label)
            .or_default()
            .push((candidate.entity, candidate.bounds));
    }

    order
        .into_iter()
        .map(|label| {
            let members = buckets.remove(&label).unwrap_or_default();
            let union = members
                .iter()
                .map(|(_, b)| *b)
                .reduce(WorldBounds::union)
                .unwrap_or(WorldBounds {
                    min: Vec3::ZERO,
                    max: Vec3::ZERO,
                });

            let mut radius = union.sphere_radius();
            if radius <= 0.0 {
                radius = members
                    .iter()
                    .map(|(_, b)| b.diagonal())
                    .fold(0.0f32, f32::max);
            }
            if radius <= 0.0 {
                radius = FALLBACK_GROUP_RADIUS;
            }

            BuildingGroup {
                id: label.clone(),
                display_name: label,
                members: members.into_iter().map(|(entity, _)| entity).collect(),
                center_world: union.center(),
                bounding_radius: radius,
                vertical_offset: (union.height() * 0.5 + 1.0).max(1.0),
            }
        })
        .collect()
}

/// Pull the two authored label attributes out of a node's GLTF extras JSON.
pub fn authored_labels(extras: Option<&GltfExtras>) -> (Option<String>, Option<String>) {
    let Some(extras) = extras else {
        return (None, None);
    };
    let Ok(value) = serde_json::from_str::<serde_json::Value>(&extras.value) else {
        return (None, None);
    };
    let field = |key: &str| {
        value
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::to_string)
    };
    (field(BUILDING_NAME_EXTRA), field(GENERIC_NAME_EXTRA))
}

/// Build the building registry from the centred scene.
///
/// Runs one tick after the model was centred so global transforms have
/// propagated; reads mesh bounds, clusters, publishes the list to the
/// embedding frontend and enters the interactive state.
pub fn build_building_groups(
    meshes: Query<
        (
            Entity,
            Option<&Name>,
            Option<&GltfExtras>,
            &Aabb,
            &GlobalTransform,
        ),
        With<Mesh3d>,
    >,
    parents: Query<&ChildOf>,
    roots: Query<Entity, With<ModelRoot>>,
    mut commands: Commands,
    mut rpc: ResMut<WebRpcInterface>,
    mut schedule: ResMut<RenderSchedule>,
    time: Res<Time<Real>>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    let Ok(root) = roots.single() else {
        return;
    };

    let mut candidates = Vec::new();
    for (entity, name, extras, aabb, transform) in &meshes {
        if !is_descendant_of(entity, root, &parents) {
            continue;
        }
        let (authored_building, authored_name) = authored_labels(extras);
        candidates.push(MeshCandidate {
            entity,
            authored_building,
            authored_name,
            node_name: name
                .map(|n| n.as_str().to_string())
                .filter(|n| !n.is_empty()),
            bounds: WorldBounds::from_local_aabb(aabb, transform),
        });
    }

    let mesh_count = candidates.len();
    let groups = cluster(candidates);
    println!(
        "✓ Grouped {} meshes into {} buildings",
        mesh_count,
        groups.len()
    );

    rpc.send_notification(
        "buildings_loaded",
        serde_json::json!({
            "buildings": groups
                .iter()
                .map(|g| serde_json::json!({
                    "id": g.id,
                    "name": g.display_name,
                    "parts": g.members.len(),
                }))
                .collect::<Vec<_>>()
        }),
    );

    commands.insert_resource(BuildingRegistry::from_groups(groups));
    schedule.request(time.elapsed_secs_f64());
    next_state.set(AppState::Running);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(
        world: &mut World,
        node_name: Option<&str>,
        min: Vec3,
        max: Vec3,
    ) -> MeshCandidate {
        MeshCandidate {
            entity: world.spawn_empty().id(),
            authored_building: None,
            authored_name: None,
            node_name: node_name.map(str::to_string),
            bounds: WorldBounds { min, max },
        }
    }

    fn unit_box_at(world: &mut World, name: &str, origin: Vec3) -> MeshCandidate {
        candidate(world, Some(name), origin, origin + Vec3::ONE)
    }

    #[test]
    fn shared_labels_merge_into_one_group() {
        let mut world = World::new();
        let candidates = vec![
            unit_box_at(&mut world, "Hall-A", Vec3::ZERO),
            unit_box_at(&mut world, "Hall-A", Vec3::new(2.0, 0.0, 0.0)),
            unit_box_at(&mut world, "Hall-B", Vec3::new(10.0, 0.0, 0.0)),
        ];

        let groups = cluster(candidates);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].id, "Hall-A");
        assert_eq!(groups[0].members.len(), 2);
        assert_eq!(groups[1].id, "Hall-B");
        assert_eq!(groups[1].members.len(), 1);
    }

    #[test]
    fn micro_geometry_never_joins_a_group() {
        let mut world = World::new();
        let speck = candidate(
            &mut world,
            Some("Speck"),
            Vec3::ZERO,
            Vec3::splat(0.1), // diagonal ≈ 0.17, well under the threshold
        );
        let speck_entity = speck.entity;
        let candidates = vec![speck, unit_box_at(&mut world, "Hall-A", Vec3::ZERO)];

        let groups = cluster(candidates);
        assert_eq!(groups.len(), 1);
        assert!(groups.iter().all(|g| !g.members.contains(&speck_entity)));
    }

    #[test]
    fn scene_of_only_clutter_yields_empty_registry() {
        let mut world = World::new();
        let candidates = vec![candidate(&mut world, Some("Dust"), Vec3::ZERO, Vec3::splat(0.2))];
        assert!(cluster(candidates).is_empty());
    }

    #[test]
    fn group_invariants_hold() {
        let mut world = World::new();
        let candidates = vec![
            unit_box_at(&mut world, "Hall-A", Vec3::ZERO),
            candidate(&mut world, None, Vec3::ZERO, Vec3::splat(2.0)),
        ];

        for group in cluster(candidates) {
            assert!(!group.members.is_empty());
            assert!(group.bounding_radius > 0.0);
            assert!(group.vertical_offset >= 1.0);
        }
    }

    #[test]
    fn clustering_is_idempotent() {
        let mut world = World::new();
        let candidates = vec![
            unit_box_at(&mut world, "Hall-A", Vec3::ZERO),
            unit_box_at(&mut world, "Hall-A", Vec3::new(3.0, 0.0, 1.0)),
            unit_box_at(&mut world, "Annex", Vec3::new(-5.0, 0.0, 2.0)),
        ];

        let first = cluster(candidates.clone());
        let second = cluster(candidates);
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.members.len(), b.members.len());
            assert!((a.center_world - b.center_world).length() < 1e-6);
            assert!((a.bounding_radius - b.bounding_radius).abs() < 1e-6);
        }
    }

    #[test]
    fn label_sources_resolve_in_priority_order() {
        let mut world = World::new();
        let mut c = candidate(&mut world, Some("NodeName"), Vec3::ZERO, Vec3::ONE);
        c.authored_building = Some("Science Hall".to_string());
        c.authored_name = Some("generic".to_string());

        let mut auto_index = 1;
        assert_eq!(resolve_label(&c, &mut auto_index), "Science Hall");

        c.authored_building = None;
        assert_eq!(resolve_label(&c, &mut auto_index), "generic");

        c.authored_name = None;
        assert_eq!(resolve_label(&c, &mut auto_index), "NodeName");

        // empty strings are skipped, not taken literally
        c.node_name = Some(String::new());
        assert_eq!(resolve_label(&c, &mut auto_index), "Building 1");
        assert_eq!(resolve_label(&c, &mut auto_index), "Building 2");
        assert_eq!(auto_index, 3);
    }

    #[test]
    fn vertical_offset_tracks_union_height() {
        let mut world = World::new();
        // 8 units tall: offset = 8/2 + 1
        let tall = candidate(&mut world, Some("Tower"), Vec3::ZERO, Vec3::new(1.0, 8.0, 1.0));
        // squat building clamps to the minimum of 1
        let flat = candidate(
            &mut world,
            Some("Slab"),
            Vec3::new(20.0, 0.0, 0.0),
            Vec3::new(22.0, 0.1, 2.0),
        );

        let groups = cluster(vec![tall, flat]);
        let tower = groups.iter().find(|g| g.id == "Tower").unwrap();
        let slab = groups.iter().find(|g| g.id == "Slab").unwrap();
        assert!((tower.vertical_offset - 5.0).abs() < 1e-6);
        assert!((slab.vertical_offset - 1.05).abs() < 1e-6);
    }
}
