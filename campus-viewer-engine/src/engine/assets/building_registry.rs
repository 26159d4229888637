use bevy::prelude::*;

/// A named cluster of scene meshes treated as one selectable building.
///
/// Groups index into the loaded scene graph; they never own mesh lifetime.
/// The `id` is the label the members were clustered under and is stable for
/// the lifetime of the registry.
#[derive(Debug, Clone)]
pub struct BuildingGroup {
    pub id: String,
    pub display_name: String,
    /// Member meshes in traversal order. Always non-empty.
    pub members: Vec<Entity>,
    /// World-space centroid of the union of member bounds.
    pub center_world: Vec3,
    /// Radius of the sphere enclosing the union volume. Always positive.
    pub bounding_radius: f32,
    /// Vertical padding so fly-to aims above ground level rather than at the
    /// geometric centre.
    pub vertical_offset: f32,
}

impl BuildingGroup {
    /// Point the camera aims at when flying to this group.
    pub fn aim_point(&self) -> Vec3 {
        self.center_world + Vec3::Y * self.vertical_offset
    }
}

/// Registry of every building group discovered in the loaded scene.
///
/// Lookup by id is order-independent; iteration follows insertion order so
/// UI listings match traversal order.
#[derive(Resource, Debug, Default)]
pub struct BuildingRegistry {
    groups: Vec<BuildingGroup>,
}

impl BuildingRegistry {
    pub fn from_groups(groups: Vec<BuildingGroup>) -> Self {
        Self { groups }
    }

    pub fn get(&self, id: &str) -> Option<&BuildingGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// Find the group containing a picked mesh entity.
    pub fn group_of(&self, entity: Entity) -> Option<&BuildingGroup> {
        self.groups
            .iter()
            .find(|g| g.members.iter().any(|m| *m == entity))
    }

    pub fn iter(&self) -> impl Iterator<Item = &BuildingGroup> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(world: &mut World) -> Entity {
        world.spawn_empty().id()
    }

    fn group(id: &str, members: Vec<Entity>) -> BuildingGroup {
        BuildingGroup {
            id: id.to_string(),
            display_name: id.to_string(),
            members,
            center_world: Vec3::ZERO,
            bounding_radius: 1.0,
            vertical_offset: 1.0,
        }
    }

    #[test]
    fn lookup_by_id_and_member() {
        let mut world = World::new();
        let a = entity(&mut world);
        let b = entity(&mut world);
        let registry = BuildingRegistry::from_groups(vec![
            group("Hall-A", vec![a]),
            group("Hall-B", vec![b]),
        ]);

        assert_eq!(registry.get("Hall-B").unwrap().id, "Hall-B");
        assert_eq!(registry.group_of(a).unwrap().id, "Hall-A");
        assert!(registry.get("Hall-C").is_none());
    }

    #[test]
    fn iteration_preserves_insertion_order() {
        let mut world = World::new();
        let a = entity(&mut world);
        let b = entity(&mut world);
        let registry = BuildingRegistry::from_groups(vec![
            group("Zulu", vec![a]),
            group("Alpha", vec![b]),
        ]);

        let ids: Vec<&str> = registry.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["Zulu", "Alpha"]);
    }

    #[test]
    fn aim_point_is_offset_above_centre() {
        let mut world = World::new();
        let a = entity(&mut world);
        let mut g = group("Hall-A", vec![a]);
        g.center_world = Vec3::new(4.0, 2.0, -3.0);
        g.vertical_offset = 2.5;
        assert_eq!(g.aim_point(), Vec3::new(4.0, 4.5, -3.0));
    }
}
