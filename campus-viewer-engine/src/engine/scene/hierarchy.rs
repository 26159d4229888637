use bevy::ecs::entity::EntityHashSet;
use bevy::prelude::*;

/// Walk the parent chain to test whether `entity` sits under `ancestor`
/// (an entity counts as its own descendant).
pub fn is_descendant_of(entity: Entity, ancestor: Entity, parents: &Query<&ChildOf>) -> bool {
    let mut current = entity;
    loop {
        if current == ancestor {
            return true;
        }
        match parents.get(current) {
            Ok(child_of) => current = child_of.parent(),
            Err(_) => return false,
        }
    }
}

/// Collect `root` and every entity below it. Used to exclude a fly-to target
/// from its own occlusion ray.
pub fn collect_with_descendants(root: Entity, children: &Query<&Children>) -> EntityHashSet {
    let mut set = EntityHashSet::default();
    let mut stack = vec![root];
    while let Some(entity) = stack.pop() {
        if !set.insert(entity) {
            continue;
        }
        if let Ok(direct) = children.get(entity) {
            stack.extend(direct.iter());
        }
    }
    set
}
