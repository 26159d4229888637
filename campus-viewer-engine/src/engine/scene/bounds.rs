use bevy::prelude::*;
use bevy::render::primitives::Aabb;

/// Axis-aligned world-space bounds of a mesh or a union of meshes.
/// Computed once at grouping time; the scene is static after load, so cached
/// values stay valid for the whole session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl WorldBounds {
    /// World bounds of a render AABB under an arbitrary global transform.
    /// Transforms all eight corners so rotation and non-uniform scale keep
    /// the result conservative.
    pub fn from_local_aabb(aabb: &Aabb, transform: &GlobalTransform) -> Self {
        let local_min = Vec3::from(aabb.min());
        let local_max = Vec3::from(aabb.max());
        let affine = transform.affine();

        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for corner in 0..8u8 {
            let corner = Vec3::new(
                if corner & 1 == 0 { local_min.x } else { local_max.x },
                if corner & 2 == 0 { local_min.y } else { local_max.y },
                if corner & 4 == 0 { local_min.z } else { local_max.z },
            );
            let world = affine.transform_point3(corner);
            min = min.min(world);
            max = max.max(world);
        }
        Self { min, max }
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Centre point for camera positioning and scene navigation.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Diagonal length; the micro-geometry filter thresholds on this.
    pub fn diagonal(&self) -> f32 {
        self.size().length()
    }

    /// Radius of the sphere enclosing these bounds.
    pub fn sphere_radius(&self) -> f32 {
        self.diagonal() * 0.5
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(min: Vec3, max: Vec3) -> WorldBounds {
        WorldBounds { min, max }
    }

    #[test]
    fn translated_aabb_lands_in_world_space() {
        let aabb = Aabb::from_min_max(Vec3::splat(-1.0), Vec3::splat(1.0));
        let transform = GlobalTransform::from_translation(Vec3::new(10.0, 0.0, -5.0));
        let world = WorldBounds::from_local_aabb(&aabb, &transform);
        assert_eq!(world.min, Vec3::new(9.0, -1.0, -6.0));
        assert_eq!(world.max, Vec3::new(11.0, 1.0, -4.0));
    }

    #[test]
    fn scaled_aabb_grows_diagonal() {
        let aabb = Aabb::from_min_max(Vec3::ZERO, Vec3::ONE);
        let transform = GlobalTransform::from_scale(Vec3::splat(3.0));
        let world = WorldBounds::from_local_aabb(&aabb, &transform);
        assert!((world.diagonal() - 3.0 * 3f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn rotated_aabb_stays_conservative() {
        let aabb = Aabb::from_min_max(Vec3::new(-2.0, 0.0, -0.5), Vec3::new(2.0, 1.0, 0.5));
        let transform =
            GlobalTransform::from_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        let world = WorldBounds::from_local_aabb(&aabb, &transform);
        // a 90° yaw swaps the long axis into z
        assert!((world.max.z - 2.0).abs() < 1e-5);
        assert!((world.max.x - 0.5).abs() < 1e-5);
    }

    #[test]
    fn union_covers_both_volumes() {
        let a = bounds(Vec3::ZERO, Vec3::ONE);
        let b = bounds(Vec3::new(2.0, -1.0, 0.0), Vec3::new(3.0, 0.5, 4.0));
        let u = a.union(b);
        assert_eq!(u.min, Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(u.max, Vec3::new(3.0, 1.0, 4.0));
        assert!((u.height() - 2.0).abs() < 1e-6);
    }
}
