//! Picking system for ray-surface intersection
//!
//! Provides CPU-based surface picking using raycasting. Each surface is first
//! tested against its bounding box, then triangle by triangle.

use glam::{Mat4, Vec3};
use viewer_core::{Model, Surface};

pub use viewer_core::AABB;

const TRIANGLE_EPSILON: f32 = 1e-7;

/// Ray for raycasting
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Ray origin point
    pub origin: Vec3,
    /// Ray direction (should be normalized)
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Transform the ray by an affine matrix.
    /// The direction is not renormalized, so hit distances stay comparable
    /// with the untransformed ray.
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        Self {
            origin: matrix.transform_point3(self.origin),
            direction: matrix.transform_vector3(self.direction),
        }
    }

    /// Check intersection with AABB using slab method
    /// Returns the distance to intersection point if hit, None otherwise
    pub fn intersect_aabb(&self, aabb: &AABB) -> Option<f32> {
        // Handle division by zero with small epsilon
        let inv_dir = Vec3::new(
            if self.direction.x.abs() > f32::EPSILON {
                1.0 / self.direction.x
            } else {
                f32::MAX
            },
            if self.direction.y.abs() > f32::EPSILON {
                1.0 / self.direction.y
            } else {
                f32::MAX
            },
            if self.direction.z.abs() > f32::EPSILON {
                1.0 / self.direction.z
            } else {
                f32::MAX
            },
        );

        let t1 = (aabb.min - self.origin) * inv_dir;
        let t2 = (aabb.max - self.origin) * inv_dir;

        let tmin_vec = t1.min(t2);
        let tmax_vec = t1.max(t2);

        let tmin = tmin_vec.x.max(tmin_vec.y).max(tmin_vec.z);
        let tmax = tmax_vec.x.min(tmax_vec.y).min(tmax_vec.z);

        if tmax >= tmin && tmax >= 0.0 {
            Some(tmin.max(0.0))
        } else {
            None
        }
    }

    /// Möller–Trumbore ray/triangle test.
    /// Counter-clockwise triangles face the viewer; back faces are rejected
    /// unless `double_sided` is set.
    pub fn intersect_triangle(&self, [a, b, c]: [Vec3; 3], double_sided: bool) -> Option<f32> {
        let edge1 = b - a;
        let edge2 = c - a;
        let p = self.direction.cross(edge2);
        let det = edge1.dot(p);

        if double_sided {
            if det.abs() < TRIANGLE_EPSILON {
                return None;
            }
        } else if det < TRIANGLE_EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = self.origin - a;
        let u = s.dot(p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = self.direction.dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = edge2.dot(q) * inv_det;
        (t >= 0.0).then_some(t)
    }

    /// Nearest hit against a single surface
    pub fn intersect_surface(&self, surface: &Surface) -> Option<f32> {
        self.intersect_aabb(&surface.bounds)?;
        surface
            .triangles()
            .filter_map(|tri| self.intersect_triangle(tri, surface.double_sided))
            .min_by(f32::total_cmp)
    }
}

/// Result of a successful pick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// Index into `Model::surfaces`
    pub surface: usize,
    /// Ray parameter of the hit (world units)
    pub distance: f32,
}

/// Cast a world-space ray against every surface of the model and return the
/// nearest hit.
pub fn pick_surface(model: &Model, ray: &Ray) -> Option<SurfaceHit> {
    let local = ray.transformed(&model.transform.to_matrix().inverse());

    model
        .surfaces()
        .iter()
        .enumerate()
        .filter_map(|(index, surface)| {
            local.intersect_surface(surface).map(|distance| SurfaceHit {
                surface: index,
                distance,
            })
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewer_core::Color;

    fn quad(name: &str, size: f32, z: f32) -> Surface {
        let h = size * 0.5;
        Surface::new(
            name,
            Color::WHITE,
            vec![
                Vec3::new(-h, -h, z),
                Vec3::new(h, -h, z),
                Vec3::new(h, h, z),
                Vec3::new(-h, h, z),
            ],
            Vec::new(),
            vec![0, 1, 2, 0, 2, 3],
        )
    }

    #[test]
    fn test_ray_aabb_hit() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let aabb = AABB::new(Vec3::splat(-0.5), Vec3::splat(0.5));

        let t = ray.intersect_aabb(&aabb).unwrap();
        assert!((t - 4.5).abs() < 0.001); // Should hit at z = 0.5
    }

    #[test]
    fn test_ray_aabb_miss() {
        let ray = Ray::new(Vec3::new(5.0, 5.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let aabb = AABB::new(Vec3::splat(-0.5), Vec3::splat(0.5));

        assert!(ray.intersect_aabb(&aabb).is_none());
    }

    #[test]
    fn test_ray_inside_aabb() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let aabb = AABB::new(Vec3::splat(-0.5), Vec3::splat(0.5));

        assert!(ray.intersect_aabb(&aabb).unwrap() >= 0.0);
    }

    #[test]
    fn test_triangle_front_face() {
        let ray = Ray::new(Vec3::new(0.2, 0.2, 3.0), Vec3::NEG_Z);
        let tri = [Vec3::ZERO, Vec3::X, Vec3::Y];
        let t = ray.intersect_triangle(tri, false).unwrap();
        assert!((t - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_triangle_back_face_culled_unless_double_sided() {
        let ray = Ray::new(Vec3::new(0.2, 0.2, -3.0), Vec3::Z);
        let tri = [Vec3::ZERO, Vec3::X, Vec3::Y];
        assert!(ray.intersect_triangle(tri, false).is_none());
        assert!(ray.intersect_triangle(tri, true).is_some());
    }

    #[test]
    fn test_triangle_outside() {
        let ray = Ray::new(Vec3::new(0.8, 0.8, 3.0), Vec3::NEG_Z);
        let tri = [Vec3::ZERO, Vec3::X, Vec3::Y];
        assert!(ray.intersect_triangle(tri, false).is_none());
    }

    #[test]
    fn test_triangle_behind_origin() {
        let ray = Ray::new(Vec3::new(0.2, 0.2, -3.0), Vec3::NEG_Z);
        let tri = [Vec3::ZERO, Vec3::X, Vec3::Y];
        assert!(ray.intersect_triangle(tri, true).is_none());
    }

    #[test]
    fn test_pick_nearest_surface() {
        let model = Model::new(vec![quad("back", 2.0, 0.0), quad("front", 2.0, 1.0)]).unwrap();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);

        let hit = pick_surface(&model, &ray).unwrap();
        assert_eq!(hit.surface, 1);
        assert!((hit.distance - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_pick_respects_model_transform() {
        let mut model = Model::new(vec![quad("a", 2.0, 0.0)]).unwrap();
        let ray = Ray::new(Vec3::new(5.0, 0.0, 5.0), Vec3::NEG_Z);
        assert!(pick_surface(&model, &ray).is_none());

        model.transform.position = Vec3::new(5.0, 0.0, 0.0);
        assert_eq!(pick_surface(&model, &ray).map(|h| h.surface), Some(0));
    }

    #[test]
    fn test_pick_miss() {
        let model = Model::new(vec![quad("a", 2.0, 0.0)]).unwrap();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
        assert!(pick_surface(&model, &ray).is_none());
    }
}
