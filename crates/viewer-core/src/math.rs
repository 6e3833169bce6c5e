//! 数学型
//!
//! glamの型を再エクスポートし、バウンディングボックスを提供

pub use glam::{Mat3, Mat4, Quat, Vec2, Vec3, Vec4};

/// Axis-Aligned Bounding Box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl AABB {
    /// Create a new AABB from min and max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// 何も含まない空のAABB（extendの初期値）
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    /// 点群を包むAABBを作成
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        points.into_iter().fold(Self::empty(), |mut aabb, p| {
            aabb.extend(p);
            aabb
        })
    }

    /// 点を含むように拡張
    pub fn extend(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// 2つのAABBを包むAABB
    pub fn union(&self, other: &AABB) -> AABB {
        AABB {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// 一度もextendされていないか
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// 中心点
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// 各軸の大きさ
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// 対角線の長さ
    pub fn diagonal(&self) -> f32 {
        if self.is_empty() {
            0.0
        } else {
            self.extent().length()
        }
    }
}

impl Default for AABB {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        let aabb = AABB::from_points([
            Vec3::new(-1.0, 0.0, 2.0),
            Vec3::new(3.0, -2.0, 0.0),
            Vec3::new(0.0, 4.0, 1.0),
        ]);
        assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(3.0, 4.0, 2.0));
        assert_eq!(aabb.center(), Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_empty() {
        let aabb = AABB::empty();
        assert!(aabb.is_empty());
        assert_eq!(aabb.diagonal(), 0.0);
        assert!(!AABB::from_points([Vec3::ZERO]).is_empty());
    }

    #[test]
    fn test_union_and_diagonal() {
        let a = AABB::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
        let b = AABB::new(Vec3::new(0.0, -2.0, 0.0), Vec3::new(0.0, 0.0, 2.0));
        let u = a.union(&b);
        assert_eq!(u.min, Vec3::new(0.0, -2.0, 0.0));
        assert_eq!(u.max, Vec3::new(1.0, 0.0, 2.0));
        assert!((u.diagonal() - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_union_with_empty() {
        let a = AABB::new(Vec3::splat(-0.5), Vec3::splat(0.5));
        assert_eq!(AABB::empty().union(&a), a);
    }
}
