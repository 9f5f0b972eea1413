//! Rigid poses (position + rotation, no scale)

use glam::{EulerRot, Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Position and rotation. Forward is +Z and up is +Y.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    /// Build a pose from Euler angles in degrees, applied yaw-pitch-roll
    pub fn from_euler_degrees(position: Vec3, degrees: [f32; 3]) -> Self {
        let rotation = Quat::from_euler(
            EulerRot::YXZ,
            degrees[1].to_radians(),
            degrees[0].to_radians(),
            degrees[2].to_radians(),
        );
        Self::new(position, rotation)
    }

    /// Build a pose facing `forward` with `up` as close to the given vector as
    /// the forward axis allows
    pub fn looking(position: Vec3, forward: Vec3, up: Vec3) -> Self {
        let forward = forward.normalize_or_zero();
        if forward == Vec3::ZERO {
            return Self::from_position(position);
        }
        let mut right = up.cross(forward).normalize_or_zero();
        if right == Vec3::ZERO {
            right = forward.any_orthonormal_vector();
        }
        let up = forward.cross(right);
        let rotation = Quat::from_mat3(&Mat3::from_cols(right, up, forward)).normalize();
        Self::new(position, rotation)
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Compose a child's local pose onto this (parent) pose
    pub fn mul_pose(&self, local: &Pose) -> Pose {
        Pose {
            position: self.position + self.rotation * local.position,
            rotation: (self.rotation * local.rotation).normalize(),
        }
    }

    pub fn inverse(&self) -> Pose {
        let rotation = self.rotation.inverse();
        Pose {
            position: rotation * -self.position,
            rotation,
        }
    }

    /// Express a world pose relative to this pose
    pub fn relative(&self, world: &Pose) -> Pose {
        self.inverse().mul_pose(world)
    }

    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation * point
    }

    pub fn inverse_transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation.inverse() * (point - self.position)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_euler_pitch_points_forward_down() {
        let pose = Pose::from_euler_degrees(Vec3::ZERO, [90.0, 0.0, 0.0]);
        assert!(pose.forward().abs_diff_eq(Vec3::NEG_Y, 1e-5));
    }

    #[test]
    fn test_euler_yaw_half_turn() {
        let pose = Pose::from_euler_degrees(Vec3::ZERO, [0.0, 180.0, 0.0]);
        assert!(pose.forward().abs_diff_eq(Vec3::NEG_Z, 1e-5));
        assert!(pose.up().abs_diff_eq(Vec3::Y, 1e-5));
    }

    #[test]
    fn test_looking_matches_requested_axes() {
        let pose = Pose::looking(Vec3::ONE, Vec3::Y, Vec3::Z);
        assert!(pose.forward().abs_diff_eq(Vec3::Y, 1e-5));
        assert!(pose.up().abs_diff_eq(Vec3::Z, 1e-5));
        assert!(pose.right().abs_diff_eq(Vec3::NEG_X, 1e-5));
    }

    #[test]
    fn test_relative_round_trip() {
        let parent = Pose::from_euler_degrees(Vec3::new(1.0, 2.0, 3.0), [10.0, 40.0, 0.0]);
        let world = Pose::from_euler_degrees(Vec3::new(-2.0, 0.5, 1.0), [0.0, -30.0, 15.0]);

        let local = parent.relative(&world);
        let back = parent.mul_pose(&local);

        assert!(back.position.abs_diff_eq(world.position, 1e-4));
        assert!(back.forward().abs_diff_eq(world.forward(), 1e-4));
    }

    #[test]
    fn test_inverse_transform_point() {
        let pose = Pose::from_euler_degrees(Vec3::new(0.0, 0.0, 5.0), [0.0, 90.0, 0.0]);
        let world = pose.transform_point(Vec3::new(0.0, 0.0, 1.0));
        assert!(pose.inverse_transform_point(world).abs_diff_eq(Vec3::Z, 1e-5));
    }
}
