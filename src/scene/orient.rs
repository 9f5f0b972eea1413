//! Connector face alignment

use glam::{Quat, Vec3};
use std::f32::consts::PI;

use super::graph::SceneGraph;
use crate::core::error::Result;
use crate::core::types::NodeId;

const PARALLEL_EPSILON: f32 = 1e-6;

/// Shortest rotation taking direction `from` onto `to`.
///
/// When the two directions are opposite the shortest arc is ambiguous; the
/// half turn is then taken about `fallback_axis` (projected to be
/// perpendicular to `from`).
pub fn from_to_rotation(from: Vec3, to: Vec3, fallback_axis: Vec3) -> Quat {
    let from = from.normalize_or_zero();
    let to = to.normalize_or_zero();
    if from == Vec3::ZERO || to == Vec3::ZERO {
        return Quat::IDENTITY;
    }

    let dot = from.dot(to);
    if dot >= 1.0 - PARALLEL_EPSILON {
        return Quat::IDENTITY;
    }
    if dot <= -1.0 + PARALLEL_EPSILON {
        let axis = (fallback_axis - from * fallback_axis.dot(from)).normalize_or_zero();
        let axis = if axis == Vec3::ZERO {
            from.any_orthonormal_vector()
        } else {
            axis
        };
        return Quat::from_axis_angle(axis, PI);
    }

    Quat::from_rotation_arc(from, to)
}

/// Rotate and move `parent` so that `child` (a node somewhere below it, or
/// the parent itself) ends up exactly on `target`, facing the opposite way
/// with matching up vectors.
///
/// The rotations go onto the parent; the child's local offset is never
/// touched, it only follows the parent. After both rotations the parent is
/// translated by whatever still separates the child from the target.
pub fn orientate_new_piece(
    scene: &mut SceneGraph,
    child: NodeId,
    parent: NodeId,
    target: NodeId,
) -> Result<()> {
    let child_pose = scene.world_pose(child)?;
    let target_pose = scene.world_pose(target)?;
    let parent_pose = scene.world_pose(parent)?;

    // Forward axis first: the child must face into the target.
    let forward_rotation = from_to_rotation(
        child_pose.forward(),
        -target_pose.forward(),
        child_pose.up(),
    );

    // Then spin about the new forward axis until the up vectors agree.
    let rotated_up = forward_rotation * child_pose.up();
    let up_rotation = from_to_rotation(rotated_up, target_pose.up(), -target_pose.forward());

    let rotation = (up_rotation * forward_rotation * parent_pose.rotation).normalize();
    scene.set_world_rotation(parent, rotation)?;

    let child_after = scene.world_pose(child)?;
    let movement = target_pose.position - child_after.position;
    scene.set_world_position(parent, parent_pose.position + movement)?;

    Ok(())
}
