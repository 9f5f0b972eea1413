//! Probe queries against the physics collaborator
//!
//! Outputs never look for inputs themselves. Each tick the workshop builds a
//! [`ProbeRay`] per searching output and asks a [`ConnectorProbe`] for the
//! nearest input on the ray. A host with a physics engine implements the
//! trait over its colliders; [`RaySphereProbe`] answers geometrically.

use glam::Vec3;

use super::graph::LayerMask;
use crate::core::types::{ComponentId, InputId, OutputId};

/// Bounded ray cast from an output along its forward axis
#[derive(Debug, Clone, Copy)]
pub struct ProbeRay {
    pub origin: Vec3,
    /// Unit direction
    pub direction: Vec3,
    pub distance: f32,
    pub mask: LayerMask,
    pub source: OutputId,
    pub source_component: ComponentId,
}

/// An input as seen by the probe
#[derive(Debug, Clone, Copy)]
pub struct ProbeTarget {
    pub input: InputId,
    pub component: ComponentId,
    pub position: Vec3,
    pub layer: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeHit {
    pub input: InputId,
    pub distance: f32,
}

/// Nearest-hit query on a layer mask within a distance
pub trait ConnectorProbe {
    fn cast(&self, ray: &ProbeRay, targets: &[ProbeTarget]) -> Option<ProbeHit>;
}

/// Treats every input as a small sphere and returns the closest one the ray
/// passes through
#[derive(Debug, Clone, Copy)]
pub struct RaySphereProbe {
    pub radius: f32,
}

impl RaySphereProbe {
    pub fn new(radius: f32) -> Self {
        Self { radius }
    }
}

impl ConnectorProbe for RaySphereProbe {
    fn cast(&self, ray: &ProbeRay, targets: &[ProbeTarget]) -> Option<ProbeHit> {
        let mut best: Option<ProbeHit> = None;

        for target in targets {
            if target.component == ray.source_component || !ray.mask.contains(target.layer) {
                continue;
            }

            let to_center = target.position - ray.origin;
            let along = to_center.dot(ray.direction);
            let closest = to_center - ray.direction * along;
            let miss_sq = closest.length_squared();
            let radius_sq = self.radius * self.radius;
            if miss_sq > radius_sq {
                continue;
            }

            // Entry point of the ray into the sphere; origins inside count as 0
            let entry = (along - (radius_sq - miss_sq).sqrt()).max(0.0);
            if along < -self.radius || entry > ray.distance {
                continue;
            }

            if best.map_or(true, |hit| entry < hit.distance) {
                best = Some(ProbeHit {
                    input: target.input,
                    distance: entry,
                });
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ray(distance: f32) -> ProbeRay {
        ProbeRay {
            origin: Vec3::ZERO,
            direction: Vec3::Z,
            distance,
            mask: LayerMask::ALL,
            source: OutputId(1),
            source_component: ComponentId(1),
        }
    }

    fn target(input: u32, component: u32, z: f32) -> ProbeTarget {
        ProbeTarget {
            input: InputId(input),
            component: ComponentId(component),
            position: Vec3::new(0.0, 0.0, z),
            layer: 0,
        }
    }

    #[test]
    fn test_nearest_target_wins() {
        let probe = RaySphereProbe::new(0.02);
        let hit = probe
            .cast(&ray(1.0), &[target(1, 2, 0.5), target(2, 3, 0.2)])
            .unwrap();
        assert_eq!(hit.input, InputId(2));
    }

    #[test]
    fn test_out_of_range_is_missed() {
        let probe = RaySphereProbe::new(0.02);
        assert!(probe.cast(&ray(0.05), &[target(1, 2, 0.5)]).is_none());
    }

    #[test]
    fn test_own_component_is_ignored() {
        let probe = RaySphereProbe::new(0.02);
        assert!(probe.cast(&ray(1.0), &[target(1, 1, 0.01)]).is_none());
    }

    #[test]
    fn test_behind_origin_is_missed() {
        let probe = RaySphereProbe::new(0.02);
        assert!(probe.cast(&ray(1.0), &[target(1, 2, -0.5)]).is_none());
    }

    #[test]
    fn test_layer_mask_filters() {
        let probe = RaySphereProbe::new(0.02);
        let mut masked = ray(1.0);
        masked.mask = LayerMask::single(4);
        assert!(probe.cast(&masked, &[target(1, 2, 0.01)]).is_none());
    }
}
