//! Forward kinematics for a planar chain of rigid links.
//!
//! Each link rotates relative to the link before it. Angles are stored in
//! degrees; the cumulative (world) angle of a link is the sum of every
//! relative angle from the root up to and including that link.

use glam::Vec2;
use tracing::debug;

use crate::{KinematicsError, KinematicsResult};

/// Derived world-space state of a chain, recomputed whenever the angles change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChainPose {
    /// Where each link begins. `joint_positions[0]` is the chain origin.
    pub joint_positions: Vec<Vec2>,
    /// Where each link ends. The last entry is the end-effector.
    pub joint_ends: Vec<Vec2>,
    /// Cumulative angle of each link in degrees.
    pub world_angles: Vec<f32>,
}

impl ChainPose {
    pub fn end_effector(&self) -> Vec2 {
        self.joint_ends.last().copied().unwrap_or_default()
    }
}

/// Pure forward kinematics: lay the links out one after another.
pub fn compute_pose(origin: Vec2, lengths: &[f32], angles: &[f32]) -> ChainPose {
    let mut pose = ChainPose {
        joint_positions: Vec::with_capacity(lengths.len()),
        joint_ends: Vec::with_capacity(lengths.len()),
        world_angles: Vec::with_capacity(lengths.len()),
    };

    let mut start = origin;
    let mut world_angle = 0.0_f32;
    for (&length, &angle) in lengths.iter().zip(angles) {
        world_angle += angle;
        let end = start + length * Vec2::from_angle(world_angle.to_radians());
        pose.joint_positions.push(start);
        pose.joint_ends.push(end);
        pose.world_angles.push(world_angle);
        start = end;
    }
    pose
}

/// Ordered links with fixed lengths and mutable relative joint angles.
#[derive(Debug, Clone)]
pub struct KinematicChain {
    origin: Vec2,
    lengths: Vec<f32>,
    angles: Vec<f32>,
    pose: ChainPose,
}

impl KinematicChain {
    /// Build a chain rooted at the origin with every joint at zero degrees.
    pub fn new(lengths: Vec<f32>) -> KinematicsResult<Self> {
        Self::with_origin(lengths, Vec2::ZERO)
    }

    pub fn with_origin(lengths: Vec<f32>, origin: Vec2) -> KinematicsResult<Self> {
        if lengths.is_empty() {
            return Err(KinematicsError::EmptyChain);
        }
        if let Some((index, &length)) = lengths
            .iter()
            .enumerate()
            .find(|(_, l)| !l.is_finite() || **l <= 0.0)
        {
            return Err(KinematicsError::InvalidLinkLength { index, length });
        }

        let angles = vec![0.0; lengths.len()];
        let pose = compute_pose(origin, &lengths, &angles);
        debug!(links = lengths.len(), ?origin, "created kinematic chain");
        Ok(Self {
            origin,
            lengths,
            angles,
            pose,
        })
    }

    /// Overwrite every relative joint angle (degrees).
    pub fn set_angles(&mut self, angles: &[f32]) -> KinematicsResult<()> {
        self.check_count(angles.len())?;
        self.angles.copy_from_slice(angles);
        self.forward_kinematics();
        Ok(())
    }

    /// Add `deltas` (degrees) to the current relative joint angles.
    pub fn rotate_by(&mut self, deltas: &[f32]) -> KinematicsResult<()> {
        self.check_count(deltas.len())?;
        self.apply_rotation(deltas);
        Ok(())
    }

    /// Recompute the cached pose from the current angles.
    pub fn forward_kinematics(&mut self) -> &ChainPose {
        self.pose = compute_pose(self.origin, &self.lengths, &self.angles);
        &self.pose
    }

    /// Zero every joint angle.
    pub fn reset(&mut self) {
        self.angles.iter_mut().for_each(|a| *a = 0.0);
        self.forward_kinematics();
    }

    pub fn link_count(&self) -> usize {
        self.lengths.len()
    }

    pub fn link_lengths(&self) -> &[f32] {
        &self.lengths
    }

    pub fn angles(&self) -> &[f32] {
        &self.angles
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn pose(&self) -> &ChainPose {
        &self.pose
    }

    pub fn end_effector(&self) -> Vec2 {
        self.pose.end_effector()
    }

    /// Distance the end-effector can be from the origin when fully stretched.
    pub fn reach(&self) -> f32 {
        self.lengths.iter().sum()
    }

    // Callers guarantee `deltas.len() == self.link_count()`.
    pub(crate) fn apply_rotation(&mut self, deltas: &[f32]) {
        for (angle, delta) in self.angles.iter_mut().zip(deltas) {
            *angle += delta;
        }
        self.forward_kinematics();
    }

    fn check_count(&self, actual: usize) -> KinematicsResult<()> {
        if actual == self.lengths.len() {
            Ok(())
        } else {
            Err(KinematicsError::AngleCountMismatch {
                expected: self.lengths.len(),
                actual,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < EPS
    }

    #[test]
    fn zero_angles_lay_links_along_x() {
        let chain = KinematicChain::new(vec![100.0, 100.0, 100.0, 75.0, 75.0]).unwrap();
        let expected = [100.0, 200.0, 300.0, 375.0, 450.0];
        for (end, x) in chain.pose().joint_ends.iter().zip(expected) {
            assert!(approx(*end, Vec2::new(x, 0.0)), "{end:?} != ({x}, 0)");
        }
        assert_eq!(chain.pose().joint_positions[0], Vec2::ZERO);
        assert!(approx(chain.end_effector(), Vec2::new(450.0, 0.0)));
    }

    #[test]
    fn relative_angles_compose() {
        let mut chain = KinematicChain::new(vec![100.0, 100.0]).unwrap();
        chain.set_angles(&[90.0, -90.0]).unwrap();
        let pose = chain.pose();
        assert!(approx(pose.joint_ends[0], Vec2::new(0.0, 100.0)));
        assert!(approx(pose.joint_positions[1], pose.joint_ends[0]));
        assert!(approx(chain.end_effector(), Vec2::new(100.0, 100.0)));
        assert_eq!(pose.world_angles, vec![90.0, 0.0]);
    }

    #[test]
    fn origin_offsets_every_joint() {
        let origin = Vec2::new(10.0, -5.0);
        let chain = KinematicChain::with_origin(vec![50.0, 25.0], origin).unwrap();
        assert_eq!(chain.pose().joint_positions[0], origin);
        assert!(approx(chain.end_effector(), Vec2::new(85.0, -5.0)));
    }

    #[test]
    fn angles_past_full_turn_wrap_harmlessly() {
        let mut a = KinematicChain::new(vec![100.0, 50.0]).unwrap();
        let mut b = a.clone();
        a.set_angles(&[30.0, 45.0]).unwrap();
        b.set_angles(&[390.0, -315.0]).unwrap();
        assert!(approx(a.end_effector(), b.end_effector()));
    }

    #[test]
    fn rejects_bad_link_lengths() {
        assert_eq!(
            KinematicChain::new(Vec::new()).unwrap_err(),
            KinematicsError::EmptyChain
        );
        assert_eq!(
            KinematicChain::new(vec![10.0, 0.0]).unwrap_err(),
            KinematicsError::InvalidLinkLength {
                index: 1,
                length: 0.0
            }
        );
        assert!(KinematicChain::new(vec![-3.0]).is_err());
        assert!(KinematicChain::new(vec![f32::NAN]).is_err());
    }

    #[test]
    fn mismatched_angles_leave_state_untouched() {
        let mut chain = KinematicChain::new(vec![100.0, 100.0]).unwrap();
        chain.set_angles(&[10.0, 20.0]).unwrap();
        let before = chain.pose().clone();

        let err = chain.set_angles(&[1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(
            err,
            KinematicsError::AngleCountMismatch {
                expected: 2,
                actual: 3
            }
        );
        assert!(chain.rotate_by(&[1.0]).is_err());
        assert_eq!(chain.angles(), &[10.0, 20.0]);
        assert_eq!(chain.pose(), &before);
    }

    #[test]
    fn rotate_and_reset() {
        let mut chain = KinematicChain::new(vec![100.0, 100.0]).unwrap();
        chain.rotate_by(&[5.0, -5.0]).unwrap();
        chain.rotate_by(&[5.0, -5.0]).unwrap();
        assert_eq!(chain.angles(), &[10.0, -10.0]);
        chain.reset();
        assert_eq!(chain.angles(), &[0.0, 0.0]);
        assert!(approx(chain.end_effector(), Vec2::new(chain.reach(), 0.0)));
    }
}
