//! Jacobian Transpose inverse kinematics.
//!
//! Every tick the solver measures the positional error between the
//! end-effector and the goal, maps it through the transpose of the positional
//! Jacobian to a per-joint rotation rate, scales that rate by the tick rate and
//! adds it to the joint angles. There is no termination: the chain keeps
//! creeping toward the goal for as long as `step` is called, and a new goal is
//! picked up on the very next call.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{Goal, KinematicChain, KinematicsError, KinematicsResult};

/// Divisor applied (together with the tick rate) to raw rotation rates.
/// Larger values approach the goal more slowly and more stably.
pub const DEFAULT_RATE_CONSTANT: f32 = 120.0;

pub const DEFAULT_STEPS_PER_SECOND: f32 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Simulation ticks per second.
    pub steps_per_second: f32,
    /// The `K` in `rate / (K * steps_per_second)`.
    pub rate_constant: f32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            steps_per_second: DEFAULT_STEPS_PER_SECOND,
            rate_constant: DEFAULT_RATE_CONSTANT,
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> KinematicsResult<()> {
        if !self.steps_per_second.is_finite() || self.steps_per_second <= 0.0 {
            return Err(KinematicsError::InvalidSolverConfig(format!(
                "steps_per_second must be positive, got {}",
                self.steps_per_second
            )));
        }
        if !self.rate_constant.is_finite() || self.rate_constant <= 0.0 {
            return Err(KinematicsError::InvalidSolverConfig(format!(
                "rate_constant must be positive, got {}",
                self.rate_constant
            )));
        }
        Ok(())
    }
}

/// One row per joint: the end-effector velocity produced by a unit rotation
/// rate at that joint, i.e. `ẑ × (end_effector - joint)`.
pub fn jacobian_transpose(joint_positions: &[Vec2], end_effector: Vec2) -> Vec<Vec2> {
    joint_positions
        .iter()
        .map(|&joint| {
            let d = end_effector - joint;
            Vec3::Z.cross(d.extend(0.0)).truncate()
        })
        .collect()
}

/// `goal - end_effector`. Orientation does not participate.
pub fn positional_error(end_effector: Vec2, goal: Vec2) -> Vec2 {
    goal - end_effector
}

/// Row-wise dot product of the Jacobian Transpose with the error vector.
pub fn rotation_rates(jacobian_transpose: &[Vec2], error: Vec2) -> Vec<f32> {
    jacobian_transpose.iter().map(|row| row.dot(error)).collect()
}

/// Divide every rate by `rate_constant * steps_per_second`.
pub fn scale_for_timestep(rates: &mut [f32], steps_per_second: f32, rate_constant: f32) {
    let divisor = rate_constant * steps_per_second;
    for rate in rates.iter_mut() {
        *rate /= divisor;
    }
}

/// Outcome of a bounded batch solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Convergence {
    pub steps: usize,
    pub converged: bool,
    pub distance: f32,
}

/// Owns a chain and steers its end-effector toward a goal.
#[derive(Debug, Clone)]
pub struct IkSolver {
    chain: KinematicChain,
    goal: Goal,
    config: SolverConfig,
    last_rates: Vec<f32>,
}

impl IkSolver {
    pub fn new(chain: KinematicChain, goal: Goal, config: SolverConfig) -> KinematicsResult<Self> {
        config.validate()?;
        let last_rates = vec![0.0; chain.link_count()];
        debug!(
            links = chain.link_count(),
            steps_per_second = config.steps_per_second,
            rate_constant = config.rate_constant,
            "created ik solver"
        );
        Ok(Self {
            chain,
            goal,
            config,
            last_rates,
        })
    }

    /// Replace the goal. Takes effect on the next `step`.
    pub fn set_goal(&mut self, position: Vec2, orientation: f32) {
        debug!(x = position.x, y = position.y, orientation, "goal changed");
        self.goal = Goal::new(position, orientation);
    }

    /// Advance the chain by one tick.
    pub fn step(&mut self) {
        let pose = self.chain.pose();
        let end_effector = pose.end_effector();
        let jt = jacobian_transpose(&pose.joint_positions, end_effector);
        let error = positional_error(end_effector, self.goal.position);
        let mut rates = rotation_rates(&jt, error);
        scale_for_timestep(
            &mut rates,
            self.config.steps_per_second,
            self.config.rate_constant,
        );

        self.chain.apply_rotation(&rates);
        trace!(
            error = error.length(),
            end_x = self.chain.end_effector().x,
            end_y = self.chain.end_effector().y,
            "ik step"
        );
        self.last_rates = rates;
    }

    /// Step until the end-effector is within `tolerance` of the goal or
    /// `max_steps` ticks have run.
    pub fn solve(&mut self, tolerance: f32, max_steps: usize) -> Convergence {
        let mut steps = 0;
        while self.distance_to_goal() >= tolerance && steps < max_steps {
            self.step();
            steps += 1;
        }
        let distance = self.distance_to_goal();
        let converged = distance < tolerance;
        debug!(steps, converged, distance, "batch solve finished");
        Convergence {
            steps,
            converged,
            distance,
        }
    }

    /// Return the chain to its start-up pose. The goal is kept.
    pub fn reset(&mut self) {
        self.chain.reset();
        self.last_rates.iter_mut().for_each(|r| *r = 0.0);
    }

    pub fn error(&self) -> Vec2 {
        positional_error(self.chain.end_effector(), self.goal.position)
    }

    pub fn distance_to_goal(&self) -> f32 {
        self.error().length()
    }

    pub fn goal(&self) -> Goal {
        self.goal
    }

    pub fn chain(&self) -> &KinematicChain {
        &self.chain
    }

    pub fn config(&self) -> SolverConfig {
        self.config
    }

    /// Angle deltas (degrees) applied by the most recent `step`.
    pub fn last_rates(&self) -> &[f32] {
        &self.last_rates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arm() -> KinematicChain {
        KinematicChain::new(vec![100.0, 100.0, 100.0, 75.0, 75.0]).unwrap()
    }

    fn solver(goal: Goal) -> IkSolver {
        IkSolver::new(arm(), goal, SolverConfig::default()).unwrap()
    }

    #[test]
    fn jacobian_rows_are_perpendicular_to_joint_offsets() {
        let mut chain = arm();
        chain.set_angles(&[12.0, -40.0, 75.0, 3.5, -120.0]).unwrap();
        let pose = chain.pose();
        let end = pose.end_effector();
        let jt = jacobian_transpose(&pose.joint_positions, end);
        assert_eq!(jt.len(), chain.link_count());
        for (row, joint) in jt.iter().zip(&pose.joint_positions) {
            let d = end - *joint;
            assert!(row.dot(d).abs() < 1e-2, "row {row:?} not perpendicular to {d:?}");
            assert!((row.length() - d.length()).abs() < 1e-3);
        }
    }

    #[test]
    fn jacobian_row_points_counter_clockwise() {
        let jt = jacobian_transpose(&[Vec2::ZERO], Vec2::new(100.0, 0.0));
        assert_eq!(jt[0], Vec2::new(0.0, 100.0));
    }

    #[test]
    fn error_ignores_orientation() {
        let mut a = solver(Goal::new(Vec2::new(-50.0, 50.0), 0.0));
        let mut b = solver(Goal::new(Vec2::new(-50.0, 50.0), 270.0));
        assert_eq!(a.error(), b.error());
        assert_eq!(a.error(), Vec2::new(-500.0, 50.0));
        a.step();
        b.step();
        assert_eq!(a.chain().angles(), b.chain().angles());
    }

    #[test]
    fn goal_on_end_effector_leaves_angles_unchanged() {
        let mut chain = arm();
        chain.set_angles(&[10.0, 20.0, -30.0, 40.0, 5.0]).unwrap();
        let end = chain.end_effector();
        let before = chain.angles().to_vec();
        let mut solver = IkSolver::new(chain, Goal::new(end, 0.0), SolverConfig::default()).unwrap();

        assert_eq!(solver.error(), Vec2::ZERO);
        solver.step();
        assert_eq!(solver.chain().angles(), before.as_slice());
        assert!(solver.last_rates().iter().all(|r| *r == 0.0));
    }

    #[test]
    fn repeated_steps_close_in_on_reachable_goal() {
        for target in [Vec2::new(-50.0, 50.0), Vec2::new(300.0, 150.0), Vec2::new(250.0, 200.0)] {
            let mut solver = solver(Goal::new(target, 0.0));
            let initial = solver.distance_to_goal();
            for _ in 0..200 {
                solver.step();
            }
            let remaining = solver.distance_to_goal();
            assert!(
                remaining < initial * 0.1,
                "{target:?}: {remaining} not below 10% of {initial}"
            );
        }
    }

    #[test]
    fn new_goal_redirects_next_step() {
        let mut solver = solver(Goal::at(450.0, 100.0));
        solver.step();
        assert!(solver.last_rates()[0] > 0.0);

        solver.set_goal(Vec2::new(450.0, -100.0), 0.0);
        solver.step();
        assert!(solver.last_rates()[0] < 0.0);
    }

    #[test]
    fn doubling_tick_rate_halves_rotation() {
        let goal = Goal::at(100.0, 200.0);
        let mut slow = IkSolver::new(
            arm(),
            goal,
            SolverConfig {
                steps_per_second: 30.0,
                ..SolverConfig::default()
            },
        )
        .unwrap();
        let mut fast = IkSolver::new(
            arm(),
            goal,
            SolverConfig {
                steps_per_second: 60.0,
                ..SolverConfig::default()
            },
        )
        .unwrap();
        slow.step();
        fast.step();
        for (s, f) in slow.last_rates().iter().zip(fast.last_rates()) {
            assert!((s / 2.0 - f).abs() < 1e-5, "{s} / 2 != {f}");
        }
    }

    #[test]
    fn scale_divides_by_rate_constant_and_tick_rate() {
        let mut rates = vec![3600.0, -7200.0, 0.0];
        scale_for_timestep(&mut rates, 30.0, 120.0);
        assert_eq!(rates, vec![1.0, -2.0, 0.0]);
    }

    #[test]
    fn rotation_rates_are_row_dot_error() {
        let jt = [Vec2::new(1.0, 2.0), Vec2::new(-3.0, 0.5)];
        let rates = rotation_rates(&jt, Vec2::new(4.0, -2.0));
        assert_eq!(rates, vec![0.0, -13.0]);
    }

    #[test]
    fn batch_solve_converges_or_hits_cap() {
        let mut reachable = solver(Goal::at(-50.0, 50.0));
        let outcome = reachable.solve(0.5, 2000);
        assert!(outcome.converged);
        assert!(outcome.steps > 0 && outcome.steps < 2000);
        assert!(outcome.distance < 0.5);

        let mut unreachable = solver(Goal::at(1000.0, 1000.0));
        let outcome = unreachable.solve(0.5, 50);
        assert!(!outcome.converged);
        assert_eq!(outcome.steps, 50);
    }

    #[test]
    fn solve_at_goal_takes_no_steps() {
        let mut solver = solver(Goal::at(450.0, 0.0));
        let outcome = solver.solve(0.5, 100);
        assert_eq!(outcome.steps, 0);
        assert!(outcome.converged);
    }

    #[test]
    fn reset_restores_start_pose_and_keeps_goal() {
        let mut solver = solver(Goal::new(Vec2::new(0.0, 200.0), 45.0));
        solver.solve(1.0, 500);
        solver.reset();
        assert!(solver.chain().angles().iter().all(|a| *a == 0.0));
        assert_eq!(solver.goal(), Goal::new(Vec2::new(0.0, 200.0), 45.0));
    }

    #[test]
    fn rejects_non_positive_config() {
        let bad_rate = SolverConfig {
            steps_per_second: 0.0,
            ..SolverConfig::default()
        };
        assert!(matches!(
            IkSolver::new(arm(), Goal::default(), bad_rate),
            Err(KinematicsError::InvalidSolverConfig(_))
        ));
        let bad_k = SolverConfig {
            rate_constant: -1.0,
            ..SolverConfig::default()
        };
        assert!(bad_k.validate().is_err());
        assert!(SolverConfig::default().validate().is_ok());
    }
}
