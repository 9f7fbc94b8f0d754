use ik_kernel::IkSolver;
use serde::Serialize;

/// Result of a windowless solve, printed as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct HeadlessReport {
    pub steps: usize,
    pub converged: bool,
    pub distance: f32,
    pub goal: [f32; 2],
    pub end_effector: [f32; 2],
    /// Relative joint angles in degrees
    pub angles: Vec<f32>,
}

pub fn run(solver: &mut IkSolver, tolerance: f32, max_steps: usize) -> HeadlessReport {
    let outcome = solver.solve(tolerance, max_steps);
    HeadlessReport {
        steps: outcome.steps,
        converged: outcome.converged,
        distance: outcome.distance,
        goal: solver.goal().position.to_array(),
        end_effector: solver.chain().end_effector().to_array(),
        angles: solver.chain().angles().to_vec(),
    }
}
