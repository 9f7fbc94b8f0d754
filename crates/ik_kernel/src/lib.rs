//! Planar kinematic chain and Jacobian Transpose inverse kinematics solver.

pub mod chain;
pub mod error;
pub mod goal;
pub mod solver;

pub use chain::{compute_pose, ChainPose, KinematicChain};
pub use error::{KinematicsError, KinematicsResult};
pub use goal::Goal;
pub use solver::{
    jacobian_transpose, positional_error, rotation_rates, scale_for_timestep, Convergence,
    IkSolver, SolverConfig, DEFAULT_RATE_CONSTANT, DEFAULT_STEPS_PER_SECOND,
};
