use glam::Vec2;
use ik_kernel::IkSolver;
use viewport::Viewport;

/// One link as the renderer needs it, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkSprite {
    pub start: Vec2,
    pub end: Vec2,
    pub length: f32,
    /// On-screen rotation in degrees
    pub angle: f32,
}

/// Everything a renderer reads after a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    pub links: Vec<LinkSprite>,
    pub end_effector: Vec2,
    pub goal: Vec2,
    pub goal_angle: f32,
    /// Chain-space distance between end-effector and goal
    pub distance: f32,
}

impl FrameSnapshot {
    pub fn capture(solver: &IkSolver, viewport: &Viewport) -> Self {
        let chain = solver.chain();
        let pose = chain.pose();
        let links = pose
            .joint_positions
            .iter()
            .zip(&pose.joint_ends)
            .zip(&pose.world_angles)
            .zip(chain.link_lengths())
            .map(|(((&start, &end), &angle), &length)| LinkSprite {
                start: viewport.to_screen(start),
                end: viewport.to_screen(end),
                length,
                angle: viewport.screen_angle(angle),
            })
            .collect();

        let goal = solver.goal();
        Self {
            links,
            end_effector: viewport.to_screen(pose.end_effector()),
            goal: viewport.to_screen(goal.position),
            goal_angle: viewport.screen_angle(goal.orientation),
            distance: solver.distance_to_goal(),
        }
    }

    pub fn title(&self, base: &str) -> String {
        format!(
            "{base} | end ({:.0}, {:.0}) | goal ({:.0}, {:.0}) | distance {:.1}",
            self.end_effector.x, self.end_effector.y, self.goal.x, self.goal.y, self.distance
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ik_kernel::{Goal, KinematicChain, SolverConfig};

    fn solver() -> IkSolver {
        let chain = KinematicChain::new(vec![100.0, 100.0, 100.0, 75.0, 75.0]).unwrap();
        IkSolver::new(
            chain,
            Goal::new(Vec2::new(-50.0, 50.0), 90.0),
            SolverConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn captures_start_pose_in_screen_space() {
        let snapshot = FrameSnapshot::capture(&solver(), &Viewport::new(800, 600));

        assert_eq!(snapshot.links.len(), 5);
        assert_eq!(snapshot.links[0].start, Vec2::new(400.0, 300.0));
        assert_eq!(snapshot.links[0].end, Vec2::new(500.0, 300.0));
        assert_eq!(snapshot.links[4].length, 75.0);
        assert_eq!(snapshot.end_effector, Vec2::new(850.0, 300.0));
        assert_eq!(snapshot.goal, Vec2::new(350.0, 250.0));
        assert_eq!(snapshot.goal_angle, -90.0);
        assert!((snapshot.distance - 502.49).abs() < 0.01);
    }

    #[test]
    fn links_stay_connected_after_steps() {
        let mut solver = solver();
        for _ in 0..10 {
            solver.step();
        }
        let snapshot = FrameSnapshot::capture(&solver, &Viewport::new(800, 600));
        for pair in snapshot.links.windows(2) {
            assert!((pair[0].end - pair[1].start).length() < 1e-3);
        }
        assert!(snapshot.title("IK solver").starts_with("IK solver | end ("));
    }
}
