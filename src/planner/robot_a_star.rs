//! Moves the robot between two poses without touching anything.

use crate::config::PlannerConfig;
use crate::data::{round3, Pos, UNIT_STEP};
use crate::geometry::no_collision;
use crate::state::{Environment, RobotPose};

use super::a_star::{search, Budget, SearchResult, SearchSpace};

/// Smallest rotation which moves the ends of the robot by about one unit step.
pub(crate) fn rotation_step(width: f64) -> f64 {
    let angle = (1.0 - 2.0 * UNIT_STEP * UNIT_STEP / (width * width)).acos();
    (round3(angle) - UNIT_STEP).max(UNIT_STEP)
}

/// Moves `from` by `delta`, but lands exactly on `to` instead of stepping over it.
fn snapped(from: f64, delta: f64, to: f64) -> f64 {
    let next = from + delta;
    if (from < to && next > to) || (from > to && next < to) {
        to
    } else {
        next
    }
}

struct RobotSpace<'a> {
    env: &'a Environment,
    goal: RobotPose,
    width: f64,
    rotation: f64,
    distance_weight: f64,
    angle_weight: f64,
}

impl RobotSpace<'_> {
    fn moves(&self, pose: &RobotPose) -> [RobotPose; 6] {
        let RobotPose { pos: Pos { x, y }, angle } = *pose;
        let goal = self.goal;
        [
            RobotPose::new(x, snapped(y, UNIT_STEP, goal.pos.y), angle),
            RobotPose::new(x, snapped(y, -UNIT_STEP, goal.pos.y), angle),
            RobotPose::new(snapped(x, -UNIT_STEP, goal.pos.x), y, angle),
            RobotPose::new(snapped(x, UNIT_STEP, goal.pos.x), y, angle),
            RobotPose::new(x, y, snapped(angle, -self.rotation, goal.angle)),
            RobotPose::new(x, y, snapped(angle, self.rotation, goal.angle)),
        ]
    }
}

impl SearchSpace for RobotSpace<'_> {
    type State = RobotPose;
    type Step = RobotPose;

    fn heuristic(&self, pose: &RobotPose) -> f64 {
        self.distance_weight * pose.pos.dist(self.goal.pos)
            + self.angle_weight * (pose.angle - self.goal.angle).abs()
    }

    fn is_goal(&self, pose: &RobotPose) -> bool {
        pose.is_near(&self.goal)
    }

    fn expand(&self, pose: &RobotPose) -> Vec<(RobotPose, RobotPose)> {
        self.moves(pose)
            .iter()
            .filter(|next| no_collision(self.env, self.env, next, self.width))
            .map(|&next| (next, next))
            .collect()
    }
}

/// Route of unit moves from `from` to `to`, the steps are the poses after each move.
pub(crate) fn solve(
    env: &Environment,
    from: RobotPose,
    to: RobotPose,
    max_expansions: usize,
    width: f64,
    config: &PlannerConfig,
) -> SearchResult<RobotPose, RobotPose> {
    let space = RobotSpace {
        env,
        goal: to,
        width,
        rotation: rotation_step(width),
        distance_weight: config.distance_weight,
        angle_weight: config.angle_weight,
    };
    search(&space, from, Budget::Expansions(max_expansions))
}

/// Cheap check that `to` can be reached from `from` at all.
pub(crate) fn probe(
    env: &Environment,
    from: RobotPose,
    to: RobotPose,
    width: f64,
    config: &PlannerConfig,
) -> bool {
    solve(env, from, to, config.robot_probe_expansions, width, config).is_solved()
}
