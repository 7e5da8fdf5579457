//! Moves all boxes towards their goals at once, one phase at a time.

use std::time::Duration;

use crate::action::{Action, Push};
use crate::config::{Phase, PlannerConfig};
use crate::data::{Pos, DIRECTIONS, UNIT_STEP};
use crate::geometry::no_collision;
use crate::state::Environment;

use super::a_star::{search, Budget, SearchResult, SearchSpace};

struct CoarseSpace<'a> {
    goals: &'a [Pos],
    phase: Phase,
    /// Step of the first box - decides how close counts as arrived.
    goal_step: f64,
    robot_width: f64,
    box_weight: f64,
    retreat: f64,
}

impl SearchSpace for CoarseSpace<'_> {
    type State = Environment;
    type Step = Action;

    fn heuristic(&self, env: &Environment) -> f64 {
        self.goals
            .iter()
            .zip(env.objects())
            .map(|(&goal, o)| self.box_weight * o.pos.dist(goal))
            .sum()
    }

    fn is_goal(&self, env: &Environment) -> bool {
        self.goals
            .iter()
            .zip(env.objects())
            .all(|(&goal, o)| !o.pos.is_away(goal, 0.5 * self.goal_step))
    }

    fn expand(&self, env: &Environment) -> Vec<(Environment, Action)> {
        let mut children = Vec::new();
        for (index, object) in env.objects().iter().enumerate() {
            let step = self.phase.step_size(object.width);
            for &dir in &DIRECTIONS {
                let push = Push::new(object, dir, step, self.retreat);
                let child = env.with_object_at(index, push.object_pos);
                // the robot has to fit both at the contact face and a bit behind it
                if no_collision(env, &child, &push.before, self.robot_width)
                    && no_collision(env, &child, &push.backup, self.robot_width)
                {
                    let action = Action::new(env.clone(), index, dir, push.before, push.after);
                    children.push((child, action));
                }
            }
        }
        children
    }
}

/// Runs one phase for at most `time_limit`.
///
/// Never fails - when the time runs out the path to the visited environment
/// closest to the goals is returned instead.
pub(crate) fn solve(
    env: &Environment,
    goals: &[Pos],
    phase: Phase,
    time_limit: Duration,
    robot_width: f64,
    config: &PlannerConfig,
) -> SearchResult<Environment, Action> {
    let goal_step = env
        .objects()
        .first()
        .map_or(UNIT_STEP, |o| phase.step_size(o.width));
    let space = CoarseSpace {
        goals,
        phase,
        goal_step,
        robot_width,
        box_weight: config.box_weight,
        retreat: f64::from(config.space_left) * UNIT_STEP,
    };
    let res = search(&space, env.clone(), Budget::WallClock(time_limit));
    if res.is_solved() {
        info!(
            "{} solved with {} pushes after visiting {} states",
            phase,
            res.steps.len(),
            res.stats.total_unique_visited()
        );
    } else {
        info!(
            "{} stopped at the closest environment after visiting {} states, {} pushes",
            phase,
            res.stats.total_unique_visited(),
            res.steps.len()
        );
    }
    res
}
