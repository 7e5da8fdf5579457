//! Moves one designated box by unit steps, everything else stays put.

use crate::action::{Action, Push};
use crate::config::PlannerConfig;
use crate::data::{Pos, DIRECTIONS, MAX_ERROR, UNIT_STEP};
use crate::geometry::no_collision;
use crate::state::Environment;

use super::a_star::{search, Budget, SearchResult, SearchSpace};

struct SingleBoxSpace {
    moved: usize,
    target: Pos,
    robot_width: f64,
    weight: f64,
}

impl SearchSpace for SingleBoxSpace {
    type State = Environment;
    type Step = Action;

    fn heuristic(&self, env: &Environment) -> f64 {
        self.weight * env.object(self.moved).pos.dist2(self.target)
    }

    fn is_goal(&self, env: &Environment) -> bool {
        !env.object(self.moved).pos.is_away(self.target, MAX_ERROR)
    }

    fn expand(&self, env: &Environment) -> Vec<(Environment, Action)> {
        let object = env.object(self.moved);
        DIRECTIONS
            .iter()
            .filter_map(|&dir| {
                let push = Push::new(object, dir, UNIT_STEP, 0.0);
                let child = env.with_object_at(self.moved, push.object_pos);
                if no_collision(env, &child, &push.before, self.robot_width) {
                    let action = Action::new(env.clone(), self.moved, dir, push.before, push.after);
                    Some((child, action))
                } else {
                    None
                }
            })
            .collect()
    }
}

/// Pushes object `moved` from where it is in `start` to where it is in `goal`.
pub(crate) fn solve(
    start: &Environment,
    goal: &Environment,
    moved: usize,
    max_expansions: usize,
    robot_width: f64,
    config: &PlannerConfig,
) -> SearchResult<Environment, Action> {
    let space = SingleBoxSpace {
        moved,
        target: goal.object(moved).pos,
        robot_width,
        weight: config.single_box_weight,
    };
    let res = search(&space, start.clone(), Budget::Expansions(max_expansions));
    debug!(
        "Single box search for object {}: {:?} after {} states",
        moved,
        res.outcome,
        res.stats.total_unique_visited()
    );
    res
}

/// Same as `solve` with the goal given as the object's target position.
pub(crate) fn solve_to_point(
    start: &Environment,
    target: Pos,
    moved: usize,
    max_expansions: usize,
    robot_width: f64,
    config: &PlannerConfig,
) -> SearchResult<Environment, Action> {
    let goal = start.with_object_at(moved, target);
    solve(start, &goal, moved, max_expansions, robot_width, config)
}
