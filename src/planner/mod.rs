pub(crate) mod a_star;
mod box_rrt;
mod coarse;
mod robot_a_star;
mod robot_rrt;
mod single_box;

use std::error::Error;
use std::fmt::{self, Debug, Display, Formatter, Write};
use std::path::Path;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::action::Action;
use crate::config::{PlannerConfig, RrtBudget};
use crate::data::{Pos, MAX_ERROR};
use crate::fs;
use crate::problem::Problem;
use crate::state::{Environment, ObjectKind, RobotPose};
use crate::trace::{Trace, TraceLine};
use crate::Plan;

use self::box_rrt::BoxRrt;
use self::robot_rrt::RobotRrt;

pub use self::a_star::{SearchOutcome, Stats};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlanErr {
    NoBoxes,
    InvalidRobotWidth,
    /// Index of a goal whose object is missing or isn't a box.
    GoalWithoutBox(usize),
    /// Index of the object which doesn't fit in the workspace.
    OutOfBounds(usize),
    InitialCollision,
}

impl Display for PlanErr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            PlanErr::NoBoxes => write!(f, "No boxes with goals"),
            PlanErr::InvalidRobotWidth => write!(f, "Robot width must be positive"),
            PlanErr::GoalWithoutBox(index) => write!(f, "Goal {} doesn't belong to a box", index),
            PlanErr::OutOfBounds(index) => {
                write!(f, "Object {} is not inside the unit square", index)
            }
            PlanErr::InitialCollision => write!(
                f,
                "Initial configuration collides - overlapping objects or robot"
            ),
        }
    }
}

impl Error for PlanErr {}

/// Which tier moved a box the coarse search left off its goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalOutcome {
    SingleBox,
    BoxRrt,
    /// Needed to move `blocker` out of the way at the same time.
    JointBoxRrt { blocker: usize },
    Unreachable,
}

impl Display for GoalOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            GoalOutcome::SingleBox => write!(f, "single box search"),
            GoalOutcome::BoxRrt => write!(f, "box RRT"),
            GoalOutcome::JointBoxRrt { blocker } => {
                write!(f, "joint box RRT with object {}", blocker)
            }
            GoalOutcome::Unreachable => write!(f, "unreachable"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalReport {
    /// Index of the box (and its goal).
    pub goal: usize,
    /// How far the box was from its goal after the coarse search.
    pub distance: f64,
    pub outcome: GoalOutcome,
}

/// How far the robot got - `at` is the index of the first action not traced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotStage {
    Complete,
    TimedOut { at: usize },
    Unrealizable { at: usize },
}

impl Display for RobotStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            RobotStage::Complete => write!(f, "complete"),
            RobotStage::TimedOut { at } => write!(f, "timed out at push {}", at),
            RobotStage::Unrealizable { at } => {
                write!(f, "no robot route to push {}", at)
            }
        }
    }
}

pub struct PlanOk {
    pub trace: Trace,
    /// Only goals the coarse search didn't reach, in the order they were attempted.
    pub goals: Vec<GoalReport>,
    pub robot_stage: RobotStage,
    pub pushes: usize,
    pub box_stats: Stats,
    pub robot_stats: Stats,
    pub final_env: Environment,
}

impl PlanOk {
    pub fn is_complete(&self) -> bool {
        self.robot_stage == RobotStage::Complete
            && self
                .goals
                .iter()
                .all(|g| g.outcome != GoalOutcome::Unreachable)
    }
}

impl Debug for PlanOk {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pushes: {}", self.pushes)?;
        writeln!(f, "Trace lines: {}", self.trace.len())?;
        writeln!(f, "Robot stage: {}", self.robot_stage)?;
        for g in &self.goals {
            writeln!(f, "Goal {} ({:.3} away): {}", g.goal, g.distance, g.outcome)?;
        }
        writeln!(f, "Box searches:\n{}", self.box_stats)?;
        write!(f, "Robot searches:\n{}", self.robot_stats)
    }
}

impl Plan for Problem {
    fn plan(&self, config: &PlannerConfig) -> Result<PlanOk, PlanErr> {
        plan(self, config)
    }
}

pub fn plan(problem: &Problem, config: &PlannerConfig) -> Result<PlanOk, PlanErr> {
    problem.validate()?;

    let started = Instant::now();
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut planner = Planner {
        width: problem.robot_width,
        goals: &problem.goals,
        config,
        rng: &mut rng,
        box_stats: Stats::new(),
        robot_stats: Stats::new(),
    };

    let initial = problem.initial_env();
    info!(
        "Planning for {} boxes and {} other objects in {} mode",
        problem.goals.len(),
        initial.len() - problem.goals.len(),
        config.mode
    );
    let (actions, final_env, goals) = planner.plan_boxes(&initial);
    info!("Boxes planned with {} pushes", actions.len());

    let (trace, robot_stage) =
        planner.plan_robot(&initial, problem.initial_robot, &actions, started);
    info!(
        "Robot stage {} with {} trace lines in {} ms",
        robot_stage,
        trace.len(),
        started.elapsed().as_millis()
    );

    Ok(PlanOk {
        trace,
        goals,
        robot_stage,
        pushes: actions.len(),
        box_stats: planner.box_stats,
        robot_stats: planner.robot_stats,
        final_env,
    })
}

struct Planner<'a> {
    width: f64,
    goals: &'a [Pos],
    config: &'a PlannerConfig,
    rng: &'a mut StdRng,
    box_stats: Stats,
    robot_stats: Stats,
}

impl Planner<'_> {
    fn plan_boxes(&mut self, initial: &Environment) -> (Vec<Action>, Environment, Vec<GoalReport>) {
        let mut actions = Vec::new();
        let mut env = initial.clone();

        for &(phase, limit) in &self.config.coarse_phases {
            let res = coarse::solve(&env, self.goals, phase, limit, self.width, self.config);
            self.box_stats.merge(&res.stats);
            actions.extend(res.steps);
            env = res.state;
        }

        let mut pending: Vec<_> = self
            .goals
            .iter()
            .enumerate()
            .filter(|&(i, &goal)| env.object(i).pos.is_away(goal, MAX_ERROR))
            .map(|(i, &goal)| (i, env.object(i).pos.dist(goal)))
            .collect();
        // easiest first
        pending.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(::std::cmp::Ordering::Equal));

        let mut reports = Vec::new();
        for (goal, distance) in pending {
            info!("Box {} is {:.3} away from its goal", goal, distance);
            let outcome = match self.resolve_goal(&env, goal) {
                Some((outcome, pushes, reached)) => {
                    info!("Box {} moved to its goal by {}", goal, outcome);
                    actions.extend(pushes);
                    env = reached;
                    outcome
                }
                None => {
                    warn!("Box {} can't reach its goal, skipping it", goal);
                    GoalOutcome::Unreachable
                }
            };
            reports.push(GoalReport {
                goal,
                distance,
                outcome,
            });
        }

        (actions, env, reports)
    }

    /// Tries the single box search, then the box RRT, then (advanced mode only)
    /// the joint RRT with whatever blocked the box RRT the most.
    fn resolve_goal(
        &mut self,
        env: &Environment,
        goal: usize,
    ) -> Option<(GoalOutcome, Vec<Action>, Environment)> {
        let target = self.goals[goal];
        let res = single_box::solve_to_point(
            env,
            target,
            goal,
            self.config.single_box_retry_expansions,
            self.width,
            self.config,
        );
        self.box_stats.merge(&res.stats);
        if res.is_solved() {
            return Some((GoalOutcome::SingleBox, res.steps, res.state));
        }

        let budget = self.config.box_rrt;
        let mut rrt = BoxRrt::new(
            env,
            vec![goal],
            target,
            budget.step,
            self.config.box_rrt_goal_tolerance,
        );
        if let Some(route) = rrt.solve(budget.max_samples, self.rng) {
            return self
                .realize_route(env, &route, &[goal])
                .map(|(pushes, reached)| (GoalOutcome::BoxRrt, pushes, reached));
        }

        if !self.config.advanced() {
            return None;
        }
        let (blocker, count) = rrt.problem_object()?;
        info!(
            "Box {} blocked {} times by object {}, moving both",
            goal, count, blocker
        );
        let route = self.joint_route(env, goal, blocker, target, self.config.joint_box_rrt)?;
        self.realize_route(env, &route, &[goal, blocker])
            .map(|(pushes, reached)| (GoalOutcome::JointBoxRrt { blocker }, pushes, reached))
    }

    fn joint_route(
        &mut self,
        env: &Environment,
        goal: usize,
        blocker: usize,
        target: Pos,
        budget: RrtBudget,
    ) -> Option<Vec<Environment>> {
        BoxRrt::new(
            env,
            vec![goal, blocker],
            target,
            budget.step,
            self.config.box_rrt_goal_tolerance,
        )
        .solve(budget.max_samples, self.rng)
    }

    /// Turns a route of environments into unit pushes, hop by hop. With two moved
    /// objects, the second one follows the first at every hop but the last.
    ///
    /// `None` if any hop can't be realized - a partial route is never returned.
    fn realize_route(
        &mut self,
        start: &Environment,
        route: &[Environment],
        moved: &[usize],
    ) -> Option<(Vec<Action>, Environment)> {
        let mut actions = Vec::new();
        let mut current = start.clone();
        for (hop, target) in route.iter().enumerate() {
            let last = hop + 1 == route.len();
            for (k, &index) in moved.iter().enumerate() {
                if k > 0 && last {
                    break;
                }
                let res = single_box::solve(
                    &current,
                    target,
                    index,
                    self.config.single_box_hop_expansions,
                    self.width,
                    self.config,
                );
                self.box_stats.merge(&res.stats);
                if !res.is_solved() {
                    info!(
                        "Hop {} of {} can't be realized for object {}",
                        hop,
                        route.len(),
                        index
                    );
                    return None;
                }
                actions.extend(res.steps);
                current = res.state;
            }
        }
        Some((actions, current))
    }

    fn plan_robot(
        &mut self,
        initial: &Environment,
        start: RobotPose,
        actions: &[Action],
        started: Instant,
    ) -> (Trace, RobotStage) {
        let mut trace = Trace::new();
        trace.push(TraceLine::new(start, initial));
        let mut robot = start;

        for (at, action) in actions.iter().enumerate() {
            if self.config.time_boxed() && started.elapsed() > self.config.robot_stage_timeout {
                warn!("Out of time after {} of {} pushes", at, actions.len());
                return (trace, RobotStage::TimedOut { at });
            }

            match self.route_robot(&action.env, robot, action.push_pose) {
                Some(poses) => {
                    trace.extend(poses.into_iter().map(|p| TraceLine::new(p, &action.env)))
                }
                None => {
                    error!(
                        "No robot route from {:?} to push {} ({:?})",
                        robot, at, action
                    );
                    self.dump(&action.env, robot, action.push_pose);
                    return (trace, RobotStage::Unrealizable { at });
                }
            }

            match action.push_trace() {
                Ok(lines) => trace.extend(lines),
                Err(err) => warn!("Skipping push {}: {}", at, err),
            }
            robot = action.after_push_pose;
        }

        (trace, RobotStage::Complete)
    }

    /// Poses after every robot move from `from` to `to`, `from` itself excluded.
    fn route_robot(
        &mut self,
        env: &Environment,
        from: RobotPose,
        to: RobotPose,
    ) -> Option<Vec<RobotPose>> {
        let expansions = self.config.robot_expansions;
        let res = robot_a_star::solve(env, from, to, expansions, self.width, self.config);
        self.robot_stats.merge(&res.stats);
        if res.is_solved() {
            return Some(res.steps);
        }

        debug!("Robot A* failed, sampling waypoints");
        let budget = self.config.robot_rrt;
        let waypoints =
            RobotRrt::new(env, to, self.width, self.config).solve(from, budget.max_samples, self.rng)?;

        let mut poses = Vec::new();
        let mut current = from;
        for waypoint in waypoints {
            let res = robot_a_star::solve(env, current, waypoint, expansions, self.width, self.config);
            self.robot_stats.merge(&res.stats);
            if !res.is_solved() {
                return None;
            }
            poses.extend(res.steps);
            current = res.state;
        }
        Some(poses)
    }

    fn dump(&self, env: &Environment, from: RobotPose, to: RobotPose) {
        let dir = match self.config.dump_dir {
            Some(ref dir) => dir,
            None => return,
        };
        for &(name, pose) in &[("from.txt", from), ("to.txt", to)] {
            let text = dump_text(self.width, &pose, env, self.goals);
            match fs::write_in(dir, name, &text) {
                Ok(path) => info!("Wrote {}", path.display()),
                Err(err) => error!("Can't write {} in {}: {}", name, dir.display(), err),
            }
        }
    }
}

/// The robot sub-problem in a form that can be fed back to the planner by hand.
pub(crate) fn dump_text(width: f64, pose: &RobotPose, env: &Environment, goals: &[Pos]) -> String {
    let objects = env.objects();
    let inert: Vec<_> = objects
        .iter()
        .filter(|o| o.kind == ObjectKind::Obstacle)
        .collect();

    let mut out = String::new();
    // writing to a String can't fail
    let _ = writeln!(
        out,
        "{:.3} {:.3} {:.3} {:.3}",
        width, pose.pos.x, pose.pos.y, pose.angle
    );
    let _ = writeln!(out, "{} {} {}", goals.len(), inert.len(), env.statics().len());
    for (o, goal) in objects.iter().zip(goals) {
        let half = 0.5 * o.width;
        let _ = writeln!(
            out,
            "{} {:.3} {:.3}",
            o.center(),
            goal.x + half,
            goal.y + half
        );
    }
    for o in inert {
        let _ = writeln!(out, "{} {:.3}", o.center(), o.width);
    }
    for s in env.statics() {
        let r = s.rect;
        let _ = writeln!(
            out,
            "{:.3} {:.3} {:.3} {:.3}",
            r.x,
            r.y,
            r.max_x(),
            r.max_y()
        );
    }
    out
}

/// Writes the trace of a finished plan.
pub fn write_trace<P: AsRef<Path>>(path: P, plan: &PlanOk) -> Result<(), Box<dyn Error>> {
    fs::write_file(path, &plan.trace.to_string())
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::config::Mode;
    use crate::data::{Rect, HORIZONTAL};
    use crate::state::{MovingObject, StaticObstacle};

    const W: f64 = 0.05;

    fn problem(boxes: &[((f64, f64), (f64, f64))], robot: RobotPose, statics: Vec<Rect>) -> Problem {
        Problem {
            robot_width: W,
            initial_robot: robot,
            objects: boxes
                .iter()
                .map(|&((x, y), _)| MovingObject::new(Pos::new(x, y), W, ObjectKind::Box))
                .collect(),
            goals: boxes.iter().map(|&(_, (x, y))| Pos::new(x, y)).collect(),
            statics: statics.into_iter().map(StaticObstacle::new).collect(),
        }
    }

    fn config() -> PlannerConfig {
        PlannerConfig::default().with_seed(42)
    }

    #[test]
    fn single_push_plan() {
        // robot already touching the box, one full width push to the right
        let p = problem(
            &[((0.2, 0.2), (0.25, 0.2))],
            RobotPose::new(0.2, 0.225, crate::data::VERTICAL),
            vec![],
        );
        let res = plan(&p, &config()).unwrap();

        assert!(res.is_complete());
        assert!(res.goals.is_empty());
        assert_eq!(res.pushes, 1);
        // initial line, no robot moves, then 51 push lines
        assert_eq!(res.trace.len(), 1 + 51);
        assert_eq!(
            res.trace.lines()[0].to_string(),
            "0.200 0.225 1.571 0.225 0.225"
        );
        assert_eq!(
            res.trace.last().unwrap().to_string(),
            "0.250 0.225 1.571 0.275 0.225"
        );
        assert!(!res.final_env.object(0).pos.is_away(Pos::new(0.25, 0.2), MAX_ERROR));
    }

    #[test]
    fn robot_walks_to_every_push() {
        let p = problem(
            &[((0.2, 0.2), (0.3, 0.2)), ((0.6, 0.6), (0.6, 0.5))],
            RobotPose::new(0.5, 0.1, HORIZONTAL),
            vec![],
        );
        let res = plan(&p, &config()).unwrap();
        assert!(res.is_complete());
        assert!(!res.final_env.object(0).pos.is_away(Pos::new(0.3, 0.2), MAX_ERROR));
        assert!(!res.final_env.object(1).pos.is_away(Pos::new(0.6, 0.5), MAX_ERROR));

        // every line differs from the previous one by at most one robot move
        for pair in res.trace.lines().windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(a.robot.pos.dist(b.robot.pos) <= 0.001 + 1e-6);
            assert!((a.robot.angle - b.robot.angle).abs() <= 0.04);
        }
    }

    #[test]
    fn coarse_leftover_is_resolved_by_single_box_search() {
        // closer than half a phase 1 step, so the coarse search doesn't push at all
        let p = problem(
            &[((0.2, 0.2), (0.22, 0.2))],
            RobotPose::new(0.195, 0.225, crate::data::VERTICAL),
            vec![],
        );
        let res = plan(&p, &config()).unwrap();
        assert_eq!(res.goals.len(), 1);
        assert_eq!(res.goals[0].outcome, GoalOutcome::SingleBox);
        assert!(res.is_complete());
        assert_eq!(res.pushes, 20);
    }

    #[test]
    fn unreachable_goal_is_skipped() {
        // the goal is inside a static obstacle
        let p = problem(
            &[((0.2, 0.2), (0.7, 0.7)), ((0.2, 0.5), (0.3, 0.5))],
            RobotPose::new(0.1, 0.1, HORIZONTAL),
            vec![Rect::new(0.65, 0.65, 0.2, 0.2)],
        );
        let mut config = config();
        config.box_rrt.max_samples = 500;
        let res = plan(&p, &config).unwrap();
        assert!(!res.is_complete());
        let report = res.goals.iter().find(|g| g.goal == 0).unwrap();
        assert_eq!(report.outcome, GoalOutcome::Unreachable);
        assert!(!res.final_env.object(1).pos.is_away(Pos::new(0.3, 0.5), MAX_ERROR));
    }

    #[test]
    fn time_boxed_stops_immediately() {
        let p = problem(
            &[((0.2, 0.2), (0.3, 0.2))],
            RobotPose::new(0.5, 0.1, HORIZONTAL),
            vec![],
        );
        let mut config = config().with_mode(Mode::TimeBoxed);
        config.robot_stage_timeout = ::std::time::Duration::from_secs(0);
        let res = plan(&p, &config).unwrap();
        assert_eq!(res.robot_stage, RobotStage::TimedOut { at: 0 });
        assert_eq!(res.trace.len(), 1);
    }

    #[test]
    fn invalid_problems() {
        let mut p = problem(&[], RobotPose::new(0.5, 0.5, 0.0), vec![]);
        assert_eq!(plan(&p, &config()).unwrap_err(), PlanErr::NoBoxes);

        p = problem(&[((0.98, 0.2), (0.5, 0.5))], RobotPose::new(0.5, 0.5, 0.0), vec![]);
        assert_eq!(plan(&p, &config()).unwrap_err(), PlanErr::OutOfBounds(0));

        p = problem(
            &[((0.2, 0.2), (0.5, 0.5)), ((0.22, 0.2), (0.6, 0.6))],
            RobotPose::new(0.5, 0.5, 0.0),
            vec![],
        );
        assert_eq!(plan(&p, &config()).unwrap_err(), PlanErr::InitialCollision);
    }

    #[test]
    fn realized_route_follows_every_hop() {
        let p = problem(
            &[((0.2, 0.2), (0.5, 0.5)), ((0.5, 0.2), (0.5, 0.2))],
            RobotPose::new(0.1, 0.1, HORIZONTAL),
            vec![Rect::new(0.0, 0.6, 0.2, 0.1)],
        );
        let config = config();
        let mut rng = StdRng::seed_from_u64(1);
        let mut planner = Planner {
            width: W,
            goals: &p.goals,
            config: &config,
            rng: &mut rng,
            box_stats: Stats::new(),
            robot_stats: Stats::new(),
        };
        let start = p.initial_env();

        let route = vec![
            start.with_objects_at(&[(0, Pos::new(0.21, 0.2)), (1, Pos::new(0.52, 0.2))]),
            start.with_objects_at(&[(0, Pos::new(0.22, 0.21)), (1, Pos::new(0.53, 0.2))]),
        ];
        let (pushes, reached) = planner.realize_route(&start, &route, &[0, 1]).unwrap();
        // 10 + 20 for the first hop, the second object sits out the last one
        assert_eq!(pushes.len(), 30 + 20);
        assert!(!reached.object(0).pos.is_away(Pos::new(0.22, 0.21), MAX_ERROR));
        assert!(!reached.object(1).pos.is_away(Pos::new(0.52, 0.2), MAX_ERROR));

        // replaying the pushes gives the same environment
        let mut replay = start.clone();
        for a in &pushes {
            assert_eq!(a.env, replay);
            replay = a.result();
        }
        assert_eq!(replay, reached);

        // a hop into the static obstacle can't be realized
        let blocked = vec![start.with_object_at(0, Pos::new(0.1, 0.6))];
        assert!(planner.realize_route(&start, &blocked, &[0]).is_none());
        assert!(planner.box_stats.total_unique_visited() > 0);
    }

    #[test]
    fn blocked_goal_moves_the_blocker_too() {
        // a moving obstacle sits right on the goal
        let goal = Pos::new(0.4, 0.2);
        let p = Problem {
            robot_width: W,
            initial_robot: RobotPose::new(0.1, 0.1, HORIZONTAL),
            objects: vec![
                MovingObject::new(Pos::new(0.2, 0.2), W, ObjectKind::Box),
                MovingObject::new(goal, W, ObjectKind::Obstacle),
            ],
            goals: vec![goal],
            statics: vec![],
        };
        let mut config = config().with_mode(Mode::Advanced);
        config.box_rrt.max_samples = 2000;
        config.box_rrt_goal_tolerance = 0.02;
        config.joint_box_rrt = RrtBudget {
            step: 0.2,
            max_samples: 20_000,
        };
        let start = p.initial_env();

        let mut rng = StdRng::seed_from_u64(3);
        let mut planner = Planner {
            width: W,
            goals: &p.goals,
            config: &config,
            rng: &mut rng,
            box_stats: Stats::new(),
            robot_stats: Stats::new(),
        };
        let (outcome, pushes, reached) = planner.resolve_goal(&start, 0).unwrap();
        assert_eq!(outcome, GoalOutcome::JointBoxRrt { blocker: 1 });
        assert!(!reached.object(0).pos.is_away(goal, MAX_ERROR));
        assert!(reached.object(1).pos.is_away(goal, MAX_ERROR));
        assert!(pushes.iter().any(|a| a.moved == 1));

        let mut replay = start.clone();
        for a in &pushes {
            assert!(a.moved == 0 || a.moved == 1);
            assert_eq!(a.env, replay);
            replay = a.result();
        }
        assert_eq!(replay, reached);

        // without advanced mode the blocker is never moved
        let config = config.clone().with_mode(Mode::Default);
        let mut rng = StdRng::seed_from_u64(3);
        let mut planner = Planner {
            width: W,
            goals: &p.goals,
            config: &config,
            rng: &mut rng,
            box_stats: Stats::new(),
            robot_stats: Stats::new(),
        };
        assert!(planner.resolve_goal(&start, 0).is_none());
    }

    #[test]
    fn walled_in_robot_dumps_its_sub_problem() {
        let dir = ::std::env::temp_dir().join(format!("box-pusher-stuck-{}", ::std::process::id()));
        // the robot starts inside a closed room, away from the box
        let walls = vec![
            Rect::new(0.7, 0.7, 0.2, 0.05),
            Rect::new(0.7, 0.85, 0.2, 0.05),
            Rect::new(0.7, 0.7, 0.05, 0.2),
            Rect::new(0.85, 0.7, 0.05, 0.2),
        ];
        let p = problem(
            &[((0.2, 0.2), (0.25, 0.2))],
            RobotPose::new(0.8, 0.8, HORIZONTAL),
            walls,
        );
        let mut config = config().with_dump_dir(&dir);
        config.robot_expansions = 200;
        config.robot_probe_expansions = 50;
        config.robot_rrt.max_samples = 200;

        let res = plan(&p, &config).unwrap();
        assert_eq!(res.pushes, 1);
        assert_eq!(res.robot_stage, RobotStage::Unrealizable { at: 0 });
        assert!(!res.is_complete());
        assert_eq!(res.trace.len(), 1);

        let from = fs::read_file(dir.join("from.txt")).unwrap();
        let to = fs::read_file(dir.join("to.txt")).unwrap();
        ::std::fs::remove_dir_all(&dir).unwrap();

        let from: Vec<_> = from.lines().collect();
        let to: Vec<_> = to.lines().collect();
        assert_eq!(from[0], "0.050 0.800 0.800 0.000");
        assert_eq!(to[0], "0.050 0.200 0.225 1.571");
        for lines in &[&from, &to] {
            assert_eq!(lines.len(), 2 + 1 + 4);
            assert_eq!(lines[1], "1 0 4");
            assert_eq!(lines[2], "0.225 0.225 0.275 0.225");
            assert_eq!(lines[3], "0.700 0.700 0.900 0.750");
        }
    }

    #[test]
    fn goals_without_boxes_are_invalid() {
        let mut p = problem(&[((0.2, 0.2), (0.5, 0.5))], RobotPose::new(0.5, 0.1, 0.0), vec![]);
        p.goals.push(Pos::new(0.6, 0.6));
        assert_eq!(plan(&p, &config()).unwrap_err(), PlanErr::GoalWithoutBox(1));
    }

    #[test]
    fn dump_format() {
        let objects = vec![
            MovingObject::new(Pos::new(0.2, 0.2), W, ObjectKind::Box),
            MovingObject::new(Pos::new(0.5, 0.5), 0.1, ObjectKind::Obstacle),
        ];
        let statics = vec![StaticObstacle::new(Rect::new(0.7, 0.0, 0.1, 0.3))];
        let env = Environment::new(objects, Rc::from(statics));
        let text = dump_text(W, &RobotPose::new(0.1, 0.2, 0.3), &env, &[Pos::new(0.4, 0.4)]);
        assert_eq!(
            text,
            "0.050 0.100 0.200 0.300\n\
             1 1 1\n\
             0.225 0.225 0.425 0.425\n\
             0.550 0.550 0.100\n\
             0.700 0.000 0.800 0.300\n"
        );
    }
}
