use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

use crate::data::{round3, UNIT_STEP};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Default,
    /// Allows a joint 2 box RRT when a single box RRT is blocked by another box.
    Advanced,
    /// Cuts the robot's route once planning as a whole has run longer than
    /// `PlannerConfig::robot_stage_timeout`.
    TimeBoxed,
}

impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            Mode::Default => write!(f, "default"),
            Mode::Advanced => write!(f, "advanced"),
            Mode::TimeBoxed => write!(f, "time-boxed"),
        }
    }
}

/// Resolution of the coarse box search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Full box width.
    Phase1,
    Phase2,
    Phase3,
    Phase4,
    /// 1/16 of box width.
    Phase5,
    /// Unit step.
    Phase6,
}

impl Phase {
    /// Step size for a box of the given width, never less than `UNIT_STEP`.
    pub fn step_size(self, width: f64) -> f64 {
        let step = match self {
            Phase::Phase1 => width,
            Phase::Phase2 => width / 2.0,
            Phase::Phase3 => width / 4.0,
            Phase::Phase4 => width / 8.0,
            Phase::Phase5 => width / 16.0,
            Phase::Phase6 => UNIT_STEP,
        };
        round3(step).max(UNIT_STEP)
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let n = match *self {
            Phase::Phase1 => 1,
            Phase::Phase2 => 2,
            Phase::Phase3 => 3,
            Phase::Phase4 => 4,
            Phase::Phase5 => 5,
            Phase::Phase6 => 6,
        };
        write!(f, "phase {}", n)
    }
}

/// Sampling step and budget of one RRT run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RrtBudget {
    pub step: f64,
    pub max_samples: usize,
}

/// Every tunable of the planner.
///
/// The defaults are the values the planner was tuned with - most of them don't
/// have any deeper justification so they are kept here instead of hardcoded.
#[derive(Clone, Debug)]
pub struct PlannerConfig {
    pub mode: Mode,

    /// Coarse phases to run, in order, each with its own time limit.
    pub coarse_phases: Vec<(Phase, Duration)>,
    /// Weight of the euclidean box-goal distance in the coarse heuristic.
    pub box_weight: f64,
    /// Weight of the squared box-goal distance in the single box heuristic.
    pub single_box_weight: f64,
    /// How far behind the contact face (in unit steps) the robot must be able to retreat.
    pub space_left: u32,

    /// Expansions allowed when retrying an unresolved goal with the single box planner.
    pub single_box_retry_expansions: usize,
    /// Expansions allowed per hop when turning an RRT route into pushes.
    pub single_box_hop_expansions: usize,

    pub box_rrt: RrtBudget,
    pub joint_box_rrt: RrtBudget,
    /// Distance (per axis) at which the box RRT considers the target box arrived.
    pub box_rrt_goal_tolerance: f64,

    pub distance_weight: f64,
    pub angle_weight: f64,
    pub robot_expansions: usize,
    /// Expansions of the probe that checks an RRT sample really connects to the goal.
    pub robot_probe_expansions: usize,
    pub robot_rrt: RrtBudget,
    /// Divides angle differences so they are comparable to distances in the robot RRT.
    pub angle_scale: f64,
    /// Upper bound of sampled robot orientations.
    pub max_sample_angle: f64,

    /// Counted from the start of planning, so time spent on the boxes counts too.
    /// Only checked between pushes of the robot stage, in time-boxed mode.
    pub robot_stage_timeout: Duration,

    /// Seed for the RRTs, random if `None`.
    pub seed: Option<u64>,
    /// Where to write `from.txt` and `to.txt` when the robot gets stuck, nowhere if `None`.
    pub dump_dir: Option<PathBuf>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig {
            mode: Mode::Default,
            coarse_phases: vec![(Phase::Phase1, Duration::from_millis(1000))],
            box_weight: 1000.0,
            single_box_weight: 10000.0,
            space_left: 10,
            single_box_retry_expansions: 250,
            single_box_hop_expansions: 10_000,
            box_rrt: RrtBudget {
                step: 0.05,
                max_samples: 50_000,
            },
            joint_box_rrt: RrtBudget {
                step: 0.1,
                max_samples: 100_000,
            },
            box_rrt_goal_tolerance: 0.005,
            distance_weight: 1.0,
            angle_weight: 1.0,
            robot_expansions: 10_000,
            robot_probe_expansions: 1000,
            robot_rrt: RrtBudget {
                step: 0.05,
                max_samples: 100_000,
            },
            angle_scale: 15.71,
            max_sample_angle: 1.571,
            robot_stage_timeout: Duration::from_secs(120),
            seed: None,
            dump_dir: None,
        }
    }
}

impl PlannerConfig {
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_dump_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.dump_dir = Some(dir.into());
        self
    }

    pub fn advanced(&self) -> bool {
        self.mode == Mode::Advanced
    }

    pub fn time_boxed(&self) -> bool {
        self.mode == Mode::TimeBoxed
    }
}
