use std::error::Error;
use std::fmt::{self, Debug, Formatter};
use std::path::Path;
use std::rc::Rc;

use crate::data::{Pos, Rect, MAX_ERROR};
use crate::fs;
use crate::geometry::{no_box_collision, no_collision};
use crate::planner::PlanErr;
use crate::state::{Environment, MovingObject, ObjectKind, RobotPose, StaticObstacle};
use crate::LoadProblem;

/// Everything the planner needs to know about one task.
///
/// `objects` holds the boxes with goals first (in the order of `goals`),
/// then the moving obstacles. All positions are lower-left corners.
#[derive(Clone)]
pub struct Problem {
    pub robot_width: f64,
    pub initial_robot: RobotPose,
    pub objects: Vec<MovingObject>,
    pub goals: Vec<Pos>,
    pub statics: Vec<StaticObstacle>,
}

impl Problem {
    pub fn initial_env(&self) -> Environment {
        Environment::new(self.objects.clone(), Rc::from(self.statics.clone()))
    }

    /// Checks what the planners take for granted.
    pub fn validate(&self) -> Result<(), PlanErr> {
        if self.robot_width <= 0.0 || !self.robot_width.is_finite() {
            return Err(PlanErr::InvalidRobotWidth);
        }
        if self.goals.is_empty() {
            return Err(PlanErr::NoBoxes);
        }
        for i in 0..self.goals.len() {
            match self.objects.get(i) {
                Some(o) if o.kind == ObjectKind::Box => {}
                _ => return Err(PlanErr::GoalWithoutBox(i)),
            }
        }

        let border = Rect::unit().grow(MAX_ERROR);
        for (i, o) in self.objects.iter().enumerate() {
            if !border.contains_rect(&o.rect()) {
                return Err(PlanErr::OutOfBounds(i));
            }
        }

        let env = self.initial_env();
        if !no_box_collision(env.objects(), env.statics(), None)
            || !no_collision(&env, &env, &self.initial_robot, self.robot_width)
        {
            return Err(PlanErr::InitialCollision);
        }
        Ok(())
    }

    pub fn box_count(&self) -> usize {
        self.goals.len()
    }

    pub fn obstacle_count(&self) -> usize {
        self.objects
            .iter()
            .filter(|o| o.kind == ObjectKind::Obstacle)
            .count()
    }
}

impl Debug for Problem {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "robot {:.3} at {} {:.3}",
            self.robot_width, self.initial_robot.pos, self.initial_robot.angle
        )?;
        for (o, goal) in self.objects.iter().zip(&self.goals) {
            writeln!(f, "box {} -> {}", o.pos, goal)?;
        }
        for o in self.objects.iter().skip(self.goals.len()) {
            writeln!(f, "obstacle {} {:.3}", o.pos, o.width)?;
        }
        write!(f, "{} static obstacles", self.statics.len())
    }
}

impl<P: AsRef<Path>> LoadProblem for P {
    fn load_problem(&self) -> Result<Problem, Box<dyn Error>> {
        let text = fs::read_file(self)?;
        let problem: Problem = text.parse()?;
        Ok(problem)
    }
}
