use std::error::Error;
use std::fmt::{self, Debug, Display, Formatter};

use crate::data::{Dir, Pos, HORIZONTAL, UNIT_STEP, VERTICAL};
use crate::state::{Environment, MovingObject, RobotPose};
use crate::trace::TraceLine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushTraceErr {
    /// The pushed object isn't where the push pose expects it (object index).
    BoxNotAtPushPosition(usize),
}

impl Display for PushTraceErr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            PushTraceErr::BoxNotAtPushPosition(index) => write!(
                f,
                "Object {} is not in contact with the robot at the start of the push",
                index
            ),
        }
    }
}

impl Error for PushTraceErr {}

/// Robot poses of one push of `object` by `step` in `dir`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Push {
    /// Where the object ends up.
    pub(crate) object_pos: Pos,
    /// In contact with the face opposite to `dir`.
    pub(crate) before: RobotPose,
    /// `retreat` further away from the contact face than `before`.
    pub(crate) backup: RobotPose,
    pub(crate) after: RobotPose,
}

impl Push {
    pub(crate) fn new(object: &MovingObject, dir: Dir, step: f64, retreat: f64) -> Push {
        let Pos { x, y } = object.pos;
        let w = object.width;
        let half = 0.5 * w;
        let object_pos = object.pos + Pos::new(dir.delta().x * step, dir.delta().y * step);
        let (before, backup, after) = match dir {
            Dir::Up => (
                RobotPose::new(x + half, y, HORIZONTAL),
                RobotPose::new(x + half, y - retreat, HORIZONTAL),
                RobotPose::new(x + half, y + step, HORIZONTAL),
            ),
            Dir::Down => (
                RobotPose::new(x + half, y + w, HORIZONTAL),
                RobotPose::new(x + half, y + w + retreat, HORIZONTAL),
                RobotPose::new(x + half, y + w - step, HORIZONTAL),
            ),
            Dir::Left => (
                RobotPose::new(x + w, y + half, VERTICAL),
                RobotPose::new(x + w + retreat, y + half, VERTICAL),
                RobotPose::new(x + w - step, y + half, VERTICAL),
            ),
            Dir::Right => (
                RobotPose::new(x, y + half, VERTICAL),
                RobotPose::new(x - retreat, y + half, VERTICAL),
                RobotPose::new(x + step, y + half, VERTICAL),
            ),
        };
        Push {
            object_pos,
            before,
            backup,
            after,
        }
    }
}

/// One straight push of a single object, the robot moving from `push_pose`
/// to `after_push_pose` while in contact.
#[derive(Clone)]
pub struct Action {
    /// Before the push.
    pub env: Environment,
    pub moved: usize,
    pub dir: Dir,
    pub push_pose: RobotPose,
    pub after_push_pose: RobotPose,
}

impl Action {
    pub fn new(
        env: Environment,
        moved: usize,
        dir: Dir,
        push_pose: RobotPose,
        after_push_pose: RobotPose,
    ) -> Self {
        Action {
            env,
            moved,
            dir,
            push_pose,
            after_push_pose,
        }
    }

    /// How far the object travels.
    pub fn distance(&self) -> f64 {
        if self.dir.is_vertical() {
            (self.after_push_pose.pos.y - self.push_pose.pos.y).abs()
        } else {
            (self.after_push_pose.pos.x - self.push_pose.pos.x).abs()
        }
    }

    /// The environment after the push.
    pub fn result(&self) -> Environment {
        let object = self.env.object(self.moved);
        let d = self.distance();
        let delta = self.dir.delta();
        self.env
            .with_object_at(self.moved, object.pos + Pos::new(delta.x * d, delta.y * d))
    }

    /// Trace of the push itself, one line per unit step, both ends included.
    ///
    /// No search is needed - the planner that produced the action already
    /// checked the pushed positions.
    pub fn push_trace(&self) -> Result<Vec<TraceLine>, PushTraceErr> {
        let object = self
            .env
            .objects()
            .get(self.moved)
            .ok_or(PushTraceErr::BoxNotAtPushPosition(self.moved))?;
        let contact = Push::new(object, self.dir, 0.0, 0.0).before;
        if !contact.is_near(&self.push_pose) {
            return Err(PushTraceErr::BoxNotAtPushPosition(self.moved));
        }

        let loops = (self.distance() / UNIT_STEP).round() as usize;
        let delta = self.dir.delta();
        let base = TraceLine::new(self.push_pose, &self.env);
        let center = object.center();

        let lines = (0..=loops)
            .map(|i| {
                let offset = Pos::new(
                    delta.x * i as f64 * UNIT_STEP,
                    delta.y * i as f64 * UNIT_STEP,
                );
                let mut line = base.clone();
                line.robot.pos = self.push_pose.pos + offset;
                line.centers[self.moved] = center + offset;
                line
            })
            .collect();
        Ok(lines)
    }
}

impl Debug for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{} {} -> {}",
            self.dir,
            self.moved,
            self.push_pose.pos,
            self.after_push_pose.pos
        )
    }
}
