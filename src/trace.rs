use std::fmt::{self, Debug, Display, Formatter};

use crate::data::Pos;
use crate::state::{Environment, RobotPose};

/// One line of the output: a robot pose and the centre of every moving object.
#[derive(Clone, PartialEq)]
pub struct TraceLine {
    pub robot: RobotPose,
    pub centers: Vec<Pos>,
}

impl TraceLine {
    pub fn new(robot: RobotPose, env: &Environment) -> Self {
        TraceLine {
            robot,
            centers: env.objects().iter().map(|o| o.center()).collect(),
        }
    }
}

impl Display for TraceLine {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.3} {:.3} {:.3}",
            self.robot.pos.x, self.robot.pos.y, self.robot.angle
        )?;
        for c in &self.centers {
            write!(f, " {}", c)?;
        }
        Ok(())
    }
}

impl Debug for TraceLine {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// The whole output file - the number of lines followed by the lines.
#[derive(Clone, Default, PartialEq)]
pub struct Trace(Vec<TraceLine>);

impl Trace {
    pub fn new() -> Self {
        Trace(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn lines(&self) -> &[TraceLine] {
        &self.0
    }

    pub fn last(&self) -> Option<&TraceLine> {
        self.0.last()
    }

    pub(crate) fn push(&mut self, line: TraceLine) {
        self.0.push(line);
    }

    pub(crate) fn extend<I: IntoIterator<Item = TraceLine>>(&mut self, lines: I) {
        self.0.extend(lines);
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a TraceLine;
    type IntoIter = ::std::slice::Iter<'a, TraceLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Display for Trace {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.0.len())?;
        for line in self {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

impl Debug for Trace {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::state::{MovingObject, ObjectKind};

    #[test]
    fn formatting_trace() {
        let objects = vec![
            MovingObject::new(Pos::new(0.1, 0.2), 0.05, ObjectKind::Box),
            MovingObject::new(Pos::new(0.5, 0.5), 0.1, ObjectKind::Obstacle),
        ];
        let env = Environment::new(objects, Rc::from(Vec::new()));

        let mut trace = Trace::new();
        trace.push(TraceLine::new(RobotPose::new(0.3, 0.3, 0.0), &env));
        trace.push(TraceLine::new(RobotPose::new(0.125, 0.2, 1.5708), &env));

        let expected = "2\n\
                        0.300 0.300 0.000 0.125 0.225 0.550 0.550\n\
                        0.125 0.200 1.571 0.125 0.225 0.550 0.550\n";
        assert_eq!(trace.to_string(), expected);
        assert_eq!(trace.len(), 2);
    }
}
