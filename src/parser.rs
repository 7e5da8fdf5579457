use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::data::{Pos, Rect};
use crate::problem::Problem;
use crate::state::{MovingObject, ObjectKind, RobotPose, StaticObstacle};

/// Line numbers start at 1 and count blank lines too.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserErr {
    /// Number of the record that's missing (the file ended before it).
    MissingLine(usize),
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },
    InvalidNumber(usize),
    NonPositiveWidth(usize),
    TrailingRecords(usize),
}

impl Display for ParserErr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            ParserErr::MissingLine(record) => {
                write!(f, "Unexpected end of file, record {} is missing", record)
            }
            ParserErr::FieldCount {
                line,
                expected,
                found,
            } => write!(
                f,
                "Expected {} values on line {}, found {}",
                expected, line, found
            ),
            ParserErr::InvalidNumber(line) => write!(f, "Invalid number on line {}", line),
            ParserErr::NonPositiveWidth(line) => {
                write!(f, "Width must be positive on line {}", line)
            }
            ParserErr::TrailingRecords(line) => {
                write!(f, "Unexpected records starting at line {}", line)
            }
        }
    }
}

impl Error for ParserErr {}

impl FromStr for Problem {
    type Err = ParserErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Non-empty lines with their line numbers.
struct Records<'a> {
    lines: Box<dyn Iterator<Item = (usize, &'a str)> + 'a>,
    read: usize,
}

impl<'a> Records<'a> {
    fn new(text: &'a str) -> Self {
        let lines = text
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|&(_, line)| !line.is_empty());
        Records {
            lines: Box::new(lines),
            read: 0,
        }
    }

    fn floats(&mut self, expected: usize) -> Result<(usize, Vec<f64>), ParserErr> {
        self.read += 1;
        let (line, text) = self
            .lines
            .next()
            .ok_or(ParserErr::MissingLine(self.read))?;
        let values = text
            .split_whitespace()
            .map(|v| v.parse::<f64>().map_err(|_| ParserErr::InvalidNumber(line)))
            .collect::<Result<Vec<_>, _>>()?;
        if values.len() != expected {
            return Err(ParserErr::FieldCount {
                line,
                expected,
                found: values.len(),
            });
        }
        Ok((line, values))
    }

    fn counts(&mut self) -> Result<(usize, usize, usize), ParserErr> {
        let (line, values) = self.floats(3)?;
        let count = |v: f64| {
            if v >= 0.0 && v.fract() == 0.0 {
                Ok(v as usize)
            } else {
                Err(ParserErr::InvalidNumber(line))
            }
        };
        Ok((count(values[0])?, count(values[1])?, count(values[2])?))
    }
}

fn positive(width: f64, line: usize) -> Result<f64, ParserErr> {
    if width > 0.0 {
        Ok(width)
    } else {
        Err(ParserErr::NonPositiveWidth(line))
    }
}

/// Centre of a square to its lower-left corner.
fn lower_left(cx: f64, cy: f64, width: f64) -> Pos {
    Pos::new(cx - 0.5 * width, cy - 0.5 * width)
}

pub(crate) fn parse(text: &str) -> Result<Problem, ParserErr> {
    let mut records = Records::new(text);

    let (line, robot) = records.floats(4)?;
    let robot_width = positive(robot[0], line)?;
    let initial_robot = RobotPose::new(robot[1], robot[2], robot[3]);

    let (boxes, obstacles, statics) = records.counts()?;

    // counts come from the file, the records they promise may not exist
    let mut objects = Vec::new();
    let mut goals = Vec::new();
    for _ in 0..boxes {
        let (_, v) = records.floats(4)?;
        objects.push(MovingObject::new(
            lower_left(v[0], v[1], robot_width),
            robot_width,
            ObjectKind::Box,
        ));
        goals.push(lower_left(v[2], v[3], robot_width));
    }
    for _ in 0..obstacles {
        let (line, v) = records.floats(3)?;
        let width = positive(v[2], line)?;
        objects.push(MovingObject::new(
            lower_left(v[0], v[1], width),
            width,
            ObjectKind::Obstacle,
        ));
    }
    let mut rects = Vec::new();
    for _ in 0..statics {
        let (_, v) = records.floats(4)?;
        let rect = Rect::from_corners(Pos::new(v[0], v[1]), Pos::new(v[2], v[3]));
        rects.push(StaticObstacle::new(rect));
    }

    if let Some((line, _)) = records.lines.next() {
        return Err(ParserErr::TrailingRecords(line));
    }

    debug!(
        "Parsed {} boxes, {} moving obstacles, {} static obstacles",
        boxes, obstacles, statics
    );
    Ok(Problem {
        robot_width,
        initial_robot,
        objects,
        goals,
        statics: rects,
    })
}
