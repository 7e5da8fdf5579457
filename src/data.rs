use std::fmt::{self, Display, Formatter};
use std::ops::{Add, Sub};

/// Smallest positional difference that counts as a different state.
pub const MAX_ERROR: f64 = 0.0001;

/// Smallest step the robot or a box ever makes.
pub const UNIT_STEP: f64 = 0.001;

/// Orientation used when pushing left or right (pi/2 written with three decimals
/// because that's what ends up in the output anyway).
pub const VERTICAL: f64 = 1.571;

/// Horizontal orientation, used when pushing up or down.
pub const HORIZONTAL: f64 = 0.0;

/// Position of a value on the `MAX_ERROR` grid - used for equality and hashing
/// so that values which are equal are guaranteed to hash the same.
pub(crate) fn quantize(v: f64) -> i64 {
    (v / MAX_ERROR).round() as i64
}

/// Round to the `UNIT_STEP` grid (3 decimals).
pub(crate) fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pos {
    pub x: f64,
    pub y: f64,
}

impl Pos {
    pub fn new(x: f64, y: f64) -> Pos {
        Pos { x, y }
    }

    pub fn dist(self, other: Pos) -> f64 {
        self.dist2(other).sqrt()
    }

    pub fn dist2(self, other: Pos) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// True if the positions differ by at least `tolerance` along either axis.
    pub fn is_away(self, other: Pos, tolerance: f64) -> bool {
        (self.x - other.x).abs() >= tolerance || (self.y - other.y).abs() >= tolerance
    }

    pub(crate) fn key(self) -> (i64, i64) {
        (quantize(self.x), quantize(self.y))
    }
}

impl Add<Pos> for Pos {
    type Output = Pos;

    fn add(self, other: Pos) -> Pos {
        Pos::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub<Pos> for Pos {
    type Output = Pos;

    fn sub(self, other: Pos) -> Pos {
        Pos::new(self.x - other.x, self.y - other.y)
    }
}

impl Display for Pos {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} {:.3}", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

pub const DIRECTIONS: [Dir; 4] = [Dir::Up, Dir::Down, Dir::Left, Dir::Right];

impl Dir {
    /// Unit vector of the direction.
    pub fn delta(self) -> Pos {
        match self {
            Dir::Up => Pos::new(0.0, 1.0),
            Dir::Down => Pos::new(0.0, -1.0),
            Dir::Left => Pos::new(-1.0, 0.0),
            Dir::Right => Pos::new(1.0, 0.0),
        }
    }

    pub fn is_vertical(self) -> bool {
        self == Dir::Up || self == Dir::Down
    }
}

impl Display for Dir {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            Dir::Up => write!(f, "U"),
            Dir::Down => write!(f, "D"),
            Dir::Left => write!(f, "L"),
            Dir::Right => write!(f, "R"),
        }
    }
}

/// Axis aligned rectangle given by its lower-left corner and size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Rect {
        Rect { x, y, w, h }
    }

    pub fn from_corners(min: Pos, max: Pos) -> Rect {
        Rect::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    pub fn unit() -> Rect {
        Rect::new(0.0, 0.0, 1.0, 1.0)
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.w
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.h
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }

    /// Grows the rect by `delta` in every direction, negative delta shrinks it.
    pub fn grow(&self, delta: f64) -> Rect {
        Rect::new(
            self.x - delta,
            self.y - delta,
            self.w + 2.0 * delta,
            self.h + 2.0 * delta,
        )
    }

    /// Interiors overlap - touching edges don't count.
    pub fn intersects(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && other.x < self.max_x()
            && other.max_x() > self.x
            && other.y < self.max_y()
            && other.max_y() > self.y
    }

    /// `other` lies completely inside (edges included).
    pub fn contains_rect(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && other.x >= self.x
            && other.y >= self.y
            && other.max_x() <= self.max_x()
            && other.max_y() <= self.max_y()
    }

    /// Half-open - the lower and left edges are inside, the upper and right are not.
    pub fn contains_point(&self, p: Pos) -> bool {
        p.x >= self.x && p.y >= self.y && p.x < self.max_x() && p.y < self.max_y()
    }

    fn outcode(&self, p: Pos) -> u8 {
        let mut out = 0;
        if self.w <= 0.0 {
            out |= OUT_LEFT | OUT_RIGHT;
        } else if p.x < self.x {
            out |= OUT_LEFT;
        } else if p.x > self.max_x() {
            out |= OUT_RIGHT;
        }
        if self.h <= 0.0 {
            out |= OUT_TOP | OUT_BOTTOM;
        } else if p.y < self.y {
            out |= OUT_TOP;
        } else if p.y > self.max_y() {
            out |= OUT_BOTTOM;
        }
        out
    }

    /// Segment touches the closed rect. Clips the first endpoint towards the rect
    /// until it's either inside or provably on the same outer side as the second one.
    pub fn intersects_segment(&self, seg: &Segment) -> bool {
        let out2 = self.outcode(seg.p2);
        if out2 == 0 {
            return true;
        }
        let (mut x1, mut y1) = (seg.p1.x, seg.p1.y);
        let (x2, y2) = (seg.p2.x, seg.p2.y);
        loop {
            let out1 = self.outcode(Pos::new(x1, y1));
            if out1 == 0 {
                return true;
            }
            if out1 & out2 != 0 {
                return false;
            }
            if out1 & (OUT_LEFT | OUT_RIGHT) != 0 {
                let x = if out1 & OUT_RIGHT != 0 {
                    self.max_x()
                } else {
                    self.x
                };
                y1 += (x - x1) * (y2 - y1) / (x2 - x1);
                x1 = x;
            } else {
                let y = if out1 & OUT_BOTTOM != 0 {
                    self.max_y()
                } else {
                    self.y
                };
                x1 += (y - y1) * (x2 - x1) / (y2 - y1);
                y1 = y;
            }
        }
    }
}

const OUT_LEFT: u8 = 1;
const OUT_TOP: u8 = 2;
const OUT_RIGHT: u8 = 4;
const OUT_BOTTOM: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub p1: Pos,
    pub p2: Pos,
}

impl Segment {
    pub fn new(p1: Pos, p2: Pos) -> Segment {
        Segment { p1, p2 }
    }
}
