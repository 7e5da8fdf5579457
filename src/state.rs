use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::data::{quantize, Pos, Rect, Segment, MAX_ERROR};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Has a goal it must be pushed to.
    Box,
    /// Movable but has no goal - behaves exactly like a box otherwise.
    Obstacle,
}

/// A square object the robot can push, `pos` is its lower-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovingObject {
    pub pos: Pos,
    pub width: f64,
    pub kind: ObjectKind,
}

impl MovingObject {
    pub fn new(pos: Pos, width: f64, kind: ObjectKind) -> Self {
        MovingObject { pos, width, kind }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.width, self.width)
    }

    pub fn center(&self) -> Pos {
        Pos::new(self.pos.x + 0.5 * self.width, self.pos.y + 0.5 * self.width)
    }

    pub fn moved_to(&self, pos: Pos) -> Self {
        MovingObject { pos, ..*self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticObstacle {
    pub rect: Rect,
}

impl StaticObstacle {
    pub fn new(rect: Rect) -> Self {
        StaticObstacle { rect }
    }
}

/// Positions of all moving objects plus the (shared) static obstacles.
///
/// Objects are stored behind an `Rc` and only copied when one of them is moved,
/// so creating a child never touches the parent and the child differs from it
/// in exactly one slot. Boxes with goals always come first, in goal order.
///
/// Equality and hashing look only at the moving objects' positions,
/// quantized to the `MAX_ERROR` grid.
#[derive(Debug, Clone)]
pub struct Environment {
    objects: Rc<Vec<MovingObject>>,
    statics: Rc<[StaticObstacle]>,
}

impl Environment {
    pub fn new(objects: Vec<MovingObject>, statics: Rc<[StaticObstacle]>) -> Self {
        Environment {
            objects: Rc::new(objects),
            statics,
        }
    }

    pub fn objects(&self) -> &[MovingObject] {
        &self.objects
    }

    pub fn object(&self, index: usize) -> &MovingObject {
        &self.objects[index]
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn statics(&self) -> &[StaticObstacle] {
        &self.statics
    }

    pub(crate) fn shared_statics(&self) -> Rc<[StaticObstacle]> {
        Rc::clone(&self.statics)
    }

    /// New environment with one object relocated, `self` is left untouched.
    pub fn with_object_at(&self, index: usize, pos: Pos) -> Environment {
        let mut objects = Rc::clone(&self.objects);
        let moved = objects[index].moved_to(pos);
        Rc::make_mut(&mut objects)[index] = moved;
        Environment {
            objects,
            statics: Rc::clone(&self.statics),
        }
    }

    /// New environment with the given objects replaced, useful when several
    /// objects move at once (2 box RRT).
    pub fn with_objects_at(&self, moves: &[(usize, Pos)]) -> Environment {
        let mut objects = (*self.objects).clone();
        for &(index, pos) in moves {
            objects[index] = objects[index].moved_to(pos);
        }
        Environment {
            objects: Rc::new(objects),
            statics: Rc::clone(&self.statics),
        }
    }

    fn keys<'a>(&'a self) -> impl Iterator<Item = (i64, i64)> + 'a {
        self.objects.iter().map(|o| o.pos.key())
    }
}

impl PartialEq for Environment {
    fn eq(&self, other: &Self) -> bool {
        self.objects.len() == other.objects.len() && self.keys().eq(other.keys())
    }
}

impl Eq for Environment {}

impl Hash for Environment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for key in self.keys() {
            key.hash(state);
        }
    }
}

/// Center of the robot and its orientation (radians).
///
/// The robot is a segment of the robot's width, centered at `pos`.
#[derive(Debug, Clone, Copy)]
pub struct RobotPose {
    pub pos: Pos,
    pub angle: f64,
}

impl RobotPose {
    pub fn new(x: f64, y: f64, angle: f64) -> Self {
        RobotPose {
            pos: Pos::new(x, y),
            angle,
        }
    }

    pub fn segment(&self, width: f64) -> Segment {
        let dx = self.angle.cos() * width * 0.5;
        let dy = self.angle.sin() * width * 0.5;
        Segment::new(
            Pos::new(self.pos.x - dx, self.pos.y - dy),
            Pos::new(self.pos.x + dx, self.pos.y + dy),
        )
    }

    /// All three coordinates within `MAX_ERROR`.
    pub fn is_near(&self, other: &RobotPose) -> bool {
        !self.pos.is_away(other.pos, MAX_ERROR) && (self.angle - other.angle).abs() < MAX_ERROR
    }

    fn key(&self) -> (i64, i64, i64) {
        let (x, y) = self.pos.key();
        (x, y, quantize(self.angle))
    }
}

impl PartialEq for RobotPose {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for RobotPose {}

impl Hash for RobotPose {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;

    use super::*;

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    fn env(positions: &[(f64, f64)]) -> Environment {
        let objects = positions
            .iter()
            .map(|&(x, y)| MovingObject::new(Pos::new(x, y), 0.05, ObjectKind::Box))
            .collect();
        Environment::new(objects, Rc::from(Vec::new()))
    }

    #[test]
    fn child_differs_only_in_moved_object() {
        let parent = env(&[(0.1, 0.1), (0.5, 0.5), (0.8, 0.2)]);
        let child = parent.with_object_at(1, Pos::new(0.55, 0.5));

        assert_eq!(parent.object(1).pos, Pos::new(0.5, 0.5));
        assert_eq!(child.object(1).pos, Pos::new(0.55, 0.5));
        for &i in &[0, 2] {
            assert_eq!(parent.object(i), child.object(i));
            assert_eq!(
                parent.object(i).pos.x.to_bits(),
                child.object(i).pos.x.to_bits()
            );
        }
        assert_ne!(parent, child);
    }

    #[test]
    fn tolerant_equality_and_hashing() {
        let a = env(&[(0.1, 0.2), (0.3, 0.4)]);
        let b = env(&[(0.100_02, 0.199_97), (0.3, 0.400_03)]);
        let c = env(&[(0.1, 0.2), (0.3002, 0.4)]);

        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(a, c);
    }

    #[test]
    fn statics_are_shared() {
        let statics: Rc<[StaticObstacle]> =
            Rc::from(vec![StaticObstacle::new(Rect::new(0.4, 0.4, 0.2, 0.2))]);
        let objects = vec![MovingObject::new(Pos::new(0.1, 0.1), 0.05, ObjectKind::Box)];
        let a = Environment::new(objects, statics);
        let b = a.with_object_at(0, Pos::new(0.2, 0.1));
        assert!(Rc::ptr_eq(&a.shared_statics(), &b.shared_statics()));
    }

    #[test]
    fn robot_pose_segment_and_equality() {
        let pose = RobotPose::new(0.5, 0.5, 0.0);
        let seg = pose.segment(0.1);
        assert!((seg.p1.x - 0.45).abs() < 1e-12);
        assert!((seg.p2.x - 0.55).abs() < 1e-12);

        let vertical = RobotPose::new(0.5, 0.5, std::f64::consts::FRAC_PI_2).segment(0.1);
        assert!((vertical.p1.y - 0.45).abs() < 1e-12);
        assert!((vertical.p2.y - 0.55).abs() < 1e-12);

        assert_eq!(pose, RobotPose::new(0.500_01, 0.499_99, 0.000_02));
        assert_ne!(pose, RobotPose::new(0.5, 0.5, 0.001));
        assert!(pose.is_near(&RobotPose::new(0.500_05, 0.5, 0.0)));
    }
}
