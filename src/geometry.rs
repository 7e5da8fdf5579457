//! Collision checks shared by every planner.
//!
//! Everything here is a pure function of its arguments. All checks return as
//! soon as they find the first violation.

use std::f64::consts::PI;

use fnv::FnvHashMap;

use crate::data::{Pos, Rect, Segment, MAX_ERROR, UNIT_STEP};
use crate::state::{Environment, MovingObject, RobotPose, StaticObstacle};

/// How many times each tracked object caused a rejection during one RRT run,
/// keyed by object index.
pub(crate) type CollisionCounts = FnvHashMap<usize, u32>;

fn border() -> Rect {
    Rect::unit().grow(MAX_ERROR)
}

/// Maps any angle into `[2pi, 4pi)`.
///
/// Keeping it away from 0 means the "close to horizontal" check below doesn't
/// have to handle angles on both sides of zero separately.
pub(crate) fn normalise_angle(angle: f64) -> f64 {
    let mut angle = angle % (2.0 * PI);
    if angle < 0.0 {
        angle += 2.0 * PI;
    }
    angle + 2.0 * PI
}

/// True if every object in `hits` lies on the same side of the line.
fn is_at_same_side(line: &Segment, hits: &[&MovingObject], horizontal: bool) -> bool {
    let mut prev_side = 0.0;
    for object in hits {
        let side = if horizontal {
            object.pos.y + MAX_ERROR - line.p1.y
        } else {
            object.pos.x + MAX_ERROR - line.p1.x
        };
        if prev_side * side < 0.0 {
            return false;
        }
        prev_side = side;
    }
    true
}

/// Anti-pinch check.
///
/// For a (nearly) axis aligned robot, the segment without its outermost unit
/// steps may touch several boxes, but only if they are all on the same side.
/// Boxes on both sides mean the robot is squeezed between them.
/// Robots which aren't axis aligned always pass.
pub fn slide_check(width: f64, pose: &RobotPose, objects: &[MovingObject]) -> bool {
    let angle_error = ((MAX_ERROR / 2.0) / (width / 2.0)).asin() * 2.0;
    let angle = normalise_angle(pose.angle);
    let seg = pose.segment(width);
    let (p1, p2) = (seg.p1, seg.p2);

    let (line, horizontal) = if angle >= PI * 4.0 - angle_error || angle <= PI * 2.0 + angle_error
    {
        (
            Segment::new(Pos::new(p1.x + UNIT_STEP, p1.y), Pos::new(p2.x - UNIT_STEP, p2.y)),
            true,
        )
    } else if (angle - PI * 2.5).abs() <= angle_error {
        (
            Segment::new(Pos::new(p1.x, p1.y + UNIT_STEP), Pos::new(p2.x, p2.y - UNIT_STEP)),
            false,
        )
    } else if (angle - PI * 3.0).abs() <= angle_error {
        (
            Segment::new(Pos::new(p2.x + UNIT_STEP, p2.y), Pos::new(p1.x - UNIT_STEP, p1.y)),
            true,
        )
    } else if (angle - PI * 3.5).abs() <= angle_error {
        (
            Segment::new(Pos::new(p2.x, p2.y + UNIT_STEP), Pos::new(p1.x, p1.y - UNIT_STEP)),
            false,
        )
    } else {
        return true;
    };

    let hits: Vec<_> = objects
        .iter()
        .filter(|o| o.rect().grow(MAX_ERROR).intersects_segment(&line))
        .collect();
    hits.len() <= 1 || is_at_same_side(&line, &hits, horizontal)
}

/// Full check of a robot pose in `new_env`.
///
/// Rejects the robot touching static obstacles or (shrunk) objects, the robot
/// or any object leaving the (grown) unit square, overlapping objects and
/// objects overlapping static obstacles. Finally runs the anti-pinch check
/// against the objects of `old_env` - where they were before the push.
pub fn no_collision(
    old_env: &Environment,
    new_env: &Environment,
    pose: &RobotPose,
    width: f64,
) -> bool {
    let border = border();
    let robot = pose.segment(width);

    for o in new_env.statics() {
        if o.rect.grow(-MAX_ERROR).intersects_segment(&robot) {
            return false;
        }
    }
    if !border.contains_point(robot.p1) || !border.contains_point(robot.p2) {
        return false;
    }

    let objects = new_env.objects();
    for (i, b1) in objects.iter().enumerate() {
        if !border.contains_rect(&b1.rect()) {
            return false;
        }
        let collision_box = b1.rect().grow(-MAX_ERROR);
        if collision_box.intersects_segment(&robot) {
            return false;
        }
        for (j, b2) in objects.iter().enumerate() {
            if i != j && collision_box.intersects(&b2.rect()) {
                return false;
            }
        }
        for o in new_env.statics() {
            if collision_box.intersects(&o.rect) {
                return false;
            }
        }
    }

    slide_check(width, pose, old_env.objects())
}

/// Objects only - no robot. Used by the box RRT.
///
/// When two objects overlap and `counts` tracks one of them, that one gets
/// blamed (the first of the pair if both are tracked).
pub(crate) fn no_box_collision(
    objects: &[MovingObject],
    statics: &[StaticObstacle],
    mut counts: Option<&mut CollisionCounts>,
) -> bool {
    let border = border();
    for (i, b1) in objects.iter().enumerate() {
        if !border.contains_rect(&b1.rect()) {
            return false;
        }
        let collision_box = b1.rect().grow(-MAX_ERROR);
        for (j, b2) in objects.iter().enumerate() {
            if i != j && collision_box.intersects(&b2.rect()) {
                if let Some(counts) = counts.as_mut() {
                    if let Some(count) = counts.get_mut(&i) {
                        *count += 1;
                    } else if let Some(count) = counts.get_mut(&j) {
                        *count += 1;
                    }
                }
                return false;
            }
        }
        for o in statics {
            if collision_box.intersects(&o.rect) {
                return false;
            }
        }
    }
    true
}

/// Object with the most rejections and its count, `None` if nothing was ever blamed.
pub(crate) fn problem_object(counts: &CollisionCounts) -> Option<(usize, u32)> {
    counts
        .iter()
        .filter(|&(_, &count)| count > 0)
        // ties go to the lower index so the result doesn't depend on hash order
        .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
        .map(|(&index, &count)| (index, count))
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::data::{HORIZONTAL, VERTICAL};
    use crate::state::ObjectKind;

    const W: f64 = 0.05;

    fn boxes(positions: &[(f64, f64)]) -> Vec<MovingObject> {
        positions
            .iter()
            .map(|&(x, y)| MovingObject::new(Pos::new(x, y), W, ObjectKind::Box))
            .collect()
    }

    fn env(positions: &[(f64, f64)], statics: Vec<Rect>) -> Environment {
        let statics: Vec<_> = statics.into_iter().map(StaticObstacle::new).collect();
        Environment::new(boxes(positions), Rc::from(statics))
    }

    #[test]
    fn normalised_angles() {
        assert!((normalise_angle(0.0) - 2.0 * PI).abs() < 1e-12);
        assert!((normalise_angle(-PI / 2.0) - 3.5 * PI).abs() < 1e-12);
        assert!((normalise_angle(5.0 * PI) - 3.0 * PI).abs() < 1e-9);
    }

    #[test]
    fn free_pose_passes() {
        let e = env(&[(0.2, 0.2)], vec![]);
        assert!(no_collision(&e, &e, &RobotPose::new(0.5, 0.5, 0.3), W));
        // touching the bottom face of the box as when pushing up
        assert!(no_collision(&e, &e, &RobotPose::new(0.225, 0.2, HORIZONTAL), W));
    }

    #[test]
    fn robot_through_box_or_obstacle_is_rejected() {
        let e = env(&[(0.2, 0.2)], vec![Rect::new(0.6, 0.6, 0.1, 0.1)]);
        assert!(!no_collision(&e, &e, &RobotPose::new(0.225, 0.225, HORIZONTAL), W));
        assert!(!no_collision(&e, &e, &RobotPose::new(0.65, 0.65, VERTICAL), W));
    }

    #[test]
    fn leaving_the_workspace_is_rejected() {
        let e = env(&[(0.2, 0.2)], vec![]);
        assert!(!no_collision(&e, &e, &RobotPose::new(0.01, 0.5, HORIZONTAL), W));

        let outside = env(&[(0.97, 0.2)], vec![]);
        assert!(!no_collision(&outside, &outside, &RobotPose::new(0.5, 0.5, 0.0), W));
    }

    #[test]
    fn overlapping_boxes_are_rejected() {
        let overlapping = env(&[(0.2, 0.2), (0.24, 0.2)], vec![]);
        assert!(!no_collision(&overlapping, &overlapping, &RobotPose::new(0.6, 0.6, 0.0), W));

        let touching = env(&[(0.2, 0.2), (0.25, 0.2)], vec![]);
        assert!(no_collision(&touching, &touching, &RobotPose::new(0.6, 0.6, 0.0), W));
    }

    #[test]
    fn box_on_static_obstacle_is_rejected() {
        let e = env(&[(0.2, 0.2)], vec![Rect::new(0.24, 0.2, 0.1, 0.1)]);
        assert!(!no_collision(&e, &e, &RobotPose::new(0.6, 0.6, 0.0), W));
    }

    #[test]
    fn pinched_between_two_boxes_is_rejected() {
        // a horizontal robot at y = 0.25 touches one box from below and one from above
        let objects = boxes(&[(0.2, 0.25), (0.2, 0.2)]);
        let pose = RobotPose::new(0.225, 0.25, HORIZONTAL);
        assert!(!slide_check(W, &pose, &objects));

        // both above - fine
        let same_side = boxes(&[(0.2, 0.25), (0.25, 0.25)]);
        let pose = RobotPose::new(0.25, 0.25, HORIZONTAL);
        assert!(slide_check(W, &pose, &same_side));

        // vertical robot between a box on the left and one on the right
        let sides = boxes(&[(0.15, 0.2), (0.2, 0.2)]);
        let pose = RobotPose::new(0.2, 0.225, VERTICAL);
        assert!(!slide_check(W, &pose, &sides));

        // same thing but the full check - the robot itself doesn't overlap either box
        let e = env(&[(0.15, 0.2), (0.2, 0.2)], vec![]);
        assert!(!no_collision(&e, &e, &pose, W));
    }

    #[test]
    fn slanted_robot_skips_the_pinch_check() {
        let objects = boxes(&[(0.2, 0.25), (0.2, 0.2)]);
        let pose = RobotPose::new(0.225, 0.25, 0.7);
        assert!(slide_check(W, &pose, &objects));
    }

    #[test]
    fn box_collision_feedback_blames_tracked_object() {
        let objects = boxes(&[(0.2, 0.2), (0.22, 0.2), (0.6, 0.6)]);
        let mut counts = CollisionCounts::default();
        counts.insert(1, 0);
        counts.insert(2, 0);

        assert!(!no_box_collision(&objects, &[], Some(&mut counts)));
        assert_eq!(counts[&1], 1);
        assert_eq!(counts[&2], 0);
        assert_eq!(problem_object(&counts), Some((1, 1)));

        let free = boxes(&[(0.2, 0.2), (0.6, 0.6)]);
        assert!(no_box_collision(&free, &[], Some(&mut counts)));
        assert_eq!(counts[&1], 1);
    }

    #[test]
    fn no_problem_object_without_rejections() {
        let mut counts = CollisionCounts::default();
        counts.insert(3, 0);
        assert_eq!(problem_object(&counts), None);
        counts.insert(4, 2);
        counts.insert(5, 2);
        assert_eq!(problem_object(&counts), Some((4, 2)));
    }
}
