//! RRT over robot poses, for routes too long or twisted for the robot A*.
//!
//! It only produces waypoints - the A* connects them afterwards.

use fnv::FnvHashSet;
use rand::rngs::StdRng;
use rand::Rng;
use typed_arena::Arena;

use crate::config::PlannerConfig;
use crate::data::{round3, Pos};
use crate::geometry::no_collision;
use crate::state::{Environment, RobotPose};

use super::robot_a_star;

struct RobotSample<'a> {
    pose: RobotPose,
    parent: Option<&'a RobotSample<'a>>,
}

pub(crate) struct RobotRrt<'e> {
    env: &'e Environment,
    width: f64,
    goal: RobotPose,
    step: f64,
    angle_scale: f64,
    max_angle: f64,
    config: &'e PlannerConfig,
}

impl<'e> RobotRrt<'e> {
    pub(crate) fn new(
        env: &'e Environment,
        goal: RobotPose,
        width: f64,
        config: &'e PlannerConfig,
    ) -> Self {
        RobotRrt {
            env,
            width,
            goal,
            step: config.robot_rrt.step,
            angle_scale: config.angle_scale,
            max_angle: config.max_sample_angle,
            config,
        }
    }

    /// Squared distance with the angle difference scaled down to be comparable to positions.
    fn dist2(&self, a: &RobotPose, b: &RobotPose) -> f64 {
        let da = (a.angle - b.angle) / self.angle_scale;
        a.pos.dist2(b.pos) + da * da
    }

    fn random_sample(&self, rng: &mut StdRng) -> RobotPose {
        RobotPose::new(
            round3(rng.gen::<f64>()),
            round3(rng.gen::<f64>()),
            round3(rng.gen::<f64>() * self.max_angle),
        )
    }

    fn between(from: &RobotPose, to: &RobotPose, fraction: f64) -> RobotPose {
        let lerp = |a: f64, b: f64| round3(a + (b - a) * fraction);
        RobotPose {
            pos: Pos::new(lerp(from.pos.x, to.pos.x), lerp(from.pos.y, to.pos.y)),
            angle: lerp(from.angle, to.angle),
        }
    }

    fn is_free(&self, pose: &RobotPose) -> bool {
        no_collision(self.env, self.env, pose, self.width)
    }

    fn extend(&self, from: &RobotPose, to: &RobotPose) -> Option<RobotPose> {
        let distance = self.dist2(from, to).sqrt();
        let mut last = None;
        for k in 1..=10 {
            let candidate = Self::between(from, to, f64::from(k) / 10.0 * self.step / distance);
            if !self.is_free(&candidate) {
                break;
            }
            last = Some(candidate);
        }
        last
    }

    fn can_connect(&self, from: &RobotPose, to: &RobotPose) -> bool {
        (1..=10).all(|k| self.is_free(&Self::between(from, to, f64::from(k) / 10.0)))
    }

    /// Close to the goal and the A* can actually get there.
    fn is_goal(&self, pose: &RobotPose) -> bool {
        self.dist2(pose, &self.goal) < self.step * self.step
            && robot_a_star::probe(self.env, *pose, self.goal, self.width, self.config)
    }

    /// Poses to visit after `start`, ending with the goal.
    pub(crate) fn solve(
        &self,
        start: RobotPose,
        max_samples: usize,
        rng: &mut StdRng,
    ) -> Option<Vec<RobotPose>> {
        let arena = Arena::new();
        let root: &RobotSample<'_> = arena.alloc(RobotSample {
            pose: start,
            parent: None,
        });
        let mut tree = vec![root];
        let mut seen = FnvHashSet::default();
        seen.insert(start);

        let mut reached = if self.is_goal(&start) {
            Some(root)
        } else {
            None
        };

        let mut samples = 0;
        while reached.is_none() {
            if samples >= max_samples {
                info!(
                    "Robot RRT gave up after {} samples, tree size {}",
                    samples,
                    tree.len()
                );
                return None;
            }
            samples += 1;

            let mut sample = self.random_sample(rng);
            if seen.contains(&sample) {
                continue;
            }
            let closest = tree
                .iter()
                .cloned()
                .min_by(|a, b| {
                    self.dist2(&a.pose, &sample)
                        .partial_cmp(&self.dist2(&b.pose, &sample))
                        .unwrap_or(::std::cmp::Ordering::Equal)
                })
                .unwrap_or(root);

            if self.dist2(&closest.pose, &sample) > self.step * self.step {
                match self.extend(&closest.pose, &sample) {
                    Some(extended) => sample = extended,
                    None => continue,
                }
                if seen.contains(&sample) {
                    continue;
                }
            }
            if self.can_connect(&closest.pose, &sample) {
                seen.insert(sample);
                let node: &RobotSample<'_> = arena.alloc(RobotSample {
                    pose: sample,
                    parent: Some(closest),
                });
                tree.push(node);
                if self.is_goal(&sample) {
                    reached = Some(node);
                }
            }
        }

        info!(
            "Robot RRT solved with {} samples, tree size {}",
            samples,
            tree.len()
        );
        reached.map(|last| {
            let mut waypoints = vec![self.goal];
            let mut sample = last;
            while let Some(parent) = sample.parent {
                waypoints.push(sample.pose);
                sample = parent;
            }
            waypoints.reverse();
            waypoints
        })
    }
}
