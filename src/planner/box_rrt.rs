//! RRT over the positions of one or two boxes, used when the grid searches
//! get stuck behind other objects.

use fnv::FnvHashSet;
use rand::rngs::StdRng;
use rand::Rng;
use typed_arena::Arena;

use crate::data::{round3, Pos, UNIT_STEP};
use crate::geometry::{no_box_collision, problem_object, CollisionCounts};
use crate::state::{Environment, MovingObject};

/// Positions of the moved objects, in the order of `BoxRrt::moved`.
struct BoxSample<'a> {
    positions: Vec<Pos>,
    parent: Option<&'a BoxSample<'a>>,
}

fn key(positions: &[Pos]) -> Vec<(i64, i64)> {
    positions.iter().map(|p| p.key()).collect()
}

fn dist2(a: &[Pos], b: &[Pos]) -> f64 {
    a.iter().zip(b).map(|(&p, &q)| p.dist2(q)).sum()
}

pub(crate) struct BoxRrt<'e> {
    start: &'e Environment,
    /// Object indices which may move, the first one is the one with the goal.
    moved: Vec<usize>,
    goal: Pos,
    goal_tolerance: f64,
    step: f64,
    counts: CollisionCounts,
}

impl<'e> BoxRrt<'e> {
    pub(crate) fn new(
        start: &'e Environment,
        moved: Vec<usize>,
        goal: Pos,
        step: f64,
        goal_tolerance: f64,
    ) -> Self {
        let counts = (0..start.len())
            .filter(|i| !moved.contains(i))
            .map(|i| (i, 0))
            .collect();
        BoxRrt {
            start,
            moved,
            goal,
            goal_tolerance,
            step,
            counts,
        }
    }

    /// The object which got in the way most often and how many times.
    pub(crate) fn problem_object(&self) -> Option<(usize, u32)> {
        problem_object(&self.counts)
    }

    fn origin(&self) -> Vec<Pos> {
        self.moved.iter().map(|&i| self.start.object(i).pos).collect()
    }

    /// Keeps every position a whole number of unit steps away from where the object
    /// started so the unit step box search can hit it exactly.
    fn snap(&self, positions: Vec<Pos>) -> Vec<Pos> {
        positions
            .into_iter()
            .zip(&self.moved)
            .map(|(p, &i)| {
                let o = self.start.object(i).pos;
                Pos::new(o.x + round3(p.x - o.x), o.y + round3(p.y - o.y))
            })
            .collect()
    }

    fn random_sample(&self, rng: &mut StdRng) -> Vec<Pos> {
        let positions = self
            .moved
            .iter()
            .map(|_| Pos::new(round3(rng.gen::<f64>()), round3(rng.gen::<f64>())))
            .collect();
        self.snap(positions)
    }

    fn objects_at(&self, positions: &[Pos]) -> Vec<MovingObject> {
        let mut objects = self.start.objects().to_vec();
        for (&i, &p) in self.moved.iter().zip(positions) {
            objects[i] = objects[i].moved_to(p);
        }
        objects
    }

    fn is_free(&mut self, positions: &[Pos]) -> bool {
        let objects = self.objects_at(positions);
        no_box_collision(&objects, self.start.statics(), Some(&mut self.counts))
    }

    /// Point `fraction` of the way from `from` to `to`.
    fn between(&self, from: &[Pos], to: &[Pos], fraction: f64) -> Vec<Pos> {
        let positions = from
            .iter()
            .zip(to)
            .map(|(&a, &b)| Pos::new(a.x + (b.x - a.x) * fraction, a.y + (b.y - a.y) * fraction))
            .collect();
        self.snap(positions)
    }

    /// Walks at most one step from `from` towards `to` in 10 sub-steps, stopping
    /// before the first collision. `None` if even the first sub-step collides.
    ///
    /// The walk is shortened by the worst case snapping error, so the snapped
    /// result is never farther than `step` from `from`.
    fn extend(&mut self, from: &[Pos], to: &[Pos]) -> Option<Vec<Pos>> {
        let distance = dist2(from, to).sqrt();
        let rounding = 0.5 * UNIT_STEP * (2.0 * from.len() as f64).sqrt();
        let reach = self.step - rounding;
        let mut last = None;
        for k in 1..=10 {
            let fraction = f64::from(k) / 10.0 * reach / distance;
            let candidate = self.between(from, to, fraction);
            if !self.is_free(&candidate) {
                break;
            }
            last = Some(candidate);
        }
        last
    }

    /// Every tenth of the way between the two configurations is collision free.
    fn can_connect(&mut self, from: &[Pos], to: &[Pos]) -> bool {
        (1..=10).all(|k| {
            let candidate = self.between(from, to, f64::from(k) / 10.0);
            self.is_free(&candidate)
        })
    }

    fn is_goal(&self, positions: &[Pos]) -> bool {
        !positions[0].is_away(self.goal, self.goal_tolerance)
    }

    /// Environments to go through, the last one with the goal box exactly at its goal.
    /// `None` if no route was found within `max_samples` samples.
    pub(crate) fn solve(&mut self, max_samples: usize, rng: &mut StdRng) -> Option<Vec<Environment>> {
        let arena = Arena::new();
        let root: &BoxSample<'_> = arena.alloc(BoxSample {
            positions: self.origin(),
            parent: None,
        });
        let mut tree = vec![root];
        let mut keys = FnvHashSet::default();
        keys.insert(key(&root.positions));

        let mut reached = if self.is_goal(&root.positions) {
            Some(root)
        } else {
            None
        };

        let mut samples = 0;
        while reached.is_none() {
            if samples >= max_samples {
                info!(
                    "Box RRT for {:?} gave up after {} samples, tree size {}",
                    self.moved,
                    samples,
                    tree.len()
                );
                return None;
            }
            samples += 1;

            let mut sample = self.random_sample(rng);
            if keys.contains(&key(&sample)) {
                continue;
            }
            let closest = tree
                .iter()
                .cloned()
                .min_by(|a, b| {
                    dist2(&a.positions, &sample)
                        .partial_cmp(&dist2(&b.positions, &sample))
                        .unwrap_or(::std::cmp::Ordering::Equal)
                })
                .unwrap_or(root);

            if dist2(&closest.positions, &sample) > self.step * self.step {
                match self.extend(&closest.positions, &sample) {
                    Some(extended) => sample = extended,
                    None => continue,
                }
                if keys.contains(&key(&sample)) {
                    continue;
                }
            }
            if self.can_connect(&closest.positions, &sample) {
                keys.insert(key(&sample));
                let node: &BoxSample<'_> = arena.alloc(BoxSample {
                    positions: sample,
                    parent: Some(closest),
                });
                tree.push(node);
                if self.is_goal(&node.positions) {
                    reached = Some(node);
                }
            }
        }

        info!(
            "Box RRT for {:?} solved with {} samples, tree size {}",
            self.moved,
            samples,
            tree.len()
        );
        reached.map(|last| self.route(last))
    }

    fn route(&self, last: &BoxSample<'_>) -> Vec<Environment> {
        let mut chain = Vec::new();
        let mut sample = last;
        while let Some(parent) = sample.parent {
            chain.push(&sample.positions);
            sample = parent;
        }
        chain.reverse();

        let mut route: Vec<Environment> = chain
            .into_iter()
            .map(|positions| {
                let moves: Vec<_> = self.moved.iter().cloned().zip(positions.iter().cloned()).collect();
                self.start.with_objects_at(&moves)
            })
            .collect();
        let pinned = route
            .last()
            .unwrap_or(self.start)
            .with_object_at(self.moved[0], self.goal);
        route.push(pinned);
        route
    }
}
