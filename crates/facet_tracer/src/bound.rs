//! Bounding-volume hierarchy over scene primitives.
//!
//! Two builders: [`Bound::no_acceleration`] puts everything in one leaf and
//! serves as the reference answer, [`Bound::top_down`] recursively slices
//! the primitives into a few groups along the widest centroid axis. Trees
//! are built once per scene and only read afterwards.

use facet_math::{Aabb, Interval, Ray};

use crate::error::{TracerError, TracerResult};
use crate::intersectable::{closest_hit, Intersectable, ShadeablePoint};

/// Tuning for [`Bound::top_down`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopDownOptions {
    /// Groups of at most this many primitives become leaves.
    pub leaf_size: usize,
    /// Number of equal slabs each split cuts the centroid extent into.
    pub split_count: usize,
    /// Recursion limit; deeper groups become leaves regardless of size.
    pub max_depth: usize,
}

impl Default for TopDownOptions {
    fn default() -> Self {
        Self {
            leaf_size: 4,
            split_count: 3,
            max_depth: 64,
        }
    }
}

/// Node of the acceleration tree.
///
/// Using an enum keeps traversal free of dynamic dispatch.
#[derive(Debug, Clone)]
pub enum Bound {
    Leaf {
        primitives: Vec<Intersectable>,
        bbox: Aabb,
    },
    /// Internal node with two or more children.
    Node { children: Vec<Bound>, bbox: Aabb },
}

/// Shape of a built tree, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoundStats {
    pub nodes: usize,
    pub leaves: usize,
    pub primitives: usize,
    pub max_depth: usize,
    pub largest_leaf: usize,
}

impl Bound {
    /// A single leaf holding every primitive.
    pub fn no_acceleration(primitives: Vec<Intersectable>) -> Self {
        let bbox = surrounding(&primitives);
        Bound::Leaf { primitives, bbox }
    }

    /// Recursive spatial split into at most `split_count` groups per level.
    pub fn top_down(primitives: Vec<Intersectable>, options: &TopDownOptions) -> Self {
        Self::build(primitives, options, 0)
    }

    fn build(primitives: Vec<Intersectable>, options: &TopDownOptions, depth: usize) -> Self {
        let bbox = surrounding(&primitives);
        if primitives.len() <= options.leaf_size.max(1) || depth >= options.max_depth {
            return Bound::Leaf { primitives, bbox };
        }

        match split(primitives, options.split_count.max(2)) {
            Ok(groups) => Bound::Node {
                children: groups
                    .into_iter()
                    .map(|group| Self::build(group, options, depth + 1))
                    .collect(),
                bbox,
            },
            Err(primitives) => Bound::Leaf { primitives, bbox },
        }
    }

    pub fn bounding_box(&self) -> Aabb {
        match self {
            Bound::Leaf { bbox, .. } | Bound::Node { bbox, .. } => *bbox,
        }
    }

    /// Checks that every node's box contains every descendant's box and that
    /// internal nodes have at least two children.
    pub fn check_sanity(&self) -> TracerResult<()> {
        match self {
            Bound::Leaf { primitives, bbox } => {
                for primitive in primitives {
                    let extent = primitive.bounding_box();
                    if !bbox.encloses(&extent) {
                        return Err(TracerError::ConstructionInvariantViolated(format!(
                            "primitive {extent:?} escapes leaf bounds {bbox:?}"
                        )));
                    }
                    if let Some(message) = primitive.find_escaped_member() {
                        return Err(TracerError::ConstructionInvariantViolated(message));
                    }
                }
                Ok(())
            }
            Bound::Node { children, bbox } => {
                if children.len() < 2 {
                    return Err(TracerError::ConstructionInvariantViolated(format!(
                        "internal node with {} children",
                        children.len()
                    )));
                }
                for child in children {
                    let extent = child.bounding_box();
                    if !bbox.encloses(&extent) {
                        return Err(TracerError::ConstructionInvariantViolated(format!(
                            "child {extent:?} escapes node bounds {bbox:?}"
                        )));
                    }
                    child.check_sanity()?;
                }
                Ok(())
            }
        }
    }

    /// Closest hit along `ray` at a strictly positive distance.
    pub fn intersect(&self, ray: &Ray) -> Option<ShadeablePoint<'_>> {
        self.closest_hit(ray, Interval::FORWARD)
    }

    fn closest_hit(&self, ray: &Ray, ray_t: Interval) -> Option<ShadeablePoint<'_>> {
        let bbox = self.bounding_box();
        if bbox.is_empty() {
            return None;
        }
        bbox.hit(ray, ray_t)?;

        match self {
            Bound::Leaf { primitives, .. } => closest_hit(primitives, ray, ray_t),
            Bound::Node { children, .. } => {
                let mut closest = None;
                let mut range = ray_t;
                for child in children {
                    // Children whose box starts past the best hit are pruned inside.
                    if let Some(hit) = child.closest_hit(ray, range) {
                        range = range.with_max(hit.distance);
                        closest = Some(hit);
                    }
                }
                closest
            }
        }
    }

    /// True if anything lies along `ray` strictly inside `ray_t`.
    /// Stops at the first hit found rather than the closest.
    pub fn any_hit(&self, ray: &Ray, ray_t: Interval) -> bool {
        let bbox = self.bounding_box();
        if bbox.is_empty() || bbox.hit(ray, ray_t).is_none() {
            return false;
        }
        match self {
            Bound::Leaf { primitives, .. } => primitives
                .iter()
                .any(|primitive| primitive.intersect(ray, ray_t).is_some()),
            Bound::Node { children, .. } => children.iter().any(|child| child.any_hit(ray, ray_t)),
        }
    }

    pub fn stats(&self) -> BoundStats {
        let mut stats = BoundStats::default();
        self.collect_stats(1, &mut stats);
        stats
    }

    fn collect_stats(&self, depth: usize, stats: &mut BoundStats) {
        stats.max_depth = stats.max_depth.max(depth);
        match self {
            Bound::Leaf { primitives, .. } => {
                stats.leaves += 1;
                stats.primitives += primitives.len();
                stats.largest_leaf = stats.largest_leaf.max(primitives.len());
            }
            Bound::Node { children, .. } => {
                stats.nodes += 1;
                for child in children {
                    child.collect_stats(depth + 1, stats);
                }
            }
        }
    }
}

fn surrounding(primitives: &[Intersectable]) -> Aabb {
    primitives
        .iter()
        .fold(Aabb::EMPTY, |acc, p| Aabb::surrounding(&acc, &p.bounding_box()))
}

/// Partitions `primitives` into equal-width centroid slabs along the widest
/// axis that separates them. Empty slabs are dropped. Gives the primitives
/// back when no axis yields at least two non-empty groups.
fn split(
    primitives: Vec<Intersectable>,
    count: usize,
) -> Result<Vec<Vec<Intersectable>>, Vec<Intersectable>> {
    let centroids: Vec<_> = primitives
        .iter()
        .map(|p| p.bounding_box().centroid())
        .collect();
    let centroid_bounds = Aabb::from_point_cloud(centroids.iter().copied());

    let mut axes = [0, 1, 2];
    axes.sort_by(|&a, &b| {
        centroid_bounds
            .axis_interval(b)
            .size()
            .total_cmp(&centroid_bounds.axis_interval(a).size())
    });

    for axis in axes {
        let extent = centroid_bounds.axis_interval(axis);
        if extent.size() <= 0.0 {
            continue;
        }
        let slabs: Vec<usize> = centroids
            .iter()
            .map(|c| {
                let offset = (c[axis] - extent.min) / extent.size();
                ((offset * count as f32) as usize).min(count - 1)
            })
            .collect();

        let mut occupied = vec![false; count];
        for &slab in &slabs {
            occupied[slab] = true;
        }
        if occupied.iter().filter(|&&o| o).count() < 2 {
            continue;
        }

        let mut groups: Vec<Vec<Intersectable>> = (0..count).map(|_| Vec::new()).collect();
        for (primitive, slab) in primitives.into_iter().zip(slabs) {
            groups[slab].push(primitive);
        }
        groups.retain(|group| !group.is_empty());
        return Ok(groups);
    }
    Err(primitives)
}
