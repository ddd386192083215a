//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! An octree over the scene's object arena. Each interior node cuts its
//! members at the per-axis medians of their center points into up to eight
//! octants. Leaves store indices into the scene's object list, never the
//! objects themselves.

use crate::{Hit, Ray, SceneObject};
use ember_math::{Aabb, Interval, Vec3};

/// Padding added around every node box so rounding at grazing angles
/// never culls a hit that a linear scan would report.
const NODE_PADDING: f32 = 1e-4;

/// Hard recursion limit for the build; deeper nodes become leaves.
const MAX_DEPTH: usize = 64;

/// BVH node - either an interior node with up to eight children or a leaf.
#[derive(Debug, Clone)]
pub enum BvhNode {
    /// Internal node with one child per non-empty octant.
    Interior { children: Vec<BvhNode>, bbox: Aabb },
    /// Leaf node holding indices into the object arena.
    Leaf { objects: Vec<usize>, bbox: Aabb },
}

/// Shape statistics of a built tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BvhStats {
    pub nodes: usize,
    pub leaves: usize,
    pub max_depth: usize,
    pub max_leaf_size: usize,
}

/// Octree BVH over a slice of [`SceneObject`]s.
#[derive(Debug, Clone)]
pub struct Bvh {
    root: BvhNode,
    object_count: usize,
    leaf_threshold: usize,
}

impl Bvh {
    /// Build the tree. `leaf_threshold` values below 1 are treated as 1.
    pub fn new(objects: &[SceneObject], leaf_threshold: usize) -> Self {
        let leaf_threshold = leaf_threshold.max(1);
        let indices: Vec<usize> = (0..objects.len()).collect();
        let root = BvhNode::build(objects, indices, leaf_threshold, 0);

        let bvh = Self {
            root,
            object_count: objects.len(),
            leaf_threshold,
        };

        let stats = bvh.stats();
        log::info!(
            "Built BVH over {} objects: {} nodes, {} leaves, depth {}, largest leaf {}",
            bvh.object_count,
            stats.nodes,
            stats.leaves,
            stats.max_depth,
            stats.max_leaf_size
        );

        bvh
    }

    pub fn root(&self) -> &BvhNode {
        &self.root
    }

    /// Number of objects the tree was built over.
    pub fn object_count(&self) -> usize {
        self.object_count
    }

    pub fn leaf_threshold(&self) -> usize {
        self.leaf_threshold
    }

    /// Nearest hit of `ray` against `objects`.
    ///
    /// `objects` must be the slice the tree was built from.
    pub fn intersect(&self, objects: &[SceneObject], ray: &Ray) -> Option<Hit> {
        debug_assert_eq!(objects.len(), self.object_count);
        self.root.ray_intersect(objects, ray, f32::INFINITY)
    }

    /// Object indices of every leaf, in depth-first order.
    pub fn leaves(&self) -> Vec<&[usize]> {
        let mut leaves = Vec::new();
        self.root.collect_leaves(&mut leaves);
        leaves
    }

    pub fn stats(&self) -> BvhStats {
        let mut stats = BvhStats::default();
        self.root.accumulate_stats(0, &mut stats);
        stats
    }
}

impl BvhNode {
    /// Recursive octree construction.
    fn build(
        objects: &[SceneObject],
        indices: Vec<usize>,
        leaf_threshold: usize,
        depth: usize,
    ) -> Self {
        // Compute bounding box of all members
        let bbox = indices
            .iter()
            .fold(Aabb::EMPTY, |acc, &i| Aabb::surrounding(&acc, &objects[i].bounding_box()))
            .padded(NODE_PADDING);

        if indices.len() <= leaf_threshold {
            return BvhNode::Leaf { objects: indices, bbox };
        }
        if depth >= MAX_DEPTH {
            log::debug!(
                "BVH depth limit reached with {} objects, making a leaf",
                indices.len()
            );
            return BvhNode::Leaf { objects: indices, bbox };
        }

        let centers: Vec<Vec3> = indices.iter().map(|&i| objects[i].center_point()).collect();
        let split = median_point(&centers);

        // Assign each member to exactly one octant
        let mut octants: [Vec<usize>; 8] = Default::default();
        for (&index, &center) in indices.iter().zip(&centers) {
            let octant = Aabb::octant_index(center, split);
            debug_assert!(bbox.octant(split, octant).contains(center));
            octants[octant].push(index);
        }

        // Coincident centers cannot be separated; stop here
        if octants.iter().any(|o| o.len() == indices.len()) {
            log::debug!(
                "BVH split made no progress on {} objects, making a leaf",
                indices.len()
            );
            return BvhNode::Leaf { objects: indices, bbox };
        }

        let children = octants
            .into_iter()
            .filter(|members| !members.is_empty())
            .map(|members| Self::build(objects, members, leaf_threshold, depth + 1))
            .collect();

        BvhNode::Interior { children, bbox }
    }

    pub fn bounding_box(&self) -> Aabb {
        match self {
            BvhNode::Interior { bbox, .. } | BvhNode::Leaf { bbox, .. } => *bbox,
        }
    }

    /// Nearest hit strictly closer than `closest`.
    ///
    /// Subtrees whose box the ray cannot enter before `closest` are skipped;
    /// this never changes the answer, only the work done to find it.
    pub fn ray_intersect(&self, objects: &[SceneObject], ray: &Ray, mut closest: f32) -> Option<Hit> {
        if !self.bounding_box().hit(ray, Interval::new(0.0, closest)) {
            return None;
        }

        let mut nearest = None;
        match self {
            BvhNode::Leaf { objects: members, .. } => {
                for &index in members {
                    if let Some(hit) = objects[index].ray_intersect(ray) {
                        if hit.t < closest {
                            closest = hit.t;
                            nearest = Some(hit);
                        }
                    }
                }
            }
            BvhNode::Interior { children, .. } => {
                for child in children {
                    if let Some(hit) = child.ray_intersect(objects, ray, closest) {
                        closest = hit.t;
                        nearest = Some(hit);
                    }
                }
            }
        }
        nearest
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a [usize]>) {
        match self {
            BvhNode::Leaf { objects, .. } => out.push(objects),
            BvhNode::Interior { children, .. } => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }

    fn accumulate_stats(&self, depth: usize, stats: &mut BvhStats) {
        stats.nodes += 1;
        stats.max_depth = stats.max_depth.max(depth);
        match self {
            BvhNode::Leaf { objects, .. } => {
                stats.leaves += 1;
                stats.max_leaf_size = stats.max_leaf_size.max(objects.len());
            }
            BvhNode::Interior { children, .. } => {
                for child in children {
                    child.accumulate_stats(depth + 1, stats);
                }
            }
        }
    }
}

/// Per-axis median of a set of points: sort by axis, take index `len / 2`.
fn median_point(points: &[Vec3]) -> Vec3 {
    let mut axis_values: Vec<f32> = Vec::with_capacity(points.len());
    let mut split = Vec3::ZERO;

    for axis in 0..3 {
        axis_values.clear();
        axis_values.extend(points.iter().map(|p| p[axis]));
        axis_values.sort_unstable_by(|a, b| a.total_cmp(b));
        split[axis] = axis_values[axis_values.len() / 2];
    }

    split
}
