// THEORY:
// The `ProximityGrouper` is the engine of the grouping layer. Masks cut from the
// same on-screen element (a boss health bar in three states, a loading icon in two
// frames) rarely have pixel-identical bounding boxes, but their corners land within
// a few pixels of each other. This module decides which masks in a directory belong
// to one WatchZone.
//
// Key architectural principles & algorithm steps:
// 1.  **Directory Scoping**: Grouping only ever runs over the masks of a single
//     directory. Two masks in different directories never merge.
// 2.  **Size-Based Strategy**:
//     - One mask is its own group.
//     - Two masks are compared directly: they merge when both their top-left and
//       their bottom-right corners are within tolerance.
//     - Three or more masks go through connectivity clustering, run separately over
//       the top-left points and the bottom-right points.
// 3.  **Connectivity Clustering**: Points are nodes; an edge joins two points whose
//     distance is within tolerance. Each connected component is a cluster, found with
//     a breadth-first search. Reachability is transitive, so a chain of close points
//     forms a single cluster even when its ends are far apart.
// 4.  **Two-Sided Membership**: A mask's final group is the pair (top-left cluster,
//     bottom-right cluster) within its directory. Both corners must agree.
// 5.  **Determinism**: Points are visited in input order and the first unlabelled
//     point receives the next cluster id, so identical input gives identical ids.

use crate::config::{DistanceMetric, GroupingConfig};
use crate::core_modules::geometry::{Corners, Point};
use std::fmt;
use std::path::PathBuf;

/// Identifies one output group: a (top-left, bottom-right) cluster pair inside a directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClusterKey {
    pub top_left: usize,
    pub bottom_right: usize,
    pub directory: PathBuf,
}

impl fmt::Display for ClusterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{}) in {}",
            self.top_left,
            self.bottom_right,
            self.directory.display()
        )
    }
}

pub mod proximity_grouper {
    use super::*;
    use indexmap::IndexMap;
    use std::collections::VecDeque;
    use std::path::Path;
    use tracing::info;

    /// Measures the distance between two points under the configured metric.
    pub fn distance(a: &Point, b: &Point, metric: DistanceMetric) -> f64 {
        match metric {
            DistanceMetric::Chebyshev => a.chebyshev_distance(b),
            DistanceMetric::Euclidean => a.euclidean_distance(b),
        }
    }

    /// The symmetric "same spot" relation between two points.
    pub fn is_within_tolerance(a: &Point, b: &Point, config: &GroupingConfig) -> bool {
        distance(a, b, config.metric) <= config.tolerance as f64
    }

    /// Direct test used for two-mask directories.
    pub fn are_images_close(a: &Corners, b: &Corners, config: &GroupingConfig) -> bool {
        is_within_tolerance(&a.top_left, &b.top_left, config)
            && is_within_tolerance(&a.bottom_right, &b.bottom_right, config)
    }

    /// Labels every point with the id of its connected component.
    /// Ids start at 0 and are handed out in order of first appearance.
    pub fn connected_components(points: &[Point], config: &GroupingConfig) -> Vec<usize> {
        let mut labels: Vec<Option<usize>> = vec![None; points.len()];
        let mut next_label = 0;

        for seed in 0..points.len() {
            if labels[seed].is_some() {
                continue;
            }

            // Breadth-first expansion of everything reachable from this seed.
            let mut queue = VecDeque::from([seed]);
            labels[seed] = Some(next_label);

            while let Some(current) = queue.pop_front() {
                for (candidate, label) in labels.iter_mut().enumerate() {
                    if label.is_none()
                        && is_within_tolerance(&points[current], &points[candidate], config)
                    {
                        *label = Some(next_label);
                        queue.push_back(candidate);
                    }
                }
            }
            next_label += 1;
        }

        labels.into_iter().flatten().collect()
    }

    /// Partitions the masks of one directory into groups.
    ///
    /// `members` pairs each mask's run-wide index with its corners, in input order.
    /// The result maps each group to its member indices; both the groups and the
    /// members keep input order.
    pub fn group_directory(
        directory: &Path,
        members: &[(usize, Corners)],
        config: &GroupingConfig,
    ) -> IndexMap<ClusterKey, Vec<usize>> {
        let key = |top_left: usize, bottom_right: usize| ClusterKey {
            top_left,
            bottom_right,
            directory: directory.to_path_buf(),
        };
        let mut groups: IndexMap<ClusterKey, Vec<usize>> = IndexMap::new();

        match members {
            [] => {}
            [(only, _)] => {
                info!("One image file located.");
                groups.insert(key(0, 0), vec![*only]);
            }
            [(first, first_corners), (second, second_corners)] => {
                info!("Two image files located.");
                if are_images_close(first_corners, second_corners, config) {
                    info!("Grouping images due to proximity.");
                    groups.insert(key(0, 0), vec![*first, *second]);
                } else {
                    groups.insert(key(0, 0), vec![*first]);
                    groups.insert(key(0, 1), vec![*second]);
                }
            }
            _ => {
                info!("Beginning connectivity clustering over {} images.", members.len());
                let top_lefts: Vec<Point> = members.iter().map(|(_, c)| c.top_left).collect();
                let bottom_rights: Vec<Point> =
                    members.iter().map(|(_, c)| c.bottom_right).collect();

                let tl_labels = connected_components(&top_lefts, config);
                let br_labels = connected_components(&bottom_rights, config);
                info!("Top-left clusters: {:?}", tl_labels);
                info!("Bottom-right clusters: {:?}", br_labels);

                for (i, (index, _)) in members.iter().enumerate() {
                    groups
                        .entry(key(tl_labels[i], br_labels[i]))
                        .or_default()
                        .push(*index);
                }
            }
        }

        info!(
            "Formed {} image groups in {}.",
            groups.len(),
            directory.display()
        );
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::proximity_grouper::*;
    use super::*;
    use crate::core_modules::geometry::BoundingBox;
    use proptest::prelude::*;
    use std::path::Path;

    fn corners(x0: u32, y0: u32, x1: u32, y1: u32) -> Corners {
        BoundingBox::new(x0, y0, x1, y1).corners()
    }

    fn members(boxes: &[Corners]) -> Vec<(usize, Corners)> {
        boxes.iter().copied().enumerate().collect()
    }

    #[test]
    fn single_image_forms_singleton_group() {
        let groups = group_directory(
            Path::new("dir"),
            &members(&[corners(10, 10, 50, 50)]),
            &GroupingConfig::default(),
        );
        assert_eq!(groups.len(), 1);
        assert_eq!(groups.values().next(), Some(&vec![0]));
    }

    #[test]
    fn two_close_images_are_grouped() {
        let groups = group_directory(
            Path::new("dir"),
            &members(&[corners(0, 0, 40, 40), corners(5, 5, 45, 45)]),
            &GroupingConfig::default(),
        );
        assert_eq!(groups.len(), 1);
        assert_eq!(groups.values().next(), Some(&vec![0, 1]));
    }

    #[test]
    fn two_distant_images_stay_apart() {
        let groups = group_directory(
            Path::new("dir"),
            &members(&[corners(0, 0, 40, 40), corners(50, 50, 90, 90)]),
            &GroupingConfig::default(),
        );
        let values: Vec<_> = groups.values().cloned().collect();
        assert_eq!(values, vec![vec![0], vec![1]]);
    }

    #[test]
    fn two_images_need_both_corners_close() {
        let a = corners(0, 0, 40, 40);
        let b = corners(2, 2, 80, 80);
        assert!(!are_images_close(&a, &b, &GroupingConfig::default()));
    }

    #[test]
    fn chain_of_close_points_clusters_transitively() {
        let groups = group_directory(
            Path::new("dir"),
            &members(&[
                corners(0, 0, 30, 30),
                corners(8, 8, 38, 38),
                corners(16, 16, 46, 46),
            ]),
            &GroupingConfig::default(),
        );
        assert_eq!(groups.len(), 1);
        assert_eq!(groups.values().next(), Some(&vec![0, 1, 2]));
    }

    #[test]
    fn euclidean_metric_breaks_the_diagonal_chain() {
        let config = GroupingConfig {
            tolerance: 10,
            metric: DistanceMetric::Euclidean,
        };
        let points = [Point::new(0, 0), Point::new(8, 8), Point::new(16, 16)];
        assert_eq!(connected_components(&points, &config), vec![0, 1, 2]);
    }

    #[test]
    fn cluster_ids_follow_first_appearance() {
        let points = [
            Point::new(100, 100),
            Point::new(0, 0),
            Point::new(102, 99),
            Point::new(3, 1),
            Point::new(500, 500),
        ];
        assert_eq!(
            connected_components(&points, &GroupingConfig::default()),
            vec![0, 1, 0, 1, 2]
        );
    }

    #[test]
    fn group_key_combines_both_corner_clusters() {
        // Same top-left, diverging bottom-right: two groups.
        let groups = group_directory(
            Path::new("dir"),
            &members(&[
                corners(0, 0, 40, 40),
                corners(1, 1, 41, 41),
                corners(2, 2, 200, 200),
            ]),
            &GroupingConfig::default(),
        );
        let keys: Vec<(usize, usize)> = groups
            .keys()
            .map(|k| (k.top_left, k.bottom_right))
            .collect();
        assert_eq!(keys, vec![(0, 0), (0, 1)]);
        assert_eq!(groups[1], vec![2]);
    }

    proptest! {
        #[test]
        fn tolerance_relation_is_symmetric_and_reflexive(
            ax in 0u32..200, ay in 0u32..200, bx in 0u32..200, by in 0u32..200,
            tolerance in 0u32..30,
        ) {
            for metric in [DistanceMetric::Chebyshev, DistanceMetric::Euclidean] {
                let config = GroupingConfig { tolerance, metric };
                let a = Point::new(ax, ay);
                let b = Point::new(bx, by);
                prop_assert!(is_within_tolerance(&a, &a, &config));
                prop_assert_eq!(
                    is_within_tolerance(&a, &b, &config),
                    is_within_tolerance(&b, &a, &config)
                );
            }
        }

        #[test]
        fn close_points_share_a_cluster(
            raw in prop::collection::vec((0u32..120, 0u32..120), 1..12),
        ) {
            let config = GroupingConfig::default();
            let points: Vec<Point> = raw.iter().map(|&(x, y)| Point::new(x, y)).collect();
            let labels = connected_components(&points, &config);
            prop_assert_eq!(labels.len(), points.len());
            for i in 0..points.len() {
                for j in 0..points.len() {
                    if is_within_tolerance(&points[i], &points[j], &config) {
                        prop_assert_eq!(labels[i], labels[j]);
                    }
                }
            }
        }
    }
}
