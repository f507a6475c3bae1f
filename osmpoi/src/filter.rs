//! Greedy spatial thinning of node lists.

use crate::geo::{haversine_distance, Coord};
use crate::label::LabelSpec;
use crate::osmxml::{RawNode, Tag};

/// A retained node with its composed display label.
#[derive(Debug, Clone)]
pub struct Poi {
    pub label: String,
    pub coord: Coord,
    pub tags: Vec<Tag>,
}

/// Outcome of a thinning pass.
#[derive(Debug)]
pub struct Thinned {
    /// Retained nodes in input order.
    pub pois: Vec<Poi>,
    pub num_dropped: usize,
}

/// Thins `nodes` so that no retained node lies strictly closer than
/// `threshold_meters` to an already retained one.
///
/// A single greedy pass in input order: each node is checked against the
/// nodes retained so far and dropped as soon as one of them is too close.
/// The first node of a cluster always wins, so the input order is part of
/// the contract. A threshold of zero or below retains every node. Every
/// retained node gets its display label composed from its tags.
pub fn filter_nodes(nodes: Vec<RawNode>, threshold_meters: f64, labels: &LabelSpec) -> Thinned {
    let mut kept: Vec<Coord> = Vec::new();
    let mut pois = Vec::new();
    let mut num_dropped = 0;

    for node in nodes {
        let too_close = kept
            .iter()
            .any(|&coord| haversine_distance(node.coord, coord) < threshold_meters);
        if too_close {
            num_dropped += 1;
            continue;
        }
        kept.push(node.coord);
        pois.push(Poi {
            label: labels.compose(&node.tags),
            coord: node.coord,
            tags: node.tags,
        });
    }

    Thinned { pois, num_dropped }
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    fn node(id: &str, lat: f64, lon: f64) -> RawNode {
        RawNode {
            id: id.to_string(),
            coord: Coord::new(lat, lon),
            tags: vec![],
        }
    }

    fn ids(thinned: &Thinned) -> Vec<String> {
        thinned.pois.iter().map(|p| p.label.clone()).collect()
    }

    fn labeled(id: &str, lat: f64, lon: f64) -> RawNode {
        RawNode {
            id: id.to_string(),
            coord: Coord::new(lat, lon),
            tags: vec![Tag {
                key: "amenity".to_string(),
                value: id.to_string(),
            }],
        }
    }

    #[test]
    fn middle_node_of_a_chain_is_dropped() {
        // B is within 150 m of A, C is within 150 m of B but not of A.
        let nodes = vec![
            labeled("A", 0.0, 0.0),
            labeled("B", 0.0, 0.0009),
            labeled("C", 0.0, 0.0018),
        ];
        let thinned = filter_nodes(nodes, 150.0, &LabelSpec::default());
        assert_eq!(ids(&thinned), ["A", "C"]);
        assert_eq!(thinned.num_dropped, 1);
    }

    #[test]
    fn input_order_changes_the_outcome() {
        // Same nodes as the chain above, but B leads and suppresses both
        // of its neighbors.
        let nodes = vec![
            labeled("B", 0.0, 0.0009),
            labeled("A", 0.0, 0.0),
            labeled("C", 0.0, 0.0018),
        ];
        let thinned = filter_nodes(nodes, 150.0, &LabelSpec::default());
        assert_eq!(ids(&thinned), ["B"]);
        assert_eq!(thinned.num_dropped, 2);
    }

    #[test]
    fn first_node_of_a_cluster_wins() {
        let nodes = vec![
            labeled("A", 0.0, 0.0),
            labeled("B", 0.0, 0.0001),
            labeled("C", 0.0, 0.0002),
        ];
        let thinned = filter_nodes(nodes, 500.0, &LabelSpec::default());
        assert_eq!(ids(&thinned), ["A"]);
        assert_eq!(thinned.num_dropped, 2);
    }

    #[test]
    fn distance_exactly_at_the_threshold_is_kept() {
        // Two nodes on the same spot are 0 m apart, which is not strictly
        // less than a zero threshold.
        let nodes = vec![node("A", 12.5, 3.25), node("B", 12.5, 3.25)];
        let thinned = filter_nodes(nodes, 0.0, &LabelSpec::default());
        assert_eq!(thinned.pois.len(), 2);
        assert_eq!(thinned.num_dropped, 0);
    }

    #[test]
    fn negative_threshold_retains_everything() {
        let nodes = vec![node("A", 0.0, 0.0), node("B", 0.0, 0.0), node("C", 0.0, 0.0)];
        let thinned = filter_nodes(nodes, -1.0, &LabelSpec::default());
        assert_eq!(thinned.pois.len(), 3);
    }

    #[test]
    fn empty_input_stays_empty() {
        let thinned = filter_nodes(vec![], 100.0, &LabelSpec::default());
        assert!(thinned.pois.is_empty());
        assert_eq!(thinned.num_dropped, 0);
    }

    #[test]
    fn retained_nodes_keep_their_tags() {
        let nodes = vec![labeled("fuel", 10.0, 20.0)];
        let thinned = filter_nodes(nodes, 100.0, &LabelSpec::default());
        assert_eq!(thinned.pois[0].tags[0].value, "fuel");
        assert_eq!(thinned.pois[0].label, "fuel");
    }

    proptest! {
        /// No two retained nodes are closer than the threshold.
        #[test]
        fn retained_nodes_respect_the_threshold(
            coords in prop::collection::vec((-1.0..1.0f64, -1.0..1.0f64), 0..40),
            threshold in 0.0..5000.0f64,
        ) {
            let nodes = coords
                .iter()
                .enumerate()
                .map(|(i, &(lat, lon))| node(&i.to_string(), lat, lon))
                .collect();
            let thinned = filter_nodes(nodes, threshold, &LabelSpec::default());
            for (i, a) in thinned.pois.iter().enumerate() {
                for b in &thinned.pois[i + 1..] {
                    prop_assert!(haversine_distance(a.coord, b.coord) >= threshold);
                }
            }
            prop_assert_eq!(thinned.pois.len() + thinned.num_dropped, coords.len());
        }

        /// Thinning an already thinned list drops nothing further.
        #[test]
        fn a_second_pass_drops_nothing(
            coords in prop::collection::vec((-1.0..1.0f64, -1.0..1.0f64), 0..40),
            threshold in 0.0..5000.0f64,
        ) {
            let nodes = coords
                .iter()
                .map(|&(lat, lon)| node("", lat, lon))
                .collect();
            let thinned = filter_nodes(nodes, threshold, &LabelSpec::default());
            let again = thinned
                .pois
                .iter()
                .map(|p| node("", p.coord.lat, p.coord.lon))
                .collect();
            let rethinned = filter_nodes(again, threshold, &LabelSpec::default());
            prop_assert_eq!(rethinned.num_dropped, 0);
            prop_assert_eq!(rethinned.pois.len(), thinned.pois.len());
        }
    }
}
