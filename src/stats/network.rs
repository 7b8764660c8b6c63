//! Country / target-type network with a Fruchterman-Reingold spring layout.

use crate::data::{IncidentTable, Selection};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Minimum distance used by the force computation.
const MIN_DISTANCE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    Country,
    TargetType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkNode {
    pub label: String,
    pub kind: NodeKind,
    /// Layout position, within [-1, 1] on both axes.
    pub position: [f64; 2],
    pub degree: usize,
}

/// Undirected edge between a country node and a target-type node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkEdge {
    pub source: usize,
    pub target: usize,
    /// Number of incidents linking the two nodes.
    pub weight: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NetworkGraph {
    pub nodes: Vec<NetworkNode>,
    pub edges: Vec<NetworkEdge>,
}

impl NetworkGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Spring layout parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    pub iterations: usize,
    pub seed: u64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            iterations: 50,
            seed: 42,
        }
    }
}

pub struct NetworkBuilder;

impl NetworkBuilder {
    /// Build the bipartite country/target graph of the selection and lay it out.
    pub fn build(
        table: &IncidentTable,
        selection: &Selection,
        layout: &LayoutSettings,
    ) -> NetworkGraph {
        let mut occurrences: BTreeMap<(&str, &str), u32> = BTreeMap::new();
        for incident in table.incidents().iter().filter(|i| i.matches(selection)) {
            if let (Some(country), Some(target)) = (
                incident.country.as_deref(),
                incident.target_type.as_deref(),
            ) {
                *occurrences.entry((country, target)).or_default() += 1;
            }
        }

        let mut index: HashMap<(NodeKind, &str), usize> = HashMap::new();
        let mut nodes: Vec<NetworkNode> = Vec::new();
        let mut edges = Vec::with_capacity(occurrences.len());

        for ((country, target), weight) in occurrences {
            let source = Self::node_id(&mut index, &mut nodes, NodeKind::Country, country);
            let target = Self::node_id(&mut index, &mut nodes, NodeKind::TargetType, target);
            edges.push(NetworkEdge {
                source,
                target,
                weight,
            });
        }

        for edge in &edges {
            nodes[edge.source].degree += 1;
            nodes[edge.target].degree += 1;
        }

        let positions = Self::spring_layout(nodes.len(), &edges, layout);
        for (node, position) in nodes.iter_mut().zip(positions) {
            node.position = position;
        }

        NetworkGraph { nodes, edges }
    }

    fn node_id<'a>(
        index: &mut HashMap<(NodeKind, &'a str), usize>,
        nodes: &mut Vec<NetworkNode>,
        kind: NodeKind,
        label: &'a str,
    ) -> usize {
        *index.entry((kind, label)).or_insert_with(|| {
            nodes.push(NetworkNode {
                label: label.to_string(),
                kind,
                position: [0.0, 0.0],
                degree: 0,
            });
            nodes.len() - 1
        })
    }

    /// Force-directed positions, centered on the origin and scaled into [-1, 1].
    ///
    /// Edge weights scale the attractive force. A single node sits at the
    /// origin.
    pub fn spring_layout(
        node_count: usize,
        edges: &[NetworkEdge],
        settings: &LayoutSettings,
    ) -> Vec<[f64; 2]> {
        match node_count {
            0 => return Vec::new(),
            1 => return vec![[0.0, 0.0]],
            _ => {}
        }

        let n = node_count;
        let mut rng = StdRng::seed_from_u64(settings.seed);
        let mut pos: Vec<[f64; 2]> = (0..n).map(|_| [rng.gen(), rng.gen()]).collect();

        let mut adjacency = vec![0.0f64; n * n];
        for edge in edges {
            adjacency[edge.source * n + edge.target] += edge.weight as f64;
            adjacency[edge.target * n + edge.source] += edge.weight as f64;
        }

        let k = (1.0 / n as f64).sqrt();
        let span = |axis: usize| {
            let (lo, hi) = pos
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                    (lo.min(p[axis]), hi.max(p[axis]))
                });
            hi - lo
        };
        let mut temperature = span(0).max(span(1)) * 0.1;
        let cooling = temperature / (settings.iterations + 1) as f64;

        for _ in 0..settings.iterations {
            let mut displacement = vec![[0.0f64; 2]; n];
            for i in 0..n {
                for j in 0..n {
                    if i == j {
                        continue;
                    }
                    let dx = pos[i][0] - pos[j][0];
                    let dy = pos[i][1] - pos[j][1];
                    let distance = dx.hypot(dy).max(MIN_DISTANCE);
                    let force = k * k / (distance * distance)
                        - adjacency[i * n + j] * distance / k;
                    displacement[i][0] += dx * force;
                    displacement[i][1] += dy * force;
                }
            }

            let mut moved = 0.0;
            for (p, d) in pos.iter_mut().zip(&displacement) {
                let length = d[0].hypot(d[1]).max(MIN_DISTANCE);
                let step = [d[0] * temperature / length, d[1] * temperature / length];
                p[0] += step[0];
                p[1] += step[1];
                moved += step[0].hypot(step[1]);
            }
            temperature -= cooling;

            if moved / (n as f64) < 1e-4 {
                break;
            }
        }

        Self::rescale(&mut pos);
        pos
    }

    fn rescale(pos: &mut [[f64; 2]]) {
        let n = pos.len() as f64;
        let center = pos
            .iter()
            .fold([0.0, 0.0], |acc, p| [acc[0] + p[0] / n, acc[1] + p[1] / n]);

        let mut limit = 0.0f64;
        for p in pos.iter_mut() {
            p[0] -= center[0];
            p[1] -= center[1];
            limit = limit.max(p[0].abs()).max(p[1].abs());
        }

        if limit > 0.0 {
            for p in pos.iter_mut() {
                p[0] /= limit;
                p[1] /= limit;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Incident;

    fn incident(country: &str, target: &str) -> Incident {
        Incident {
            month: Some(3),
            region: Some("South Asia".to_string()),
            country: Some(country.to_string()),
            target_type: Some(target.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn edges_count_incidents() {
        let table = IncidentTable::new(vec![
            incident("Afghanistan", "Police"),
            incident("Afghanistan", "Police"),
            incident("Afghanistan", "Military"),
            incident("India", "Police"),
        ]);

        let graph = NetworkBuilder::build(
            &table,
            &Selection::new("South Asia", 3),
            &LayoutSettings::default(),
        );

        assert_eq!(graph.nodes.len(), 4);
        assert_eq!(graph.edges.len(), 3);
        assert_eq!(graph.nodes[0].label, "Afghanistan");
        assert_eq!(graph.nodes[0].degree, 2);

        let police = graph
            .nodes
            .iter()
            .position(|n| n.label == "Police")
            .unwrap();
        assert_eq!(graph.nodes[police].kind, NodeKind::TargetType);
        assert_eq!(graph.nodes[police].degree, 2);
        let heavy = graph
            .edges
            .iter()
            .find(|e| e.source == 0 && e.target == police)
            .unwrap();
        assert_eq!(heavy.weight, 2);
    }

    #[test]
    fn no_matching_incidents_gives_empty_graph() {
        let table = IncidentTable::new(vec![incident("Afghanistan", "Police")]);

        let graph = NetworkBuilder::build(
            &table,
            &Selection::new("South Asia", 4),
            &LayoutSettings::default(),
        );

        assert!(graph.nodes.is_empty());
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn same_label_on_both_sides_stays_bipartite() {
        let table = IncidentTable::new(vec![incident("Unknown", "Unknown")]);

        let graph = NetworkBuilder::build(
            &table,
            &Selection::new("South Asia", 3),
            &LayoutSettings::default(),
        );

        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.edges.len(), 1);
    }

    #[test]
    fn layout_is_bounded_and_deterministic() {
        let edges: Vec<NetworkEdge> = (1..6)
            .map(|target| NetworkEdge {
                source: 0,
                target,
                weight: target as u32,
            })
            .collect();
        let settings = LayoutSettings::default();

        let first = NetworkBuilder::spring_layout(6, &edges, &settings);
        let second = NetworkBuilder::spring_layout(6, &edges, &settings);

        assert_eq!(first, second);
        for p in &first {
            assert!(p[0].is_finite() && p[1].is_finite());
            assert!(p[0].abs() <= 1.0 + 1e-9 && p[1].abs() <= 1.0 + 1e-9);
        }
    }

    #[test]
    fn degenerate_layouts() {
        let settings = LayoutSettings::default();
        assert!(NetworkBuilder::spring_layout(0, &[], &settings).is_empty());
        assert_eq!(
            NetworkBuilder::spring_layout(1, &[], &settings),
            vec![[0.0, 0.0]]
        );
    }
}
