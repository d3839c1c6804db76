//! Spatial-Index (KD-Tree) über die Bodenebene (X/Z) der Map-Nodes.

use std::collections::HashMap;

use glam::Vec2;
use kiddo::{KdTree, SquaredEuclidean};

use crate::core::Node;

/// Zuschlag auf den Vorfilter-Radius, damit Punkte exakt auf dem Rand
/// trotz f32→f64-Rundung im Kandidatenset landen.
const RADIUS_PADDING: f64 = 1.0;

/// Ergebnis einer Nächster-Nachbar-Abfrage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialMatch {
    /// UID des gefundenen Nodes
    pub node_uid: u64,
    /// Euklidische Distanz in der X/Z-Ebene
    pub distance: f32,
}

/// Read-only Spatial-Index über allen Nodes einer geladenen Welt.
///
/// Nodes mit identischer Bodenposition (z.B. übereinander liegende Brücken)
/// teilen sich einen Baum-Eintrag. Wird einmal pro Weltladung gebaut;
/// Abfragen brauchen kein Lock.
#[derive(Debug, Clone)]
pub struct SpatialNodeIndex {
    tree: KdTree<f64, 2>,
    positions: Vec<Vec2>,
    /// UIDs pro Baum-Eintrag, aufsteigend sortiert
    groups: Vec<Vec<u64>>,
    node_count: usize,
}

impl Default for SpatialNodeIndex {
    fn default() -> Self {
        Self::empty()
    }
}

/// Gruppierungs-Schlüssel einer Bodenposition; `-0.0` zählt als `0.0`.
fn ground_key(p: Vec2) -> (u32, u32) {
    ((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits())
}

impl SpatialNodeIndex {
    /// Erstellt einen leeren Index.
    pub fn empty() -> Self {
        Self {
            tree: (&Vec::<[f64; 2]>::new()).into(),
            positions: Vec::new(),
            groups: Vec::new(),
            node_count: 0,
        }
    }

    /// Baut den Index aus der Node-Tabelle (Position `x`/`z`).
    pub fn from_nodes(nodes: &HashMap<u64, Node>) -> Self {
        let mut node_uids: Vec<u64> = nodes.keys().copied().collect();
        node_uids.sort_unstable();

        let mut slots: HashMap<(u32, u32), usize> = HashMap::new();
        let mut positions: Vec<Vec2> = Vec::new();
        let mut groups: Vec<Vec<u64>> = Vec::new();
        for node in node_uids.iter().filter_map(|uid| nodes.get(uid)) {
            let pos = Vec2::new(node.position.x, node.position.z);
            let slot = *slots.entry(ground_key(pos)).or_insert_with(|| {
                positions.push(pos);
                groups.push(Vec::new());
                positions.len() - 1
            });
            // UIDs kommen sortiert an, die Gruppen bleiben damit sortiert
            groups[slot].push(node.uid);
        }

        let entries: Vec<[f64; 2]> = positions
            .iter()
            .map(|p| [p.x as f64, p.y as f64])
            .collect();
        let node_count = groups.iter().map(Vec::len).sum();

        Self {
            tree: (&entries).into(),
            positions,
            groups,
            node_count,
        }
    }

    /// Anzahl indexierter Nodes.
    pub fn len(&self) -> usize {
        self.node_count
    }

    /// `true` wenn keine Nodes im Index liegen.
    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }

    /// Nächster Node zur Bodenposition `(x, z)`; bei gleicher Position die kleinste UID.
    pub fn nearest(&self, x: f32, z: f32) -> Option<SpatialMatch> {
        if self.is_empty() {
            return None;
        }

        let result = self
            .tree
            .nearest_one::<SquaredEuclidean>(&[x as f64, z as f64]);
        let node_uid = *self.groups.get(result.item as usize)?.first()?;

        Some(SpatialMatch {
            node_uid,
            distance: (result.distance as f32).sqrt(),
        })
    }

    /// Alle Nodes im achsparallelen Rechteck (Ränder inklusive), sortiert nach UID.
    ///
    /// KD-Tree-Abfrage mit dem umschließenden Kreis, danach exakte
    /// Rechteck-Prüfung. Ein invertiertes Rechteck liefert nichts.
    pub fn within(&self, min_x: f32, min_z: f32, max_x: f32, max_z: f32) -> Vec<u64> {
        if self.is_empty() || min_x > max_x || min_z > max_z {
            return Vec::new();
        }

        let center_x = (min_x as f64 + max_x as f64) * 0.5;
        let center_z = (min_z as f64 + max_z as f64) * 0.5;
        let half_w = (max_x as f64 - min_x as f64) * 0.5;
        let half_h = (max_z as f64 - min_z as f64) * 0.5;
        let radius = (half_w * half_w + half_h * half_h).sqrt() + RADIUS_PADDING;

        let mut uids: Vec<u64> = self
            .tree
            .within_unsorted::<SquaredEuclidean>(&[center_x, center_z], radius * radius)
            .into_iter()
            .filter_map(|entry| {
                let index = entry.item as usize;
                let pos = self.positions.get(index)?;
                // Exakte Rechteck-Prüfung nach dem Vorfilter
                if pos.x >= min_x && pos.x <= max_x && pos.y >= min_z && pos.y <= max_z {
                    self.groups.get(index)
                } else {
                    None
                }
            })
            .flatten()
            .copied()
            .collect();
        uids.sort_unstable();
        uids
    }
}
