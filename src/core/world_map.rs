//! Geladene Spielwelt: Node- und Item-Tabellen plus Spatial-Index.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::{MapItem, Node, Prefab, Road, SpatialNodeIndex};

/// Serialisierbarer Schnappschuss einer Welt (z.B. aus einem Sektor-Export).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Alle Nodes
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// Alle Items
    #[serde(default)]
    pub items: Vec<MapItem>,
}

/// Node- und Item-Tabellen einer geladenen Welt.
///
/// Der Spatial-Index wird einmal beim Erstellen gebaut und danach nur gelesen.
#[derive(Debug, Clone, Default)]
pub struct WorldMap {
    nodes: HashMap<u64, Node>,
    items: HashMap<u64, MapItem>,
    spatial_index: SpatialNodeIndex,
}

impl WorldMap {
    /// Baut die Tabellen aus einem Schnappschuss. Doppelte UIDs: der letzte gewinnt.
    pub fn from_snapshot(snapshot: WorldSnapshot) -> Self {
        let nodes: HashMap<u64, Node> = snapshot
            .nodes
            .into_iter()
            .map(|node| (node.uid, node))
            .collect();
        let items: HashMap<u64, MapItem> = snapshot
            .items
            .into_iter()
            .map(|item| (item.uid(), item))
            .collect();
        let spatial_index = SpatialNodeIndex::from_nodes(&nodes);

        log::info!(
            "Welt geladen: {} Nodes, {} Items",
            nodes.len(),
            items.len()
        );

        Self {
            nodes,
            items,
            spatial_index,
        }
    }

    /// Parsed einen JSON-Schnappschuss.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let snapshot: WorldSnapshot =
            serde_json::from_str(json).context("Ungültiger Welt-Schnappschuss")?;
        Ok(Self::from_snapshot(snapshot))
    }

    /// Lädt einen JSON-Schnappschuss von der Platte.
    pub fn load_snapshot_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Welt-Datei nicht lesbar: {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("Welt-Datei fehlerhaft: {}", path.display()))
    }

    /// Node per UID.
    pub fn node(&self, uid: u64) -> Option<&Node> {
        self.nodes.get(&uid)
    }

    /// Item per UID; `None` für nicht geladene Items.
    pub fn item(&self, uid: u64) -> Option<&MapItem> {
        self.items.get(&uid)
    }

    /// Straße per UID.
    pub fn road(&self, uid: u64) -> Option<&Road> {
        self.item(uid).and_then(MapItem::as_road)
    }

    /// Prefab per UID.
    pub fn prefab(&self, uid: u64) -> Option<&Prefab> {
        self.item(uid).and_then(MapItem::as_prefab)
    }

    /// Start- und End-Node einer Straße.
    pub fn road_endpoints(&self, road: &Road) -> Option<(&Node, &Node)> {
        Some((self.node(road.start_node)?, self.node(road.end_node)?))
    }

    /// Vorgänger-Straße: das Item, das am Start-Node endet (nicht die Straße selbst).
    pub fn previous_road(&self, road: &Road) -> Option<&Road> {
        let uid = self.node(road.start_node)?.backward_item?;
        if uid == road.uid {
            return None;
        }
        self.road(uid)
    }

    /// Node-UIDs im Rechteck (Bodenebene, Ränder inklusive), sortiert.
    pub fn nodes_within(&self, min_x: f32, min_z: f32, max_x: f32, max_z: f32) -> Vec<u64> {
        self.spatial_index.within(min_x, min_z, max_x, max_z)
    }

    /// Der Spatial-Index.
    pub fn spatial_index(&self) -> &SpatialNodeIndex {
        &self.spatial_index
    }

    /// Anzahl der Nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Anzahl der Items.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}
