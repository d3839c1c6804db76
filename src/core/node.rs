//! Map-Node: orientierter Punkt, an dem Straßen und Prefabs anschließen.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::geometry::OrientedPoint;

/// Node der Spielwelt.
///
/// Die Item-Verweise sind UIDs in die Item-Tabelle der [`super::WorldMap`];
/// ein Verweis auf ein nicht geladenes Item ist kein Fehler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Eindeutige ID
    pub uid: u64,
    /// Weltposition
    pub position: Vec3,
    /// Orientierung (Vorwärtsachse `rotation * -Z`)
    #[serde(default = "identity")]
    pub rotation: Quat,
    /// Item, das in Fahrtrichtung an diesem Node beginnt
    #[serde(default)]
    pub forward_item: Option<u64>,
    /// Item, das an diesem Node endet
    #[serde(default)]
    pub backward_item: Option<u64>,
}

fn identity() -> Quat {
    Quat::IDENTITY
}

impl Node {
    /// Erstellt einen Node ohne Rotation und ohne Item-Verweise.
    pub fn new(uid: u64, position: Vec3) -> Self {
        Self {
            uid,
            position,
            rotation: Quat::IDENTITY,
            forward_item: None,
            backward_item: None,
        }
    }

    /// Builder: setzt die Rotation.
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Builder: setzt die Item-Verweise (rückwärts, vorwärts).
    pub fn with_items(mut self, backward: Option<u64>, forward: Option<u64>) -> Self {
        self.backward_item = backward;
        self.forward_item = forward;
        self
    }

    /// Position und Rotation als orientierter Punkt.
    pub fn oriented(&self) -> OrientedPoint {
        OrientedPoint::new(self.position, self.rotation)
    }

    /// Item-Verweise in Abfragereihenfolge: erst rückwärts, dann vorwärts.
    pub fn item_refs(&self) -> impl Iterator<Item = u64> {
        self.backward_item.into_iter().chain(self.forward_item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_refs_are_backward_first() {
        let node = Node::new(1, Vec3::ZERO).with_items(Some(7), Some(9));
        assert_eq!(node.item_refs().collect::<Vec<_>>(), vec![7, 9]);

        let forward_only = Node::new(2, Vec3::ZERO).with_items(None, Some(9));
        assert_eq!(forward_only.item_refs().collect::<Vec<_>>(), vec![9]);
    }

    #[test]
    fn rotation_defaults_to_identity_in_json() {
        let node: Node =
            serde_json::from_str(r#"{ "uid": 5, "position": [1.0, 2.0, 3.0] }"#).expect("Node erwartet");
        assert_eq!(node.rotation, Quat::IDENTITY);
        assert_eq!(node.forward_item, None);
    }
}
