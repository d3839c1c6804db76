//! Core-Domänentypen: Nodes, Map-Items, Welt-Tabellen, Spatial-Index.

pub mod map_item;
pub mod node;
pub mod spatial;
pub mod world_map;

pub use map_item::{MapItem, Prefab, Road};
pub use node::Node;
pub use spatial::{SpatialMatch, SpatialNodeIndex};
pub use world_map::{WorldMap, WorldSnapshot};
