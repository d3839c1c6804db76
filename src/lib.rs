//! ETS2 Map Geometry Library.
//!
//! Liest Road-Look-Templates, Prefab-Registraturen und Prefab-Deskriptoren
//! einer Spielinstallation lazy ein und rekonstruiert daraus Fahrspur- und
//! Prefab-Kurvengeometrie um einen Referenzpunkt.

pub mod cache;
pub mod context;
pub mod core;
pub mod driver;
pub mod error;
pub mod fs;
pub mod geometry;
pub mod ppd;
pub mod shared;
pub mod sii;

pub use cache::{
    CacheEntry, DefinitionFileReader, PrefabDescriptorReader, PrefabModelResolver, TemplateCache,
    TokenResolver,
};
pub use context::WorldContext;
pub use core::{MapItem, Node, Prefab, Road, SpatialMatch, SpatialNodeIndex, WorldMap, WorldSnapshot};
pub use driver::{
    PrefabGeometry, ReconstructionDriver, ReferencePointProvider, RoadGeometry, TickOutput,
    TickStatistics,
};
pub use error::LookupError;
pub use fs::{DirectoryFileSystem, FileSystem, MemoryFileSystem, ZipFileSystem};
pub use geometry::{
    interpolate, BlendPolicy, LaneGeometry, LaneGeometryCalculator, OrientedPoint,
};
pub use ppd::{JsonPrefabDecoder, NavCurve, PrefabDecoder, PrefabDescriptor, PrefabNode};
pub use shared::GeometryOptions;
pub use sii::{AttributeValue, DefinitionFile, DefinitionParser, SiiTextParser, Unit};
