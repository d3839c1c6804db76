//! Geteilte Typen für modulübergreifende Verträge.

pub mod options;

pub use options::GeometryOptions;
