pub mod annotation;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod id;
pub mod model;
pub mod patch;
pub mod wire;

pub use error::GraphError;
pub use graph::{DEFAULT_NODE_LABEL, DEFAULT_TEXT_CONTENT, Deleted, GraphModel};
pub use id::ElementId;
pub use model::*;
pub use patch::{EdgePatch, ElementPatch, NodePatch, PropertyPath, StyleField, TextPatch};

// Re-export kurbo so downstream crates share one geometry vocabulary
pub use kurbo;
