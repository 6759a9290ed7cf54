//! Interactive force-directed view of a concept hierarchy on a 2D canvas.
//!
//! `GraphEngine` is the browser-independent core; `ForceGraphCanvas` hosts it
//! inside a Leptos view.

mod component;
mod config;
mod error;
mod interaction;
mod model;
mod picking;
mod render;
pub mod scale;
mod scheduler;
mod simulation;
mod state;
mod surface;
mod transform;
mod types;

pub use component::ForceGraphCanvas;
pub use types::{GraphData, GraphLink, GraphNode, NodeId};
