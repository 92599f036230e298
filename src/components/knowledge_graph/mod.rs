//! Knowledge graph of personas, concepts and emotions.
//!
//! Data flows in one direction:
//! - [`build_graph`] turns personas and mined insights into nodes and links
//!   with normalized starting positions
//! - [`layout_graph`] prunes links and runs a [`LayoutEngine`] to get 3D
//!   positions
//! - [`KnowledgeGraph`] projects the positioned graph through an orbit camera
//!   and draws it on a canvas, with hover highlights and click selection
//!
//! # Example
//!
//! ```ignore
//! let raw = build_graph(&personas, Some(&insights));
//! let data = layout_graph(&raw, &ForceSimulation::default(), 100, 300);
//!
//! view! { <KnowledgeGraph data=Signal::derive(move || data.clone()) empty_message="No data" /> }
//! ```

mod component;
pub mod layout;
mod render;
pub mod scale;
pub mod scene;
pub mod theme;
pub mod transform;
mod types;

pub use component::KnowledgeGraph;
pub use layout::{
	ForceSimulation, LayoutEngine, LayoutKind, PlanarLayout, layout_graph, prune_links,
};
pub use theme::Theme;
pub use transform::build_graph;
pub use types::{GraphData, GraphLink, GraphNode, LinkKind, NodeCategory, Vec3};
