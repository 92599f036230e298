//! UI components: floating panels, toasts and the knowledge graph.

pub mod dashboard;
pub mod floating_panel;
pub mod focus_groups;
pub mod graph_panel;
pub mod knowledge_graph;
pub mod loadable;
pub mod personas;
pub mod projects;
pub mod surveys;
pub mod toasts;
