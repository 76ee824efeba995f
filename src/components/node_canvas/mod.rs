mod animation;
mod batch;
mod component;
pub mod config;
mod controller;
pub mod error;
mod geometry;
mod gesture;
mod graph;
mod layout;
mod minimap;
pub mod persistence;
mod render;
mod state;
mod toolbar;
mod transform;
mod types;

pub use component::NodeCanvas;
pub use config::CanvasConfig;
pub use controller::CanvasController;
pub use toolbar::Toolbar;
pub use types::{
	AudioNodeData, Edge, GenerationRequest, GraphSnapshot, ImageNodeData, Node, NodeData, NodeId,
	NodeKind, NodePatch, TextNodeData,
};
