use super::transform::Point;
use super::types::NodeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Button {
	Primary,
	Middle,
	Secondary,
	Other,
}

impl Button {
	/// Maps `MouseEvent.button` codes.
	pub fn from_dom(button: i16) -> Self {
		match button {
			0 => Self::Primary,
			1 => Self::Middle,
			2 => Self::Secondary,
			_ => Self::Other,
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
	pub shift: bool,
	pub ctrl: bool,
	pub meta: bool,
	pub alt: bool,
}

impl Modifiers {
	pub fn multi_select(&self) -> bool {
		self.shift || self.ctrl || self.meta
	}
}

/// The single gesture in flight. Created on pointer-down, resolved on pointer-up.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Gesture {
	#[default]
	Idle,
	Panning {
		start: Point,
		initial_offset: Point,
	},
	/// Both corners in screen space.
	RubberBandSelecting {
		start: Point,
		current: Point,
	},
	DraggingNodes {
		start: Point,
		initial_positions: Vec<(NodeId, Point)>,
	},
	/// `pointer` is the live canvas-space end of the preview curve.
	Connecting {
		source: NodeId,
		pointer: Point,
	},
}

impl Gesture {
	pub fn cursor(&self) -> &'static str {
		match self {
			Self::Idle => "default",
			Self::Panning { .. } => "grabbing",
			Self::RubberBandSelecting { .. } | Self::Connecting { .. } => "crosshair",
			Self::DraggingNodes { .. } => "move",
		}
	}
}
