use serde::Deserialize;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
	pub start_x: f64,
	pub start_y: f64,
	/// Rows wrap once the next node would cross `start_x + width_budget`.
	pub width_budget: f64,
	pub column_gap: f64,
	pub row_gap: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			start_x: 100.0,
			start_y: 100.0,
			width_budget: 2400.0,
			column_gap: 80.0,
			row_gap: 100.0,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
	pub columns: usize,
	pub gap: f64,
}

impl Default for SpawnConfig {
	fn default() -> Self {
		Self {
			columns: 3,
			gap: 40.0,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MiniMapConfig {
	pub width: f64,
	pub height: f64,
	/// Distance from the viewport's bottom-right corner.
	pub margin: f64,
	pub padding: f64,
	pub max_scale: f64,
	pub min_content: f64,
	pub hit_tolerance: f64,
	pub animation_ms: f64,
}

impl Default for MiniMapConfig {
	fn default() -> Self {
		Self {
			width: 220.0,
			height: 150.0,
			margin: 16.0,
			padding: 8.0,
			max_scale: 0.2,
			min_content: 400.0,
			hit_tolerance: 4.0,
			animation_ms: 450.0,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
	pub min_scale: f64,
	pub max_scale: f64,
	pub wheel_zoom_step: f64,
	/// Width of the invisible band around edges, in screen pixels.
	pub edge_hit_width: f64,
	pub handle_radius: f64,
	pub delete_button_radius: f64,
	pub layout: LayoutConfig,
	pub spawn: SpawnConfig,
	pub minimap: MiniMapConfig,
}

impl Default for CanvasConfig {
	fn default() -> Self {
		Self {
			min_scale: 0.1,
			max_scale: 5.0,
			wheel_zoom_step: 1.1,
			edge_hit_width: 14.0,
			handle_radius: 8.0,
			delete_button_radius: 10.0,
			layout: LayoutConfig::default(),
			spawn: SpawnConfig::default(),
			minimap: MiniMapConfig::default(),
		}
	}
}

impl CanvasConfig {
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(json)
	}
}
