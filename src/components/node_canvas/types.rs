use serde::{Deserialize, Serialize};

/// Node ids are monotonic and derived from creation time.
pub type NodeId = u64;

/// Payload fields owned by other collaborators. Carried through untouched.
pub type Extra = serde_json::Map<String, serde_json::Value>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
	Text,
	Image,
	Video,
	Audio,
}

impl NodeKind {
	pub const ALL: [NodeKind; 4] = [Self::Text, Self::Image, Self::Video, Self::Audio];

	pub fn label(self) -> &'static str {
		match self {
			Self::Text => "Text",
			Self::Image => "Image",
			Self::Video => "Video",
			Self::Audio => "Audio",
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextNodeData {
	pub content: String,
	pub prompt: String,
	pub role_prompt: Option<String>,
	pub model: Option<String>,
	/// Explicit content height; text nodes grow with what they hold.
	pub height: f64,
	pub generating: bool,
	pub error: Option<String>,
	#[serde(flatten)]
	pub extra: Extra,
}

impl Default for TextNodeData {
	fn default() -> Self {
		Self {
			content: String::new(),
			prompt: String::new(),
			role_prompt: None,
			model: None,
			height: 220.0,
			generating: false,
			error: None,
			extra: Extra::new(),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageNodeData {
	pub prompt: String,
	pub model: Option<String>,
	/// Output size preset requested from the generator.
	pub ratio: Option<String>,
	pub aspect_ratio: String,
	pub url: Option<String>,
	pub reference_image: Option<String>,
	pub generating: bool,
	pub error: Option<String>,
	#[serde(flatten)]
	pub extra: Extra,
}

impl Default for ImageNodeData {
	fn default() -> Self {
		Self {
			prompt: String::new(),
			model: None,
			ratio: None,
			aspect_ratio: "1:1".into(),
			url: None,
			reference_image: None,
			generating: false,
			error: None,
			extra: Extra::new(),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VideoNodeData {
	pub prompt: String,
	pub model: Option<String>,
	pub ratio: Option<String>,
	pub aspect_ratio: String,
	pub duration_secs: Option<f64>,
	pub url: Option<String>,
	pub reference_image: Option<String>,
	pub generating: bool,
	pub error: Option<String>,
	#[serde(flatten)]
	pub extra: Extra,
}

impl Default for VideoNodeData {
	fn default() -> Self {
		Self {
			prompt: String::new(),
			model: None,
			ratio: None,
			aspect_ratio: "16:9".into(),
			duration_secs: None,
			url: None,
			reference_image: None,
			generating: false,
			error: None,
			extra: Extra::new(),
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AudioNodeData {
	pub prompt: String,
	pub model: Option<String>,
	pub url: Option<String>,
	pub generating: bool,
	pub error: Option<String>,
	#[serde(flatten)]
	pub extra: Extra,
}

/// Per-kind payload. Serialized next to the node as `{"type": .., "data": {..}}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum NodeData {
	Text(TextNodeData),
	Image(ImageNodeData),
	Video(VideoNodeData),
	Audio(AudioNodeData),
}

impl NodeData {
	pub fn new(kind: NodeKind) -> Self {
		match kind {
			NodeKind::Text => Self::Text(TextNodeData::default()),
			NodeKind::Image => Self::Image(ImageNodeData::default()),
			NodeKind::Video => Self::Video(VideoNodeData::default()),
			NodeKind::Audio => Self::Audio(AudioNodeData::default()),
		}
	}

	pub fn kind(&self) -> NodeKind {
		match self {
			Self::Text(_) => NodeKind::Text,
			Self::Image(_) => NodeKind::Image,
			Self::Video(_) => NodeKind::Video,
			Self::Audio(_) => NodeKind::Audio,
		}
	}

	pub fn prompt(&self) -> &str {
		match self {
			Self::Text(d) => &d.prompt,
			Self::Image(d) => &d.prompt,
			Self::Video(d) => &d.prompt,
			Self::Audio(d) => &d.prompt,
		}
	}

	pub fn model(&self) -> Option<&str> {
		match self {
			Self::Text(d) => d.model.as_deref(),
			Self::Image(d) => d.model.as_deref(),
			Self::Video(d) => d.model.as_deref(),
			Self::Audio(d) => d.model.as_deref(),
		}
	}

	pub fn aspect_ratio(&self) -> Option<&str> {
		match self {
			Self::Image(d) => Some(&d.aspect_ratio),
			Self::Video(d) => Some(&d.aspect_ratio),
			Self::Text(_) | Self::Audio(_) => None,
		}
	}

	pub fn reference_image(&self) -> Option<&str> {
		match self {
			Self::Image(d) => d.reference_image.as_deref(),
			Self::Video(d) => d.reference_image.as_deref(),
			Self::Text(_) | Self::Audio(_) => None,
		}
	}

	pub fn is_generating(&self) -> bool {
		match self {
			Self::Text(d) => d.generating,
			Self::Image(d) => d.generating,
			Self::Video(d) => d.generating,
			Self::Audio(d) => d.generating,
		}
	}

	pub fn set_generating(&mut self, generating: bool) {
		match self {
			Self::Text(d) => d.generating = generating,
			Self::Image(d) => d.generating = generating,
			Self::Video(d) => d.generating = generating,
			Self::Audio(d) => d.generating = generating,
		}
	}

	/// Short human-readable summary drawn on the node body.
	pub fn summary(&self) -> &str {
		match self {
			Self::Text(d) if !d.content.is_empty() => &d.content,
			Self::Image(ImageNodeData { url: Some(url), .. })
			| Self::Video(VideoNodeData { url: Some(url), .. })
			| Self::Audio(AudioNodeData { url: Some(url), .. }) => url,
			other => other.prompt(),
		}
	}

	/// A fresh sibling payload: same prompt and settings, no result yet, marked generating.
	pub fn sibling(&self, reference_image: Option<&str>) -> Self {
		let reference = |own: &Option<String>| reference_image.map(str::to_owned).or_else(|| own.clone());
		match self {
			Self::Text(d) => Self::Text(TextNodeData {
				content: String::new(),
				prompt: d.prompt.clone(),
				role_prompt: d.role_prompt.clone(),
				model: d.model.clone(),
				height: d.height,
				generating: true,
				error: None,
				extra: d.extra.clone(),
			}),
			Self::Image(d) => Self::Image(ImageNodeData {
				prompt: d.prompt.clone(),
				model: d.model.clone(),
				ratio: d.ratio.clone(),
				aspect_ratio: d.aspect_ratio.clone(),
				url: None,
				reference_image: reference(&d.reference_image),
				generating: true,
				error: None,
				extra: d.extra.clone(),
			}),
			Self::Video(d) => Self::Video(VideoNodeData {
				prompt: d.prompt.clone(),
				model: d.model.clone(),
				ratio: d.ratio.clone(),
				aspect_ratio: d.aspect_ratio.clone(),
				duration_secs: d.duration_secs,
				url: None,
				reference_image: reference(&d.reference_image),
				generating: true,
				error: None,
				extra: d.extra.clone(),
			}),
			Self::Audio(d) => Self::Audio(AudioNodeData {
				prompt: d.prompt.clone(),
				model: d.model.clone(),
				url: None,
				generating: true,
				error: None,
				extra: d.extra.clone(),
			}),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
	pub id: NodeId,
	/// Top-left corner in canvas space.
	pub x: f64,
	pub y: f64,
	#[serde(flatten)]
	pub data: NodeData,
}

impl Node {
	pub fn new(id: NodeId, x: f64, y: f64, data: NodeData) -> Self {
		Self { id, x, y, data }
	}

	pub fn kind(&self) -> NodeKind {
		self.data.kind()
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
	pub id: String,
	pub source: NodeId,
	pub target: NodeId,
}

/// Partial update merged into a node's data. Fields that do not apply to the
/// node's kind are ignored.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodePatch {
	pub content: Option<String>,
	pub prompt: Option<String>,
	pub role_prompt: Option<String>,
	pub model: Option<String>,
	pub ratio: Option<String>,
	pub aspect_ratio: Option<String>,
	pub height: Option<f64>,
	pub url: Option<String>,
	pub reference_image: Option<String>,
	pub generating: Option<bool>,
	pub error: Option<String>,
}

impl NodePatch {
	pub fn apply(&self, data: &mut NodeData) {
		fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
			if let Some(v) = value {
				*slot = v.clone();
			}
		}
		fn set_opt<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
			if value.is_some() {
				slot.clone_from(value);
			}
		}

		match data {
			NodeData::Text(d) => {
				set(&mut d.content, &self.content);
				set(&mut d.prompt, &self.prompt);
				set_opt(&mut d.role_prompt, &self.role_prompt);
				set_opt(&mut d.model, &self.model);
				set(&mut d.height, &self.height);
				set_opt(&mut d.error, &self.error);
			}
			NodeData::Image(d) => {
				set(&mut d.prompt, &self.prompt);
				set_opt(&mut d.model, &self.model);
				set_opt(&mut d.ratio, &self.ratio);
				set(&mut d.aspect_ratio, &self.aspect_ratio);
				set_opt(&mut d.url, &self.url);
				set_opt(&mut d.reference_image, &self.reference_image);
				set_opt(&mut d.error, &self.error);
			}
			NodeData::Video(d) => {
				set(&mut d.prompt, &self.prompt);
				set_opt(&mut d.model, &self.model);
				set_opt(&mut d.ratio, &self.ratio);
				set(&mut d.aspect_ratio, &self.aspect_ratio);
				set_opt(&mut d.url, &self.url);
				set_opt(&mut d.reference_image, &self.reference_image);
				set_opt(&mut d.error, &self.error);
			}
			NodeData::Audio(d) => {
				set(&mut d.prompt, &self.prompt);
				set_opt(&mut d.model, &self.model);
				set_opt(&mut d.url, &self.url);
				set_opt(&mut d.error, &self.error);
			}
		}
		if let Some(generating) = self.generating {
			data.set_generating(generating);
		}
	}
}

/// What the generation collaborator receives for one node.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationRequest {
	pub node_id: NodeId,
	pub kind: NodeKind,
	pub prompt: String,
	pub model: Option<String>,
	pub aspect_ratio: Option<String>,
	pub reference_image: Option<String>,
}

impl GenerationRequest {
	pub fn for_node(node: &Node) -> Self {
		Self {
			node_id: node.id,
			kind: node.kind(),
			prompt: node.data.prompt().to_owned(),
			model: node.data.model().map(str::to_owned),
			aspect_ratio: node.data.aspect_ratio().map(str::to_owned),
			reference_image: node.data.reference_image().map(str::to_owned),
		}
	}
}

/// Persisted graph layout: `{ nodes: [..], edges: [..] }`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
	pub nodes: Vec<Node>,
	pub edges: Vec<Edge>,
}
