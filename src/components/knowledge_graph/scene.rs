//! Scene state: the settled graph, the orbit camera and interaction tracking.
//!
//! The scene never moves nodes. It only projects their layout positions
//! through a perspective camera, tracks hover/selection, and animates
//! highlight intensities.

use std::collections::{HashMap, HashSet};

use log::warn;

use super::scale::ScaleConfig;
use super::types::{GraphData, GraphNode, Vec3};

/// Orbit camera looking at the origin.
#[derive(Clone, Debug)]
pub struct Camera {
	/// Rotation around the vertical axis, radians.
	pub yaw: f64,
	/// Rotation around the horizontal axis, radians, clamped to avoid flipping.
	pub pitch: f64,
	/// Distance from the origin to the eye.
	pub distance: f64,
	/// Zoom factor (1.0 = 100%, clamped to 0.2..5.0).
	pub zoom: f64,
}

impl Default for Camera {
	fn default() -> Self {
		Self {
			yaw: 0.0,
			pitch: 0.25,
			distance: 600.0,
			zoom: 1.0,
		}
	}
}

/// Limit on camera pitch so the view never turns upside down.
const MAX_PITCH: f64 = 1.4;

/// A node position projected to the screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
	pub x: f64,
	pub y: f64,
	/// Perspective scale (1.0 at the focal plane, times zoom).
	pub k: f64,
	/// Distance along the view axis; larger is further away.
	pub depth: f64,
}

impl Camera {
	/// Project a world point to screen coordinates for a canvas of the given
	/// size. Points behind the eye yield `None`.
	pub fn project(&self, p: Vec3, width: f64, height: f64) -> Option<Projected> {
		let (sy, cy) = self.yaw.sin_cos();
		let (sp, cp) = self.pitch.sin_cos();

		// yaw around y, then pitch around x
		let x1 = p.x * cy + p.z * sy;
		let z1 = -p.x * sy + p.z * cy;
		let y2 = p.y * cp - z1 * sp;
		let z2 = p.y * sp + z1 * cp;

		let depth = self.distance - z2;
		if depth <= 1.0 {
			return None;
		}
		let k = self.distance / depth * self.zoom;
		Some(Projected {
			x: width / 2.0 + x1 * k,
			y: height / 2.0 + y2 * k,
			k,
			depth,
		})
	}

	/// Rotate by a pointer delta in pixels.
	pub fn orbit(&mut self, dx: f64, dy: f64) {
		self.yaw += dx * 0.005;
		self.pitch = (self.pitch + dy * 0.005).clamp(-MAX_PITCH, MAX_PITCH);
	}

	/// Multiply zoom by `factor`, keeping it within bounds.
	pub fn zoom_by(&mut self, factor: f64) {
		self.zoom = (self.zoom * factor).clamp(0.2, 5.0);
	}
}

/// Tracks an in-progress orbit drag.
#[derive(Clone, Debug, Default)]
pub struct OrbitDrag {
	pub active: bool,
	pub last_x: f64,
	pub last_y: f64,
	/// Total pointer travel; a press that barely moves counts as a click.
	pub travel: f64,
}

/// Pointer travel in pixels above which a press is a drag, not a click.
pub const CLICK_TOLERANCE: f64 = 4.0;

/// Minimum time (seconds) a highlight must be held before it can fade out.
/// This prevents flashing when the pointer grazes a node.
const MIN_HOLD_TIME: f64 = 0.12;

/// Per-node highlight intensities with exponential fade in and out.
///
/// The hovered node and its neighbours fade toward 1.0; everything else
/// decays toward 0.0 once its hold timer runs out.
#[derive(Clone, Debug, Default)]
pub struct HighlightState {
	hovered: Option<usize>,
	target_set: HashSet<usize>,
	intensity: HashMap<usize, f64>,
	hold_timer: HashMap<usize, f64>,
	cached_max: f64,
}

impl HighlightState {
	/// Currently hovered node index.
	pub fn hovered(&self) -> Option<usize> {
		self.hovered
	}

	/// Update the hovered node and recompute the target highlight set.
	pub fn set_hover(&mut self, node: Option<usize>, neighbors: &[Vec<usize>]) {
		if self.hovered == node {
			return;
		}
		self.hovered = node;
		self.target_set.clear();

		if let Some(idx) = node {
			self.target_set.insert(idx);
			if let Some(adj) = neighbors.get(idx) {
				self.target_set.extend(adj.iter().copied());
			}
			for &i in &self.target_set {
				self.hold_timer.insert(i, MIN_HOLD_TIME);
			}
		}
	}

	/// Advance fades by `dt` seconds.
	pub fn tick(&mut self, dt: f64) {
		const FADE_IN_SPEED: f64 = 6.0;
		const FADE_OUT_SPEED: f64 = 4.0;

		let fade_in = 1.0 - (-FADE_IN_SPEED * dt).exp();
		let fade_out = (-FADE_OUT_SPEED * dt).exp();

		for &idx in &self.target_set {
			let v = self.intensity.entry(idx).or_insert(0.0);
			*v += (1.0 - *v) * fade_in;
		}

		let targets = &self.target_set;
		self.hold_timer.retain(|idx, timer| {
			if targets.contains(idx) {
				true
			} else {
				*timer -= dt;
				*timer > 0.0
			}
		});

		let holds = &self.hold_timer;
		let mut new_max: f64 = 0.0;
		self.intensity.retain(|idx, v| {
			if !targets.contains(idx) && holds.get(idx).copied().unwrap_or(0.0) <= 0.0 {
				*v *= fade_out;
			}
			new_max = new_max.max(*v);
			*v > 0.005
		});
		self.cached_max = new_max;
	}

	/// Smoothed highlight intensity for a node.
	pub fn node_intensity(&self, idx: usize) -> f64 {
		self.intensity.get(&idx).copied().unwrap_or(0.0)
	}

	/// Geometric mean of the endpoint intensities.
	pub fn link_intensity(&self, a: usize, b: usize) -> f64 {
		(self.node_intensity(a) * self.node_intensity(b)).sqrt()
	}

	/// Largest intensity of any node, used to dim everything else.
	pub fn max_intensity(&self) -> f64 {
		self.cached_max
	}
}

/// A link resolved to node indices.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneLink {
	pub source: usize,
	pub target: usize,
	/// Strength relative to the strongest link, in `[0, 1]`.
	pub weight: f64,
	pub link: usize,
}

/// Graph scene combining the settled layout with camera and interaction state.
///
/// Built whenever the graph data changes, then mutated each frame by the
/// animation loop and the pointer handlers.
pub struct SceneState {
	pub graph: GraphData,
	pub links: Vec<SceneLink>,
	pub camera: Camera,
	pub drag: OrbitDrag,
	pub highlight: HighlightState,
	pub selected: Option<usize>,
	pub width: f64,
	pub height: f64,
	/// Slow yaw drift while the user is not interacting.
	pub auto_rotate: bool,
	neighbors: Vec<Vec<usize>>,
}

impl SceneState {
	/// Build a scene for a laid-out graph. A graph with unpositioned nodes is
	/// treated as empty so that partial layouts never reach the screen.
	pub fn new(data: &GraphData, width: f64, height: f64) -> Self {
		let graph = if data.is_positioned() {
			data.clone()
		} else {
			warn!("focus-lab: graph handed to scene before layout, showing nothing");
			GraphData::default()
		};

		let index: HashMap<&str, usize> = graph
			.nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id.as_str(), i))
			.collect();
		let max_strength = graph
			.links
			.iter()
			.map(|l| l.strength)
			.fold(0.0_f64, f64::max)
			.max(f64::EPSILON);

		let mut neighbors = vec![Vec::new(); graph.nodes.len()];
		let mut links = Vec::with_capacity(graph.links.len());
		for (i, link) in graph.links.iter().enumerate() {
			if let (Some(&s), Some(&t)) = (
				index.get(link.source.as_str()),
				index.get(link.target.as_str()),
			) {
				neighbors[s].push(t);
				neighbors[t].push(s);
				links.push(SceneLink {
					source: s,
					target: t,
					weight: (link.strength / max_strength).clamp(0.0, 1.0),
					link: i,
				});
			}
		}

		Self {
			graph,
			links,
			camera: Camera::default(),
			drag: OrbitDrag::default(),
			highlight: HighlightState::default(),
			selected: None,
			width,
			height,
			auto_rotate: true,
			neighbors,
		}
	}

	/// Nothing to draw.
	pub fn is_empty(&self) -> bool {
		self.graph.nodes.is_empty()
	}

	/// Screen projection of node `idx`.
	pub fn project_node(&self, idx: usize) -> Option<Projected> {
		let p = self.graph.nodes.get(idx)?.position?;
		self.camera.project(p, self.width, self.height)
	}

	/// Visible node indices ordered back to front.
	pub fn depth_order(&self) -> Vec<(usize, Projected)> {
		let mut order: Vec<(usize, Projected)> = (0..self.graph.nodes.len())
			.filter_map(|i| self.project_node(i).map(|p| (i, p)))
			.collect();
		order.sort_by(|a, b| b.1.depth.total_cmp(&a.1.depth));
		order
	}

	/// Front-most node under a screen point.
	pub fn node_at_position(&self, sx: f64, sy: f64, config: &ScaleConfig) -> Option<usize> {
		self.depth_order()
			.into_iter()
			.rev()
			.find(|(i, p)| {
				let r = config.hit_radius(self.graph.nodes[*i].size, p.k);
				let (dx, dy) = (p.x - sx, p.y - sy);
				dx * dx + dy * dy <= r * r
			})
			.map(|(i, _)| i)
	}

	pub fn set_hover(&mut self, node: Option<usize>) {
		self.highlight.set_hover(node, &self.neighbors);
	}

	/// Select whatever is under the pointer; empty space clears the selection.
	pub fn click(&mut self, sx: f64, sy: f64, config: &ScaleConfig) -> Option<&GraphNode> {
		self.selected = self.node_at_position(sx, sy, config);
		self.selected.map(|i| &self.graph.nodes[i])
	}

	pub fn begin_drag(&mut self, x: f64, y: f64) {
		self.drag = OrbitDrag {
			active: true,
			last_x: x,
			last_y: y,
			travel: 0.0,
		};
	}

	/// Rotate the camera by the pointer movement since the last event.
	pub fn drag_to(&mut self, x: f64, y: f64) {
		if !self.drag.active {
			return;
		}
		let (dx, dy) = (x - self.drag.last_x, y - self.drag.last_y);
		self.camera.orbit(dx, dy);
		self.drag.travel += (dx * dx + dy * dy).sqrt();
		self.drag.last_x = x;
		self.drag.last_y = y;
	}

	/// Finish a drag. Returns true if the press should count as a click.
	pub fn end_drag(&mut self) -> bool {
		let was_click = self.drag.active && self.drag.travel < CLICK_TOLERANCE;
		self.drag = OrbitDrag::default();
		was_click
	}

	pub fn tick(&mut self, dt: f64) {
		if self.auto_rotate && !self.drag.active && self.highlight.hovered().is_none() {
			self.camera.yaw += dt * 0.08;
		}
		self.highlight.tick(dt);
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::knowledge_graph::types::{GraphLink, LinkKind, NodeCategory};

	fn positioned(id: &str, p: Vec3) -> GraphNode {
		GraphNode {
			id: id.into(),
			label: id.into(),
			category: NodeCategory::Persona,
			size: 1.0,
			sentiment: None,
			initial: (0.5, 0.5),
			position: Some(p),
		}
	}

	fn scene() -> SceneState {
		let graph = GraphData {
			nodes: vec![
				positioned("a", Vec3::new(0.0, 0.0, 0.0)),
				positioned("b", Vec3::new(100.0, 0.0, 0.0)),
				positioned("c", Vec3::new(-100.0, 0.0, 0.0)),
			],
			links: vec![GraphLink {
				source: "a".into(),
				target: "b".into(),
				kind: LinkKind::Agrees,
				strength: 2.0,
			}],
		};
		let mut s = SceneState::new(&graph, 800.0, 600.0);
		s.camera.pitch = 0.0;
		s
	}

	#[test]
	fn origin_projects_to_canvas_center() {
		let s = scene();
		let p = s.project_node(0).unwrap();
		assert!((p.x - 400.0).abs() < 1e-9);
		assert!((p.y - 300.0).abs() < 1e-9);
		assert!((p.k - 1.0).abs() < 1e-9);
	}

	#[test]
	fn nearer_points_project_larger() {
		let cam = Camera {
			pitch: 0.0,
			..Camera::default()
		};
		let near = cam.project(Vec3::new(0.0, 0.0, 200.0), 800.0, 600.0).unwrap();
		let far = cam.project(Vec3::new(0.0, 0.0, -200.0), 800.0, 600.0).unwrap();
		assert!(near.k > far.k);
		assert!(near.depth < far.depth);
		assert!(cam.project(Vec3::new(0.0, 0.0, 1000.0), 800.0, 600.0).is_none());
	}

	#[test]
	fn hit_test_and_click_selects_node() {
		let mut s = scene();
		let config = ScaleConfig::default();
		assert_eq!(s.node_at_position(500.0, 300.0, &config), Some(1));
		assert_eq!(s.node_at_position(10.0, 10.0, &config), None);

		let selected = s.click(400.0, 300.0, &config).map(|n| n.id.clone());
		assert_eq!(selected.as_deref(), Some("a"));
		assert!(s.click(10.0, 10.0, &config).is_none());
		assert_eq!(s.selected, None);
	}

	#[test]
	fn hover_highlights_neighbors_only() {
		let mut s = scene();
		s.set_hover(Some(0));
		for _ in 0..30 {
			s.tick(0.016);
		}
		assert!(s.highlight.node_intensity(0) > 0.9);
		assert!(s.highlight.node_intensity(1) > 0.9);
		assert_eq!(s.highlight.node_intensity(2), 0.0);
		assert!(s.highlight.link_intensity(0, 1) > 0.9);

		s.set_hover(None);
		for _ in 0..200 {
			s.tick(0.016);
		}
		assert_eq!(s.highlight.node_intensity(0), 0.0);
		assert_eq!(s.highlight.max_intensity(), 0.0);
	}

	#[test]
	fn small_drag_counts_as_click() {
		let mut s = scene();
		s.begin_drag(10.0, 10.0);
		s.drag_to(11.0, 11.0);
		assert!(s.end_drag());

		let yaw = s.camera.yaw;
		s.begin_drag(10.0, 10.0);
		s.drag_to(60.0, 10.0);
		assert!(!s.end_drag());
		assert!(s.camera.yaw > yaw);
	}

	#[test]
	fn unpositioned_graph_is_not_rendered() {
		let mut node = positioned("a", Vec3::ZERO);
		node.position = None;
		let s = SceneState::new(
			&GraphData {
				nodes: vec![node],
				links: vec![],
			},
			100.0,
			100.0,
		);
		assert!(s.is_empty());
	}

	#[test]
	fn empty_graph_with_no_links_is_fine() {
		let mut s = SceneState::new(&GraphData::default(), 100.0, 100.0);
		assert!(s.is_empty());
		assert!(s.depth_order().is_empty());
		s.tick(0.016);
		assert!(s.click(50.0, 50.0, &ScaleConfig::default()).is_none());
	}

	#[test]
	fn link_weights_are_relative_to_strongest() {
		let s = scene();
		assert_eq!(s.links.len(), 1);
		assert_eq!(s.links[0].weight, 1.0);
	}

	#[test]
	fn pitch_and_zoom_are_bounded() {
		let mut cam = Camera::default();
		cam.orbit(0.0, 10_000.0);
		assert_eq!(cam.pitch, MAX_PITCH);
		cam.zoom_by(100.0);
		assert_eq!(cam.zoom, 5.0);
	}
}
