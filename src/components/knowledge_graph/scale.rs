//! Depth-dependent sizing for the projected scene.
//!
//! Every node is drawn at a perspective scale `k` (1.0 at the focal plane,
//! smaller further away, multiplied by camera zoom). This module decides how
//! each visual property reacts to `k`, so near nodes grow without far nodes
//! vanishing or labels becoming unreadable.
//!
//! All results are screen-space pixels; the renderer draws without a canvas
//! transform.

/// How a visual property scales with perspective.
#[derive(Clone, Debug, PartialEq)]
pub enum ScaleBehavior {
	/// Proportional to `k`.
	World,
	/// Constant pixel size.
	Screen,
	/// Proportional to `k`, clamped to `[min_screen, max_screen]` pixels.
	Clamped { min_screen: f64, max_screen: f64 },
}

impl ScaleBehavior {
	/// Pixel size of a property with world size `base` at scale `k`.
	pub fn screen_size(&self, base: f64, k: f64) -> f64 {
		match self {
			ScaleBehavior::World => base * k,
			ScaleBehavior::Screen => base,
			ScaleBehavior::Clamped {
				min_screen,
				max_screen,
			} => (base * k).clamp(*min_screen, *max_screen),
		}
	}
}

/// Node sizing.
#[derive(Clone, Debug)]
pub struct NodeScaleConfig {
	/// Base node radius in world units.
	pub radius: f64,
	pub radius_behavior: ScaleBehavior,
	/// Extra pixels around the drawn radius that still count as a hit.
	pub hit_slop: f64,
	/// Label font size in pixels at `k = 1`.
	pub label_size: f64,
	pub label_behavior: ScaleBehavior,
}

/// Link sizing.
#[derive(Clone, Debug)]
pub struct LinkScaleConfig {
	/// Line width in pixels for the weakest link.
	pub min_width: f64,
	/// Line width in pixels for the strongest link.
	pub max_width: f64,
	pub width_behavior: ScaleBehavior,
}

/// Hover ring sizing.
#[derive(Clone, Debug)]
pub struct RingScaleConfig {
	/// Stroke width in pixels.
	pub width: f64,
	/// Gap between node edge and ring in pixels.
	pub offset: f64,
}

/// Complete scale configuration for the scene.
#[derive(Clone, Debug)]
pub struct ScaleConfig {
	pub node: NodeScaleConfig,
	pub link: LinkScaleConfig,
	pub ring: RingScaleConfig,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			node: NodeScaleConfig {
				radius: 7.0,
				radius_behavior: ScaleBehavior::Clamped {
					min_screen: 2.5,
					max_screen: 40.0,
				},
				hit_slop: 4.0,
				label_size: 11.0,
				label_behavior: ScaleBehavior::Clamped {
					min_screen: 9.0,
					max_screen: 16.0,
				},
			},
			link: LinkScaleConfig {
				min_width: 0.5,
				max_width: 3.5,
				width_behavior: ScaleBehavior::Clamped {
					min_screen: 0.3,
					max_screen: 6.0,
				},
			},
			ring: RingScaleConfig {
				width: 1.5,
				offset: 3.0,
			},
		}
	}
}

impl ScaleConfig {
	/// Drawn radius in pixels for a node of relative `size` at scale `k`.
	pub fn node_radius(&self, size: f64, k: f64) -> f64 {
		self.node
			.radius_behavior
			.screen_size(self.node.radius * size, k)
	}

	/// Radius in pixels within which a pointer hits the node.
	pub fn hit_radius(&self, size: f64, k: f64) -> f64 {
		self.node_radius(size, k) + self.node.hit_slop
	}

	/// CSS font string for a label at scale `k`.
	pub fn label_font(&self, k: f64) -> String {
		let px = self.node.label_behavior.screen_size(self.node.label_size, k);
		format!("{:.1}px sans-serif", px)
	}

	/// Line width in pixels for a link whose strength is `t` of the maximum.
	pub fn link_width(&self, t: f64, k: f64) -> f64 {
		let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
		let base = self.link.min_width + (self.link.max_width - self.link.min_width) * t;
		self.link.width_behavior.screen_size(base, k)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn behaviors_scale_as_documented() {
		assert_eq!(ScaleBehavior::World.screen_size(4.0, 0.5), 2.0);
		assert_eq!(ScaleBehavior::Screen.screen_size(4.0, 0.5), 4.0);
		let clamped = ScaleBehavior::Clamped {
			min_screen: 3.0,
			max_screen: 6.0,
		};
		assert_eq!(clamped.screen_size(4.0, 0.5), 3.0);
		assert_eq!(clamped.screen_size(4.0, 1.25), 5.0);
		assert_eq!(clamped.screen_size(4.0, 10.0), 6.0);
	}

	#[test]
	fn stronger_links_are_thicker() {
		let config = ScaleConfig::default();
		assert!(config.link_width(1.0, 1.0) > config.link_width(0.2, 1.0));
		assert_eq!(config.link_width(f64::NAN, 1.0), config.link_width(0.0, 1.0));
	}

	#[test]
	fn hit_radius_exceeds_drawn_radius() {
		let config = ScaleConfig::default();
		assert!(config.hit_radius(1.0, 1.0) > config.node_radius(1.0, 1.0));
	}
}
