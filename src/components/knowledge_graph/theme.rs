//! Visual theming for the knowledge graph.
//!
//! Colors are keyed by node category and link kind; concept and emotion
//! nodes are tinted toward green or red by their sentiment.

use super::types::{LinkKind, NodeCategory};

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Lighten the color by a factor (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		self.lerp(Color::rgba(255, 255, 255, self.a), factor)
	}

	/// Darken the color by a factor (0.0 = unchanged, 1.0 = black)
	pub fn darken(self, factor: f64) -> Self {
		self.lerp(Color::rgba(0, 0, 0, self.a), factor)
	}

	/// Linear interpolation between two colors
	pub fn lerp(self, other: Color, t: f64) -> Self {
		let t = t.clamp(0.0, 1.0);
		let mix = |a: u8, b: u8| (a as f64 * (1.0 - t) + b as f64 * t).round() as u8;
		Self {
			r: mix(self.r, other.r),
			g: mix(self.g, other.g),
			b: mix(self.b, other.b),
			a: self.a * (1.0 - t) + other.a * t,
		}
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {:.3})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Background style configuration.
#[derive(Clone, Debug)]
pub struct BackgroundStyle {
	/// Edge color of the radial gradient
	pub color: Color,
	/// Center color of the radial gradient
	pub color_center: Color,
	/// Vignette intensity (0.0 = none, 1.0 = strong)
	pub vignette: f64,
	/// Color of the empty-state message
	pub text: Color,
}

/// Link colors per relationship kind.
#[derive(Clone, Debug)]
pub struct LinkStyle {
	pub agrees: Color,
	pub disagrees: Color,
	pub mentions: Color,
	pub feels: Color,
	/// Opacity of links touching no highlighted node while something is hovered.
	pub dimmed_alpha: f64,
}

/// Node colors per category and sentiment.
#[derive(Clone, Debug)]
pub struct NodeStyle {
	pub persona: Color,
	pub concept: Color,
	pub emotion: Color,
	pub positive: Color,
	pub negative: Color,
	/// How far sentiment pulls the base color toward positive/negative.
	pub sentiment_tint: f64,
	pub use_gradient: bool,
	pub selected_ring: Color,
}

/// Complete theme configuration.
#[derive(Clone, Debug)]
pub struct Theme {
	pub background: BackgroundStyle,
	pub link: LinkStyle,
	pub node: NodeStyle,
}

impl Theme {
	/// Base color for a category.
	pub fn category_color(&self, category: NodeCategory) -> Color {
		match category {
			NodeCategory::Persona => self.node.persona,
			NodeCategory::Concept => self.node.concept,
			NodeCategory::Emotion => self.node.emotion,
		}
	}

	/// Node fill color: category color tinted by sentiment when present.
	pub fn node_color(&self, category: NodeCategory, sentiment: Option<f64>) -> Color {
		let base = self.category_color(category);
		match sentiment.filter(|s| s.is_finite()) {
			Some(s) if s > 0.0 => base.lerp(self.node.positive, s.min(1.0) * self.node.sentiment_tint),
			Some(s) if s < 0.0 => {
				base.lerp(self.node.negative, (-s).min(1.0) * self.node.sentiment_tint)
			}
			_ => base,
		}
	}

	/// Line color for a relationship kind.
	pub fn link_color(&self, kind: LinkKind) -> Color {
		match kind {
			LinkKind::Agrees => self.link.agrees,
			LinkKind::Disagrees => self.link.disagrees,
			LinkKind::Mentions => self.link.mentions,
			LinkKind::Feels => self.link.feels,
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self {
			background: BackgroundStyle {
				color: Color::rgb(14, 17, 26),
				color_center: Color::rgb(26, 31, 46),
				vignette: 0.25,
				text: Color::rgba(200, 210, 225, 0.7),
			},
			link: LinkStyle {
				agrees: Color::rgba(110, 190, 140, 0.55),
				disagrees: Color::rgba(220, 110, 110, 0.55),
				mentions: Color::rgba(130, 150, 190, 0.45),
				feels: Color::rgba(200, 160, 220, 0.45),
				dimmed_alpha: 0.12,
			},
			node: NodeStyle {
				persona: Color::rgb(94, 129, 172),
				concept: Color::rgb(214, 170, 90),
				emotion: Color::rgb(176, 120, 190),
				positive: Color::rgb(90, 190, 120),
				negative: Color::rgb(220, 90, 90),
				sentiment_tint: 0.6,
				use_gradient: true,
				selected_ring: Color::rgb(255, 255, 255),
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn categories_have_distinct_colors() {
		let theme = Theme::default();
		let colors: Vec<_> = NodeCategory::ALL
			.iter()
			.map(|c| theme.category_color(*c).to_css())
			.collect();
		assert_ne!(colors[0], colors[1]);
		assert_ne!(colors[1], colors[2]);
		assert_ne!(colors[0], colors[2]);
	}

	#[test]
	fn sentiment_tints_toward_polarity() {
		let theme = Theme::default();
		let neutral = theme.node_color(NodeCategory::Concept, None);
		let good = theme.node_color(NodeCategory::Concept, Some(1.0));
		let bad = theme.node_color(NodeCategory::Concept, Some(-1.0));
		assert_eq!(neutral, theme.node.concept);
		assert!(good.g > neutral.g);
		assert!(bad.r > neutral.r);
		assert_eq!(theme.node_color(NodeCategory::Concept, Some(f64::NAN)), neutral);
	}

	#[test]
	fn css_output_uses_hex_for_opaque() {
		assert_eq!(Color::rgb(255, 0, 16).to_css(), "#ff0010");
		assert_eq!(Color::rgba(1, 2, 3, 0.5).to_css(), "rgba(1, 2, 3, 0.500)");
	}

	#[test]
	fn lighten_and_darken_reach_extremes() {
		let c = Color::rgb(100, 100, 100);
		assert_eq!(c.lighten(1.0), Color::rgb(255, 255, 255));
		assert_eq!(c.darken(1.0), Color::rgb(0, 0, 0));
		assert_eq!(c.lighten(0.0), c);
	}
}
