//! Floating panel positions.
//!
//! The store does not know the viewport size. Positions are clamped when they
//! are read against the current viewport, and a corrected position is written
//! back so a panel stranded by a window resize heals itself.

use std::collections::HashMap;

use leptos::prelude::*;

/// Gap kept between a panel and the viewport edge, in pixels.
pub const PANEL_MARGIN: f64 = 12.0;

/// Vertical distance between a trigger button and a freshly opened panel.
const TRIGGER_GAP: f64 = 48.0;

/// The fixed set of floating panels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PanelId {
	/// Project list and creation form.
	Projects,
	/// Persona list and generation.
	Personas,
	/// Focus group builder and transcripts.
	FocusGroups,
	/// Surveys and their results.
	Surveys,
	/// Insights, usage and health dashboards.
	Analysis,
	/// Knowledge graph view.
	Graph,
}

impl PanelId {
	/// Every panel, in trigger-button order.
	pub const ALL: [PanelId; 6] = [
		PanelId::Projects,
		PanelId::Personas,
		PanelId::FocusGroups,
		PanelId::Surveys,
		PanelId::Analysis,
		PanelId::Graph,
	];

	/// Catalog key of the panel title.
	pub fn title_key(self) -> &'static str {
		match self {
			PanelId::Projects => "panel.projects",
			PanelId::Personas => "panel.personas",
			PanelId::FocusGroups => "panel.focus_groups",
			PanelId::Surveys => "panel.surveys",
			PanelId::Analysis => "panel.analysis",
			PanelId::Graph => "panel.graph",
		}
	}

	/// Where a panel opens before the user ever moves it.
	pub fn default_position(self) -> PanelPosition {
		let slot = PanelId::ALL.iter().position(|p| *p == self).unwrap_or(0) as f64;
		PanelPosition {
			x: 96.0 + slot * 32.0,
			y: 72.0 + slot * 24.0,
		}
	}
}

/// Top-left corner of a panel in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PanelPosition {
	pub x: f64,
	pub y: f64,
}

/// Browser viewport size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	pub width: f64,
	pub height: f64,
}

impl Viewport {
	/// Current window inner size, if a window exists.
	pub fn current() -> Option<Self> {
		let window = web_sys::window()?;
		Some(Self {
			width: window.inner_width().ok()?.as_f64()?,
			height: window.inner_height().ok()?.as_f64()?,
		})
	}
}

/// Rendered size of a panel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanelSize {
	pub width: f64,
	pub height: f64,
}

fn clamp_axis(value: f64, viewport: f64, size: f64) -> f64 {
	let upper = viewport - size - PANEL_MARGIN;
	let value = if value.is_finite() { value } else { PANEL_MARGIN };
	// When the panel does not fit, pin it to the leading margin.
	value.min(upper).max(PANEL_MARGIN)
}

/// Clamp a position so the panel stays inside the viewport with a margin.
pub fn clamp_position(pos: PanelPosition, viewport: Viewport, size: PanelSize) -> PanelPosition {
	PanelPosition {
		x: clamp_axis(pos.x, viewport.width, size.width),
		y: clamp_axis(pos.y, viewport.height, size.height),
	}
}

/// Pointer drag moving a panel.
#[derive(Clone, Copy, Debug, PartialEq)]
struct DragSession {
	panel: PanelId,
	grab_dx: f64,
	grab_dy: f64,
}

/// Positions of every panel and of its trigger button.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PanelLayout {
	panels: HashMap<PanelId, PanelPosition>,
	triggers: HashMap<PanelId, PanelPosition>,
	drag: Option<DragSession>,
}

impl PanelLayout {
	/// Record a panel position as given.
	pub fn set_panel_position(&mut self, panel: PanelId, pos: PanelPosition) {
		self.panels.insert(panel, pos);
	}

	/// Record where a panel's trigger button sits.
	pub fn set_trigger_position(&mut self, panel: PanelId, pos: PanelPosition) {
		self.triggers.insert(panel, pos);
	}

	/// Stored position, unclamped. A panel never placed opens just below its
	/// trigger, or at its default spot when the trigger is unknown.
	pub fn panel_position(&self, panel: PanelId) -> PanelPosition {
		if let Some(pos) = self.panels.get(&panel) {
			return *pos;
		}
		match self.triggers.get(&panel) {
			Some(t) => PanelPosition {
				x: t.x,
				y: t.y + TRIGGER_GAP,
			},
			None => panel.default_position(),
		}
	}

	pub fn trigger_position(&self, panel: PanelId) -> Option<PanelPosition> {
		self.triggers.get(&panel).copied()
	}

	/// Position clamped to the viewport. A stored value that had drifted out of
	/// bounds is replaced by the clamped one.
	pub fn resolve_panel_position(
		&mut self,
		panel: PanelId,
		viewport: Viewport,
		size: PanelSize,
	) -> PanelPosition {
		let stored = self.panel_position(panel);
		let clamped = clamp_position(stored, viewport, size);
		if clamped != stored || !self.panels.contains_key(&panel) {
			self.panels.insert(panel, clamped);
		}
		clamped
	}

	/// Start dragging `panel`; the pointer keeps its offset inside the panel.
	pub fn begin_drag(&mut self, panel: PanelId, pointer_x: f64, pointer_y: f64) {
		let pos = self.panel_position(panel);
		self.drag = Some(DragSession {
			panel,
			grab_dx: pointer_x - pos.x,
			grab_dy: pointer_y - pos.y,
		});
	}

	/// Move the dragged panel under the pointer, clamped to the viewport.
	pub fn drag_to(
		&mut self,
		pointer_x: f64,
		pointer_y: f64,
		viewport: Viewport,
		size: PanelSize,
	) -> Option<PanelPosition> {
		let drag = self.drag?;
		let pos = clamp_position(
			PanelPosition {
				x: pointer_x - drag.grab_dx,
				y: pointer_y - drag.grab_dy,
			},
			viewport,
			size,
		);
		self.panels.insert(drag.panel, pos);
		Some(pos)
	}

	pub fn end_drag(&mut self) {
		self.drag = None;
	}

	/// Panel currently being dragged.
	pub fn dragging(&self) -> Option<PanelId> {
		self.drag.map(|d| d.panel)
	}
}

/// Reactive handle to the shared [`PanelLayout`], passed down via context.
#[derive(Clone, Copy, Debug)]
pub struct PanelStore(pub RwSignal<PanelLayout>);

impl PanelStore {
	/// Create a store and provide it to the current component subtree.
	pub fn provide() -> Self {
		let store = Self(RwSignal::new(PanelLayout::default()));
		provide_context(store);
		store
	}

	/// Store provided by an ancestor.
	pub fn use_store() -> Self {
		expect_context::<PanelStore>()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const VIEWPORT: Viewport = Viewport {
		width: 1280.0,
		height: 800.0,
	};
	const SIZE: PanelSize = PanelSize {
		width: 400.0,
		height: 300.0,
	};

	#[test]
	fn negative_position_clamps_to_margin() {
		let mut layout = PanelLayout::default();
		layout.set_panel_position(PanelId::Personas, PanelPosition { x: -500.0, y: -500.0 });
		let pos = layout.resolve_panel_position(PanelId::Personas, VIEWPORT, SIZE);
		assert!(pos.x >= 12.0);
		assert!(pos.y >= 12.0);
		assert_eq!(pos, PanelPosition { x: 12.0, y: 12.0 });
	}

	#[test]
	fn out_of_bounds_position_heals_in_store() {
		let mut layout = PanelLayout::default();
		layout.set_panel_position(PanelId::Graph, PanelPosition { x: 2000.0, y: 900.0 });
		let pos = layout.resolve_panel_position(PanelId::Graph, VIEWPORT, SIZE);
		assert_eq!(pos, PanelPosition { x: 868.0, y: 488.0 });
		assert_eq!(layout.panel_position(PanelId::Graph), pos);
	}

	#[test]
	fn in_bounds_position_is_untouched() {
		let mut layout = PanelLayout::default();
		let p = PanelPosition { x: 300.0, y: 200.0 };
		layout.set_panel_position(PanelId::Projects, p);
		assert_eq!(layout.resolve_panel_position(PanelId::Projects, VIEWPORT, SIZE), p);
	}

	#[test]
	fn panel_larger_than_viewport_pins_to_margin() {
		let tiny = Viewport {
			width: 300.0,
			height: 200.0,
		};
		let pos = clamp_position(PanelPosition { x: 50.0, y: 50.0 }, tiny, SIZE);
		assert_eq!(pos, PanelPosition { x: 12.0, y: 12.0 });
	}

	#[test]
	fn non_finite_coordinates_recover() {
		let pos = clamp_position(
			PanelPosition {
				x: f64::NAN,
				y: f64::INFINITY,
			},
			VIEWPORT,
			SIZE,
		);
		assert_eq!(pos, PanelPosition { x: 12.0, y: 12.0 });
	}

	#[test]
	fn drag_keeps_grab_offset_and_clamps() {
		let mut layout = PanelLayout::default();
		layout.set_panel_position(PanelId::Surveys, PanelPosition { x: 100.0, y: 100.0 });
		layout.begin_drag(PanelId::Surveys, 110.0, 105.0);
		assert_eq!(layout.dragging(), Some(PanelId::Surveys));

		let pos = layout.drag_to(210.0, 155.0, VIEWPORT, SIZE).unwrap();
		assert_eq!(pos, PanelPosition { x: 200.0, y: 150.0 });

		let pos = layout.drag_to(-1000.0, -1000.0, VIEWPORT, SIZE).unwrap();
		assert_eq!(pos, PanelPosition { x: 12.0, y: 12.0 });

		layout.end_drag();
		assert_eq!(layout.drag_to(500.0, 500.0, VIEWPORT, SIZE), None);
		assert_eq!(layout.panel_position(PanelId::Surveys), pos);
	}

	#[test]
	fn unplaced_panel_opens_near_its_trigger() {
		let mut layout = PanelLayout::default();
		assert_eq!(
			layout.panel_position(PanelId::Analysis),
			PanelId::Analysis.default_position()
		);
		layout.set_trigger_position(PanelId::Analysis, PanelPosition { x: 5.0, y: 6.0 });
		assert_eq!(
			layout.trigger_position(PanelId::Analysis),
			Some(PanelPosition { x: 5.0, y: 6.0 })
		);
		assert_eq!(
			layout.panel_position(PanelId::Analysis),
			PanelPosition { x: 5.0, y: 54.0 }
		);

		layout.set_panel_position(PanelId::Analysis, PanelPosition { x: 400.0, y: 300.0 });
		assert_eq!(
			layout.panel_position(PanelId::Analysis),
			PanelPosition { x: 400.0, y: 300.0 }
		);
	}
}
