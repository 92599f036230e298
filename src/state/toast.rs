//! Transient notifications.
//!
//! [`ToastQueue`] is plain data keyed by a caller-supplied clock, so expiry
//! can be driven by a timer in the browser and by hand in tests.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use log::debug;
use uuid::Uuid;

/// Auto-dismiss delay used when neither the toast nor the queue picks one.
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(5000);

/// Severity of a toast.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
	Success,
	Error,
	Info,
}

impl ToastKind {
	/// CSS modifier class.
	pub fn class(self) -> &'static str {
		match self {
			ToastKind::Success => "toast--success",
			ToastKind::Error => "toast--error",
			ToastKind::Info => "toast--info",
		}
	}
}

/// How long a toast stays on screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ToastDuration {
	/// Dismissed after the queue's configured delay.
	#[default]
	Standard,
	/// Dismissed automatically after the delay.
	After(Duration),
	/// Stays until the user closes it.
	Infinite,
}

/// Button shown inside a toast.
#[derive(Clone)]
pub struct ToastAction {
	pub label: String,
	pub handler: Arc<dyn Fn() + Send + Sync>,
}

impl ToastAction {
	pub fn new(label: impl Into<String>, handler: impl Fn() + Send + Sync + 'static) -> Self {
		Self {
			label: label.into(),
			handler: Arc::new(handler),
		}
	}

	pub fn run(&self) {
		(self.handler)()
	}
}

impl fmt::Debug for ToastAction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ToastAction")
			.field("label", &self.label)
			.finish_non_exhaustive()
	}
}

impl PartialEq for ToastAction {
	fn eq(&self, other: &Self) -> bool {
		self.label == other.label && Arc::ptr_eq(&self.handler, &other.handler)
	}
}

/// A notification before and after it is queued. The id is assigned by
/// [`ToastQueue::add`].
#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
	pub id: Uuid,
	pub kind: ToastKind,
	pub title: String,
	pub message: Option<String>,
	pub action: Option<ToastAction>,
	pub duration: ToastDuration,
}

impl Toast {
	pub fn new(kind: ToastKind, title: impl Into<String>) -> Self {
		Self {
			id: Uuid::nil(),
			kind,
			title: title.into(),
			message: None,
			action: None,
			duration: ToastDuration::default(),
		}
	}

	pub fn with_message(mut self, message: impl Into<String>) -> Self {
		self.message = Some(message.into());
		self
	}

	pub fn with_action(mut self, action: ToastAction) -> Self {
		self.action = Some(action);
		self
	}

	pub fn with_duration(mut self, duration: ToastDuration) -> Self {
		self.duration = duration;
		self
	}
}

#[derive(Clone, Debug, PartialEq)]
struct Entry {
	toast: Toast,
	deadline_ms: Option<f64>,
}

/// Ordered list of visible toasts, oldest first.
#[derive(Clone, Debug, PartialEq)]
pub struct ToastQueue {
	entries: Vec<Entry>,
	standard_duration: Duration,
}

impl Default for ToastQueue {
	fn default() -> Self {
		Self::with_standard_duration(DEFAULT_TOAST_DURATION)
	}
}

impl ToastQueue {
	/// Empty queue whose [`ToastDuration::Standard`] toasts last `duration`.
	pub fn with_standard_duration(duration: Duration) -> Self {
		Self {
			entries: Vec::new(),
			standard_duration: duration,
		}
	}

	/// Delay before `duration` expires a toast in this queue, if ever.
	pub fn resolve(&self, duration: ToastDuration) -> Option<Duration> {
		match duration {
			ToastDuration::Standard => Some(self.standard_duration),
			ToastDuration::After(d) => Some(d),
			ToastDuration::Infinite => None,
		}
	}

	/// Queue a toast and return its freshly generated id.
	pub fn add(&mut self, mut toast: Toast, now_ms: f64) -> Uuid {
		let id = Uuid::new_v4();
		toast.id = id;
		let deadline_ms = self
			.resolve(toast.duration)
			.map(|d| now_ms + d.as_millis() as f64);
		self.entries.push(Entry { toast, deadline_ms });
		id
	}

	/// Remove a toast. Unknown ids are ignored.
	pub fn remove(&mut self, id: Uuid) -> bool {
		let before = self.entries.len();
		self.entries.retain(|e| e.toast.id != id);
		self.entries.len() != before
	}

	/// Drop every toast whose deadline is at or before `now_ms`.
	pub fn expire(&mut self, now_ms: f64) -> Vec<Uuid> {
		let mut expired = Vec::new();
		self.entries.retain(|e| match e.deadline_ms {
			Some(deadline) if deadline <= now_ms => {
				expired.push(e.toast.id);
				false
			}
			_ => true,
		});
		expired
	}

	pub fn toasts(&self) -> impl Iterator<Item = &Toast> {
		self.entries.iter().map(|e| &e.toast)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

/// Reactive toast queue shared through context.
#[derive(Clone, Copy, Debug)]
pub struct Toaster {
	pub queue: RwSignal<ToastQueue>,
}

impl Toaster {
	/// Toaster whose standard toasts last `standard_duration`.
	pub fn new(standard_duration: Duration) -> Self {
		Self {
			queue: RwSignal::new(ToastQueue::with_standard_duration(standard_duration)),
		}
	}

	/// Create a toaster and provide it to the current component subtree.
	pub fn provide(standard_duration: Duration) -> Self {
		let toaster = Self::new(standard_duration);
		provide_context(toaster);
		toaster
	}

	pub fn use_toaster() -> Self {
		expect_context::<Toaster>()
	}

	/// Show a toast, scheduling its dismissal unless it is infinite.
	pub fn push(&self, toast: Toast) -> Uuid {
		let now = js_sys::Date::now();
		let Some((id, delay)) = self.queue.try_update(|q| {
			let delay = q.resolve(toast.duration);
			(q.add(toast, now), delay)
		}) else {
			return Uuid::nil();
		};

		if let Some(delay) = delay {
			let queue = self.queue;
			let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
			Timeout::new(millis, move || {
				// The app may have been torn down before the timer fires.
				let _ = queue.try_update(|q| q.expire(js_sys::Date::now()));
			})
			.forget();
		}
		debug!("focus-lab: toast {id} queued");
		id
	}

	pub fn dismiss(&self, id: Uuid) {
		let _ = self.queue.try_update(|q| q.remove(id));
	}

	pub fn success(&self, title: impl Into<String>) -> Uuid {
		self.push(Toast::new(ToastKind::Success, title))
	}

	pub fn error(&self, title: impl Into<String>, message: Option<String>) -> Uuid {
		let mut toast = Toast::new(ToastKind::Error, title);
		toast.message = message;
		self.push(toast)
	}

	pub fn info(&self, title: impl Into<String>) -> Uuid {
		self.push(Toast::new(ToastKind::Info, title))
	}
}

impl Default for Toaster {
	fn default() -> Self {
		Self::new(DEFAULT_TOAST_DURATION)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn add_then_remove_leaves_queue_empty() {
		let mut queue = ToastQueue::default();
		let id = queue.add(Toast::new(ToastKind::Success, "saved"), 0.0);
		assert_eq!(queue.len(), 1);
		assert!(queue.remove(id));
		assert!(queue.is_empty());
	}

	#[test]
	fn remove_is_idempotent() {
		let mut queue = ToastQueue::default();
		let id = queue.add(Toast::new(ToastKind::Info, "hi"), 0.0);
		assert!(queue.remove(id));
		assert!(!queue.remove(id));
		assert!(!queue.remove(Uuid::new_v4()));
		assert!(queue.is_empty());
	}

	#[test]
	fn ids_are_unique() {
		let mut queue = ToastQueue::default();
		let a = queue.add(Toast::new(ToastKind::Info, "a"), 0.0);
		let b = queue.add(Toast::new(ToastKind::Info, "a"), 0.0);
		assert_ne!(a, b);
		assert_eq!(queue.toasts().map(|t| t.id).collect::<Vec<_>>(), vec![a, b]);
	}

	#[test]
	fn default_duration_expires_after_five_seconds() {
		let mut queue = ToastQueue::default();
		let id = queue.add(Toast::new(ToastKind::Error, "failed"), 1000.0);
		assert!(queue.expire(5999.0).is_empty());
		assert_eq!(queue.expire(6000.0), vec![id]);
		assert!(queue.is_empty());
	}

	#[test]
	fn standard_toasts_follow_configured_duration() {
		let mut queue = ToastQueue::with_standard_duration(Duration::from_millis(2000));
		let standard = queue.add(Toast::new(ToastKind::Success, "saved"), 0.0);
		let explicit = queue.add(
			Toast::new(ToastKind::Info, "later")
				.with_duration(ToastDuration::After(Duration::from_millis(8000))),
			0.0,
		);
		assert_eq!(queue.resolve(ToastDuration::Standard), Some(Duration::from_millis(2000)));
		assert!(queue.expire(1999.0).is_empty());
		assert_eq!(queue.expire(2000.0), vec![standard]);
		assert_eq!(queue.expire(8000.0), vec![explicit]);
	}

	#[test]
	fn infinite_toasts_never_expire() {
		let mut queue = ToastQueue::default();
		let sticky = queue.add(
			Toast::new(ToastKind::Info, "sticky").with_duration(ToastDuration::Infinite),
			0.0,
		);
		let short = queue.add(
			Toast::new(ToastKind::Info, "short")
				.with_duration(ToastDuration::After(Duration::from_millis(10))),
			0.0,
		);
		assert_eq!(queue.expire(f64::MAX), vec![short]);
		assert_eq!(queue.toasts().map(|t| t.id).collect::<Vec<_>>(), vec![sticky]);
	}

	#[test]
	fn action_equality_is_by_handler_identity() {
		let a = ToastAction::new("retry", || {});
		let b = a.clone();
		let c = ToastAction::new("retry", || {});
		assert_eq!(a, b);
		assert_ne!(a, c);
		assert!(format!("{a:?}").contains("retry"));
	}
}
