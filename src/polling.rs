//! Completion detection for persona generation.
//!
//! Generation runs on the server with no completion event. The client refetches
//! the persona list on a fixed interval while it holds no more personas than
//! before generation started, and stops as soon as it does. Progress shown meanwhile is an estimate from elapsed
//! time only.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use leptos::prelude::*;
use log::{error, info, warn};
use wasm_bindgen_futures::spawn_local;

use crate::api::ApiClient;
use crate::models::Persona;

/// Highest percentage shown before completion is observed.
pub const PROGRESS_CAP: f64 = 95.0;

/// What the poller should do after a fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollStep {
	/// Fetch again after the delay.
	Continue(Duration),
	/// Results arrived; no more fetches.
	Stop,
}

/// Decides whether polling goes on, given the size of each fetched result.
///
/// Results up to the baseline (the size known before the work started) count
/// as empty.
#[derive(Clone, Debug, PartialEq)]
pub struct PollGate {
	interval: Duration,
	baseline: usize,
	attempts: u32,
	stopped: bool,
}

impl PollGate {
	pub fn new(interval: Duration) -> Self {
		Self {
			interval,
			baseline: 0,
			attempts: 0,
			stopped: false,
		}
	}

	/// Only results larger than `baseline` stop the gate.
	pub fn with_baseline(mut self, baseline: usize) -> Self {
		self.baseline = baseline;
		self
	}

	/// Feed the length of the latest result set. Once stopped, stays stopped.
	pub fn observe(&mut self, result_len: usize) -> PollStep {
		if self.stopped {
			return PollStep::Stop;
		}
		self.attempts += 1;
		if result_len > self.baseline {
			self.stopped = true;
			PollStep::Stop
		} else {
			PollStep::Continue(self.interval)
		}
	}

	pub fn is_stopped(&self) -> bool {
		self.stopped
	}

	/// Number of results observed while still polling, including the final one.
	pub fn attempts(&self) -> u32 {
		self.attempts
	}
}

/// Rough server time for generating `num_personas` personas.
pub fn expected_generation_time(num_personas: u32) -> Duration {
	Duration::from_secs(10) + Duration::from_secs(3) * num_personas
}

/// Estimated completion percentage, linear in elapsed time and capped at
/// [`PROGRESS_CAP`].
pub fn estimate_progress(elapsed: Duration, expected: Duration) -> f64 {
	if expected.is_zero() {
		return PROGRESS_CAP;
	}
	let ratio = elapsed.as_secs_f64() / expected.as_secs_f64();
	(ratio * 100.0).clamp(0.0, PROGRESS_CAP)
}

/// Progress of one generation request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenerationProgress {
	pub started_ms: f64,
	pub expected: Duration,
	pub completed: bool,
}

impl GenerationProgress {
	pub fn start(num_personas: u32, now_ms: f64) -> Self {
		Self {
			started_ms: now_ms,
			expected: expected_generation_time(num_personas),
			completed: false,
		}
	}

	pub fn complete(&mut self) {
		self.completed = true;
	}

	pub fn percent(&self, now_ms: f64) -> f64 {
		if self.completed {
			return 100.0;
		}
		let elapsed = Duration::from_secs_f64(((now_ms - self.started_ms) / 1000.0).max(0.0));
		estimate_progress(elapsed, self.expected)
	}
}

/// Refetch personas of `project_id` every `interval` until the list holds
/// more than `baseline` entries, then hand it to `on_ready`. The interval is
/// cleared when polling stops or when the owning component is cleaned up.
pub fn poll_personas(
	client: ApiClient,
	project_id: String,
	baseline: usize,
	interval: Duration,
	on_ready: impl Fn(Vec<Persona>) + 'static,
) {
	let gate = Rc::new(RefCell::new(PollGate::new(interval).with_baseline(baseline)));
	let in_flight = Rc::new(Cell::new(false));
	let handle: Rc<Cell<Option<IntervalHandle>>> = Rc::new(Cell::new(None));
	let on_ready = Rc::new(on_ready);

	let tick = {
		let handle = handle.clone();
		move || {
			if in_flight.get() || gate.borrow().is_stopped() {
				return;
			}
			in_flight.set(true);
			let client = client.clone();
			let project_id = project_id.clone();
			let gate = gate.clone();
			let in_flight = in_flight.clone();
			let handle = handle.clone();
			let on_ready = on_ready.clone();
			spawn_local(async move {
				let result = client.list_personas(&project_id).await;
				in_flight.set(false);
				let personas = match result {
					Ok(personas) => personas,
					Err(err) => {
						warn!("focus-lab: persona poll for {project_id} failed: {err}");
						return;
					}
				};
				let step = gate.borrow_mut().observe(personas.len());
				if step == PollStep::Stop {
					info!(
						"focus-lab: personas for {project_id} ready after {} polls",
						gate.borrow().attempts()
					);
					if let Some(h) = handle.take() {
						h.clear();
					}
					on_ready(personas);
				}
			});
		}
	};

	match set_interval_with_handle(tick, interval) {
		Ok(h) => {
			handle.set(Some(h));
			on_cleanup(move || h.clear());
		}
		Err(err) => error!("focus-lab: could not start persona polling: {err:?}"),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn polls_while_empty_then_stops_for_good() {
		let interval = Duration::from_millis(3000);
		let mut gate = PollGate::new(interval);
		let steps: Vec<_> = [0, 0, 0, 10, 0, 10]
			.into_iter()
			.map(|n| gate.observe(n))
			.collect();
		assert_eq!(
			steps,
			vec![
				PollStep::Continue(interval),
				PollStep::Continue(interval),
				PollStep::Continue(interval),
				PollStep::Stop,
				PollStep::Stop,
				PollStep::Stop,
			]
		);
		assert_eq!(gate.attempts(), 4);
		assert!(gate.is_stopped());
	}

	#[test]
	fn first_non_empty_result_stops_immediately() {
		let mut gate = PollGate::new(Duration::from_secs(1));
		assert_eq!(gate.observe(1), PollStep::Stop);
	}

	#[test]
	fn existing_results_do_not_count_as_new() {
		let interval = Duration::from_millis(3000);
		let mut gate = PollGate::new(interval).with_baseline(8);
		assert_eq!(gate.observe(8), PollStep::Continue(interval));
		assert_eq!(gate.observe(3), PollStep::Continue(interval));
		assert_eq!(gate.observe(18), PollStep::Stop);
		assert_eq!(gate.attempts(), 3);
	}

	#[test]
	fn progress_is_monotone_and_capped() {
		let expected = expected_generation_time(10);
		let mut last = -1.0;
		for secs in 0..200 {
			let p = estimate_progress(Duration::from_secs(secs), expected);
			assert!(p >= last);
			assert!(p <= PROGRESS_CAP);
			last = p;
		}
		assert_eq!(last, PROGRESS_CAP);
		assert_eq!(estimate_progress(Duration::ZERO, expected), 0.0);
		assert_eq!(estimate_progress(Duration::from_secs(5), Duration::ZERO), PROGRESS_CAP);
	}

	#[test]
	fn generation_time_grows_with_count() {
		assert_eq!(expected_generation_time(0), Duration::from_secs(10));
		assert_eq!(expected_generation_time(10), Duration::from_secs(40));
	}

	#[test]
	fn progress_reaches_full_only_on_completion() {
		let mut progress = GenerationProgress::start(10, 1_000.0);
		assert_eq!(progress.percent(1_000.0), 0.0);
		assert_eq!(progress.percent(21_000.0), 50.0);
		assert_eq!(progress.percent(1_000_000.0), PROGRESS_CAP);
		assert_eq!(progress.percent(0.0), 0.0);
		progress.complete();
		assert_eq!(progress.percent(1_000.0), 100.0);
	}
}
