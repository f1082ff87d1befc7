//! Synchronous fan-out of progress events.
//!
//! Listeners are called in registration order on the emitting thread, each
//! with the same event. Registration returns a [`ListenerId`] that is the
//! handle for removal, since closures cannot be compared.
//!
//! A listener that panics does not stop delivery: the panic is caught,
//! logged, and the remaining listeners still run.
//!
//! [`PhaseReporter`] turns counted work inside one phase into events on a
//! band of the 0 to 100 scale.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use camino::Utf8PathBuf;
use tc_core::{Phase, ProgressEvent, ProgressReporter};
use tracing::{debug, warn};

/// A progress callback.
pub type ProgressListener = Arc<dyn Fn(&ProgressEvent) + Send + Sync>;

/// Handle returned by [`ProgressEmitter::on_progress`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Ordered set of progress listeners.
///
/// # Examples
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use tc_core::{Phase, ProgressEvent};
/// use tc_pipeline::ProgressEmitter;
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let mut emitter = ProgressEmitter::new();
///
/// let sink = Arc::clone(&seen);
/// let id = emitter.on_progress(move |event| sink.lock().unwrap().push(event.progress));
///
/// emitter.emit(&ProgressEvent::new(Phase::Analysis, 0, "Starting"));
/// assert!(emitter.off_progress(id));
/// emitter.emit(&ProgressEvent::new(Phase::Transformation, 30, "Transforming"));
///
/// assert_eq!(*seen.lock().unwrap(), vec![0]);
/// ```
#[derive(Default)]
pub struct ProgressEmitter {
    listeners: Vec<(ListenerId, ProgressListener)>,
    next_id: u64,
}

impl ProgressEmitter {
    /// Creates an emitter with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a listener and returns its handle.
    pub fn on_progress<F>(&mut self, listener: F) -> ListenerId
    where
        F: Fn(&ProgressEvent) + Send + Sync + 'static,
    {
        self.add_listener(Arc::new(listener))
    }

    /// Appends an already shared listener.
    pub fn add_listener(&mut self, listener: ProgressListener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Removes the listener registered under `id`.
    ///
    /// Returns `false` if no such listener is registered.
    pub fn off_progress(&mut self, id: ListenerId) -> bool {
        match self.listeners.iter().position(|(lid, _)| *lid == id) {
            Some(index) => {
                self.listeners.remove(index);
                true
            }
            None => false,
        }
    }

    /// Delivers `event` to every listener in registration order.
    ///
    /// Returns the number of listeners that panicked.
    pub fn emit(&self, event: &ProgressEvent) -> usize {
        debug!(
            phase = event.phase.label(),
            progress = event.progress,
            listeners = self.listeners.len(),
            "{}",
            event.message
        );

        let mut failures = 0;
        for (id, listener) in &self.listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(event))).is_err() {
                warn!(listener = id.0, phase = event.phase.label(), "Progress listener panicked");
                failures += 1;
            }
        }
        failures
    }

    /// Returns the number of registered listeners.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Returns `true` if no listeners are registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl fmt::Debug for ProgressEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressEmitter")
            .field("listeners", &self.listeners.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

/// Reports counted progress for one phase onto a band of the overall scale.
///
/// The pipeline reserves 30 to 90 for transformation; a transformer that
/// walks N files reports through a reporter over that band and each
/// update lands proportionally inside it. [`start`](ProgressReporter::start)
/// only records the item count, so it adds no event of its own.
///
/// # Examples
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use tc_core::{Phase, ProgressReporter};
/// use tc_pipeline::{PhaseReporter, ProgressEmitter};
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let mut emitter = ProgressEmitter::new();
/// let sink = Arc::clone(&seen);
/// emitter.on_progress(move |event| sink.lock().unwrap().push(event.progress));
///
/// let mut reporter = PhaseReporter::new(&emitter, Phase::Transformation, 30, 90);
/// reporter.start(4);
/// reporter.update(2, None);
/// reporter.complete();
///
/// assert_eq!(*seen.lock().unwrap(), vec![60, 90]);
/// ```
#[derive(Debug)]
pub struct PhaseReporter<'a> {
    emitter: &'a ProgressEmitter,
    phase: Phase,
    low: u8,
    high: u8,
    total: usize,
    message: String,
    failures: usize,
}

impl<'a> PhaseReporter<'a> {
    /// Creates a reporter for `phase` covering `low..=high`.
    ///
    /// Both bounds are clamped to the progress scale and `low` never
    /// exceeds `high`.
    #[must_use]
    pub fn new(emitter: &'a ProgressEmitter, phase: Phase, low: u8, high: u8) -> Self {
        let high = high.min(ProgressEvent::MAX_PROGRESS);
        Self {
            emitter,
            phase,
            low: low.min(high),
            high,
            total: 0,
            message: phase.label().to_owned(),
            failures: 0,
        }
    }

    /// Sets the message used when an update carries none.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Returns the item count given to `start`.
    #[inline]
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Returns how many listener panics the reported events caused.
    #[inline]
    #[must_use]
    pub const fn failures(&self) -> usize {
        self.failures
    }

    /// Reports that item `current` is in progress on `file`.
    pub fn update_file(&mut self, current: usize, file: impl Into<Utf8PathBuf>) {
        let event = self.event(current, &self.message).for_file(file);
        self.report(event);
    }

    /// Position of `current` inside the band. An empty count sits at the top.
    fn percent(&self, current: usize) -> u8 {
        let span = self.high - self.low;
        if self.total == 0 {
            return self.high;
        }
        let current = current.min(self.total);
        let offset = usize::from(span).saturating_mul(current) / self.total;
        self.low + u8::try_from(offset).unwrap_or(span)
    }

    fn event(&self, current: usize, message: &str) -> ProgressEvent {
        ProgressEvent::new(self.phase, self.percent(current), message)
            .with_operation(format!("{}/{}", current.min(self.total), self.total))
    }
}

impl ProgressReporter for PhaseReporter<'_> {
    fn report(&mut self, event: ProgressEvent) {
        self.failures += self.emitter.emit(&event);
    }

    fn start(&mut self, total_items: usize) {
        debug!(phase = self.phase.label(), total_items, "Counting progress");
        self.total = total_items;
    }

    fn update(&mut self, current: usize, message: Option<&str>) {
        let event = self.event(current, message.unwrap_or(&self.message));
        self.report(event);
    }

    fn complete(&mut self) {
        let event = self.event(self.total, &self.message);
        self.report(event);
    }
}
