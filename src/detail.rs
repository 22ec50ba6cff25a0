//! Landmark detail orchestration
//!
//! Selecting a landmark fans out three background fetches (overview text,
//! history timeline, modern image). Historical images are generated one at a
//! time on request and memoized per event. Workers report over a channel and
//! results are applied only when the UI thread drains it, tagged with the
//! selection epoch they were dispatched under so late answers for a previous
//! landmark are dropped.

use crate::catalog::Landmark;
use crate::content::{self, AttractionDetails, ContentBackend, GeneratedImage, HistoryEvent};
use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelView {
    #[default]
    Overview,
    Timeline,
}

/// Outcome of asking for an event's historical image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoricalRequest {
    /// Already generated; now on display
    Cached,
    /// Generation started in the background
    Dispatched,
    /// Another historical image is still being generated
    Busy,
    NoSelection,
}

enum Fetched {
    Details(AttractionDetails),
    History(Vec<HistoryEvent>),
    ModernImage(Option<GeneratedImage>),
    HistoricalImage { key: String, image: Option<GeneratedImage> },
}

struct Update {
    epoch: u64,
    fetched: Fetched,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Loading {
    pub details: bool,
    pub history: bool,
    pub image: bool,
}

impl Loading {
    fn all() -> Self {
        Self { details: true, history: true, image: true }
    }

    pub fn any(&self) -> bool {
        self.details || self.history || self.image
    }
}

pub struct DetailOrchestrator {
    backend: Arc<dyn ContentBackend>,
    sender: Sender<Update>,
    receiver: Receiver<Update>,
    epoch: u64,

    landmark: Option<Landmark>,
    view: PanelView,
    details: Option<AttractionDetails>,
    history: Vec<HistoryEvent>,
    modern_image: Option<Arc<GeneratedImage>>,
    display_image: Option<Arc<GeneratedImage>>,
    historical_images: HashMap<String, Arc<GeneratedImage>>,
    loading: Loading,
    generating_historical: Option<String>,
}

impl DetailOrchestrator {
    pub fn new(backend: Arc<dyn ContentBackend>) -> Self {
        let (tx, rx) = mpsc::channel();

        Self {
            backend,
            sender: tx,
            receiver: rx,
            epoch: 0,
            landmark: None,
            view: PanelView::Overview,
            details: None,
            history: Vec::new(),
            modern_image: None,
            display_image: None,
            historical_images: HashMap::new(),
            loading: Loading::default(),
            generating_historical: None,
        }
    }

    /// Make `landmark` the selection, discarding everything known about the
    /// previous one, and start the three initial fetches.
    pub fn select(&mut self, landmark: Landmark) {
        self.reset();
        self.landmark = Some(landmark);
        self.loading = Loading::all();

        tracing::info!(landmark = landmark.id, epoch = self.epoch, "landmark selected");

        let name = landmark.name;
        let country = landmark.country;

        self.dispatch(move |backend| {
            Fetched::Details(content::fetch_attraction_details(backend, name, country))
        });
        self.dispatch(move |backend| {
            Fetched::ModernImage(content::generate_attraction_image(backend, name, country))
        });
        self.dispatch(move |backend| {
            Fetched::History(content::fetch_landmark_history(backend, name, country))
        });
    }

    /// Deselect. Anything still in flight is discarded when it lands.
    pub fn close(&mut self) {
        if let Some(l) = self.landmark {
            tracing::debug!(landmark = l.id, "detail panel closed");
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.epoch += 1;
        self.landmark = None;
        self.view = PanelView::Overview;
        self.details = None;
        self.history.clear();
        self.modern_image = None;
        self.display_image = None;
        self.historical_images.clear();
        self.loading = Loading::default();
        self.generating_historical = None;
    }

    fn dispatch<F>(&self, job: F)
    where
        F: FnOnce(&dyn ContentBackend) -> Fetched + Send + 'static,
    {
        let backend = Arc::clone(&self.backend);
        let tx = self.sender.clone();
        let epoch = self.epoch;

        thread::spawn(move || {
            let fetched = job(backend.as_ref());
            // Receiver gone means the orchestrator was dropped; nothing to do
            let _ = tx.send(Update { epoch, fetched });
        });
    }

    /// Show the historical reconstruction for `event`, generating it if needed.
    pub fn visualize_event(&mut self, event: &HistoryEvent) -> HistoricalRequest {
        let Some(landmark) = self.landmark else {
            return HistoricalRequest::NoSelection;
        };

        let key = event.cache_key();
        if let Some(image) = self.historical_images.get(&key) {
            self.display_image = Some(Arc::clone(image));
            return HistoricalRequest::Cached;
        }

        if let Some(pending) = &self.generating_historical {
            tracing::debug!(pending = %pending, requested = %key, "historical image already in flight");
            return HistoricalRequest::Busy;
        }

        self.generating_historical = Some(key.clone());
        let event = event.clone();
        self.dispatch(move |backend| {
            let image = content::generate_historical_image(backend, landmark.name, landmark.country, &event);
            Fetched::HistoricalImage { key, image }
        });
        HistoricalRequest::Dispatched
    }

    pub fn revert_to_modern(&mut self) {
        self.display_image = self.modern_image.clone();
    }

    /// Apply every result that has arrived. Returns how many were applied.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        loop {
            match self.receiver.try_recv() {
                Ok(update) => {
                    if self.apply(update) {
                        applied += 1;
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        applied
    }

    /// Block up to `timeout` until nothing is loading or generating.
    /// Returns whether everything settled in time.
    pub fn wait(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        self.poll();
        while self.is_busy() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            match self.receiver.recv_timeout(remaining) {
                Ok(update) => {
                    self.apply(update);
                }
                Err(RecvTimeoutError::Timeout) => return false,
                Err(RecvTimeoutError::Disconnected) => return false,
            }
        }
        true
    }

    fn apply(&mut self, update: Update) -> bool {
        if update.epoch != self.epoch {
            tracing::debug!(stale = update.epoch, current = self.epoch, "discarding stale fetch result");
            return false;
        }

        match update.fetched {
            Fetched::Details(details) => {
                self.details = Some(details);
                self.loading.details = false;
            }
            Fetched::History(events) => {
                self.history = events;
                self.loading.history = false;
            }
            Fetched::ModernImage(image) => {
                let image = image.map(Arc::new);
                self.modern_image = image.clone();
                self.display_image = image;
                self.loading.image = false;
            }
            Fetched::HistoricalImage { key, image } => {
                if let Some(image) = image {
                    let image = Arc::new(image);
                    self.historical_images.insert(key, Arc::clone(&image));
                    self.display_image = Some(image);
                }
                self.generating_historical = None;
            }
        }
        true
    }

    pub fn landmark(&self) -> Option<&Landmark> {
        self.landmark.as_ref()
    }

    pub fn view(&self) -> PanelView {
        self.view
    }

    pub fn set_view(&mut self, view: PanelView) {
        self.view = view;
    }

    pub fn details(&self) -> Option<&AttractionDetails> {
        self.details.as_ref()
    }

    pub fn history(&self) -> &[HistoryEvent] {
        &self.history
    }

    pub fn modern_image(&self) -> Option<&Arc<GeneratedImage>> {
        self.modern_image.as_ref()
    }

    pub fn display_image(&self) -> Option<&Arc<GeneratedImage>> {
        self.display_image.as_ref()
    }

    /// Whether a historical reconstruction is on display instead of the modern view
    pub fn showing_historical(&self) -> bool {
        match (&self.display_image, &self.modern_image) {
            (Some(d), Some(m)) => !Arc::ptr_eq(d, m),
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    pub fn has_cached(&self, event: &HistoryEvent) -> bool {
        self.historical_images.contains_key(&event.cache_key())
    }

    pub fn loading(&self) -> Loading {
        self.loading
    }

    pub fn generating_historical(&self) -> Option<&str> {
        self.generating_historical.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.loading.any() || self.generating_historical.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Category, Tier};
    use crate::error::BackendError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Condvar, Mutex};

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn landmark(id: &'static str) -> Landmark {
        Landmark {
            id,
            name: id,
            country: "Testland",
            lat: 10.0,
            lng: 20.0,
            category: Category::Cultural,
            tier: Tier::Icon,
        }
    }

    fn image(tag: &str) -> GeneratedImage {
        GeneratedImage { bytes: tag.as_bytes().to_vec(), mime_type: "image/png".into() }
    }

    /// Starts closed; `release` lets every held call through
    #[derive(Default)]
    struct Gate {
        open: Mutex<bool>,
        cv: Condvar,
    }

    impl Gate {
        fn wait(&self) {
            let mut open = self.open.lock().unwrap();
            while !*open {
                open = self.cv.wait(open).unwrap();
            }
        }

        fn release(&self) {
            *self.open.lock().unwrap() = true;
            self.cv.notify_all();
        }
    }

    #[derive(Default)]
    struct Scripted {
        fail_details: bool,
        fail_historical: bool,
        held: Vec<&'static str>,
        gate: Gate,
        finished: AtomicUsize,
        historical_calls: AtomicUsize,
    }

    impl Scripted {
        fn hold(&self, name: &str) {
            if self.held.iter().any(|h| *h == name) {
                self.gate.wait();
            }
        }

        fn done<T>(&self, v: T) -> T {
            self.finished.fetch_add(1, Ordering::SeqCst);
            v
        }
    }

    impl ContentBackend for Scripted {
        fn attraction_details(&self, name: &str, _: &str) -> Result<AttractionDetails, BackendError> {
            self.hold(name);
            if self.fail_details {
                return self.done(Err(BackendError::Transport("simulated outage".into())));
            }
            self.done(Ok(AttractionDetails {
                description: format!("All about {name}"),
                things_to_do: vec!["Walk".into()],
                best_time_to_visit: "Spring".into(),
            }))
        }

        fn landmark_history(&self, name: &str, _: &str) -> Result<Vec<HistoryEvent>, BackendError> {
            self.hold(name);
            self.done(Ok(vec![
                HistoryEvent { year: "100".into(), title: format!("{name} founded"), description: "d".into() },
                HistoryEvent { year: "1900".into(), title: format!("{name} restored"), description: "d".into() },
            ]))
        }

        fn attraction_image(&self, name: &str, _: &str) -> Result<GeneratedImage, BackendError> {
            self.hold(name);
            self.done(Ok(image(&format!("modern-{name}"))))
        }

        fn historical_image(&self, name: &str, _: &str, event: &HistoryEvent) -> Result<GeneratedImage, BackendError> {
            self.historical_calls.fetch_add(1, Ordering::SeqCst);
            self.hold(name);
            if self.fail_historical {
                return self.done(Err(BackendError::Empty));
            }
            self.done(Ok(image(&format!("{name}-{}", event.year))))
        }
    }

    fn orchestrator(backend: Scripted) -> (DetailOrchestrator, Arc<Scripted>) {
        let backend = Arc::new(backend);
        (DetailOrchestrator::new(backend.clone()), backend)
    }

    #[test]
    fn select_fetches_all_three_panels() {
        let (mut orch, _) = orchestrator(Scripted::default());
        orch.select(landmark("Petra"));
        assert!(orch.loading().details && orch.loading().history && orch.loading().image);

        assert!(orch.wait(TIMEOUT));
        assert_eq!(orch.details().unwrap().description, "All about Petra");
        assert_eq!(orch.history().len(), 2);
        assert_eq!(orch.history()[0].year, "100");
        let modern = orch.modern_image().unwrap();
        assert!(Arc::ptr_eq(modern, orch.display_image().unwrap()));
        assert!(!orch.showing_historical());
        assert!(!orch.loading().any());
    }

    #[test]
    fn overview_failure_degrades_only_overview() {
        let (mut orch, _) = orchestrator(Scripted { fail_details: true, ..Default::default() });
        orch.select(landmark("Petra"));
        assert!(orch.wait(TIMEOUT));

        let details = orch.details().unwrap();
        assert_eq!(details.description, content::fallback_details("Petra").description);
        assert_eq!(orch.history()[1].title, "Petra restored");
        assert_eq!(orch.display_image().unwrap().bytes, b"modern-Petra");
    }

    #[test]
    fn late_results_for_previous_selection_are_dropped() {
        let (mut orch, backend) = orchestrator(Scripted { held: vec!["A"], ..Default::default() });
        orch.select(landmark("A"));
        orch.select(landmark("B"));
        assert!(orch.wait(TIMEOUT));
        assert_eq!(orch.details().unwrap().description, "All about B");

        backend.gate.release();
        let deadline = Instant::now() + TIMEOUT;
        while backend.finished.load(Ordering::SeqCst) < 6 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(backend.finished.load(Ordering::SeqCst), 6);
        thread::sleep(Duration::from_millis(20));

        assert_eq!(orch.poll(), 0);
        assert_eq!(orch.landmark().unwrap().id, "B");
        assert_eq!(orch.details().unwrap().description, "All about B");
        assert_eq!(orch.history()[0].title, "B founded");
        assert_eq!(orch.display_image().unwrap().bytes, b"modern-B");
    }

    #[test]
    fn historical_image_for_previous_selection_is_dropped() {
        let (mut orch, plain) = orchestrator(Scripted::default());
        orch.select(landmark("A"));
        assert!(orch.wait(TIMEOUT));
        let a_event = orch.history()[0].clone();

        let held_a = Arc::new(Scripted { held: vec!["A"], ..Default::default() });
        orch.backend = held_a.clone() as Arc<dyn ContentBackend>;
        assert_eq!(orch.visualize_event(&a_event), HistoricalRequest::Dispatched);

        orch.backend = plain.clone() as Arc<dyn ContentBackend>;
        orch.select(landmark("B"));
        assert!(orch.generating_historical().is_none());
        assert!(orch.wait(TIMEOUT));
        let b_event = orch.history()[1].clone();

        let held_b = Arc::new(Scripted { held: vec!["B"], ..Default::default() });
        orch.backend = held_b.clone() as Arc<dyn ContentBackend>;
        assert_eq!(orch.visualize_event(&b_event), HistoricalRequest::Dispatched);

        held_a.gate.release();
        let deadline = Instant::now() + TIMEOUT;
        while held_a.finished.load(Ordering::SeqCst) < 1 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(held_a.finished.load(Ordering::SeqCst), 1);
        thread::sleep(Duration::from_millis(20));

        assert_eq!(orch.poll(), 0);
        assert!(!orch.has_cached(&a_event));
        assert_eq!(orch.generating_historical(), Some(b_event.cache_key().as_str()));
        assert_eq!(orch.display_image().unwrap().bytes, b"modern-B");

        held_b.gate.release();
        assert!(orch.wait(TIMEOUT));
        assert!(orch.has_cached(&b_event));
        assert_eq!(orch.display_image().unwrap().bytes, b"B-1900");
    }

    #[test]
    fn reselect_clears_previous_state() {
        let (mut orch, _) = orchestrator(Scripted::default());
        orch.select(landmark("A"));
        assert!(orch.wait(TIMEOUT));
        let event = orch.history()[0].clone();
        assert_eq!(orch.visualize_event(&event), HistoricalRequest::Dispatched);
        assert!(orch.wait(TIMEOUT));
        orch.set_view(PanelView::Timeline);

        orch.select(landmark("B"));
        assert!(orch.details().is_none());
        assert!(orch.history().is_empty());
        assert!(orch.display_image().is_none());
        assert!(!orch.has_cached(&event));
        assert_eq!(orch.view(), PanelView::Overview);
    }

    #[test]
    fn historical_image_is_memoized() {
        let (mut orch, backend) = orchestrator(Scripted::default());
        orch.select(landmark("Kyoto"));
        assert!(orch.wait(TIMEOUT));
        let event = orch.history()[1].clone();

        assert_eq!(orch.visualize_event(&event), HistoricalRequest::Dispatched);
        assert!(orch.wait(TIMEOUT));
        let first = Arc::clone(orch.display_image().unwrap());
        assert_eq!(first.bytes, b"Kyoto-1900");
        assert!(orch.showing_historical());

        orch.revert_to_modern();
        assert_eq!(orch.visualize_event(&event), HistoricalRequest::Cached);
        assert!(Arc::ptr_eq(orch.display_image().unwrap(), &first));
        assert_eq!(backend.historical_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn second_historical_request_is_rejected_while_pending() {
        let (mut orch, backend) = orchestrator(Scripted::default());
        orch.select(landmark("Rome"));
        assert!(orch.wait(TIMEOUT));
        let events = orch.history().to_vec();

        // Swap in a held backend for the historical phase
        let held = Arc::new(Scripted { held: vec!["Rome"], ..Default::default() });
        orch.backend = held.clone() as Arc<dyn ContentBackend>;

        assert_eq!(orch.visualize_event(&events[0]), HistoricalRequest::Dispatched);
        assert_eq!(orch.generating_historical(), Some(events[0].cache_key().as_str()));
        assert_eq!(orch.visualize_event(&events[1]), HistoricalRequest::Busy);
        assert_eq!(orch.visualize_event(&events[0]), HistoricalRequest::Busy);

        held.gate.release();
        assert!(orch.wait(TIMEOUT));
        assert!(orch.generating_historical().is_none());
        assert_eq!(held.historical_calls.load(Ordering::SeqCst), 1);
        assert_eq!(backend.historical_calls.load(Ordering::SeqCst), 0);

        assert_eq!(orch.visualize_event(&events[1]), HistoricalRequest::Dispatched);
        assert!(orch.wait(TIMEOUT));
        assert_eq!(orch.display_image().unwrap().bytes, b"Rome-1900");
    }

    #[test]
    fn failed_historical_image_keeps_display() {
        let (mut orch, _) = orchestrator(Scripted { fail_historical: true, ..Default::default() });
        orch.select(landmark("Giza"));
        assert!(orch.wait(TIMEOUT));
        let modern = Arc::clone(orch.display_image().unwrap());
        let event = orch.history()[0].clone();

        assert_eq!(orch.visualize_event(&event), HistoricalRequest::Dispatched);
        assert!(orch.wait(TIMEOUT));
        assert!(Arc::ptr_eq(orch.display_image().unwrap(), &modern));
        assert!(orch.generating_historical().is_none());
        assert!(!orch.has_cached(&event));
    }

    #[test]
    fn revert_restores_the_same_modern_image() {
        let (mut orch, _) = orchestrator(Scripted::default());
        orch.select(landmark("Uluru"));
        assert!(orch.wait(TIMEOUT));
        let modern = Arc::clone(orch.modern_image().unwrap());
        let event = orch.history()[0].clone();
        orch.visualize_event(&event);
        assert!(orch.wait(TIMEOUT));
        assert!(!Arc::ptr_eq(orch.display_image().unwrap(), &modern));

        orch.revert_to_modern();
        assert!(Arc::ptr_eq(orch.display_image().unwrap(), &modern));
        assert!(!orch.showing_historical());
    }

    #[test]
    fn revert_without_modern_image_shows_nothing() {
        let (mut orch, _) = orchestrator(Scripted::default());
        orch.select(landmark("Uluru"));
        assert!(orch.wait(TIMEOUT));
        orch.modern_image = None;
        orch.revert_to_modern();
        assert!(orch.display_image().is_none());
    }

    #[test]
    fn visualize_without_selection() {
        let (mut orch, _) = orchestrator(Scripted::default());
        let event = content::fallback_history().remove(0);
        assert_eq!(orch.visualize_event(&event), HistoricalRequest::NoSelection);
    }

    #[test]
    fn close_discards_in_flight_results() {
        let (mut orch, backend) = orchestrator(Scripted { held: vec!["A"], ..Default::default() });
        orch.select(landmark("A"));
        orch.close();
        assert!(orch.landmark().is_none());
        assert!(!orch.is_busy());

        backend.gate.release();
        let deadline = Instant::now() + TIMEOUT;
        while backend.finished.load(Ordering::SeqCst) < 3 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        thread::sleep(Duration::from_millis(20));
        assert_eq!(orch.poll(), 0);
        assert!(orch.details().is_none());
    }
}
