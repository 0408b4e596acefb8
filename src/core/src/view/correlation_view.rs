use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use super::view_state::ViewState;
use crate::aggregation::{Correlation, Correlator, TagBucketing};
use crate::error_handling::types::{QueryError, ViewError};
use crate::filter_state::{decode, FilterState, TagMatch};
use crate::flow::{Flow, Service};
use crate::flow_store::FlowStore;
use crate::interaction::{ChartCallbacks, ChartRenderer, InteractionMapper};
use crate::navigation::{Location, Navigator, Router, CORRELATION_PATH};
use crate::query_trigger::{Dispatch, QueryTrigger, Ticket, DEFAULT_DEBOUNCE};

/// Tunables of a correlation view, usually taken from the configuration.
#[derive(Debug, Clone)]
pub struct ViewSettings {
    pub debounce: Duration,
    pub tag_match: TagMatch,
    pub bucketing: TagBucketing,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            tag_match: TagMatch::default(),
            bucketing: TagBucketing::default(),
        }
    }
}

/// What the view currently shows, published after every change.
#[derive(Debug, Clone)]
pub struct ViewSnapshot {
    pub state: ViewState,
    pub filter: FilterState,
    pub flows: Arc<Vec<Flow>>,
    pub correlation: Arc<Correlation>,
    pub available_tags: Vec<String>,
    /// Ticket of the response the flows come from.
    pub applied: Option<Ticket>,
}

impl ViewSnapshot {
    fn initial() -> Self {
        let filter = FilterState::default();
        Self {
            state: ViewState::Idle,
            correlation: Arc::new(Correlation::empty(filter.mode())),
            filter,
            flows: Arc::new(Vec::new()),
            available_tags: Vec::new(),
            applied: None,
        }
    }
}

type Completion = (Ticket, Result<Vec<Flow>, QueryError>);

/// Per-mount state, owned by the view task.
struct Mounted {
    filter: FilterState,
    trigger: QueryTrigger,
    correlator: Correlator,
    mapper: InteractionMapper,
    services: Vec<Service>,
    flows: Arc<Vec<Flow>>,
    correlation: Arc<Correlation>,
    state: ViewState,
    available_tags: Vec<String>,
    applied: Option<Ticket>,
    in_flight: Option<JoinHandle<()>>,
    done_tx: mpsc::UnboundedSender<Completion>,
    callbacks: ChartCallbacks,
}

/// A correlation chart mounted on a route.
///
/// Locations arrive on a `watch` channel and navigation goes through any
/// [`Navigator`]; [`CorrelationView::on_router`] wires both to a [`Router`].
///
/// [`CorrelationView::run`] follows the location for as long as it
/// stays on the view path and returns once the location leaves it (for
/// example after a point selection navigated to a flow).
pub struct CorrelationView {
    store: Arc<dyn FlowStore>,
    navigator: Arc<dyn Navigator>,
    locations: watch::Receiver<Location>,
    renderer: Arc<dyn ChartRenderer>,
    services: Vec<Service>,
    settings: ViewSettings,
    view_path: String,
    refresh: Option<watch::Receiver<u64>>,
    snapshot: watch::Sender<ViewSnapshot>,
}

async fn wait_refresh(
    refresh: &mut Option<watch::Receiver<u64>>,
) -> Result<(), watch::error::RecvError> {
    match refresh {
        Some(rx) => rx.changed().await,
        None => std::future::pending().await,
    }
}

impl CorrelationView {
    pub fn new(
        store: Arc<dyn FlowStore>,
        navigator: Arc<dyn Navigator>,
        locations: watch::Receiver<Location>,
        renderer: Arc<dyn ChartRenderer>,
        settings: ViewSettings,
    ) -> Self {
        let (snapshot, _) = watch::channel(ViewSnapshot::initial());
        Self {
            store,
            navigator,
            locations,
            renderer,
            services: Vec::new(),
            settings,
            view_path: CORRELATION_PATH.to_string(),
            refresh: None,
            snapshot,
        }
    }

    /// A view navigating through `router` and following its location.
    pub fn on_router(
        store: Arc<dyn FlowStore>,
        router: Arc<Router>,
        renderer: Arc<dyn ChartRenderer>,
        settings: ViewSettings,
    ) -> Self {
        let locations = router.subscribe();
        Self::new(store, router, locations, renderer, settings)
    }

    /// Services to resolve the service filter against. When none are given
    /// the store is asked on mount.
    pub fn with_services(mut self, services: Vec<Service>) -> Self {
        self.services = services;
        self
    }

    /// Re-queries whenever the marker behind `refresh` changes.
    pub fn with_refresh(mut self, refresh: watch::Receiver<u64>) -> Self {
        self.refresh = Some(refresh);
        self
    }

    pub fn snapshots(&self) -> watch::Receiver<ViewSnapshot> {
        self.snapshot.subscribe()
    }

    async fn resolve_services(&self) -> Vec<Service> {
        if !self.services.is_empty() {
            return self.services.clone();
        }
        match self.store.services().await {
            Ok(services) => services,
            Err(e) => {
                warn!("Could not load services, service filter disabled: {}", e);
                Vec::new()
            }
        }
    }

    fn publish(&self, m: &Mounted) {
        self.snapshot.send_replace(ViewSnapshot {
            state: m.state.clone(),
            filter: m.filter.clone(),
            flows: Arc::clone(&m.flows),
            correlation: Arc::clone(&m.correlation),
            available_tags: m.available_tags.clone(),
            applied: m.applied,
        });
    }

    fn render(&self, m: &Mounted) {
        self.renderer.render(&m.correlation, &m.callbacks);
    }

    fn start(&self, m: &mut Mounted, dispatch: Dispatch) {
        if let Some(handle) = m.in_flight.take() {
            debug!("Aborting superseded query before {}", dispatch.ticket);
            handle.abort();
        }
        let query = dispatch.state.to_query(&m.services, self.settings.tag_match);
        let store = Arc::clone(&self.store);
        let done = m.done_tx.clone();
        let ticket = dispatch.ticket;
        m.in_flight = Some(tokio::spawn(async move {
            let result = store.query(&query).await;
            let _ = done.send((ticket, result));
        }));
        m.state = m.state.on_trigger();
        self.publish(m);
    }

    fn apply(&self, m: &mut Mounted, ticket: Ticket, result: Result<Vec<Flow>, QueryError>) {
        if !m.trigger.is_current(ticket) {
            debug!("Discarding stale response {}", ticket);
            return;
        }
        m.in_flight = None;
        match result {
            Ok(flows) => {
                info!("Query {} returned {} flow(s)", ticket, flows.len());
                m.flows = Arc::new(flows);
                m.correlation = Arc::new(m.correlator.correlate(&m.flows, m.filter.mode()));
                m.state = m.state.on_response();
                m.applied = Some(ticket);
                self.render(m);
            }
            Err(e) => {
                error!("Query {} failed: {}", ticket, e);
                m.state = m.state.on_failure(e.to_string());
            }
        }
        self.publish(m);
    }

    /// Returns false when the location left the view.
    fn on_location(&self, m: &mut Mounted, location: Location) -> bool {
        if location.path != self.view_path {
            info!("Leaving correlation view for {}", location);
            return false;
        }
        let next = decode(&location.query);
        let mode_changed = next.mode() != m.filter.mode();
        m.filter = next.clone();

        if let Some(dispatch) = m.trigger.on_filter(next, Instant::now()) {
            self.start(m, dispatch);
        }
        if mode_changed {
            debug!("Correlation mode is now {}", m.filter.mode());
            m.correlation = Arc::new(m.correlator.correlate(&m.flows, m.filter.mode()));
            self.render(m);
        }
        self.publish(m);
        true
    }

    fn unmount(&self, m: &mut Mounted) {
        if let Some(handle) = m.in_flight.take() {
            handle.abort();
        }
    }

    fn mount_state(
        &self,
        filter: FilterState,
        services: Vec<Service>,
        callbacks: ChartCallbacks,
        done_tx: mpsc::UnboundedSender<Completion>,
    ) -> Mounted {
        Mounted {
            trigger: QueryTrigger::new(filter.clone(), self.settings.debounce),
            correlator: Correlator::new(self.settings.bucketing.clone()),
            mapper: InteractionMapper::new(self.view_path.clone()),
            correlation: Arc::new(Correlation::empty(filter.mode())),
            filter,
            services,
            flows: Arc::new(Vec::new()),
            state: ViewState::Idle,
            available_tags: Vec::new(),
            applied: None,
            in_flight: None,
            done_tx,
            callbacks,
        }
    }

    pub async fn run(mut self) -> Result<(), ViewError> {
        let mut location_rx = self.locations.clone();
        let location = location_rx.borrow_and_update().clone();
        if location.path != self.view_path {
            warn!("Correlation view not mounted: location is {}", location);
            return Ok(());
        }
        info!("Mounting correlation view at {}", location);

        let services = self.resolve_services().await;
        let filter = decode(&location.query);
        let (callbacks, mut events) = ChartCallbacks::channel();
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completion>();
        let mut refresh = self.refresh.take();

        let (tags_tx, mut tags_rx) = oneshot::channel();
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            let _ = tags_tx.send(store.tags().await);
        });
        let mut tags_pending = true;

        let mut m = self.mount_state(filter, services, callbacks, done_tx);
        let first = m.trigger.mount();
        self.start(&mut m, first);

        loop {
            let deadline = m.trigger.deadline();
            tokio::select! {
                changed = location_rx.changed() => {
                    if changed.is_err() {
                        self.unmount(&mut m);
                        return Err(ViewError::RouterClosed);
                    }
                    let location = location_rx.borrow_and_update().clone();
                    if !self.on_location(&mut m, location) {
                        self.unmount(&mut m);
                        return Ok(());
                    }
                }
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if let Some(dispatch) = m.trigger.on_deadline(Instant::now()) {
                        self.start(&mut m, dispatch);
                    }
                }
                Some((ticket, result)) = done_rx.recv() => {
                    self.apply(&mut m, ticket, result);
                }
                Some(event) = events.recv() => {
                    if let Some(request) = m.mapper.map(&event, &m.correlation, &m.filter) {
                        self.navigator.navigate(request);
                    }
                }
                changed = wait_refresh(&mut refresh) => match changed {
                    Ok(()) => {
                        debug!("Refresh signal received");
                        let dispatch = m.trigger.on_refresh();
                        self.start(&mut m, dispatch);
                    }
                    Err(_) => {
                        debug!("Refresh source closed");
                        refresh = None;
                    }
                },
                tags = &mut tags_rx, if tags_pending => {
                    tags_pending = false;
                    match tags {
                        Ok(Ok(tags)) => {
                            debug!("Loaded {} tag(s)", tags.len());
                            m.available_tags = tags;
                            self.publish(&m);
                        }
                        Ok(Err(e)) => error!("Failed to load tag vocabulary: {}", e),
                        Err(_) => error!("Tag vocabulary task dropped"),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter_state::{encode, CorrelationMode, FlowQuery, TimeRange};
    use crate::flow::types::fixtures::flow;
    use crate::navigation::NavigationRequest;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// Answers after 10ms, or 500ms for `slow_text`. A text filter keeps the
    /// flows whose id starts with it.
    struct ScriptedStore {
        flows: Vec<Flow>,
        slow_text: Option<String>,
        fail: AtomicBool,
        queries: Mutex<Vec<FlowQuery>>,
    }

    impl ScriptedStore {
        fn new(flows: Vec<Flow>) -> Self {
            Self {
                flows,
                slow_text: None,
                fail: AtomicBool::new(false),
                queries: Mutex::new(Vec::new()),
            }
        }

        fn slow_on(mut self, text: &str) -> Self {
            self.slow_text = Some(text.to_string());
            self
        }

        fn queries(&self) -> Vec<FlowQuery> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl FlowStore for ScriptedStore {
        async fn query(&self, query: &FlowQuery) -> Result<Vec<Flow>, QueryError> {
            self.queries.lock().unwrap().push(query.clone());
            let latency = if query.text_filter.is_some() && query.text_filter == self.slow_text {
                Duration::from_millis(500)
            } else {
                Duration::from_millis(10)
            };
            tokio::time::sleep(latency).await;
            if self.fail.load(Ordering::SeqCst) {
                return Err(QueryError::Status(503));
            }
            Ok(self
                .flows
                .iter()
                .filter(|f| match query.text_filter {
                    Some(ref t) => f.id.as_str().starts_with(t.as_str()),
                    None => true,
                })
                .cloned()
                .collect())
        }

        async fn tags(&self) -> Result<Vec<String>, QueryError> {
            Ok(vec!["flag-out".to_string()])
        }

        async fn services(&self) -> Result<Vec<Service>, QueryError> {
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    struct RecordingRenderer {
        drawn: Mutex<Vec<Correlation>>,
        callbacks: Mutex<Option<ChartCallbacks>>,
    }

    impl RecordingRenderer {
        fn drawn(&self) -> Vec<Correlation> {
            self.drawn.lock().unwrap().clone()
        }

        fn callbacks(&self) -> ChartCallbacks {
            self.callbacks.lock().unwrap().clone().expect("nothing rendered yet")
        }
    }

    impl ChartRenderer for RecordingRenderer {
        fn render(&self, correlation: &Correlation, callbacks: &ChartCallbacks) {
            self.drawn.lock().unwrap().push(correlation.clone());
            *self.callbacks.lock().unwrap() = Some(callbacks.clone());
        }
    }

    struct Harness {
        router: Arc<Router>,
        renderer: Arc<RecordingRenderer>,
        snapshots: watch::Receiver<ViewSnapshot>,
        handle: JoinHandle<Result<(), ViewError>>,
    }

    fn mount(
        store: Arc<ScriptedStore>,
        query: &str,
        refresh: Option<watch::Receiver<u64>>,
    ) -> Harness {
        let router = Arc::new(Router::new(Location::new(CORRELATION_PATH, query)));
        let renderer = Arc::new(RecordingRenderer::default());
        let mut view = CorrelationView::on_router(
            store,
            Arc::clone(&router),
            renderer.clone(),
            ViewSettings::default(),
        );
        if let Some(refresh) = refresh {
            view = view.with_refresh(refresh);
        }
        let snapshots = view.snapshots();
        let handle = tokio::spawn(view.run());
        Harness {
            router,
            renderer,
            snapshots,
            handle,
        }
    }

    async fn wait_for<F>(snapshots: &mut watch::Receiver<ViewSnapshot>, condition: F) -> ViewSnapshot
    where
        F: FnMut(&ViewSnapshot) -> bool,
    {
        tokio::time::timeout(Duration::from_secs(30), snapshots.wait_for(condition))
            .await
            .expect("condition not reached")
            .expect("view dropped")
            .clone()
    }

    fn displaying(s: &ViewSnapshot) -> bool {
        s.state == ViewState::Displaying
    }

    fn set_filter(router: &Router, state: &FilterState) {
        router.navigate(NavigationRequest {
            path: CORRELATION_PATH.to_string(),
            query: encode(state),
            replace: true,
        });
    }

    fn ids(flows: &[Flow]) -> Vec<&str> {
        flows.iter().map(|f| f.id.as_str()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_mount_queries_and_draws() {
        let store = Arc::new(ScriptedStore::new(vec![flow("a", 1000), flow("b", 2000)]));
        let mut h = mount(store.clone(), "correlation=time", None);

        let snapshot = wait_for(&mut h.snapshots, displaying).await;
        assert_eq!(ids(&snapshot.flows), vec!["a", "b"]);
        assert_eq!(snapshot.correlation.point_count(), 2);
        assert_eq!(store.queries().len(), 1);
        assert_eq!(h.renderer.drawn().len(), 1);

        let snapshot = wait_for(&mut h.snapshots, |s| !s.available_tags.is_empty()).await;
        assert_eq!(snapshot.available_tags, vec!["flag-out".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_issues_one_query() {
        let store = Arc::new(ScriptedStore::new(vec![flow("flag1", 1000)]));
        let mut h = mount(store.clone(), "", None);
        wait_for(&mut h.snapshots, displaying).await;

        let base = FilterState::default();
        for text in ["f", "fl", "fla", "flag"] {
            set_filter(&h.router, &base.clone().with_text(Some(text)));
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;

        let queries = store.queries();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[1].text_filter.as_deref(), Some("flag"));
        assert!(displaying(&h.snapshots.borrow()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_response_is_never_shown() {
        let store = Arc::new(
            ScriptedStore::new(vec![flow("a1", 1000), flow("b1", 2000)]).slow_on("a"),
        );
        let mut h = mount(store.clone(), "", None);
        wait_for(&mut h.snapshots, displaying).await;

        let base = FilterState::default();
        set_filter(&h.router, &base.clone().with_text(Some("a")));
        // "a" is dispatched after the quiet period and takes 500ms.
        tokio::time::sleep(Duration::from_millis(350)).await;
        assert!(h.snapshots.borrow().state.is_loading());
        set_filter(&h.router, &base.with_text(Some("b")));
        tokio::time::sleep(Duration::from_secs(2)).await;

        let snapshot = h.snapshots.borrow().clone();
        assert_eq!(snapshot.state, ViewState::Displaying);
        assert_eq!(ids(&snapshot.flows), vec!["b1"]);
        assert_eq!(store.queries().len(), 3);
        let drawn = h.renderer.drawn();
        assert_eq!(drawn.len(), 2);
        assert_eq!(drawn[1].flow_ids, vec![crate::flow::FlowId::new("b1")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_point_selection_leaves_for_flow() {
        let store = Arc::new(ScriptedStore::new(vec![
            flow("a", 1000),
            flow("b", 2000),
            flow("c", 3000),
        ]));
        let query = "from=0&to=5000&correlation=time";
        let mut h = mount(store, query, None);
        wait_for(&mut h.snapshots, displaying).await;

        h.renderer.callbacks().point_selected(1);
        let result = tokio::time::timeout(Duration::from_secs(5), h.handle)
            .await
            .expect("view did not unmount")
            .unwrap();
        assert!(result.is_ok());

        let expected = Location::new("/flow/b", encode(&decode(query)));
        assert_eq!(h.router.current(), expected);
        assert_eq!(h.router.history_len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_range_selection_is_ignored() {
        let store = Arc::new(ScriptedStore::new(vec![flow("a", 1000)]));
        let mut h = mount(store, "", None);
        wait_for(&mut h.snapshots, displaying).await;

        h.renderer.callbacks().point_selected(7);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(h.router.current().path, CORRELATION_PATH);
        assert!(!h.handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zoom_narrows_time_range() {
        let store = Arc::new(ScriptedStore::new(vec![flow("a", 1000), flow("b", 2500)]));
        let mut h = mount(store.clone(), "", None);
        wait_for(&mut h.snapshots, displaying).await;

        h.renderer.callbacks().zoomed(1000.4, 2999.2);
        let snapshot = wait_for(&mut h.snapshots, |s| {
            s.filter.time_range() == TimeRange::between(1000, 3000) && displaying(s)
        })
        .await;
        assert_eq!(snapshot.applied.map(|t| t.to_string()), Some("#2".to_string()));

        let queries = store.queries();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[1].from_time, Some(1000));
        assert_eq!(queries[1].to_time, Some(3000));
        assert_eq!(h.router.history_len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mode_change_reaggregates_without_query() {
        let store = Arc::new(ScriptedStore::new(vec![flow("a", 1000), flow("b", 2000)]));
        let mut h = mount(store.clone(), "", None);
        wait_for(&mut h.snapshots, displaying).await;

        h.renderer.callbacks().mode_selected(CorrelationMode::Packets);
        let snapshot = wait_for(&mut h.snapshots, |s| {
            s.correlation.mode == CorrelationMode::Packets
        })
        .await;
        assert_eq!(snapshot.state, ViewState::Displaying);
        assert_eq!(store.queries().len(), 1);
        assert_eq!(h.renderer.drawn().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_flows_and_refresh_recovers() {
        let store = Arc::new(ScriptedStore::new(vec![flow("a", 1000), flow("b", 2000)]));
        let (refresh_tx, refresh_rx) = watch::channel(0u64);
        let mut h = mount(store.clone(), "", Some(refresh_rx));
        wait_for(&mut h.snapshots, displaying).await;

        store.fail.store(true, Ordering::SeqCst);
        refresh_tx.send(1).unwrap();
        let snapshot =
            wait_for(&mut h.snapshots, |s| matches!(s.state, ViewState::Error(_))).await;
        assert_eq!(snapshot.flows.len(), 2);
        assert_eq!(snapshot.state, ViewState::Error("Flow store answered with status 503".to_string()));

        store.fail.store(false, Ordering::SeqCst);
        refresh_tx.send(2).unwrap();
        wait_for(&mut h.snapshots, displaying).await;
        assert_eq!(store.queries().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_external_navigation_unmounts() {
        let store = Arc::new(ScriptedStore::new(Vec::new()));
        let mut h = mount(store, "", None);
        wait_for(&mut h.snapshots, displaying).await;

        h.router.navigate(NavigationRequest {
            path: "/flow/x".to_string(),
            query: String::new(),
            replace: false,
        });
        let result = tokio::time::timeout(Duration::from_secs(5), h.handle)
            .await
            .expect("view did not unmount")
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_mounted_off_path() {
        let router = Arc::new(Router::new(Location::new("/flow/a", "")));
        let store = Arc::new(ScriptedStore::new(Vec::new()));
        let view = CorrelationView::on_router(
            store.clone(),
            router,
            Arc::new(RecordingRenderer::default()),
            ViewSettings::default(),
        );
        assert!(view.run().await.is_ok());
        assert!(store.queries().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_completion_is_discarded() {
        let store = Arc::new(ScriptedStore::new(Vec::new()));
        let router = Arc::new(Router::new(Location::new(CORRELATION_PATH, "")));
        let renderer = Arc::new(RecordingRenderer::default());
        let view = CorrelationView::on_router(
            store,
            router,
            renderer.clone(),
            ViewSettings::default(),
        );
        let mut snapshots = view.snapshots();
        let (callbacks, _events) = ChartCallbacks::channel();
        let (done_tx, _done_rx) = mpsc::unbounded_channel();
        let mut m = view.mount_state(FilterState::default(), Vec::new(), callbacks, done_tx);

        let first = m.trigger.mount();
        let stale = first.ticket;
        view.start(&mut m, first);
        let second = m.trigger.on_refresh();
        let current = second.ticket;
        view.start(&mut m, second);

        // superseded answer arriving while the current query is in flight
        view.apply(&mut m, stale, Ok(vec![flow("a1", 1000)]));
        assert!(m.state.is_loading());
        assert!(m.flows.is_empty());
        assert_eq!(m.applied, None);

        view.apply(&mut m, current, Ok(vec![flow("b1", 2000)]));
        // and again after the current one was applied
        view.apply(&mut m, stale, Ok(vec![flow("a1", 1000)]));
        view.apply(&mut m, stale, Err(QueryError::Timeout));

        assert_eq!(ids(&m.flows), vec!["b1"]);
        assert_eq!(m.applied, Some(current));
        assert_eq!(m.state, ViewState::Displaying);
        assert_eq!(renderer.drawn().len(), 1);

        let snapshot = snapshots.borrow_and_update().clone();
        assert_eq!(ids(&snapshot.flows), vec!["b1"]);
        assert_eq!(snapshot.applied, Some(current));
        assert_eq!(snapshot.state, ViewState::Displaying);
    }

    #[derive(Default)]
    struct RecordingNavigator {
        requests: Mutex<Vec<NavigationRequest>>,
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, request: NavigationRequest) {
            self.requests.lock().unwrap().push(request);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_any_navigator_receives_requests() {
        let store = Arc::new(ScriptedStore::new(vec![flow("a", 1000), flow("b", 2000)]));
        let navigator = Arc::new(RecordingNavigator::default());
        let (location_tx, locations) = watch::channel(Location::new(CORRELATION_PATH, ""));
        let renderer = Arc::new(RecordingRenderer::default());
        let view = CorrelationView::new(
            store,
            navigator.clone(),
            locations,
            renderer.clone(),
            ViewSettings::default(),
        );
        let mut snapshots = view.snapshots();
        let handle = tokio::spawn(view.run());
        wait_for(&mut snapshots, displaying).await;

        renderer.callbacks().point_selected(0);
        tokio::time::sleep(Duration::from_millis(10)).await;
        let requests = navigator.requests.lock().unwrap().clone();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path, "/flow/a");
        assert!(requests[0].replace);
        // the navigator did not move the location, so the view stays mounted
        assert!(!handle.is_finished());

        location_tx.send_replace(Location::new("/flow/a", requests[0].query.clone()));
        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("view did not unmount")
            .unwrap();
        assert!(result.is_ok());
    }
}
