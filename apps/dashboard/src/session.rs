use std::sync::Arc;

use analysis::{Canvas, RenderStyle};
use mokart_api_core::{ApiError, SessionApi};
use model::{Session, SessionStats, Surface, TrajectoryPoint};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

/// Identifies the selection a fetch was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    session_id: String,
}

impl Ticket {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// A finished fetch, reported back to the owner of the state.
#[derive(Debug)]
pub enum Fetched {
    Sessions(Result<Vec<Session>, ApiError>),
    Trajectory(Ticket, Result<Vec<TrajectoryPoint>, ApiError>),
    Stats(Ticket, Result<SessionStats, ApiError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Trajectory or stats changed: the whole picture has to be redrawn.
    Redraw,
    /// Something else changed (session list).
    Updated,
    /// The fetch failed; state kept its previous value.
    Failed,
    /// Answer for a selection that is no longer current, dropped.
    Stale,
}

/// Selection state of the analysis page.
#[derive(Debug, Default)]
pub struct AnalysisState {
    sessions: Vec<Session>,
    selected: Option<String>,
    generation: u64,
    trajectory: Vec<TrajectoryPoint>,
    stats: Option<SessionStats>,
    loading: bool,
    stats_pending: bool,
    sessions_pending: bool,
}

impl AnalysisState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn trajectory(&self) -> &[TrajectoryPoint] {
        &self.trajectory
    }

    pub fn stats(&self) -> Option<&SessionStats> {
        self.stats.as_ref()
    }

    /// Only the trajectory fetch drives the loading indicator.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_settled(&self) -> bool {
        !self.loading && !self.stats_pending && !self.sessions_pending
    }

    pub fn begin_sessions_refresh(&mut self) {
        self.sessions_pending = true;
    }

    /// Switch to `session_id`, dropping whatever the previous selection had
    /// loaded. An empty id deselects. Returns the ticket the new fetches must
    /// carry, or `None` when there is nothing to fetch.
    pub fn select(&mut self, session_id: &str) -> Option<Ticket> {
        if self.selected.as_deref() == Some(session_id) {
            return None;
        }
        self.generation += 1;
        self.trajectory.clear();
        self.stats = None;
        if session_id.is_empty() {
            self.selected = None;
            self.loading = false;
            self.stats_pending = false;
            return None;
        }
        self.selected = Some(session_id.to_string());
        self.loading = true;
        self.stats_pending = true;
        Some(Ticket { generation: self.generation, session_id: session_id.to_string() })
    }

    pub fn apply(&mut self, fetched: Fetched) -> Applied {
        match fetched {
            Fetched::Sessions(res) => {
                self.sessions_pending = false;
                match res {
                    Ok(list) => {
                        debug!(count = list.len(), "sessions loaded");
                        self.sessions = list;
                        Applied::Updated
                    }
                    Err(e) => {
                        warn!(error = %e, "failed to load sessions");
                        Applied::Failed
                    }
                }
            }
            Fetched::Trajectory(ticket, res) => {
                if ticket.generation != self.generation {
                    debug!(session = %ticket.session_id, "dropping stale trajectory");
                    return Applied::Stale;
                }
                self.loading = false;
                match res {
                    Ok(points) => {
                        debug!(session = %ticket.session_id, points = points.len(), "trajectory loaded");
                        self.trajectory = points;
                        Applied::Redraw
                    }
                    Err(e) => {
                        warn!(session = %ticket.session_id, error = %e, "failed to load trajectory");
                        Applied::Failed
                    }
                }
            }
            Fetched::Stats(ticket, res) => {
                if ticket.generation != self.generation {
                    debug!(session = %ticket.session_id, "dropping stale stats");
                    return Applied::Stale;
                }
                self.stats_pending = false;
                match res {
                    Ok(stats) => {
                        self.stats = Some(stats);
                        Applied::Redraw
                    }
                    Err(e) => {
                        warn!(session = %ticket.session_id, error = %e, "failed to load stats");
                        Applied::Failed
                    }
                }
            }
        }
    }

    /// Full bounds → projection → draw pass over the current inputs.
    pub fn render<C: Canvas>(&self, canvas: &mut C, surface: &Surface, style: &RenderStyle) -> Result<(), C::Error> {
        analysis::render(canvas, &self.trajectory, self.stats.as_ref(), surface, style)
    }
}

/// Runs the fetches for an [`AnalysisState`] and applies their results.
///
/// Fetches run as tokio tasks and report back over a channel; only the
/// dashboard touches the state.
pub struct Dashboard<A: SessionApi + ?Sized + 'static> {
    api: Arc<A>,
    state: AnalysisState,
    tx: UnboundedSender<Fetched>,
    rx: UnboundedReceiver<Fetched>,
}

impl<A: SessionApi + ?Sized + 'static> Dashboard<A> {
    pub fn new(api: Arc<A>) -> Self {
        let (tx, rx) = unbounded_channel();
        Self { api, state: AnalysisState::new(), tx, rx }
    }

    pub fn state(&self) -> &AnalysisState {
        &self.state
    }

    pub fn refresh_sessions(&mut self) {
        self.state.begin_sessions_refresh();
        let (api, tx) = (self.api.clone(), self.tx.clone());
        tokio::spawn(async move {
            let res = api.sessions().await;
            let _ = tx.send(Fetched::Sessions(res));
        });
    }

    /// Trajectory and stats are requested concurrently; either may land
    /// first.
    pub fn select(&mut self, session_id: &str) {
        let Some(ticket) = self.state.select(session_id) else { return };

        let (api, tx, t) = (self.api.clone(), self.tx.clone(), ticket.clone());
        tokio::spawn(async move {
            let res = api.trajectory(&t.session_id).await;
            let _ = tx.send(Fetched::Trajectory(t, res));
        });

        let (api, tx) = (self.api.clone(), self.tx.clone());
        tokio::spawn(async move {
            let res = api.stats(&ticket.session_id).await;
            let _ = tx.send(Fetched::Stats(ticket, res));
        });
    }

    /// Wait for the next finished fetch and apply it.
    pub async fn next_event(&mut self) -> Applied {
        match self.rx.recv().await {
            Some(fetched) => self.state.apply(fetched),
            // unreachable while `self.tx` is alive
            None => Applied::Failed,
        }
    }

    /// Apply results until every fetch of the current selection is in.
    pub async fn settle(&mut self) {
        while !self.state.is_settled() {
            self.next_event().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis::DrawList;
    use model::Bounds;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use tokio::sync::Semaphore;

    fn points(n: usize, offset: f64) -> Vec<TrajectoryPoint> {
        (0..n).map(|i| TrajectoryPoint::new(offset + i as f64, i as f64 * 0.5, i as i64 * 100)).collect()
    }

    fn stats_for(id: &str) -> SessionStats {
        SessionStats {
            session_id: id.into(),
            total_points: 3,
            duration_ms: 200,
            uwb_coverage: 100.0,
            imu_coverage: 100.0,
            steering_coverage: 0.0,
            bounds: Bounds { min_x: 0.0, max_x: 100.0, min_y: 0.0, max_y: 100.0 },
        }
    }

    fn ticket(state: &mut AnalysisState, id: &str) -> Ticket {
        state.select(id).unwrap()
    }

    #[test]
    fn late_answer_for_previous_selection_is_dropped() {
        let mut st = AnalysisState::new();
        let a = ticket(&mut st, "A");
        let b = ticket(&mut st, "B");

        assert_eq!(st.apply(Fetched::Trajectory(b.clone(), Ok(points(3, 100.0)))), Applied::Redraw);
        assert_eq!(st.apply(Fetched::Trajectory(a.clone(), Ok(points(7, 0.0)))), Applied::Stale);
        assert_eq!(st.apply(Fetched::Stats(a, Ok(stats_for("A")))), Applied::Stale);

        assert_eq!(st.selected(), Some("B"));
        assert_eq!(st.trajectory(), points(3, 100.0).as_slice());
        assert!(st.stats().is_none());
    }

    #[test]
    fn new_selection_discards_previous_data() {
        let mut st = AnalysisState::new();
        let a = ticket(&mut st, "A");
        st.apply(Fetched::Trajectory(a.clone(), Ok(points(4, 0.0))));
        st.apply(Fetched::Stats(a, Ok(stats_for("A"))));
        assert!(st.is_settled());

        let _b = ticket(&mut st, "B");
        assert!(st.trajectory().is_empty());
        assert!(st.stats().is_none());
        assert!(st.is_loading());
        assert!(!st.is_settled());
    }

    #[test]
    fn reselecting_same_session_is_a_no_op() {
        let mut st = AnalysisState::new();
        let a = ticket(&mut st, "A");
        st.apply(Fetched::Trajectory(a, Ok(points(2, 0.0))));
        assert!(st.select("A").is_none());
        assert_eq!(st.trajectory().len(), 2);
    }

    #[test]
    fn deselect_invalidates_in_flight_fetches() {
        let mut st = AnalysisState::new();
        let a = ticket(&mut st, "A");
        assert!(st.select("").is_none());
        assert_eq!(st.selected(), None);
        assert!(st.is_settled());
        assert_eq!(st.apply(Fetched::Trajectory(a, Ok(points(2, 0.0)))), Applied::Stale);
        assert!(st.trajectory().is_empty());
    }

    #[test]
    fn stats_failure_degrades_to_computed_bounds() {
        let mut st = AnalysisState::new();
        let a = ticket(&mut st, "A");
        assert_eq!(st.apply(Fetched::Stats(a.clone(), Err(ApiError::Rejected("boom".into())))), Applied::Failed);
        assert!(st.is_loading());
        st.apply(Fetched::Trajectory(a, Ok(vec![TrajectoryPoint::new(0.0, 0.0, 0), TrajectoryPoint::new(5.0, 5.0, 1)])));
        assert!(st.is_settled());
        assert!(st.stats().is_none());

        let mut list = DrawList::new();
        st.render(&mut list, &Surface::default(), &RenderStyle::default()).unwrap();
        let path = list.polylines().next().unwrap();
        // extrema of the points fill the padded rectangle
        assert_eq!(path[1], model::Point2 { x: 560.0, y: 40.0 });
    }

    #[test]
    fn trajectory_failure_stops_loading_and_draws_nothing() {
        let mut st = AnalysisState::new();
        let a = ticket(&mut st, "A");
        let res = st.apply(Fetched::Trajectory(a, Err(ApiError::Unreachable("refused".into()))));
        assert_eq!(res, Applied::Failed);
        assert!(!st.is_loading());
        let mut list = DrawList::new();
        st.render(&mut list, &Surface::default(), &RenderStyle::default()).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn session_list_failure_keeps_previous_list() {
        let mut st = AnalysisState::new();
        let s = Session { id: "A".into(), user_id: None, vehicle_model: None, created_at: None };
        st.begin_sessions_refresh();
        st.apply(Fetched::Sessions(Ok(vec![s.clone()])));
        st.begin_sessions_refresh();
        assert_eq!(st.apply(Fetched::Sessions(Err(ApiError::Unreachable("x".into())))), Applied::Failed);
        assert_eq!(st.sessions(), &[s]);
        assert!(st.is_settled());
    }

    /// Sessions listed in `gated` only answer once the test releases them.
    struct FakeApi {
        trajectories: HashMap<String, Vec<TrajectoryPoint>>,
        gates: Mutex<HashMap<String, Arc<Semaphore>>>,
    }

    impl FakeApi {
        fn new() -> Self {
            let mut trajectories = HashMap::new();
            trajectories.insert("A".to_string(), points(7, 0.0));
            trajectories.insert("B".to_string(), points(3, 100.0));
            Self { trajectories, gates: Mutex::new(HashMap::new()) }
        }

        fn gate(&self, id: &str) -> Arc<Semaphore> {
            let sem = Arc::new(Semaphore::new(0));
            self.gates.lock().insert(id.to_string(), sem.clone());
            sem
        }

        async fn wait(&self, id: &str) {
            let gate = self.gates.lock().get(id).cloned();
            if let Some(sem) = gate {
                sem.acquire().await.unwrap().forget();
            }
        }
    }

    #[async_trait::async_trait]
    impl SessionApi for FakeApi {
        async fn sessions(&self) -> Result<Vec<Session>, ApiError> {
            Ok(self
                .trajectories
                .keys()
                .map(|id| Session { id: id.clone(), user_id: None, vehicle_model: None, created_at: None })
                .collect())
        }

        async fn trajectory(&self, session_id: &str) -> Result<Vec<TrajectoryPoint>, ApiError> {
            self.wait(session_id).await;
            self.trajectories
                .get(session_id)
                .cloned()
                .ok_or_else(|| ApiError::Rejected("Session non trouvée".into()))
        }

        async fn stats(&self, session_id: &str) -> Result<SessionStats, ApiError> {
            self.wait(session_id).await;
            Ok(stats_for(session_id))
        }
    }

    #[tokio::test]
    async fn slow_previous_selection_never_overwrites_current() {
        let api = Arc::new(FakeApi::new());
        let gate_a = api.gate("A");
        let mut dash = Dashboard::new(api.clone());

        dash.select("A");
        dash.select("B");
        dash.settle().await;
        assert_eq!(dash.state().selected(), Some("B"));
        assert_eq!(dash.state().trajectory(), points(3, 100.0).as_slice());
        assert_eq!(dash.state().stats().unwrap().session_id, "B");

        // A's trajectory and stats arrive late
        gate_a.add_permits(2);
        assert_eq!(dash.next_event().await, Applied::Stale);
        assert_eq!(dash.next_event().await, Applied::Stale);
        assert_eq!(dash.state().trajectory(), points(3, 100.0).as_slice());
        assert_eq!(dash.state().stats().unwrap().session_id, "B");
    }

    #[tokio::test]
    async fn refresh_and_select_settle() {
        let api: Arc<dyn SessionApi> = Arc::new(FakeApi::new());
        let mut dash = Dashboard::new(api);
        dash.refresh_sessions();
        dash.settle().await;
        assert_eq!(dash.state().sessions().len(), 2);

        dash.select("A");
        assert!(dash.state().is_loading());
        dash.settle().await;
        assert_eq!(dash.state().trajectory().len(), 7);
        assert!(dash.state().stats().is_some());
    }
}
