use crate::config::Config;
use crate::datasources::mock::{parcel_id, synth_parcel};
use crate::datasources::{BackendClient, MockSource, NewParcel};
use crate::logic::{visible_rows, ParcelRepository, ParcelRow, RemoteAnalysis};
use crate::models::{
    parse_all, parse_date_bound, FilterState, IrrigationAdvice, Parcel, Prediction, SignalSource,
};
use crate::ui::screens::{FilterField, NewParcelField};
use rand::rngs::StdRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    Map,
    Analysis,
    Filters,
    NewParcel,
}

impl Screen {
    pub fn from_key(c: char) -> Option<Self> {
        match c {
            '1' => Some(Screen::Dashboard),
            '2' => Some(Screen::Map),
            '3' => Some(Screen::Analysis),
            '4' => Some(Screen::Filters),
            '5' => Some(Screen::NewParcel),
            _ => None,
        }
    }
}

/// Identifies the selection a remote request was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTag {
    pub parcel_id: String,
    pub generation: u64,
}

/// Work for the event loop to run against the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteRequest {
    Analysis { tag: RequestTag, rain_factor: f64 },
    Chat {
        tag: RequestTag,
        index: usize,
        question: String,
    },
}

/// Completed remote work, posted back to the event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteEvent {
    Analysis {
        tag: RequestTag,
        result: std::result::Result<RemoteAnalysis, String>,
    },
    Chat {
        tag: RequestTag,
        index: usize,
        result: std::result::Result<String, String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisStatus {
    Idle,
    Loading,
    Ready,
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatEntry {
    pub question: String,
    /// `None` while the answer is in flight.
    pub answer: Option<std::result::Result<String, String>>,
}

pub struct AnalysisState {
    pub status: AnalysisStatus,
    pub prediction: Option<Prediction>,
    pub remote_advice: Option<IrrigationAdvice>,
    pub chat_log: Vec<ChatEntry>,
    pub chat_editing: bool,
    pub chat_input: String,
}

impl AnalysisState {
    pub fn new() -> Self {
        Self {
            status: AnalysisStatus::Idle,
            prediction: None,
            remote_advice: None,
            chat_log: Vec::new(),
            chat_editing: false,
            chat_input: String::new(),
        }
    }

    fn clear_remote(&mut self) {
        self.prediction = None;
        self.remote_advice = None;
    }
}

pub struct DashboardState {
    pub selected_index: usize,
}

impl DashboardState {
    pub fn new() -> Self {
        Self { selected_index: 0 }
    }

    pub fn next(&mut self, max: usize) {
        if max > 0 && self.selected_index < max - 1 {
            self.selected_index += 1;
        }
    }

    pub fn prev(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }
}

pub struct FiltersState {
    pub focused_field: FilterField,
    pub editing: bool,
    pub edit_buffer: String,
}

impl FiltersState {
    pub fn new() -> Self {
        Self {
            focused_field: FilterField::Province,
            editing: false,
            edit_buffer: String::new(),
        }
    }

    pub fn next_field(&mut self) {
        self.focused_field = self.focused_field.next();
    }

    pub fn prev_field(&mut self) {
        self.focused_field = self.focused_field.prev();
    }

    pub fn start_editing(&mut self, current_value: &str) {
        self.editing = true;
        self.edit_buffer = current_value.to_string();
    }

    pub fn cancel_editing(&mut self) {
        self.editing = false;
        self.edit_buffer.clear();
    }

    pub fn finish_editing(&mut self) -> String {
        self.editing = false;
        std::mem::take(&mut self.edit_buffer)
    }
}

pub struct NewParcelState {
    pub focused_field: NewParcelField,
    pub input: NewParcel,
}

impl NewParcelState {
    pub fn new() -> Self {
        Self {
            focused_field: NewParcelField::Province,
            input: NewParcel::default(),
        }
    }

    pub fn toggle_field(&mut self) {
        self.focused_field = self.focused_field.next();
    }

    pub fn buffer_mut(&mut self) -> &mut String {
        match self.focused_field {
            NewParcelField::Province => &mut self.input.province,
            NewParcelField::District => &mut self.input.district,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

pub struct App {
    pub screen: Screen,
    pub should_quit: bool,

    // Data
    pub repository: ParcelRepository,
    pub filters: FilterState,

    // Screen states
    pub dashboard_state: DashboardState,
    pub analysis_state: AnalysisState,
    pub filters_state: FiltersState,
    pub new_parcel_state: NewParcelState,

    // Services
    backend: Option<BackendClient>,
    mock: MockSource,
    rng: StdRng,

    // Remote request bookkeeping
    generation: u64,
    selection_generation: u64,
    pending_requests: Vec<RemoteRequest>,

    // UI state
    pub status_message: Option<String>,
}

impl App {
    pub fn new(
        config: &Config,
        repository: ParcelRepository,
        backend: Option<BackendClient>,
        mock: MockSource,
    ) -> Self {
        let filters = FilterState::default().with_rain_factor(config.scenario.rain_factor);
        let rng = mock.rng();

        let mut app = Self {
            screen: Screen::Dashboard,
            should_quit: false,
            repository,
            filters,
            dashboard_state: DashboardState::new(),
            analysis_state: AnalysisState::new(),
            filters_state: FiltersState::new(),
            new_parcel_state: NewParcelState::new(),
            backend,
            mock,
            rng,
            generation: 0,
            selection_generation: 0,
            pending_requests: Vec::new(),
            status_message: None,
        };

        let first = app.repository.parcels().first().map(|p| p.id.clone());
        if let Some(id) = first {
            app.select_parcel(&id);
        }
        app
    }

    pub fn switch_screen(&mut self, screen: Screen) {
        self.screen = screen;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Keys go to a text field instead of the global bindings.
    pub fn is_text_entry(&self) -> bool {
        self.filters_state.editing
            || self.analysis_state.chat_editing
            || self.screen == Screen::NewParcel
    }

    pub fn set_status(&mut self, message: &str) {
        self.status_message = Some(message.to_string());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Remote calls are only made when the repository came from the backend.
    pub fn backend_available(&self) -> bool {
        self.backend.is_some() && self.repository.backend_available()
    }

    pub fn backend(&self) -> Option<&BackendClient> {
        self.backend.as_ref()
    }

    pub fn visible_rows(&self) -> Vec<ParcelRow> {
        visible_rows(self.repository.parcels(), &self.filters)
    }

    pub fn selected_parcel(&self) -> Option<&Parcel> {
        self.filters
            .selected_parcel_id
            .as_deref()
            .and_then(|id| self.repository.find_by_id(id))
    }

    pub fn provinces(&self) -> Vec<String> {
        self.repository.provinces()
    }

    pub fn select_parcel(&mut self, id: &str) {
        if self.filters.selected_parcel_id.as_deref() == Some(id) {
            return;
        }
        self.filters.selected_parcel_id = Some(id.to_string());
        self.analysis_state.chat_log.clear();
        self.analysis_state.chat_editing = false;
        self.analysis_state.chat_input.clear();
        self.begin_analysis();
        self.selection_generation = self.generation;
    }

    /// Select the row at `index` of the visible table.
    pub fn select_row(&mut self, index: usize) {
        let rows = self.visible_rows();
        if let Some(row) = rows.get(index) {
            self.dashboard_state.selected_index = index;
            let id = row.id.clone();
            self.select_parcel(&id);
        }
    }

    pub fn select_next(&mut self) {
        let count = self.visible_rows().len();
        self.dashboard_state.next(count);
        self.select_row(self.dashboard_state.selected_index);
    }

    pub fn select_prev(&mut self) {
        self.dashboard_state.prev();
        self.select_row(self.dashboard_state.selected_index);
    }

    /// Keep the table cursor on the selected parcel after the visible set changed.
    fn sync_table_cursor(&mut self) {
        let rows = self.visible_rows();
        let position = self
            .filters
            .selected_parcel_id
            .as_deref()
            .and_then(|id| rows.iter().position(|r| r.id == id));
        self.dashboard_state.selected_index = match position {
            Some(i) => i,
            None => self
                .dashboard_state
                .selected_index
                .min(rows.len().saturating_sub(1)),
        };
    }

    /// Start a fresh analysis of the selection. Supersedes any request in flight.
    pub fn begin_analysis(&mut self) {
        self.generation += 1;
        self.analysis_state.clear_remote();

        let Some(parcel_id) = self.filters.selected_parcel_id.clone() else {
            self.analysis_state.status = AnalysisStatus::Idle;
            return;
        };

        if self.backend_available() {
            self.analysis_state.status = AnalysisStatus::Loading;
            self.pending_requests.push(RemoteRequest::Analysis {
                tag: RequestTag {
                    parcel_id,
                    generation: self.generation,
                },
                rain_factor: self.filters.rain_factor,
            });
        } else {
            self.analysis_state.status = AnalysisStatus::Ready;
        }
    }

    pub fn take_requests(&mut self) -> Vec<RemoteRequest> {
        std::mem::take(&mut self.pending_requests)
    }

    fn is_current_analysis(&self, tag: &RequestTag) -> bool {
        tag.generation == self.generation
            && self.filters.selected_parcel_id.as_deref() == Some(tag.parcel_id.as_str())
    }

    fn is_current_chat(&self, tag: &RequestTag) -> bool {
        tag.generation >= self.selection_generation
            && self.filters.selected_parcel_id.as_deref() == Some(tag.parcel_id.as_str())
    }

    /// Apply a finished remote call. Returns false when it was stale and dropped.
    pub fn handle_event(&mut self, event: RemoteEvent) -> bool {
        match event {
            RemoteEvent::Analysis { tag, result } => {
                if !self.is_current_analysis(&tag) {
                    tracing::debug!(
                        "Discarding stale analysis for {} (generation {}, current {})",
                        tag.parcel_id,
                        tag.generation,
                        self.generation
                    );
                    return false;
                }
                match result {
                    Ok(analysis) => {
                        self.analysis_state.prediction = Some(analysis.prediction);
                        self.analysis_state.remote_advice = Some(analysis.advice);
                        self.analysis_state.status = AnalysisStatus::Ready;
                    }
                    Err(e) => {
                        tracing::warn!("Remote analysis for {} failed: {}", tag.parcel_id, e);
                        self.analysis_state.status = AnalysisStatus::Error(e);
                    }
                }
                true
            }
            RemoteEvent::Chat { tag, index, result } => {
                if !self.is_current_chat(&tag) {
                    tracing::debug!("Discarding stale chat answer for {}", tag.parcel_id);
                    return false;
                }
                match self.analysis_state.chat_log.get_mut(index) {
                    Some(entry) => {
                        entry.answer = Some(result);
                        true
                    }
                    None => false,
                }
            }
        }
    }

    pub fn start_chat(&mut self) {
        if !self.backend_available() {
            self.set_status("Chat needs the backend, which is unavailable");
            return;
        }
        if self.filters.selected_parcel_id.is_some() {
            self.analysis_state.chat_editing = true;
        }
    }

    pub fn submit_chat(&mut self) {
        self.analysis_state.chat_editing = false;
        let question = std::mem::take(&mut self.analysis_state.chat_input);
        let question = question.trim().to_string();
        if question.is_empty() {
            return;
        }
        let Some(parcel_id) = self.filters.selected_parcel_id.clone() else {
            return;
        };

        let index = self.analysis_state.chat_log.len();
        self.analysis_state.chat_log.push(ChatEntry {
            question: question.clone(),
            answer: None,
        });
        self.pending_requests.push(RemoteRequest::Chat {
            tag: RequestTag {
                parcel_id,
                generation: self.generation,
            },
            index,
            question,
        });
    }

    fn filters_changed(&mut self) {
        self.sync_table_cursor();
    }

    fn scenario_changed(&mut self) {
        self.sync_table_cursor();
        self.begin_analysis();
    }

    pub fn drier(&mut self) {
        self.filters.drier();
        self.scenario_changed();
    }

    pub fn wetter(&mut self) {
        self.filters.wetter();
        self.scenario_changed();
    }

    pub fn reset_filters(&mut self) {
        let scenario_moved = self.filters.rain_factor != 1.0;
        self.filters.reset();
        if scenario_moved {
            self.scenario_changed();
        } else {
            self.filters_changed();
        }
        self.set_status("Filters reset");
    }

    pub fn cycle_province(&mut self, forward: bool) {
        let mut options: Vec<Option<String>> = vec![None];
        options.extend(self.provinces().into_iter().map(Some));
        self.filters.province = cycle(&options, &self.filters.province, forward);
        self.filters_changed();
    }

    pub fn cycle_source(&mut self, forward: bool) {
        let mut options: Vec<Option<SignalSource>> = vec![None];
        options.extend(SignalSource::all().iter().copied().map(Some));
        self.filters.source = cycle(&options, &self.filters.source, forward);
        self.filters_changed();
    }

    pub fn cycle_bucket(&mut self) {
        self.filters.cycle_bucket();
        self.filters_changed();
    }

    /// Current text of a filter field, for editing.
    pub fn filter_value(&self, field: FilterField) -> String {
        match field {
            FilterField::Province => self.filters.province_label().to_string(),
            FilterField::Source => self.filters.source_label().to_string(),
            FilterField::Stress => self.filters.bucket_label().to_string(),
            FilterField::From => date_text(self.filters.from),
            FilterField::To => date_text(self.filters.to),
            FilterField::RainFactor => format!("{:.1}", self.filters.rain_factor),
        }
    }

    /// Apply typed text to a filter field. Invalid input leaves it unchanged.
    pub fn apply_filter_value(&mut self, field: FilterField, value: &str) {
        let applied = match field {
            FilterField::Province => parse_all(value, |s| Some(s.to_string()))
                .map(|v| self.filters.province = v)
                .is_some(),
            FilterField::Source => parse_all(value, SignalSource::from_str)
                .map(|v| self.filters.source = v)
                .is_some(),
            FilterField::Stress => parse_all(value, crate::models::StressBucket::from_str)
                .map(|v| self.filters.stress_bucket = v)
                .is_some(),
            FilterField::From => parse_date_bound(value)
                .map(|v| self.filters.from = v)
                .is_some(),
            FilterField::To => parse_date_bound(value)
                .map(|v| self.filters.to = v)
                .is_some(),
            FilterField::RainFactor => match value.trim().parse::<f64>() {
                Ok(f) => {
                    self.filters.set_rain_factor(f);
                    self.scenario_changed();
                    return;
                }
                Err(_) => false,
            },
        };

        if applied {
            self.filters_changed();
        } else {
            self.set_status(&format!("Invalid {}: '{}'", field.label(), value));
        }
    }

    /// Create a demo parcel from the form, select it and show the dashboard.
    ///
    /// Filters that would hide the new parcel are cleared so the table cursor
    /// lands on it.
    pub fn add_parcel(&mut self) {
        let region = self.mock.region();
        let mut parcel = synth_parcel(
            &self.new_parcel_state.input,
            &region,
            &mut self.rng,
            self.mock.today(),
        );
        while self.repository.contains(&parcel.id) {
            parcel.id = parcel_id(&mut self.rng);
        }
        let id = self.repository.add(parcel).id.clone();
        tracing::info!("Created demo parcel {}", id);

        let hidden = !self.visible_rows().iter().any(|row| row.id == id);
        if hidden {
            self.filters.clear_categories();
        }

        self.new_parcel_state.clear();
        self.select_parcel(&id);
        self.sync_table_cursor();
        if hidden {
            self.set_status(&format!("Added parcel {} (filters cleared to show it)", id));
        } else {
            self.set_status(&format!("Added parcel {}", id));
        }
        self.switch_screen(Screen::Dashboard);
    }
}

fn cycle<T: Clone + PartialEq>(options: &[T], current: &T, forward: bool) -> T {
    let len = options.len();
    let pos = options.iter().position(|o| o == current).unwrap_or(0);
    let next = if forward {
        (pos + 1) % len
    } else {
        (pos + len - 1) % len
    };
    options[next].clone()
}

fn date_text(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegionConfig;
    use crate::datasources::SourceKind;
    use crate::models::{AdviceOrigin, StressBucket};
    use chrono::NaiveDate;

    fn mock() -> MockSource {
        MockSource::new(Some(13), RegionConfig::default())
            .with_today(NaiveDate::from_ymd_opt(2025, 7, 10).unwrap())
    }

    fn offline_app() -> App {
        let mock = mock();
        let repo = ParcelRepository::new(mock.demo_parcels(), SourceKind::Mock, false);
        App::new(&Config::default(), repo, None, mock)
    }

    fn online_app() -> App {
        let mock = mock();
        let repo = ParcelRepository::new(mock.demo_parcels(), SourceKind::Remote, true);
        App::new(
            &Config::default(),
            repo,
            Some(BackendClient::new("http://localhost:8000")),
            mock,
        )
    }

    fn analysis(risk: f64) -> RemoteAnalysis {
        RemoteAnalysis {
            prediction: Prediction {
                risk_7d: risk,
                risk_14d: None,
                ndvi_7d_pred: None,
                top_factors: Vec::new(),
            },
            advice: IrrigationAdvice::new("within 3 days", 18.0, "dry", AdviceOrigin::Remote),
        }
    }

    fn analysis_tag(request: &RemoteRequest) -> RequestTag {
        match request {
            RemoteRequest::Analysis { tag, .. } => tag.clone(),
            other => panic!("expected analysis request, got {:?}", other),
        }
    }

    #[test]
    fn offline_selection_is_ready_without_requests() {
        let mut app = offline_app();
        assert_eq!(app.filters.selected_parcel_id.as_deref(), Some("P-1024"));
        assert_eq!(app.analysis_state.status, AnalysisStatus::Ready);
        assert!(app.take_requests().is_empty());
    }

    #[test]
    fn online_selection_queues_tagged_request() {
        let mut app = online_app();
        assert_eq!(app.analysis_state.status, AnalysisStatus::Loading);

        let requests = app.take_requests();
        assert_eq!(requests.len(), 1);
        let tag = analysis_tag(&requests[0]);
        assert_eq!(tag.parcel_id, "P-1024");

        assert!(app.handle_event(RemoteEvent::Analysis {
            tag,
            result: Ok(analysis(72.0)),
        }));
        assert_eq!(app.analysis_state.status, AnalysisStatus::Ready);
        assert_eq!(
            app.analysis_state.prediction.as_ref().map(|p| p.risk_7d),
            Some(72.0)
        );
    }

    #[test]
    fn superseded_response_is_discarded() {
        let mut app = online_app();
        let first = analysis_tag(&app.take_requests()[0]);

        app.select_next();
        let second = analysis_tag(&app.take_requests()[0]);
        assert_ne!(first.parcel_id, second.parcel_id);

        // The slow answer for the first parcel arrives late.
        assert!(!app.handle_event(RemoteEvent::Analysis {
            tag: first,
            result: Ok(analysis(99.0)),
        }));
        assert_eq!(app.analysis_state.status, AnalysisStatus::Loading);
        assert!(app.analysis_state.prediction.is_none());

        assert!(app.handle_event(RemoteEvent::Analysis {
            tag: second,
            result: Ok(analysis(30.0)),
        }));
        assert_eq!(
            app.analysis_state.prediction.as_ref().map(|p| p.risk_7d),
            Some(30.0)
        );
    }

    #[test]
    fn scenario_change_supersedes_same_parcel_request() {
        let mut app = online_app();
        let old = analysis_tag(&app.take_requests()[0]);

        app.drier();
        let requests = app.take_requests();
        match &requests[0] {
            RemoteRequest::Analysis { tag, rain_factor } => {
                assert_eq!(tag.parcel_id, old.parcel_id);
                assert!((rain_factor - 0.9).abs() < 1e-9);
            }
            other => panic!("unexpected {:?}", other),
        }

        assert!(!app.handle_event(RemoteEvent::Analysis {
            tag: old,
            result: Ok(analysis(50.0)),
        }));
    }

    #[test]
    fn remote_failure_sets_error_status() {
        let mut app = online_app();
        let tag = analysis_tag(&app.take_requests()[0]);
        app.handle_event(RemoteEvent::Analysis {
            tag,
            result: Err("POST http://x/predict -> 500 boom".into()),
        });
        assert!(matches!(app.analysis_state.status, AnalysisStatus::Error(_)));
    }

    #[test]
    fn chat_answers_follow_the_selection() {
        let mut app = online_app();
        app.take_requests();

        app.start_chat();
        assert!(app.analysis_state.chat_editing);
        app.analysis_state.chat_input = "Should I irrigate?".into();
        app.submit_chat();

        let (tag, index) = match app.take_requests().remove(0) {
            RemoteRequest::Chat { tag, index, .. } => (tag, index),
            other => panic!("unexpected {:?}", other),
        };

        // A scenario change does not drop the answer.
        app.wetter();
        assert!(app.handle_event(RemoteEvent::Chat {
            tag: tag.clone(),
            index,
            result: Ok("Yes".into()),
        }));
        assert_eq!(
            app.analysis_state.chat_log[0].answer,
            Some(Ok("Yes".to_string()))
        );

        // Selecting another parcel does.
        app.select_next();
        assert!(app.analysis_state.chat_log.is_empty());
        assert!(!app.handle_event(RemoteEvent::Chat {
            tag,
            index,
            result: Ok("late".into()),
        }));
    }

    #[test]
    fn chat_is_unavailable_offline() {
        let mut app = offline_app();
        app.start_chat();
        assert!(!app.analysis_state.chat_editing);
        assert!(app.status_message.is_some());
    }

    #[test]
    fn add_parcel_prepends_and_selects() {
        let mut app = offline_app();
        app.switch_screen(Screen::NewParcel);
        app.new_parcel_state.input.district = "Ilgin".into();
        app.add_parcel();

        let first = &app.repository.parcels()[0];
        assert_eq!(first.name, "Ilgin / Parcel (new)");
        assert_eq!(first.province, "Konya");
        assert_eq!(app.filters.selected_parcel_id.as_deref(), Some(first.id.as_str()));
        assert_eq!(app.dashboard_state.selected_index, 0);
        assert_eq!(app.screen, Screen::Dashboard);
        assert_eq!(app.repository.len(), 5);
    }

    #[test]
    fn added_parcels_get_unique_ids() {
        let mut app = offline_app();
        for _ in 0..300 {
            app.add_parcel();
        }

        let mut ids: Vec<&str> = app
            .repository
            .parcels()
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);

        let oldest = app.repository.parcels()[total - 1].id.clone();
        assert_eq!(app.repository.find_by_id(&oldest).unwrap().name, "Bor / Parcel 2");
    }

    #[test]
    fn add_parcel_clears_filters_hiding_it() {
        let mut app = offline_app();
        app.apply_filter_value(FilterField::Province, "Aksaray");
        app.new_parcel_state.input.province = "Karaman".into();
        app.add_parcel();

        let id = app.repository.parcels()[0].id.clone();
        assert_eq!(app.filters.province, None);
        assert_eq!(app.visible_rows()[app.dashboard_state.selected_index].id, id);
        assert!(app.status_message.as_deref().unwrap().contains("filters cleared"));
    }

    #[test]
    fn add_parcel_keeps_matching_filters() {
        let mut app = offline_app();
        app.apply_filter_value(FilterField::Province, "Konya");
        app.add_parcel();

        assert_eq!(app.filters.province.as_deref(), Some("Konya"));
        assert_eq!(app.dashboard_state.selected_index, 0);
    }

    #[test]
    fn filter_fields_parse_text() {
        let mut app = offline_app();
        app.apply_filter_value(FilterField::Stress, "high");
        assert_eq!(app.filters.stress_bucket, Some(StressBucket::High));

        app.apply_filter_value(FilterField::From, "2025-07-01");
        assert_eq!(app.filters.from, NaiveDate::from_ymd_opt(2025, 7, 1));
        assert_eq!(app.filter_value(FilterField::From), "2025-07-01");

        app.apply_filter_value(FilterField::To, "yesterday");
        assert_eq!(app.filters.to, None);
        assert!(app.status_message.as_deref().unwrap().contains("Invalid"));

        app.apply_filter_value(FilterField::Stress, "all");
        assert_eq!(app.filters.stress_bucket, None);

        app.apply_filter_value(FilterField::RainFactor, "5");
        assert_eq!(app.filters.rain_factor, 2.0);
    }

    #[test]
    fn province_cycle_wraps_through_all() {
        let mut app = offline_app();
        let provinces = app.provinces();
        app.cycle_province(true);
        assert_eq!(app.filters.province.as_ref(), Some(&provinces[0]));
        app.cycle_province(false);
        assert_eq!(app.filters.province, None);
        app.cycle_province(false);
        assert_eq!(app.filters.province.as_ref(), provinces.last());
    }

    #[test]
    fn reset_keeps_selection() {
        let mut app = offline_app();
        app.cycle_bucket();
        app.drier();
        app.reset_filters();
        assert_eq!(app.filters.stress_bucket, None);
        assert_eq!(app.filters.rain_factor, 1.0);
        assert!(app.filters.selected_parcel_id.is_some());
    }

    #[test]
    fn empty_repository_has_no_selection() {
        let mock = mock();
        let repo = ParcelRepository::new(Vec::new(), SourceKind::Remote, true);
        let mut app = App::new(
            &Config::default(),
            repo,
            Some(BackendClient::new("http://localhost:8000")),
            mock,
        );
        assert!(app.selected_parcel().is_none());
        assert!(app.visible_rows().is_empty());
        assert!(app.take_requests().is_empty());
        app.select_next();
        assert_eq!(app.analysis_state.status, AnalysisStatus::Idle);
    }
}
