//! Per-screen state machines. Rendering lives in `ui`, task spawning in `app`.

use crate::artwork::Artwork;
use crate::fetch::FetchError;
use crate::models::{CatalogEntry, EntryDetail, NavigationTarget};
use std::collections::HashMap;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState<T> {
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> LoadState<T> {
    fn from_result(result: Result<T, FetchError>) -> Self {
        match result {
            Ok(v) => LoadState::Ready(v),
            Err(e) => LoadState::Failed(e.to_string()),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, LoadState::Failed(_))
    }
}

/// A spawned fetch owned by one view. Dropping it aborts the task.
pub struct FetchTask {
    pub generation: u64,
    handle: JoinHandle<()>,
}

impl FetchTask {
    pub fn new(generation: u64, handle: JoinHandle<()>) -> Self {
        Self { generation, handle }
    }
}

impl Drop for FetchTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn owns(task: &Option<FetchTask>, generation: u64) -> bool {
    task.as_ref().map_or(false, |t| t.generation == generation)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThumbState {
    Loading,
    Ready(Artwork),
    Missing,
}

pub struct ListView {
    pub state: LoadState<Vec<CatalogEntry>>,
    pub visible: Vec<usize>, // indices into the ready entries
    pub selected_visible: usize,
    pub search_mode: bool,
    pub search_query: String,
    /// Thumbnails by entry id, scoped to this view.
    pub thumbs: HashMap<String, ThumbState>,
    task: Option<FetchTask>,
    pending_thumb: Option<String>,
}

impl ListView {
    pub fn new() -> Self {
        Self {
            state: LoadState::Loading,
            visible: Vec::new(),
            selected_visible: 0,
            search_mode: false,
            search_query: String::new(),
            thumbs: HashMap::new(),
            task: None,
            pending_thumb: None,
        }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        match &self.state {
            LoadState::Ready(v) => v,
            _ => &[],
        }
    }

    pub fn owns(&self, generation: u64) -> bool {
        owns(&self.task, generation)
    }

    /// Start (or restart) the list fetch.
    pub fn begin_list(&mut self, task: FetchTask) {
        self.clear_pending_thumb();
        self.state = LoadState::Loading;
        self.task = Some(task);
    }

    pub fn finish_list(&mut self, result: Result<Vec<CatalogEntry>, FetchError>) {
        self.task = None;
        self.state = LoadState::from_result(result);
        self.selected_visible = 0;
        self.apply_filter();
    }

    /// Replace whatever thumbnail is in flight with a fetch for `id`.
    pub fn begin_thumb(&mut self, id: String, task: FetchTask) {
        self.clear_pending_thumb();
        self.thumbs.insert(id.clone(), ThumbState::Loading);
        self.pending_thumb = Some(id);
        self.task = Some(task);
    }

    pub fn finish_thumb(&mut self, id: String, art: Option<Artwork>) {
        self.task = None;
        self.pending_thumb = None;
        let state = match art {
            Some(a) => ThumbState::Ready(a),
            None => ThumbState::Missing,
        };
        self.thumbs.insert(id, state);
    }

    // An aborted thumbnail fetch must not leave its entry stuck in Loading.
    fn clear_pending_thumb(&mut self) {
        if let Some(id) = self.pending_thumb.take() {
            if self.thumbs.get(&id) == Some(&ThumbState::Loading) {
                self.thumbs.remove(&id);
            }
        }
        self.task = None;
    }

    /// Whether a retry is allowed; the caller starts the new fetch.
    pub fn can_retry(&self) -> bool {
        self.state.is_failed()
    }

    pub fn selected_entry(&self) -> Option<&CatalogEntry> {
        let idx = *self.visible.get(self.selected_visible)?;
        self.entries().get(idx)
    }

    /// Navigation hand-off for the highlighted entry.
    pub fn select(&self) -> Option<NavigationTarget> {
        self.selected_entry().map(NavigationTarget::from)
    }

    pub fn next(&mut self) {
        if !self.visible.is_empty() {
            self.selected_visible = (self.selected_visible + 1) % self.visible.len();
        }
    }

    pub fn previous(&mut self) {
        if !self.visible.is_empty() {
            if self.selected_visible == 0 {
                self.selected_visible = self.visible.len() - 1;
            } else {
                self.selected_visible -= 1;
            }
        }
    }

    pub fn apply_filter(&mut self) {
        let q = self.search_query.to_lowercase();
        self.visible = self
            .entries()
            .iter()
            .enumerate()
            .filter_map(|(i, e)| {
                if q.is_empty() || e.name.to_lowercase().contains(&q) {
                    Some(i)
                } else {
                    None
                }
            })
            .collect();

        if self.visible.is_empty() {
            self.selected_visible = 0;
        } else if self.selected_visible >= self.visible.len() {
            self.selected_visible = self.visible.len() - 1;
        }
    }
}

impl Default for ListView {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtworkState {
    Pending,
    Ready(Artwork),
    Unavailable,
    Disabled,
}

pub struct DetailView {
    pub target: NavigationTarget,
    pub state: LoadState<EntryDetail>,
    pub artwork: ArtworkState,
    images: bool,
    task: Option<FetchTask>,
}

impl DetailView {
    pub fn new(target: NavigationTarget, images: bool) -> Self {
        Self {
            target,
            state: LoadState::Loading,
            artwork: ArtworkState::Pending,
            images,
            task: None,
        }
    }

    pub fn owns(&self, generation: u64) -> bool {
        owns(&self.task, generation)
    }

    pub fn begin(&mut self, task: FetchTask) {
        self.state = LoadState::Loading;
        self.artwork = ArtworkState::Pending;
        self.task = Some(task);
    }

    /// Record the detail outcome. The task stays alive when artwork follows.
    pub fn finish_detail(&mut self, result: Result<EntryDetail, FetchError>) {
        self.state = LoadState::from_result(result);
        self.artwork = match (&self.state, self.images) {
            (LoadState::Ready(_), true) => ArtworkState::Pending,
            (LoadState::Ready(_), false) => ArtworkState::Disabled,
            _ => ArtworkState::Unavailable,
        };
        if self.artwork != ArtworkState::Pending {
            self.task = None;
        }
    }

    pub fn finish_artwork(&mut self, art: Option<Artwork>) {
        self.task = None;
        self.artwork = match art {
            Some(a) => ArtworkState::Ready(a),
            None => ArtworkState::Unavailable,
        };
    }

    pub fn can_retry(&self) -> bool {
        self.state.is_failed()
    }
}
