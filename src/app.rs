use crate::artwork::Artwork;
use crate::fetch::{CatalogClient, FetchError};
use crate::models::{thumbnail_url, CatalogEntry, EntryDetail, NavigationTarget};
use crate::view::{DetailView, FetchTask, ListView, LoadState};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::future::Future;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// What a fetch task reports back to the UI loop.
#[derive(Debug)]
pub enum Outcome {
    List(Result<Vec<CatalogEntry>, FetchError>),
    Thumb { id: String, art: Option<Artwork> },
    Detail(Result<EntryDetail, FetchError>),
    Artwork(Option<Artwork>),
}

#[derive(Debug)]
pub struct Message {
    pub generation: u64,
    pub outcome: Outcome,
}

/// Sending half handed to a fetch task, stamped with its generation.
#[derive(Clone)]
pub struct Reporter {
    generation: u64,
    tx: UnboundedSender<Message>,
}

impl Reporter {
    fn send(&self, outcome: Outcome) {
        // The receiver lives as long as the App; a failed send means shutdown.
        let _ = self.tx.send(Message {
            generation: self.generation,
            outcome,
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    List,
    Detail,
}

pub struct App {
    client: CatalogClient,
    sprite_host: String,
    images: bool,
    pub list: ListView,
    pub detail: Option<DetailView>,
    pub show_help: bool,
    pub should_quit: bool,
    pub tick: usize,
    next_generation: u64,
    tx: UnboundedSender<Message>,
    rx: UnboundedReceiver<Message>,
}

impl App {
    pub fn new(client: CatalogClient, sprite_host: impl Into<String>, images: bool) -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            client,
            sprite_host: sprite_host.into(),
            images,
            list: ListView::new(),
            detail: None,
            show_help: false,
            should_quit: false,
            tick: 0,
            next_generation: 0,
            tx,
            rx,
        }
    }

    pub fn sprite_host(&self) -> &str {
        &self.sprite_host
    }

    pub fn screen(&self) -> Screen {
        if self.detail.is_some() {
            Screen::Detail
        } else {
            Screen::List
        }
    }

    /// Enter the list view. Called once when the UI comes up.
    pub fn start(&mut self) {
        self.start_list_fetch();
    }

    fn spawn<F, Fut>(&mut self, f: F) -> FetchTask
    where
        F: FnOnce(Reporter) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let generation = self.next_generation;
        self.next_generation += 1;
        let reporter = Reporter {
            generation,
            tx: self.tx.clone(),
        };
        FetchTask::new(generation, tokio::spawn(f(reporter)))
    }

    fn start_list_fetch(&mut self) {
        let client = self.client.clone();
        let task = self.spawn(|r| async move {
            r.send(Outcome::List(client.fetch_entry_list().await));
        });
        self.list.begin_list(task);
    }

    /// Fetch the highlighted entry's thumbnail unless it is already known.
    fn request_thumbnail(&mut self) {
        if !self.images || !matches!(self.list.state, LoadState::Ready(_)) {
            return;
        }
        let id = match self.list.selected_entry().and_then(|e| e.id()) {
            Some(id) => id.to_string(),
            None => return,
        };
        if self.list.thumbs.contains_key(&id) {
            return;
        }
        let address = thumbnail_url(&self.sprite_host, &id);
        let client = self.client.clone();
        let thumb_id = id.clone();
        let task = self.spawn(move |r| async move {
            let art = load_artwork(&client, &address).await;
            r.send(Outcome::Thumb { id: thumb_id, art });
        });
        self.list.begin_thumb(id, task);
    }

    /// Hand off to the detail view. Re-fetches only when the address changes.
    pub fn open_detail(&mut self, target: NavigationTarget) {
        if let Some(d) = &self.detail {
            if d.target.address == target.address {
                return;
            }
        }
        log::info!("opening {} ({})", target.display_name, target.address);
        self.detail = Some(DetailView::new(target, self.images));
        self.start_detail_fetch();
    }

    fn start_detail_fetch(&mut self) {
        let address = match &self.detail {
            Some(d) => d.target.address.clone(),
            None => return,
        };
        let client = self.client.clone();
        let images = self.images;
        let task = self.spawn(move |r| async move {
            match client.fetch_entry_detail(&address).await {
                Ok(detail) => {
                    let art_address = detail.primary_image_url.clone();
                    r.send(Outcome::Detail(Ok(detail)));
                    if images {
                        let art = load_artwork(&client, &art_address).await;
                        r.send(Outcome::Artwork(art));
                    }
                }
                Err(e) => r.send(Outcome::Detail(Err(e))),
            }
        });
        if let Some(d) = self.detail.as_mut() {
            d.begin(task);
        }
    }

    /// Leave the detail view; its in-flight fetch is aborted with it.
    pub fn back(&mut self) {
        self.detail = None;
    }

    pub fn handle_message(&mut self, msg: Message) {
        let generation = msg.generation;
        let applied = match msg.outcome {
            Outcome::List(result) if self.list.owns(generation) => {
                self.list.finish_list(result);
                self.request_thumbnail();
                true
            }
            Outcome::Thumb { id, art } if self.list.owns(generation) => {
                self.list.finish_thumb(id, art);
                true
            }
            Outcome::Detail(result) => match self.detail.as_mut() {
                Some(d) if d.owns(generation) => {
                    d.finish_detail(result);
                    true
                }
                _ => false,
            },
            Outcome::Artwork(art) => match self.detail.as_mut() {
                Some(d) if d.owns(generation) => {
                    d.finish_artwork(art);
                    true
                }
                _ => false,
            },
            _ => false,
        };
        if !applied {
            log::debug!("dropping stale fetch result (generation {})", generation);
        }
    }

    /// Apply every outcome that has arrived since the last frame.
    pub fn drain_messages(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            self.handle_message(msg);
        }
    }

    #[cfg(test)]
    pub async fn next_message(&mut self) -> Option<Message> {
        self.rx.recv().await
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if self.list.search_mode && self.detail.is_none() {
            self.on_search_key(key.code);
            return;
        }

        if matches!(key.code, KeyCode::Char('?') | KeyCode::F(1)) {
            self.show_help = !self.show_help;
            return;
        }

        // any key closes help
        if self.show_help {
            self.show_help = false;
            return;
        }

        match self.screen() {
            Screen::List => self.on_list_key(key.code),
            Screen::Detail => self.on_detail_key(key.code),
        }
    }

    fn on_search_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter | KeyCode::Esc => {
                self.list.search_mode = false;
            }
            KeyCode::Backspace => {
                self.list.search_query.pop();
                self.list.apply_filter();
                self.request_thumbnail();
            }
            KeyCode::Char(c) => {
                self.list.search_query.push(c);
                self.list.apply_filter();
                self.request_thumbnail();
            }
            _ => {}
        }
    }

    fn on_list_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Down | KeyCode::Char('j') => {
                self.list.next();
                self.request_thumbnail();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.list.previous();
                self.request_thumbnail();
            }
            KeyCode::Enter => {
                if let Some(target) = self.list.select() {
                    self.open_detail(target);
                }
            }
            KeyCode::Char('/') => {
                if matches!(self.list.state, LoadState::Ready(_)) {
                    self.list.search_mode = true;
                    self.list.search_query.clear();
                    self.list.apply_filter();
                }
            }
            KeyCode::Esc => {
                if !self.list.search_query.is_empty() {
                    self.list.search_query.clear();
                    self.list.apply_filter();
                    self.request_thumbnail();
                }
            }
            KeyCode::Char('r') => {
                if self.list.can_retry() {
                    self.start_list_fetch();
                }
            }
            _ => {}
        }
    }

    fn on_detail_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Backspace | KeyCode::Left => self.back(),
            KeyCode::Char('r') => {
                if self.detail.as_ref().map_or(false, |d| d.can_retry()) {
                    self.start_detail_fetch();
                }
            }
            _ => {}
        }
    }
}

/// Fetch image bytes and decode them off the async workers.
async fn load_artwork(client: &CatalogClient, address: &str) -> Option<Artwork> {
    let bytes = client.fetch_image(address).await.ok()?;
    let art = tokio::task::spawn_blocking(move || Artwork::decode(&bytes))
        .await
        .ok()
        .flatten();
    if art.is_none() {
        log::warn!("could not decode image at {}", address);
    }
    art
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artwork::tests::sample_png;
    use crate::fetch::tests::{serve, PIKACHU_JSON};
    use crate::observe::NoopObserver;
    use crate::view::{ArtworkState, ThumbState};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    const UPSTREAM_SPRITES: &str = "https://raw.githubusercontent.com/PokeAPI/sprites/master";

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn list_json(base: &str) -> String {
        format!(
            r#"{{"count": 3, "results": [
                {{"name": "bulbasaur", "url": "{base}/pokemon/1/"}},
                {{"name": "ivysaur", "url": "{base}/pokemon/2/"}},
                {{"name": "pikachu", "url": "{base}/pokemon/25/"}}
            ]}}"#
        )
    }

    /// Local catalog: list, pikachu detail (artwork on the same host), sprites.
    async fn catalog(hits: Arc<Mutex<Vec<String>>>) -> String {
        let base_slot: Arc<Mutex<String>> = Arc::new(Mutex::new(String::new()));
        let list_base = base_slot.clone();
        let detail_base = base_slot.clone();
        let app = Router::new()
            .route(
                "/pokemon",
                get(move || {
                    let base = list_base.lock().unwrap().clone();
                    async move { list_json(&base) }
                }),
            )
            .route(
                "/pokemon/25/",
                get(move || {
                    hits.lock().unwrap().push("/pokemon/25/".to_string());
                    let base = detail_base.lock().unwrap().clone();
                    async move { PIKACHU_JSON.replace(UPSTREAM_SPRITES, &base) }
                }),
            )
            .route("/sprites/pokemon/1.png", get(|| async { sample_png() }))
            .route(
                "/sprites/pokemon/other/official-artwork/25.png",
                get(|| async { sample_png() }),
            );
        let base = serve(app).await;
        *base_slot.lock().unwrap() = base.clone();
        base
    }

    fn app(base: &str, images: bool) -> App {
        let client = CatalogClient::new(base).with_observer(Arc::new(NoopObserver));
        App::new(client, base, images)
    }

    async fn pump(app: &mut App) {
        let msg = app.next_message().await.expect("message");
        app.handle_message(msg);
    }

    #[tokio::test]
    async fn test_selecting_entry_fetches_its_address() {
        let hits = Arc::new(Mutex::new(Vec::new()));
        let base = catalog(hits.clone()).await;
        let mut app = app(&base, false);
        app.start();
        assert_eq!(app.list.state, LoadState::Loading);
        pump(&mut app).await;
        assert_eq!(app.list.entries().len(), 3);

        app.on_key(key(KeyCode::Down));
        app.on_key(key(KeyCode::Down));
        app.on_key(key(KeyCode::Enter));
        assert_eq!(app.screen(), Screen::Detail);
        let detail = app.detail.as_ref().unwrap();
        assert_eq!(detail.target.address, format!("{base}/pokemon/25/"));
        assert_eq!(detail.target.display_name, "pikachu");
        assert_eq!(detail.state, LoadState::Loading);

        pump(&mut app).await;
        let detail = app.detail.as_ref().unwrap();
        match &detail.state {
            LoadState::Ready(d) => {
                assert_eq!(d.name, "pikachu");
                assert_eq!(
                    d.primary_image_url,
                    format!("{base}/sprites/pokemon/other/official-artwork/25.png")
                );
            }
            other => panic!("expected Ready, got {other:?}"),
        }
        assert_eq!(detail.artwork, ArtworkState::Disabled);
        assert_eq!(*hits.lock().unwrap(), vec!["/pokemon/25/".to_string()]);

        app.on_key(key(KeyCode::Esc));
        assert_eq!(app.screen(), Screen::List);
    }

    #[tokio::test]
    async fn test_thumbnail_and_artwork_are_loaded() {
        let hits = Arc::new(Mutex::new(Vec::new()));
        let base = catalog(hits).await;
        let mut app = app(&base, true);
        app.start();
        pump(&mut app).await;
        // the first entry is highlighted, so its thumbnail is requested
        assert_eq!(app.list.thumbs.get("1"), Some(&ThumbState::Loading));
        pump(&mut app).await;
        assert!(matches!(app.list.thumbs.get("1"), Some(ThumbState::Ready(_))));

        app.open_detail(NavigationTarget {
            address: format!("{base}/pokemon/25/"),
            display_name: "pikachu".to_string(),
        });
        pump(&mut app).await;
        assert_eq!(
            app.detail.as_ref().unwrap().artwork,
            ArtworkState::Pending
        );
        pump(&mut app).await;
        assert!(matches!(
            app.detail.as_ref().unwrap().artwork,
            ArtworkState::Ready(_)
        ));
    }

    #[tokio::test]
    async fn test_detail_404_fails_with_code() {
        let hits = Arc::new(Mutex::new(Vec::new()));
        let base = catalog(hits).await;
        let mut app = app(&base, false);
        app.open_detail(NavigationTarget {
            address: format!("{base}/pokemon/9999/"),
            display_name: "missingno".to_string(),
        });
        pump(&mut app).await;
        match &app.detail.as_ref().unwrap().state {
            LoadState::Failed(reason) => assert!(reason.contains("404")),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_retry_after_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let router = Router::new().route(
            "/pokemon",
            get(move || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        (StatusCode::SERVICE_UNAVAILABLE, String::new())
                    } else {
                        (StatusCode::OK, list_json("http://unused"))
                    }
                }
            }),
        );
        let base = serve(router).await;
        let mut app = app(&base, false);
        app.start();
        pump(&mut app).await;
        match &app.list.state {
            LoadState::Failed(reason) => assert!(reason.contains("503")),
            other => panic!("expected Failed, got {other:?}"),
        }

        app.on_key(key(KeyCode::Char('r')));
        assert_eq!(app.list.state, LoadState::Loading);
        pump(&mut app).await;
        assert_eq!(app.list.entries().len(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stale_results_are_dropped() {
        let mut app = app("http://127.0.0.1:9", false);
        app.open_detail(NavigationTarget {
            address: "http://127.0.0.1:9/pokemon/25/".to_string(),
            display_name: "pikachu".to_string(),
        });
        app.back();
        app.handle_message(Message {
            generation: 0,
            outcome: Outcome::Detail(Err(FetchError::HttpStatus { code: 500 })),
        });
        assert!(app.detail.is_none());

        app.handle_message(Message {
            generation: 42,
            outcome: Outcome::List(Ok(vec![])),
        });
        assert_eq!(app.list.state, LoadState::Loading);
    }

    #[tokio::test]
    async fn test_reopening_same_address_keeps_view() {
        let mut app = app("http://127.0.0.1:9", false);
        let target = NavigationTarget {
            address: "http://127.0.0.1:9/pokemon/25/".to_string(),
            display_name: "pikachu".to_string(),
        };
        app.open_detail(target.clone());
        app.open_detail(target);
        // only one fetch was spawned
        assert!(app.detail.as_ref().unwrap().owns(0));
    }

    #[tokio::test]
    async fn test_help_and_search_keys() {
        let mut app = app("http://127.0.0.1:9", false);
        app.list.finish_list(Ok(vec![
            CatalogEntry {
                name: "bulbasaur".to_string(),
                url: "http://127.0.0.1:9/pokemon/1/".to_string(),
            },
            CatalogEntry {
                name: "pikachu".to_string(),
                url: "http://127.0.0.1:9/pokemon/25/".to_string(),
            },
        ]));

        app.on_key(key(KeyCode::Char('?')));
        assert!(app.show_help);
        app.on_key(key(KeyCode::Char('x')));
        assert!(!app.show_help);

        app.on_key(key(KeyCode::Char('/')));
        for c in "pika".chars() {
            app.on_key(key(KeyCode::Char(c)));
        }
        // 'q' while searching is text, not quit
        app.on_key(key(KeyCode::Char('q')));
        assert!(!app.should_quit);
        app.on_key(key(KeyCode::Backspace));
        app.on_key(key(KeyCode::Enter));
        assert!(!app.list.search_mode);
        assert_eq!(app.list.visible, vec![1]);
        assert_eq!(app.list.select().unwrap().display_name, "pikachu");

        app.on_key(key(KeyCode::Esc));
        assert_eq!(app.list.visible, vec![0, 1]);
        app.on_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }
}
