use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context;
use axum::extract::State;
use axum::http::header::{HeaderName, CONTENT_TYPE};
use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;
use notify::{Event, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use tower_livereload::{LiveReloadLayer, Reloader};

use crate::config::Project;
use crate::image::ImageId;
use crate::preview::PreviewRenderer;
use crate::probe::{probe_with_timeout, HttpProbe};
use crate::settings::{SettingsPatch, Variant};
use crate::store::{CarouselState, CarouselStore, LoadResolution, PROBE_TIMEOUT};
use crate::timing::{DerivedTiming, Locale};

mod css;
mod inline_js;
mod page;

struct DevState {
    config_path: PathBuf,
    locale: Locale,
    store: CarouselStore,
    renderer: PreviewRenderer,
    /// Bumped whenever the project file is reloaded; probe outcomes from an
    /// older generation are dropped.
    generation: u64,
}

impl DevState {
    fn load(config_path: PathBuf) -> anyhow::Result<Self> {
        let project = Project::from_yaml_file(&config_path)?;
        let locale = project.locale;
        let store = project.into_store()?;
        let mut renderer = PreviewRenderer::new(store.variant());
        store.start_animation(&mut renderer);
        Ok(Self {
            config_path,
            locale,
            store,
            renderer,
            generation: 0,
        })
    }

    fn reload(&mut self) -> anyhow::Result<()> {
        let fresh = DevState::load(self.config_path.clone())?;
        let generation = self.generation + 1;
        *self = DevState { generation, ..fresh };
        Ok(())
    }

    fn resync(&mut self) {
        let change = self.store.start_animation(&mut self.renderer);
        tracing::debug!(?change, "preview synced");
    }

    fn view(&self) -> StateView {
        let variant = self.store.variant();
        let timing = self.store.timing();
        StateView {
            variant,
            locale: self.locale,
            min_images: variant.min_images(),
            max_images: variant.max_images(),
            speed_label: timing.label.text(self.locale),
            timing,
            preview_style: self
                .renderer
                .snapshot()
                .map(|snap| snap.style_attribute())
                .unwrap_or_default(),
            embed: self.store.generate_embed_code(),
            state: self.store.state().clone(),
        }
    }
}

/// Everything the authoring page and `/state.json` show.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct StateView {
    variant: Variant,
    locale: Locale,
    min_images: usize,
    max_images: usize,
    speed_label: &'static str,
    timing: DerivedTiming,
    preview_style: String,
    embed: Option<String>,
    state: CarouselState,
}

type SharedState = Arc<Mutex<DevState>>;

#[derive(Clone)]
struct AppState {
    dev: SharedState,
    reloader: Reloader,
    probe: HttpProbe,
}

/// Start the authoring server with live reload for a project file.
pub async fn run_dev_server(path: PathBuf, port: u16) -> anyhow::Result<()> {
    let dev = Arc::new(Mutex::new(DevState::load(path.clone())?));

    let livereload = LiveReloadLayer::new();
    let reloader = livereload.reloader();

    // File watcher
    let watch_dev = Arc::clone(&dev);
    let watch_reloader = reloader.clone();
    let watch_target = path.clone();
    let mut watcher = notify::recommended_watcher(move |res: Result<Event, _>| {
        let Ok(event) = res else { return };
        if !event.kind.is_modify() || !event.paths.iter().any(|p| same_file(p, &watch_target)) {
            return;
        }
        match watch_dev.lock() {
            Ok(mut dev) => match dev.reload() {
                Ok(()) => tracing::info!(path = %watch_target.display(), "project reloaded"),
                Err(e) => tracing::warn!("project reload failed: {e:#}"),
            },
            Err(e) => tracing::warn!("dev state lock poisoned: {e}"),
        }
        watch_reloader.reload();
    })?;
    let watch_dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    watcher.watch(watch_dir, RecursiveMode::NonRecursive)?;

    let state = AppState {
        dev,
        reloader,
        probe: HttpProbe::new()?,
    };

    let app = Router::new()
        .route("/", get(serve_page))
        .route("/preview.html", get(serve_preview))
        .route("/embed.txt", get(serve_embed))
        .route("/state.json", get(serve_state))
        .route("/images", post(add_image))
        .route("/images/remove", post(remove_image))
        .route("/settings", post(update_settings))
        .route("/error/clear", post(clear_error))
        .layer(livereload)
        .with_state(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    eprintln!("loopreel dev server");
    eprintln!("  project:  {}", path.display());
    eprintln!("  editor:   http://localhost:{port}/");
    eprintln!("  preview:  http://localhost:{port}/preview.html");
    eprintln!("  embed:    http://localhost:{port}/embed.txt");
    eprintln!("  watching for changes...");
    tracing::info!(%addr, "dev server listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    axum::serve(listener, app).await?;

    // Keep watcher alive
    drop(watcher);
    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a.file_name() == b.file_name(),
    }
}

fn snapshot_view(dev: &SharedState) -> Result<StateView, String> {
    dev.lock()
        .map(|d| d.view())
        .map_err(|e| format!("Lock error: {e}"))
}

// ── Route handlers ────────────────────────────────────────────────────

async fn serve_page(State(app): State<AppState>) -> Html<String> {
    match snapshot_view(&app.dev) {
        Ok(view) => Html(page::build_authoring_page(&view)),
        Err(e) => Html(page::build_error_page(&e)),
    }
}

async fn serve_preview(State(app): State<AppState>) -> Html<String> {
    match snapshot_view(&app.dev) {
        Ok(view) => Html(page::build_preview_frame(&view)),
        Err(e) => Html(page::build_error_page(&e)),
    }
}

async fn serve_embed(State(app): State<AppState>) -> ([(HeaderName, &'static str); 1], String) {
    let body = snapshot_view(&app.dev)
        .ok()
        .and_then(|view| view.embed)
        .unwrap_or_default();
    ([(CONTENT_TYPE, "text/plain; charset=utf-8")], body)
}

async fn serve_state(State(app): State<AppState>) -> ([(HeaderName, &'static str); 1], String) {
    let json = match snapshot_view(&app.dev) {
        Ok(view) => serde_json::to_string(&view).unwrap_or_else(|e| error_json(&e.to_string())),
        Err(e) => error_json(&e),
    };
    ([(CONTENT_TYPE, "application/json")], json)
}

fn error_json(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}

// ── Mutations ─────────────────────────────────────────────────────────

#[derive(Serialize)]
struct MutationResponse {
    ok: bool,
    error: Option<String>,
}

impl MutationResponse {
    fn done(app: &AppState, ok: bool, error: Option<String>) -> axum::Json<Self> {
        app.reloader.reload();
        axum::Json(Self { ok, error })
    }

    fn failed(error: String) -> axum::Json<Self> {
        axum::Json(Self {
            ok: false,
            error: Some(error),
        })
    }
}

#[derive(Deserialize)]
struct AddImageRequest {
    url: String,
}

/// POST /images: validate, probe without holding the lock, then apply.
async fn add_image(
    State(app): State<AppState>,
    axum::Json(req): axum::Json<AddImageRequest>,
) -> axum::Json<MutationResponse> {
    let begun = match app.dev.lock() {
        Ok(mut dev) => {
            let generation = dev.generation;
            dev.store.begin_load(&req.url).map(|ticket| (generation, ticket))
        }
        Err(e) => return MutationResponse::failed(format!("Lock error: {e}")),
    };
    let (generation, ticket) = match begun {
        Ok(begun) => begun,
        Err(e) => return MutationResponse::done(&app, false, Some(e.to_string())),
    };
    // show the loading state while the probe runs
    app.reloader.reload();

    let outcome = probe_with_timeout(&app.probe, ticket.url(), PROBE_TIMEOUT).await;

    let resolution = match app.dev.lock() {
        Ok(mut dev) if dev.generation == generation => {
            let resolution = dev.store.finish_load(ticket, outcome);
            dev.resync();
            resolution
        }
        Ok(_) => LoadResolution::Stale,
        Err(e) => return MutationResponse::failed(format!("Lock error: {e}")),
    };
    match resolution {
        LoadResolution::Accepted(_) => MutationResponse::done(&app, true, None),
        LoadResolution::Rejected(e) => MutationResponse::done(&app, false, Some(e.to_string())),
        LoadResolution::Stale => MutationResponse::done(&app, false, None),
    }
}

#[derive(Deserialize)]
struct RemoveImageRequest {
    id: String,
}

async fn remove_image(
    State(app): State<AppState>,
    axum::Json(req): axum::Json<RemoveImageRequest>,
) -> axum::Json<MutationResponse> {
    let removed = match app.dev.lock() {
        Ok(mut dev) => {
            let removed = dev.store.remove_image(&ImageId::from(req.id.as_str()));
            dev.resync();
            removed
        }
        Err(e) => return MutationResponse::failed(format!("Lock error: {e}")),
    };
    let error = (!removed).then(|| format!("no image with id '{}'", req.id));
    MutationResponse::done(&app, removed, error)
}

async fn update_settings(
    State(app): State<AppState>,
    axum::Json(patch): axum::Json<SettingsPatch>,
) -> axum::Json<MutationResponse> {
    let result = match app.dev.lock() {
        Ok(mut dev) => {
            let result = dev.store.update_settings(&patch);
            dev.resync();
            result
        }
        Err(e) => return MutationResponse::failed(format!("Lock error: {e}")),
    };
    match result {
        Ok(()) => MutationResponse::done(&app, true, None),
        Err(e) => MutationResponse::done(&app, false, Some(e.to_string())),
    }
}

async fn clear_error(State(app): State<AppState>) -> axum::Json<MutationResponse> {
    match app.dev.lock() {
        Ok(mut dev) => dev.store.clear_error(),
        Err(e) => return MutationResponse::failed(format!("Lock error: {e}")),
    }
    MutationResponse::done(&app, true, None)
}
