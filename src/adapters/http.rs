use crate::config::TomlConfig;
use crate::core::engine::ExportEngine;
use crate::core::{ExportRequest, Layout, Pipeline};
use crate::utils::error::{ErrorKind, ExportError, Result};
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::StreamExt;
use std::future::Future;
use std::io::{self, Write};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub const EXPORT_ROUTE: &str = "/export/zip";
pub const HEALTH_ROUTE: &str = "/health";

const CHUNK_SIZE: usize = 64 * 1024;
const CHANNEL_CAPACITY: usize = 8;

#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub allowed_origin: String,
    pub archive_filename: String,
}

impl HttpSettings {
    pub fn from_config(config: &TomlConfig) -> Self {
        Self {
            allowed_origin: config.cors.allowed_origin.clone(),
            archive_filename: config.export.archive_filename.clone(),
        }
    }
}

struct AppState<P: Pipeline> {
    engine: ExportEngine<P>,
    content_disposition: HeaderValue,
}

pub fn router<P: Pipeline + 'static>(engine: ExportEngine<P>, settings: &HttpSettings) -> Result<Router> {
    let origin = HeaderValue::from_str(&settings.allowed_origin).map_err(|e| {
        ExportError::InvalidConfigValueError {
            field: "cors.allowed_origin".to_string(),
            value: settings.allowed_origin.clone(),
            reason: e.to_string(),
        }
    })?;
    let disposition = format!("attachment; filename=\"{}\"", settings.archive_filename);
    let content_disposition = HeaderValue::from_str(&disposition).map_err(|e| {
        ExportError::InvalidConfigValueError {
            field: "export.archive_filename".to_string(),
            value: settings.archive_filename.clone(),
            reason: e.to_string(),
        }
    })?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::POST])
        .allow_headers([CONTENT_TYPE]);

    let state = Arc::new(AppState {
        engine,
        content_disposition,
    });

    Ok(Router::new()
        .route(EXPORT_ROUTE, post(export_zip::<P>))
        .route(HEALTH_ROUTE, get(health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

async fn export_zip<P: Pipeline + 'static>(State(state): State<Arc<AppState<P>>>, body: Bytes) -> Response {
    let layout = match parse_request(&body) {
        Ok(layout) => layout,
        Err(e) => {
            tracing::warn!("Rejected export request: {}", e);
            return failure_response(&e);
        }
    };

    let prepared = match state.engine.prepare(&layout).await {
        Ok(prepared) => prepared,
        Err(e) => return failure_response(&e),
    };
    let export_id = prepared.export_id();

    let (tx, mut rx) = mpsc::channel::<io::Result<Bytes>>(CHANNEL_CAPACITY);
    tokio::task::spawn_blocking(move || {
        let sink = ChannelWriter::new(tx.clone(), CHUNK_SIZE);
        if prepared.stream_into(sink).is_err() {
            // Already logged by the engine; fail the body instead of ending it cleanly.
            let _ = tx.blocking_send(Err(io::Error::other("export failed")));
        }
    });

    // Headers are committed only once the first chunk exists, so a failure
    // before that still becomes a plain 500.
    match rx.recv().await {
        Some(Ok(first)) => zip_response(state.content_disposition.clone(), first, rx),
        Some(Err(_)) | None => {
            tracing::error!(export_id, "Export produced no archive data");
            failure_response(&ExportError::archive_io(io::Error::other("no archive data")))
        }
    }
}

/// An empty body is the empty layout; anything else must be an export request object.
pub fn parse_request(body: &[u8]) -> Result<Layout> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Layout::default());
    }

    serde_json::from_slice::<ExportRequest>(body)
        .map(ExportRequest::into_layout)
        .map_err(|e| ExportError::InvalidRequestError {
            message: e.to_string(),
        })
}

pub fn failure_response(err: &ExportError) -> Response {
    let (status, message) = match err.kind() {
        ErrorKind::Request => (StatusCode::BAD_REQUEST, "Invalid export request"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "Failed to generate ZIP"),
    };

    let body = serde_json::json!({
        "statusCode": status.as_u16(),
        "message": message,
        "error": status.canonical_reason().unwrap_or("Error"),
    });
    (status, Json(body)).into_response()
}

fn zip_response(
    content_disposition: HeaderValue,
    first: Bytes,
    rx: mpsc::Receiver<io::Result<Bytes>>,
) -> Response {
    let rest = futures_util::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|chunk| (chunk, rx))
    });
    let stream = futures_util::stream::once(async move { Ok::<_, io::Error>(first) }).chain(rest);

    let mut response = Response::new(Body::from_stream(stream));
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/zip"));
    headers.insert(CONTENT_DISPOSITION, content_disposition);
    response
}

/// Blocking writer feeding the response body. Bytes leave in `chunk_size`
/// pieces and the tail leaves on `flush`, so a closed body surfaces as a
/// `BrokenPipe` from whichever call hits it. Must not be used from inside the
/// async runtime.
#[derive(Debug)]
pub struct ChannelWriter {
    tx: mpsc::Sender<io::Result<Bytes>>,
    buffer: Vec<u8>,
    chunk_size: usize,
}

impl ChannelWriter {
    pub fn new(tx: mpsc::Sender<io::Result<Bytes>>, chunk_size: usize) -> Self {
        Self {
            tx,
            buffer: Vec::with_capacity(chunk_size),
            chunk_size,
        }
    }

    fn send_buffer(&mut self) -> io::Result<()> {
        let chunk = Bytes::from(std::mem::replace(
            &mut self.buffer,
            Vec::with_capacity(self.chunk_size),
        ));
        self.tx
            .blocking_send(Ok(chunk))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "client disconnected"))
    }
}

impl Write for ChannelWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        if self.buffer.len() >= self.chunk_size {
            self.send_buffer()?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        self.send_buffer()
    }
}
