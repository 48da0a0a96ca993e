//! Interactive mode: an upload form that previews the sheet and offers the
//! label PDF for download.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::DOWNLOAD_FILE_NAME;
use crate::error::AppError;
use crate::font::LabelFont;
use crate::loader::{load_table_from_bytes, SheetTable};
use crate::render::{LabelRenderer, RenderSummary};
use crate::symbol::Symbology;

/// Largest accepted upload
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Multipart field carrying the workbook
const UPLOAD_FIELD: &str = "file";

/// Generated PDFs kept for download; older ones are dropped first
const MAX_STORED_DOWNLOADS: usize = 16;

/// Rows shown in the preview table
const PREVIEW_ROW_LIMIT: usize = 500;

/// Generated PDFs waiting to be downloaded, keyed by id
#[derive(Debug, Default)]
pub struct DownloadStore {
    next_id: u64,
    order: VecDeque<u64>,
    pdfs: HashMap<u64, Bytes>,
}

impl DownloadStore {
    /// Keep `pdf` and return the id it can be downloaded under.
    pub fn insert(&mut self, pdf: Vec<u8>) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.pdfs.insert(id, Bytes::from(pdf));
        self.order.push_back(id);

        while self.order.len() > MAX_STORED_DOWNLOADS {
            if let Some(expired) = self.order.pop_front() {
                self.pdfs.remove(&expired);
            }
        }
        id
    }

    pub fn get(&self, id: u64) -> Option<Bytes> {
        self.pdfs.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.pdfs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pdfs.is_empty()
    }
}

/// State shared across handlers
#[derive(Clone)]
pub struct ServerState {
    pub font: Arc<LabelFont>,
    pub symbology: Symbology,
    pub downloads: Arc<RwLock<DownloadStore>>,
}

impl ServerState {
    pub fn new(font: LabelFont, symbology: Symbology) -> Self {
        ServerState {
            font: Arc::new(font),
            symbology,
            downloads: Arc::new(RwLock::new(DownloadStore::default())),
        }
    }
}

impl Default for ServerState {
    fn default() -> Self {
        ServerState::new(LabelFont::Builtin, Symbology::DataMatrix)
    }
}

/// Build the router for the upload form
pub fn build_router(state: ServerState) -> Router {
    Router::new()
        .route("/", get(upload_form))
        .route("/labels", post(generate_labels))
        .route("/labels/{download_id}", get(download_labels))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the upload server and run until the process is stopped
pub async fn start_server(addr: &str, state: ServerState) -> Result<(), AppError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::ServerError(format!("cannot listen on {}: {}", addr, e)))?;
    info!("Label form available at http://{}", listener.local_addr()?);

    axum::serve(listener, build_router(state))
        .await
        .map_err(|e| AppError::ServerError(e.to_string()))
}

// ============================================================================
// Handlers
// ============================================================================

async fn health_check() -> &'static str {
    "ok"
}

async fn upload_form() -> Html<String> {
    Html(form_page(None))
}

/// Generated labels plus the sheet they came from
struct GeneratedLabels {
    table: SheetTable,
    summary: RenderSummary,
    pdf: Vec<u8>,
}

async fn generate_labels(State(state): State<ServerState>, mut multipart: Multipart) -> Response {
    let upload = match read_upload(&mut multipart).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            return form_error(StatusCode::BAD_REQUEST, "Choose a spreadsheet to upload.");
        }
        Err(message) => return form_error(StatusCode::BAD_REQUEST, &message),
    };

    let render_state = state.clone();
    let result = tokio::task::spawn_blocking(move || build_labels(upload, &render_state)).await;

    match result {
        Ok(Ok(generated)) => {
            let download_id = state.downloads.write().await.insert(generated.pdf);
            Html(result_page(&generated.table, &generated.summary, download_id)).into_response()
        }
        Ok(Err(e)) if e.is_input_error() => {
            form_error(StatusCode::UNPROCESSABLE_ENTITY, &e.to_string())
        }
        Ok(Err(e)) => {
            error!("Label generation failed: {}", e);
            form_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
        Err(e) => {
            error!("Label generation task failed: {}", e);
            form_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Label generation failed unexpectedly.",
            )
        }
    }
}

async fn download_labels(
    State(state): State<ServerState>,
    Path(download_id): Path<u64>,
) -> Response {
    match state.downloads.read().await.get(download_id) {
        Some(pdf) => (
            [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", DOWNLOAD_FILE_NAME),
                ),
            ],
            pdf,
        )
            .into_response(),
        None => form_error(
            StatusCode::NOT_FOUND,
            "This download is no longer available. Upload the spreadsheet again.",
        ),
    }
}

async fn read_upload(multipart: &mut Multipart) -> Result<Option<Vec<u8>>, String> {
    while let Some(field) = multipart.next_field().await.map_err(|e| e.to_string())? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let bytes = field.bytes().await.map_err(|e| e.to_string())?;
        if bytes.is_empty() {
            return Ok(None);
        }
        return Ok(Some(bytes.to_vec()));
    }
    Ok(None)
}

fn build_labels(upload: Vec<u8>, state: &ServerState) -> Result<GeneratedLabels, AppError> {
    let (table, records) = load_table_from_bytes(upload, None)?;
    info!("Uploaded workbook has {} locations", records.len());

    let renderer = LabelRenderer::new(&state.font, &state.symbology);
    let (pdf, summary) = renderer.render_to_bytes(&records)?;
    info!(
        "Generated {} labels on {} pages",
        summary.labels.len(),
        summary.pages
    );
    Ok(GeneratedLabels {
        table,
        summary,
        pdf,
    })
}

// ============================================================================
// Page
// ============================================================================

fn form_error(status: StatusCode, message: &str) -> Response {
    (status, Html(form_page(Some(message)))).into_response()
}

fn form_page(error: Option<&str>) -> String {
    let error_block = error
        .map(|msg| format!("<p class=\"error\">{}</p>", escape_html(msg)))
        .unwrap_or_default();
    page(&error_block)
}

/// Form again, followed by the download control and the sheet preview.
fn result_page(table: &SheetTable, summary: &RenderSummary, download_id: u64) -> String {
    let download = format!(
        "<p class=\"download\"><a href=\"/labels/{id}\" download=\"{file}\">Download PDF with labels</a> \
         ({labels} labels, {pages} pages)</p>\n",
        id = download_id,
        file = DOWNLOAD_FILE_NAME,
        labels = summary.labels.len(),
        pages = summary.pages,
    );
    page(&format!("{}{}", download, preview_table(table)))
}

fn preview_table(table: &SheetTable) -> String {
    let mut html = String::from("<h2>File preview</h2>\n<table class=\"preview\">\n<tr>");
    for header in &table.headers {
        html.push_str(&format!("<th>{}</th>", escape_html(header)));
    }
    html.push_str("</tr>\n");

    for row in table.rows.iter().take(PREVIEW_ROW_LIMIT) {
        html.push_str("<tr>");
        for cell in row {
            html.push_str(&format!("<td>{}</td>", escape_html(cell)));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>\n");

    if table.rows.len() > PREVIEW_ROW_LIMIT {
        html.push_str(&format!(
            "<p>Showing the first {} of {} rows.</p>\n",
            PREVIEW_ROW_LIMIT,
            table.rows.len()
        ));
    }
    html
}

fn page(content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="es">
<head>
<meta charset="utf-8">
<title>Shelf labels</title>
<style>
body {{ font-family: sans-serif; margin: 3em auto; max-width: 60em; }}
.error {{ color: #b00020; font-weight: bold; }}
.download a {{ font-weight: bold; }}
.preview {{ border-collapse: collapse; }}
.preview th, .preview td {{ border: 1px solid #ccc; padding: 0.2em 0.6em; }}
</style>
</head>
<body>
<h1>Shelf label generator</h1>
<form action="/labels" method="post" enctype="multipart/form-data">
<p>Upload a spreadsheet with a <code>Ubicaciones</code> column.</p>
<input type="file" name="{field}" accept=".xlsx,.xlsm,.xls,.ods" required>
<button type="submit">Generate labels</button>
</form>
{content}
</body>
</html>
"#,
        field = UPLOAD_FIELD,
        content = content,
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
