use std::path::{Component, Path as FsPath};

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use mime_guess::MimeGuess;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::info;

use super::error::{ApiError, ApiResult};
use super::AppContext;
use crate::downloader::utils::{output_template, sanitize_title};
use crate::downloader::{ExtractionMode, ExtractionOutput, FormatClass};
use crate::search::{Track, SEARCH_LIMIT};

const INDEX_HTML: &str = include_str!("../../static/index.html");
const DEFAULT_TITLE: &str = "song";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub songs: Vec<Track>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DownloadRequest {
    pub video_id: Option<String>,
    pub title: Option<String>,
    pub format: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DownloadResponse {
    pub success: bool,
    pub message: String,
    pub filename: String,
    pub method: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PreviewRequest {
    pub video_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    pub success: bool,
    pub stream_url: String,
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(req)| req)
        .map_err(|rejection| ApiError::invalid(rejection.body_text()))
}

fn required_video_id(video_id: Option<String>) -> ApiResult<String> {
    video_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::invalid("Video ID is required"))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn search(
    State(ctx): State<AppContext>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> ApiResult<Json<SearchResponse>> {
    let query = body(payload)?.query.unwrap_or_default();
    if query.is_empty() {
        return Err(ApiError::invalid("Please enter a search query"));
    }

    let items = ctx.search.search_songs(&query, SEARCH_LIMIT).await?;
    let songs: Vec<Track> = items.into_iter().map(Track::from).collect();
    info!("[Api] search {:?} -> {} songs", query, songs.len());

    Ok(Json(SearchResponse { songs }))
}

pub async fn download(
    State(ctx): State<AppContext>,
    payload: Result<Json<DownloadRequest>, JsonRejection>,
) -> ApiResult<Json<DownloadResponse>> {
    let req = body(payload)?;
    let video_id = required_video_id(req.video_id)?;

    let title = req.title.unwrap_or_else(|| DEFAULT_TITLE.to_string());
    let mut safe_title = sanitize_title(&title);
    if safe_title.is_empty() {
        safe_title = DEFAULT_TITLE.to_string();
    }

    let template = output_template(&ctx.config.downloads_dir, &safe_title);
    let plan = ctx
        .strategies
        .build(FormatClass::from_request(req.format.as_deref()), Some(template));

    let success = ctx.downloader.run(&video_id, &plan, ExtractionMode::Download).await?;
    let filename = match &success.output {
        ExtractionOutput::File(path) => path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string()),
        ExtractionOutput::StreamUrl(_) => {
            return Err(ApiError::CollaboratorFailure(
                "extractor returned a stream URL for a download".to_string(),
            ))
        }
    };

    Ok(Json(DownloadResponse {
        success: true,
        message: format!("Downloaded: {}", filename),
        filename,
        method: success.method_label(),
    }))
}

pub async fn preview(
    State(ctx): State<AppContext>,
    payload: Result<Json<PreviewRequest>, JsonRejection>,
) -> ApiResult<Json<PreviewResponse>> {
    let video_id = required_video_id(body(payload)?.video_id)?;

    let plan = ctx.strategies.build(FormatClass::BestAudio, None);
    let success = ctx.downloader.run(&video_id, &plan, ExtractionMode::Probe).await?;

    match success.output {
        ExtractionOutput::StreamUrl(stream_url) => Ok(Json(PreviewResponse {
            success: true,
            stream_url,
        })),
        ExtractionOutput::File(_) => Err(ApiError::CollaboratorFailure(
            "extractor wrote a file for a preview".to_string(),
        )),
    }
}

/// A single plain file name, nothing that could climb out of the downloads dir
fn is_plain_file_name(name: &str) -> bool {
    let mut components = FsPath::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains('/')
        && !name.contains('\\')
}

pub async fn serve_download(
    State(ctx): State<AppContext>,
    Path(filename): Path<String>,
) -> ApiResult<Response> {
    if !is_plain_file_name(&filename) {
        return Err(ApiError::invalid("Invalid file name"));
    }

    let path = ctx.config.downloads_dir.join(&filename);
    let not_found = || ApiError::NotFound(format!("File not found: {}", filename));
    let file = match File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(not_found()),
        Err(e) => return Err(ApiError::CollaboratorFailure(e.to_string())),
    };
    let metadata = file
        .metadata()
        .await
        .map_err(|e| ApiError::CollaboratorFailure(e.to_string()))?;
    if !metadata.is_file() {
        return Err(not_found());
    }

    let mime = MimeGuess::from_path(&path).first_or_octet_stream();
    let mut response = Body::from_stream(ReaderStream::new(file)).into_response();
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(mime.as_ref()) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(metadata.len()));
    if let Ok(value) = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename)) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    Ok(response)
}
