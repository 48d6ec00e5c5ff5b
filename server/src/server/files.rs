use crate::file::{calculate_content_hash, detect_file_type};
use crate::server::Server;
use axum::body::Body;
use axum::extract::State;
use axum::http::header::{CONTENT_TYPE, ETAG, IF_NONE_MATCH};
use axum::http::{HeaderMap, Response, StatusCode, Uri};
use axum::response::IntoResponse;
use kiln_shared::{KilnError, KilnResult};
use log::debug;
use percent_encoding::percent_decode_str;
use std::path::PathBuf;
use std::sync::Arc;

/// Serves a file from the output directory, falling back to the generated
/// `index.html` for any path that does not name an existing file.
pub async fn serve_static_handler(
    State(server): State<Arc<Server>>,
    uri: Uri,
    headers: HeaderMap,
) -> Response<Body> {
    match serve_static_impl(&server, uri.path(), &headers).await {
        Ok(response) => response,
        Err(err) => err.response().into_response(),
    }
}

async fn serve_static_impl(
    server: &Server,
    request_path: &str,
    headers: &HeaderMap,
) -> KilnResult<Response<Body>> {
    let ctx = server.context();
    let decoded = percent_decode_str(request_path).decode_utf8_lossy();
    let path = match ctx.resolve_output_file(&decoded) {
        Some(path) => path,
        None => {
            debug!("no file for {}, serving index", request_path);
            ctx.index_file()
        }
    };

    file_response(path, headers).await
}

async fn file_response(path: PathBuf, headers: &HeaderMap) -> KilnResult<Response<Body>> {
    let bytes = fs_err::tokio::read(&path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => KilnError::FileNotFound(path.display().to_string()),
        _ => e.into(),
    })?;
    let etag = format!("\"{}\"", calculate_content_hash(&bytes));

    let not_modified = headers
        .get(IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.split(',').any(|tag| tag.trim() == etag));

    let builder = Response::builder()
        .header(CONTENT_TYPE, detect_file_type(&path).content_type())
        .header(ETAG, &etag);

    let response = if not_modified {
        builder.status(StatusCode::NOT_MODIFIED).body(Body::empty())
    } else {
        builder.status(StatusCode::OK).body(Body::from(bytes))
    };

    response.map_err(|e| KilnError::Build(e.into()))
}
