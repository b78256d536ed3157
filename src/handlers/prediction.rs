use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use charts::{Page, CONTENT_TYPE};
use std::io::Write;
use tracing::{debug, error, instrument, trace, warn};
use validator::Validate;

use crate::debug::DebugOutcome;
use crate::error::DebugError;
use crate::schemas::{AppState, DebugPathParams};

/// Render the forecast debug page of a prediction job
///
/// The page shows the recorded history of the job's first metric and the
/// engine's forecast overlaid on the held-out actual values.
#[utoipa::path(
    get,
    path = "/api/v1/prediction/debug/{namespace}/{name}",
    tag = "prediction",
    params(DebugPathParams),
    responses(
        (status = 200, description = "Debug page rendered", content_type = "text/html", body = String),
        (status = 400, description = "Missing identifier, unknown job or unsupported algorithm"),
        (status = 500, description = "Backend failure", body = crate::schemas::ErrorResponse),
        (status = 504, description = "Forecast engine timed out", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn display_debug_page(
    Path(params): Path<DebugPathParams>,
    State(state): State<AppState>,
) -> Response {
    trace!("Entering display_debug_page function");

    if let Err(errors) = params.validate() {
        warn!("Invalid debug path parameters: {}", errors);
        return StatusCode::BAD_REQUEST.into_response();
    }

    match state.debug.display(&params.namespace, &params.name).await {
        Ok(DebugOutcome::BadRequest(reason)) => {
            debug!(
                "Debug request for {}/{} rejected: {}",
                params.namespace, params.name, reason
            );
            StatusCode::BAD_REQUEST.into_response()
        }
        Ok(DebugOutcome::Rendered(page)) => {
            let mut body = Vec::new();
            match write_page(&page, &mut body) {
                Ok(()) => ([(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response(),
                Err(e) => {
                    error!(
                        "Failed to write debug page for {}/{}: {}",
                        params.namespace, params.name, e
                    );
                    e.into_response()
                }
            }
        }
        Err(e) => {
            error!(
                "Debug page for {}/{} failed: {}",
                params.namespace, params.name, e
            );
            e.into_response()
        }
    }
}

/// Writes the whole page or reports why it could not, a partial page is never served.
fn write_page<W: Write>(page: &Page, writer: &mut W) -> Result<(), DebugError> {
    page.render(writer).map_err(DebugError::PageRender)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug::render_debug_page;
    use crate::test_utils::test_utils::sample_signals;
    use std::io;

    /// Accepts a few bytes, then fails every write
    struct ShortWriter {
        remaining: usize,
    }

    impl Write for ShortWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.remaining == 0 {
                return Err(io::Error::new(io::ErrorKind::WriteZero, "writer is full"));
            }
            let n = buf.len().min(self.remaining);
            self.remaining -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_page_failure_is_server_error() {
        let page = render_debug_page(sample_signals()).unwrap();
        let mut writer = ShortWriter { remaining: 64 };

        let err = write_page(&page, &mut writer).unwrap_err();
        assert!(matches!(err, DebugError::PageRender(_)));
        assert_eq!(err.code(), "PAGE_RENDER_ERROR");

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_write_page_writes_whole_document() {
        let page = render_debug_page(sample_signals()).unwrap();
        let mut body = Vec::new();

        write_page(&page, &mut body).unwrap();
        assert_eq!(String::from_utf8(body).unwrap(), page.to_html().unwrap());
    }
}
