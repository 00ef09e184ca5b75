//! HTTP surface: axum router, handlers and error mapping.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use vboxmanage::{CommandBuilder, ListOptions};

use crate::VERSION;
use crate::config::ResolvedParams;
use crate::dispatch::{DispatchError, Dispatcher, ResponsePayload};
use crate::runner::{CommandRunner, ExecError, ProcessRunner};

/// Echoed back as `msg` in every `/vbox` response.
const LIST_ROUTE: &str = "/vbox";

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub msg: &'static str,
    pub items: ResponsePayload,
}

/// Errors a handler turns into a JSON error response.
#[derive(Debug)]
pub enum ApiError {
    /// A `sort`/`long` value that is not a boolean.
    InvalidFlag { name: String, value: String },
    Dispatch(DispatchError),
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        ApiError::Dispatch(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidFlag { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Dispatch(DispatchError::UnknownDirective(_)) => StatusCode::BAD_REQUEST,
            ApiError::Dispatch(DispatchError::Execution {
                source: ExecError::Timeout { .. },
                ..
            }) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Dispatch(DispatchError::Execution { .. }) => StatusCode::BAD_GATEWAY,
            ApiError::Dispatch(DispatchError::Parse { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::InvalidFlag { name, value } => json!({
                "detail": format!("'{value}' is not a valid boolean for '{name}'"),
            }),
            ApiError::Dispatch(err) => json!({
                "detail": err.to_string(),
                "directive": err.directive(),
                "stage": err.stage(),
            }),
        };
        (status, Json(body)).into_response()
    }
}

/// Lenient boolean as accepted for `sort` and `long`.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Split `/vbox` query pairs into directive names and list options.
///
/// `query` may repeat; for `sort` and `long` the last occurrence wins.
/// Other keys are ignored.
fn list_request(pairs: Vec<(String, String)>) -> Result<(Vec<String>, ListOptions), ApiError> {
    let mut names = Vec::new();
    let mut options = ListOptions::default();
    for (key, value) in pairs {
        let flag = match key.as_str() {
            "query" => {
                names.push(value);
                continue;
            }
            "sort" => &mut options.sort,
            "long" => &mut options.long,
            _ => continue,
        };
        *flag = parse_bool(&value).ok_or(ApiError::InvalidFlag { name: key, value })?;
    }
    Ok((names, options))
}

async fn list_vbox<R: CommandRunner + 'static>(
    State(dispatcher): State<Arc<Dispatcher<R>>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<(StatusCode, Json<ListResponse>), ApiError> {
    let (names, options) = list_request(pairs).inspect_err(|e| warn!(?e, "bad /vbox query"))?;
    let items = dispatcher.handle(&names, options).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(ListResponse {
            msg: LIST_ROUTE,
            items,
        }),
    ))
}

async fn get_vbox_by_id(Path(id): Path<String>) -> impl IntoResponse {
    (
        StatusCode::NOT_IMPLEMENTED,
        Json(json!({ "detail": format!("lookup of '{id}' is not implemented") })),
    )
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "version": VERSION }))
}

/// Build the application router around a shared dispatcher.
pub fn router<R: CommandRunner + 'static>(dispatcher: Arc<Dispatcher<R>>) -> Router {
    Router::new()
        .route(LIST_ROUTE, get(list_vbox::<R>))
        .route("/vbox/{id}", get(get_vbox_by_id))
        .route("/health", get(health))
        .with_state(dispatcher)
}

/// Serve `dispatcher` on an already bound listener until `shutdown` fires.
pub async fn serve_on<R: CommandRunner + 'static>(
    listener: TcpListener,
    dispatcher: Arc<Dispatcher<R>>,
    shutdown: CancellationToken,
) -> Result<()> {
    let addr = listener.local_addr().context("listener has no local address")?;
    info!(%addr, program = dispatcher.builder().program(), "listening on http://{addr}");

    axum::serve(listener, router(dispatcher))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("http server failed")?;

    info!("server stopped");
    Ok(())
}

/// Bind `params`' address and serve real `VBoxManage` invocations.
///
/// Returns once `shutdown` is cancelled and in-flight requests drain.
pub async fn serve(params: ResolvedParams, shutdown: CancellationToken) -> Result<()> {
    let runner = ProcessRunner::new(params.command_timeout);
    let dispatcher = Arc::new(Dispatcher::new(
        CommandBuilder::new(params.program.clone()),
        runner,
    ));

    let addr = params.socket_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    serve_on(listener, dispatcher, shutdown).await
}

/// Run the server until Ctrl+C.
pub async fn run(params: ResolvedParams) -> Result<()> {
    let shutdown = CancellationToken::new();
    let shutdown_signal = shutdown.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("ctrl+c received, shutting down");
        shutdown_signal.cancel();
    });
    serve(params, shutdown).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(list: &[(&str, &str)]) -> Vec<(String, String)> {
        list.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn booleans() {
        for raw in ["true", "True", "1", "yes", "ON", " on "] {
            assert_eq!(parse_bool(raw), Some(true), "{raw}");
        }
        for raw in ["false", "FALSE", "0", "no", "off"] {
            assert_eq!(parse_bool(raw), Some(false), "{raw}");
        }
        for raw in ["", "2", "maybe", "t"] {
            assert_eq!(parse_bool(raw), None, "{raw}");
        }
    }

    #[test]
    fn query_pairs_become_names_and_options() {
        let (names, options) = list_request(pairs(&[
            ("query", "vms"),
            ("sort", "true"),
            ("query", "hostinfo"),
            ("query", "vms"),
            ("page", "2"),
        ]))
        .unwrap();
        assert_eq!(names, ["vms", "hostinfo", "vms"]);
        assert_eq!(options, ListOptions::new(true, false));

        let (names, options) = list_request(Vec::new()).unwrap();
        assert!(names.is_empty());
        assert_eq!(options, ListOptions::default());
    }

    #[test]
    fn last_flag_occurrence_wins() {
        let (_, options) = list_request(pairs(&[("long", "1"), ("long", "no")])).unwrap();
        assert!(!options.long);
    }

    #[test]
    fn bad_flag_is_unprocessable() {
        let err = list_request(pairs(&[("long", "maybe")])).unwrap_err();
        assert!(matches!(
            err,
            ApiError::InvalidFlag { ref name, ref value } if name == "long" && value == "maybe"
        ));
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
