//! Handlers for the three protocol operations, plus health/info.

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::json;

use gitpool_pack::build_pack;
use gitpool_protocol::{
    nak, parse_receive_request, parse_upload_request, ref_advertisement, report_status,
    service_banner, AdvertisedRef, RefCommand, Service,
};
use gitpool_refs::{RefError, RefTarget};
use gitpool_repo::{closure, Repository};
use gitpool_store::add_thin_pack;

use crate::body::{content_length, read_capped};
use crate::error::{ServerError, ServerResult};
use crate::router::AppState;

/// Health check handler.
pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Info handler.
pub async fn info_handler() -> Json<serde_json::Value> {
    Json(json!({
        "name": "gitpool-server",
        "version": env!("CARGO_PKG_VERSION"),
        "services": [Service::UploadPack.name(), Service::ReceivePack.name()],
    }))
}

#[derive(Deserialize)]
pub struct InfoRefsParams {
    service: Option<String>,
}

/// `GET /<repo>/info/refs?service=<svc>`: the ref advertisement.
pub async fn info_refs_handler(
    State(state): State<AppState>,
    Path(repo): Path<String>,
    Query(params): Query<InfoRefsParams>,
) -> ServerResult<Response> {
    let name = params.service.ok_or(ServerError::DumbProtocol)?;
    let service = Service::from_name(&name)?;
    let repo = state.backend.open(&repo).await?;

    let mut advertised = Vec::new();
    for (name, id) in repo.advertised_refs().await? {
        let mut entry = AdvertisedRef::new(&name, id);
        if let Some(peeled) = repo.refs().peeled(&name) {
            entry = entry.with_peeled(peeled);
        }
        advertised.push(entry);
    }

    let mut body = service_banner(service)?;
    body.extend_from_slice(&ref_advertisement(service, &advertised)?);
    Ok((
        [(header::CONTENT_TYPE, service.advertisement_content_type())],
        body,
    )
        .into_response())
}

/// `POST /<repo>/<service>`: dispatch a transfer request.
pub async fn service_post_handler(
    State(state): State<AppState>,
    Path((repo, service)): Path<(String, String)>,
    headers: HeaderMap,
    body: Body,
) -> ServerResult<Response> {
    let service = Service::from_name(&service)?;
    let repo = state.backend.open(&repo).await?;
    let bytes = read_capped(body, content_length(&headers), state.max_request_bytes).await?;

    let result = match service {
        Service::ReceivePack => receive_pack(&repo, &bytes).await?,
        Service::UploadPack => upload_pack(&repo, &bytes).await?,
    };
    Ok((
        [(header::CONTENT_TYPE, service.result_content_type())],
        result,
    )
        .into_response())
}

/// The receive operation: unpack first, move refs second.
///
/// A ref must never advance before the objects it points at are durably
/// stored, so the transfer is completed and committed before any command
/// is applied. Rejected commands become `ng` lines, not HTTP errors.
async fn receive_pack(repo: &Repository, body: &[u8]) -> ServerResult<Vec<u8>> {
    let request = parse_receive_request(body)?;
    if !request.pack.is_empty() {
        let count = add_thin_pack(repo.objects(), &request.pack).await?;
        tracing::info!(repo = repo.name(), objects = count, "unpacked transfer");
    }

    let mut results = Vec::with_capacity(request.commands.len());
    for command in &request.commands {
        results.push((command.name.clone(), apply_command(repo, command).await?));
    }
    Ok(report_status(None, &results)?)
}

/// Apply one ref command; `None` means ok, `Some` is the `ng` reason.
async fn apply_command(repo: &Repository, command: &RefCommand) -> ServerResult<Option<String>> {
    let refs = repo.refs();
    let outcome = if command.is_delete() {
        refs.remove_if_equals(&command.name, Some(&RefTarget::Id(command.old)))
            .await
    } else if command.is_create() {
        refs.add_if_absent(&command.name, RefTarget::Id(command.new))
            .await
    } else {
        refs.compare_and_swap(
            &command.name,
            Some(&RefTarget::Id(command.old)),
            RefTarget::Id(command.new),
        )
        .await
    };
    match outcome {
        Ok(true) => Ok(None),
        Ok(false) => Ok(Some("failed to update ref".to_string())),
        Err(RefError::InvalidName { reason, .. }) => Ok(Some(format!("funny refname: {reason}"))),
        Err(err) => Err(err.into()),
    }
}

/// The upload operation: `NAK`, then a pack with the wants' full closure.
async fn upload_pack(repo: &Repository, body: &[u8]) -> ServerResult<Vec<u8>> {
    let request = parse_upload_request(body)?;
    let objects = closure(repo.objects(), &request.wants).await?;
    let pack = build_pack(&objects)?;

    let mut out = nak();
    out.extend_from_slice(&pack);
    tracing::info!(
        repo = repo.name(),
        wants = request.wants.len(),
        objects = objects.len(),
        "served upload"
    );
    Ok(out)
}
