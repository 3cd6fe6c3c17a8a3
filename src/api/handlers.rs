use super::cache::UrlCache;
use super::caller::Caller;
use super::error::{ApiError, ApiResult};
use crate::domain::{Role, TagTarget};
use crate::engine::Engine;
use crate::jobs::{run_bulk_tagging, BulkTagItem, JobLedger};
use crate::requests::{Creation, PendingQuery, RequestOutcome, TaggingInput};
use crate::shared::ids::{EventId, JobId, NotificationId, RequestId, SectionId, UserId, VideoId};
use crate::shared::serde_ext::split_csv;
use crate::shared::WorkflowError;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// Shared by every handler: the engine plus the per-caller URL cache.
#[derive(Clone)]
pub struct ApiState {
    engine: Arc<Engine>,
    url_cache: UrlCache,
}

impl ApiState {
    pub fn new(engine: Engine) -> Self {
        let ttl = Duration::from_secs(engine.settings().notifications.url_cache_ttl_seconds);
        Self {
            engine: Arc::new(engine),
            url_cache: UrlCache::new(ttl),
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn url_cache(&self) -> &UrlCache {
        &self.url_cache
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingParams {
    pub event_id: EventId,
    #[serde(default)]
    pub section_id: Option<SectionId>,
    #[serde(default)]
    pub video_id: Option<VideoId>,
    /// Comma separated; empty or absent means every role.
    #[serde(default)]
    pub roles: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TeamMemberBody {
    pub event_id: EventId,
    pub user_id: UserId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TaggingBody {
    pub event_id: EventId,
    #[serde(default)]
    pub video_id: Option<VideoId>,
    #[serde(default)]
    pub section_id: Option<SectionId>,
    pub role: Role,
    pub target_user_id: UserId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RemoveTagBody {
    pub event_id: EventId,
    #[serde(default)]
    pub video_id: Option<VideoId>,
    #[serde(default)]
    pub section_id: Option<SectionId>,
    pub role: Role,
    pub user_id: UserId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BulkTagBody {
    pub items: Vec<BulkTagItem>,
}

/// `GET /requests/pending?eventId&sectionId|videoId&roles`
pub async fn get_pending_requests(
    State(state): State<ApiState>,
    Caller(actor): Caller,
    params: Result<Query<PendingParams>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(params) = params.map_err(|err| ApiError::bad_request(err.body_text()))?;
    let roles = params
        .roles
        .as_deref()
        .map(split_csv)
        .unwrap_or_default()
        .iter()
        .map(|role| Role::parse(role))
        .collect::<Result<Vec<_>, _>>()
        .map_err(ApiError::bad_request)?;
    let pending = state.engine.request_service().pending_requests_for_caller(
        &actor,
        &PendingQuery {
            event_id: params.event_id,
            section_id: params.section_id,
            video_id: params.video_id,
            roles,
        },
    )?;
    Ok(Json(encode(&pending)?))
}

/// `GET /requests/incoming`
pub async fn get_incoming_requests(
    State(state): State<ApiState>,
    Caller(actor): Caller,
) -> ApiResult<Json<Value>> {
    let requests = state.engine.request_service().incoming_requests(&actor)?;
    Ok(Json(json!({ "requests": requests })))
}

/// `POST /requests/tagging`
pub async fn post_tagging_request(
    State(state): State<ApiState>,
    Caller(actor): Caller,
    body: Result<Json<TaggingBody>, JsonRejection>,
) -> ApiResult<Response> {
    let body = json_body(body)?;
    let outcome = state.engine.request_service().create_tagging_request(
        &actor,
        TaggingInput {
            event_id: body.event_id,
            video_id: body.video_id,
            section_id: body.section_id,
            role: body.role,
            target_user_id: body.target_user_id,
        },
    )?;
    let body = json!({ "directTag": outcome.direct_apply, "request": outcome.request });
    Ok((outcome_status(&outcome), Json(body)).into_response())
}

/// `POST /events/{event_id}/team-requests`
pub async fn post_team_request(
    State(state): State<ApiState>,
    Caller(actor): Caller,
    Path(event_id): Path<String>,
) -> ApiResult<Response> {
    let event_id: EventId = parse_path(&event_id, "event id")?;
    let outcome = state
        .engine
        .request_service()
        .request_team_membership(&actor, &event_id)?;
    Ok((outcome_status(&outcome), Json(encode(&outcome)?)).into_response())
}

/// `POST /events/{event_id}/ownership-claims`
pub async fn post_ownership_claim(
    State(state): State<ApiState>,
    Caller(actor): Caller,
    Path(event_id): Path<String>,
) -> ApiResult<Response> {
    let event_id: EventId = parse_path(&event_id, "event id")?;
    let outcome = state
        .engine
        .request_service()
        .claim_ownership(&actor, &event_id)?;
    Ok((outcome_status(&outcome), Json(encode(&outcome)?)).into_response())
}

/// `POST /requests/{request_id}/{approve|deny|cancel}`
pub async fn post_request_decision(
    State(state): State<ApiState>,
    Caller(actor): Caller,
    Path((request_id, decision)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    let request_id: RequestId = parse_path(&request_id, "request id")?;
    let service = state.engine.request_service();
    let request = match decision.as_str() {
        "approve" => service.approve_request(&actor, &request_id)?,
        "deny" => service.deny_request(&actor, &request_id)?,
        "cancel" => service.cancel_request(&actor, &request_id)?,
        other => {
            return Err(ApiError::bad_request(format!(
                "unknown request decision `{other}`"
            )))
        }
    };
    Ok(Json(json!({ "request": request })))
}

/// `POST /team-members {eventId, userId}`
pub async fn post_team_member(
    State(state): State<ApiState>,
    Caller(actor): Caller,
    body: Result<Json<TeamMemberBody>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let body = json_body(body)?;
    let added = state
        .engine
        .request_service()
        .add_team_member(&actor, &body.event_id, &body.user_id)?;
    Ok(Json(json!({ "added": added })))
}

/// `DELETE /team-members {eventId, userId}`
pub async fn delete_team_member(
    State(state): State<ApiState>,
    Caller(actor): Caller,
    body: Result<Json<TeamMemberBody>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let body = json_body(body)?;
    let removed = state
        .engine
        .request_service()
        .remove_team_member(&actor, &body.event_id, &body.user_id)?;
    Ok(Json(json!({ "removed": removed })))
}

/// `DELETE /tags`
pub async fn delete_tag(
    State(state): State<ApiState>,
    Caller(actor): Caller,
    body: Result<Json<RemoveTagBody>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let body = json_body(body)?;
    let target = TagTarget::from_parts(body.event_id, body.video_id, body.section_id)
        .map_err(ApiError::bad_request)?;
    let removed = state
        .engine
        .request_service()
        .remove_tag(&actor, &target, body.role, &body.user_id)?;
    Ok(Json(json!({ "removed": removed })))
}

/// `GET /notifications?limit=n`
pub async fn get_notifications(
    State(state): State<ApiState>,
    Caller(actor): Caller,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(params) = params.map_err(|err| ApiError::bad_request(err.body_text()))?;
    let limit = params
        .limit
        .unwrap_or(state.engine.settings().notifications.list_limit)
        .clamp(1, crate::config::MAX_NOTIFICATION_LIST_LIMIT);
    let service = state.engine.notification_service();
    let notifications = service.list_for_user(&actor.id, limit)?;
    let unread = service.count_unread(&actor.id)?;
    Ok(Json(
        json!({ "notifications": notifications, "unread": unread }),
    ))
}

/// `GET /notifications/{id}/url`; 404 unless the caller owns the notification.
pub async fn get_notification_url(
    State(state): State<ApiState>,
    Caller(actor): Caller,
    Path(notification_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let notification_id: NotificationId = parse_path(&notification_id, "notification id")?;
    if let Some(url) = state.url_cache.get(&actor.id, &notification_id).await {
        return Ok(Json(json!({ "url": url })));
    }
    let url = resolve_url(&state.engine, &actor.id, &notification_id)?;
    state
        .url_cache
        .insert(&actor.id, &notification_id, url.clone())
        .await;
    Ok(Json(json!({ "url": url })))
}

fn resolve_url(
    engine: &Engine,
    user_id: &UserId,
    notification_id: &NotificationId,
) -> Result<Option<String>, WorkflowError> {
    let notification = engine
        .notification_service()
        .find_owned(user_id, notification_id)?;
    Ok(engine
        .target_resolver()
        .resolve(&notification, &engine.related_lookup()))
}

/// `POST /notifications/{id}/dismiss`
pub async fn post_dismiss_notification(
    State(state): State<ApiState>,
    Caller(actor): Caller,
    Path(notification_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let notification_id: NotificationId = parse_path(&notification_id, "notification id")?;
    state
        .engine
        .notification_service()
        .mark_as_old(&actor.id, &notification_id)?;
    Ok(Json(json!({ "dismissed": true })))
}

/// `POST /notifications/dismiss-all`
pub async fn post_dismiss_all_notifications(
    State(state): State<ApiState>,
    Caller(actor): Caller,
) -> ApiResult<Json<Value>> {
    let count = state
        .engine
        .notification_service()
        .mark_all_as_old(&actor.id)?;
    Ok(Json(json!({ "dismissed": count })))
}

/// `POST /jobs/bulk-tag {items}`; answers 202 with the finished job record.
pub async fn post_bulk_tag_job(
    State(state): State<ApiState>,
    Caller(actor): Caller,
    body: Result<Json<BulkTagBody>, JsonRejection>,
) -> ApiResult<Response> {
    let body = json_body(body)?;
    let engine = &state.engine;
    let job = run_bulk_tagging(
        &engine.request_service(),
        engine.jobs(),
        &actor,
        body.items,
        engine.settings().jobs.max_bulk_items,
    )?;
    Ok((StatusCode::ACCEPTED, Json(encode(&job)?)).into_response())
}

/// `GET /jobs/{job_id}`; only the creator of a job or an admin may poll it.
pub async fn get_job(
    State(state): State<ApiState>,
    Caller(actor): Caller,
    Path(job_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let job_id: JobId = parse_path(&job_id, "job id")?;
    match state.engine.jobs().get_job(&job_id).map_err(WorkflowError::from)? {
        Some(job) if job.created_by == actor.id || actor.is_admin() => Ok(Json(encode(&job)?)),
        _ => Err(WorkflowError::not_found("job", &job_id).into()),
    }
}

pub async fn fallback(uri: Uri) -> ApiError {
    ApiError(WorkflowError::not_found("route", uri.path()))
}

/// A freshly stored pending request answers 201; direct application and reuse answer 200.
fn outcome_status(outcome: &RequestOutcome) -> StatusCode {
    if outcome.creation == Some(Creation::Created) {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    }
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(body)| body)
        .map_err(|err| ApiError::bad_request(format!("invalid body: {}", err.body_text())))
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|err| {
        ApiError(WorkflowError::Internal(format!(
            "failed to encode response: {err}"
        )))
    })
}

fn parse_path<T: std::str::FromStr<Err = String>>(raw: &str, kind: &str) -> Result<T, ApiError> {
    raw.parse::<T>()
        .map_err(|err| ApiError::bad_request(format!("invalid {kind} `{raw}`: {err}")))
}
