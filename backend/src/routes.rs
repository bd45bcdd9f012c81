use rocket::{State, Shutdown, delete, get, post, http::Status, serde::json::Json};
use rocket::response::stream::{Event, EventStream};
use rocket::tokio::select;
use rocket::tokio::sync::broadcast::error::RecvError;
use tracing::{debug, instrument, warn};
use pollup_shared::{
    models::*,
    store::with_timeout,
    validation::validate_option_choice,
    CurrentUser, EventTracker, PollService, PollStore, ResultsAggregator, VoteError, VoteService,
};
use crate::{
    config::Settings,
    device::RequestDevice,
    error::ApiError,
    feed::{ChangeFeed, ChangeKind},
    store::Store,
    utils::{parse_poll_id, parse_status_filter},
};

pub struct AppState {
    pub store: Store,
    pub feed: ChangeFeed,
    pub settings: Settings,
}

impl AppState {
    pub fn new(store: Store, settings: Settings) -> Self {
        Self {
            store,
            feed: ChangeFeed::new(settings.feed_capacity),
            settings,
        }
    }
}

#[get("/polls?<status>&<q>")]
pub async fn list_polls(
    state: &State<AppState>,
    user: CurrentUser,
    status: Option<&str>,
    q: Option<&str>,
) -> Result<Json<Vec<PollSummary>>, ApiError> {
    let filter = parse_status_filter(status)?;
    let polls = PollService::new(&state.store, &user)
        .with_timeout(state.settings.backend_timeout)
        .list_my_polls(filter, q)
        .await?;
    Ok(Json(polls))
}

#[get("/polls/stats")]
pub async fn dashboard_stats(state: &State<AppState>, user: CurrentUser) -> Result<Json<DashboardStats>, ApiError> {
    let stats = PollService::new(&state.store, &user)
        .with_timeout(state.settings.backend_timeout)
        .dashboard_stats()
        .await?;
    Ok(Json(stats))
}

#[instrument(skip(state, request, user))]
#[post("/polls", format = "json", data = "<request>")]
pub async fn create_poll(
    state: &State<AppState>,
    user: CurrentUser,
    request: Json<CreatePollRequest>,
) -> Result<(Status, Json<PollDetails>), ApiError> {
    let (poll, options) = PollService::new(&state.store, &user)
        .with_timeout(state.settings.backend_timeout)
        .create_poll(&request)
        .await?;
    Ok((Status::Created, Json(PollDetails { poll, options })))
}

#[get("/polls/<id>")]
pub async fn get_poll(
    state: &State<AppState>,
    id: &str,
    device: RequestDevice<'_>,
) -> Result<Json<PollView>, ApiError> {
    let poll_id = parse_poll_id(id)?;
    let timeout = state.settings.backend_timeout;
    let view = ResultsAggregator::new(&state.store, &device)
        .with_timeout(timeout)
        .poll_view(poll_id)
        .await?;

    let tracker = EventTracker::new(&state.store, &device).with_timeout(timeout);
    if tracker.track(poll_id, EventKind::View, None).await {
        state.feed.publish(poll_id, ChangeKind::EventRecorded { kind: EventKind::View });
    }
    Ok(Json(view))
}

#[instrument(skip(state, user))]
#[delete("/polls/<id>")]
pub async fn delete_poll(state: &State<AppState>, id: &str, user: CurrentUser) -> Result<Status, ApiError> {
    let poll_id = parse_poll_id(id)?;
    PollService::new(&state.store, &user)
        .with_timeout(state.settings.backend_timeout)
        .delete_poll(poll_id)
        .await?;
    state.feed.publish(poll_id, ChangeKind::PollDeleted);
    Ok(Status::NoContent)
}

#[get("/polls/<id>/results")]
pub async fn get_results(
    state: &State<AppState>,
    id: &str,
    device: RequestDevice<'_>,
) -> Result<Json<PollResults>, ApiError> {
    let poll_id = parse_poll_id(id)?;
    let results = ResultsAggregator::new(&state.store, &device)
        .with_timeout(state.settings.backend_timeout)
        .get_poll_results(poll_id)
        .await?;
    Ok(Json(results))
}

#[get("/polls/<id>/vote-status")]
pub async fn vote_status(
    state: &State<AppState>,
    id: &str,
    device: RequestDevice<'_>,
    user: CurrentUser,
) -> Result<Json<VoteStatus>, ApiError> {
    let poll_id = parse_poll_id(id)?;
    let timeout = state.settings.backend_timeout;
    let poll = with_timeout(timeout, state.store.fetch_poll(poll_id))
        .await
        .map_err(VoteError::from)?
        .ok_or(VoteError::NotFound)?;
    let has_voted = VoteService::new(&state.store, &device, &user)
        .with_timeout(timeout)
        .has_voted(poll_id)
        .await?;

    Ok(Json(VoteStatus { poll_id, status: poll.status(), has_voted }))
}

#[instrument(skip(state, request, device, user), fields(poll_id = %id))]
#[post("/polls/<id>/votes", format = "json", data = "<request>")]
pub async fn cast_vote(
    state: &State<AppState>,
    id: &str,
    request: Json<CastVoteRequest>,
    device: RequestDevice<'_>,
    user: CurrentUser,
) -> Result<(Status, Json<Vote>), ApiError> {
    let poll_id = parse_poll_id(id)?;
    let option_id = request.option_id;
    let timeout = state.settings.backend_timeout;

    let options = with_timeout(timeout, state.store.fetch_options(poll_id))
        .await
        .map_err(VoteError::from)?;
    if options.is_empty() {
        return Err(VoteError::NotFound.into());
    }
    validate_option_choice(option_id, &options).map_err(VoteError::from)?;

    let vote = VoteService::new(&state.store, &device, &user)
        .with_timeout(timeout)
        .submit_vote(poll_id, option_id)
        .await?;

    state.feed.publish(poll_id, ChangeKind::VoteCast { option_id });
    Ok((Status::Created, Json(vote)))
}

/// Client-reported sharing events. Views and votes are recorded by the
/// server itself.
#[post("/polls/<id>/events", format = "json", data = "<request>")]
pub async fn track_event(
    state: &State<AppState>,
    id: &str,
    request: Json<TrackEventRequest>,
    device: RequestDevice<'_>,
) -> Result<Status, ApiError> {
    let poll_id = parse_poll_id(id)?;
    if !matches!(request.kind, EventKind::Share | EventKind::CopyLink) {
        return Err(ApiError::UnsupportedEvent(request.kind));
    }

    let tracker = EventTracker::new(&state.store, &device).with_timeout(state.settings.backend_timeout);
    if tracker.track(poll_id, request.kind, request.option_id).await {
        state.feed.publish(poll_id, ChangeKind::EventRecorded { kind: request.kind });
    }
    Ok(Status::Accepted)
}

#[get("/polls/<id>/analytics")]
pub async fn poll_analytics(
    state: &State<AppState>,
    id: &str,
    user: CurrentUser,
) -> Result<Json<PollAnalytics>, ApiError> {
    let poll_id = parse_poll_id(id)?;
    let analytics = PollService::new(&state.store, &user)
        .with_timeout(state.settings.backend_timeout)
        .poll_analytics(poll_id)
        .await?;
    Ok(Json(analytics))
}

/// Server-sent events for one poll, so open result views know when to
/// refresh.
#[get("/polls/<id>/feed")]
pub async fn poll_feed(
    state: &State<AppState>,
    id: &str,
    mut end: Shutdown,
) -> Result<EventStream![], ApiError> {
    let poll_id = parse_poll_id(id)?;
    let mut changes = state.feed.subscribe();
    debug!(%poll_id, "Feed subscriber connected");

    Ok(EventStream! {
        loop {
            let change = select! {
                received = changes.recv() => match received {
                    Ok(change) => change,
                    Err(RecvError::Closed) => break,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(%poll_id, skipped, "Feed subscriber lagged");
                        continue;
                    }
                },
                _ = &mut end => break,
            };

            if change.poll_id == poll_id {
                yield Event::json(&change);
            }
        }
    })
}

#[rocket::options("/<_..>")]
pub async fn all_options() -> Status {
    Status::Ok
}
