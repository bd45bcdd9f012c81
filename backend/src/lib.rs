pub mod catchers;
pub mod config;
pub mod cors;
pub mod device;
pub mod error;
pub mod feed;
pub mod queries;
pub mod routes;
pub mod store;
pub mod utils;

use rocket::{Build, Rocket};

use crate::cors::CORS;
use crate::routes::AppState;

pub use pollup_shared::{models::*, Error, ErrorCode, PollStatus, VoteError};

/// Assembles the API: every route under `/api`, JSON catchers and the CORS
/// fairing for the configured front-end origin.
pub fn build_rocket(state: AppState) -> Rocket<Build> {
    let cors = CORS::new(state.settings.allowed_origin.clone());

    rocket::build()
        .attach(cors)
        .manage(state)
        .mount(
            "/api",
            rocket::routes![
                routes::list_polls,
                routes::dashboard_stats,
                routes::create_poll,
                routes::get_poll,
                routes::delete_poll,
                routes::get_results,
                routes::vote_status,
                routes::cast_vote,
                routes::track_event,
                routes::poll_analytics,
                routes::poll_feed,
                routes::all_options,
            ],
        )
        .register(
            "/",
            rocket::catchers![
                catchers::bad_request,
                catchers::unauthorized,
                catchers::forbidden,
                catchers::not_found,
                catchers::unprocessable,
                catchers::internal_error,
            ],
        )
}
