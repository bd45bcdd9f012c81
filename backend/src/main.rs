use pollup_backend::{
    build_rocket,
    config::Settings,
    queries::PgStore,
    routes::AppState,
    store::Store,
};
use shuttle_runtime::CustomError;
use sqlx::PgPool;
use tracing::info;

#[shuttle_runtime::main]
async fn rocket(
    #[shuttle_shared_db::Postgres] pool: PgPool,
    #[shuttle_runtime::Secrets] secret_store: shuttle_runtime::SecretStore,
) -> shuttle_rocket::ShuttleRocket {
    info!("Starting poll server");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(CustomError::new)?;

    info!("Migrations complete");

    let settings = Settings::from_lookup(|key| secret_store.get(key));
    info!(
        timeout_secs = settings.backend_timeout.as_secs(),
        origin = %settings.allowed_origin,
        "Loaded settings"
    );

    let state = AppState::new(Store::Postgres(PgStore::new(pool)), settings);
    Ok(build_rocket(state).into())
}
