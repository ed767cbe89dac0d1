//! HTTP boundary of the esports arena
//!
//! Public routes: health check, OpenAPI document and Swagger UI. Every other
//! route sits behind [`middleware::require_auth`], which turns the session
//! token into the [`arena_core::Principal`] the workflow operates as.

pub mod handlers;
pub mod middleware;
pub mod models;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use arena_core::ArenaService;
use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use handlers::{labs, system, teams, tournaments, watch_parties};

/// Application state shared across handlers
pub struct AppState {
    pub service: ArenaService,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Esports Arena API",
        version = "0.1.0",
        description = "Teams, lab bookings, tournaments and watch parties for the school esports program"
    ),
    paths(
        system::health_check,
        system::current_principal,
        system::change_events,
        teams::my_teams,
        teams::available_teams,
        teams::create_team,
        teams::update_team,
        teams::delete_team,
        teams::join_team,
        teams::leave_team,
        labs::list_labs,
        labs::available_labs,
        labs::my_bookings,
        labs::create_booking,
        labs::update_booking,
        labs::delete_booking,
        tournaments::my_tournaments,
        tournaments::available_tournaments,
        tournaments::tournament_options,
        tournaments::create_tournament,
        tournaments::update_tournament,
        tournaments::delete_tournament,
        tournaments::register_for_tournament,
        tournaments::unregister_from_tournament,
        watch_parties::my_watch_parties,
        watch_parties::available_watch_parties,
        watch_parties::attendee_count,
        watch_parties::create_watch_party,
        watch_parties::update_watch_party,
        watch_parties::delete_watch_party,
        watch_parties::join_watch_party,
        watch_parties::leave_watch_party,
    ),
    components(
        schemas(
            models::ErrorResponse,
            models::HealthResponse,
            models::AttendeeCount,
            arena_core::Outcome,
            arena_core::ErrorCode,
            arena_core::Principal,
            arena_core::ChangeEvent,
            arena_core::ChangeAction,
            arena_core::Collection,
            arena_core::TeamInput,
            arena_core::TeamView,
            arena_core::TeamField,
            arena_core::LabView,
            arena_core::LabField,
            arena_core::BookingInput,
            arena_core::BookingView,
            arena_core::TournamentInput,
            arena_core::TournamentView,
            arena_core::TournamentOption,
            arena_core::TournamentField,
            arena_core::WatchPartyInput,
            arena_core::WatchPartyView,
            arena_core::WatchPartyField,
        )
    ),
    tags(
        (name = "teams", description = "Team roster endpoints"),
        (name = "labs", description = "Computer lab and booking endpoints"),
        (name = "tournaments", description = "Tournament and registration endpoints"),
        (name = "watch-parties", description = "Watch party and attendance endpoints"),
        (name = "system", description = "Health, session and change-event endpoints")
    )
)]
pub struct ApiDoc;

/// API server configuration
pub struct ApiServerConfig {
    /// Address to bind the API server
    pub bind_addr: SocketAddr,
    /// Enable CORS for local development origins
    pub enable_cors: bool,
    /// Secret used to validate session tokens
    pub jwt_secret: String,
}

/// API Server
pub struct ApiServer {
    config: ApiServerConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    pub fn new(config: ApiServerConfig, service: ArenaService) -> Self {
        let state = Arc::new(AppState { service });
        Self { config, state }
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let auth_state = middleware::AuthState::new(
            self.config.jwt_secret.as_bytes(),
            self.state.service.db().clone(),
        );

        let public_router = Router::new()
            .route("/api/health", get(system::health_check))
            .with_state(self.state.clone());

        let protected_router = Router::new()
            .route("/api/me", get(system::current_principal))
            .route("/api/events", get(system::change_events))
            .route(
                "/api/teams",
                get(teams::available_teams).post(teams::create_team),
            )
            .route("/api/teams/mine", get(teams::my_teams))
            .route(
                "/api/teams/{id}",
                put(teams::update_team).delete(teams::delete_team),
            )
            .route("/api/teams/{id}/join", post(teams::join_team))
            .route("/api/teams/{id}/leave", post(teams::leave_team))
            .route("/api/labs", get(labs::list_labs))
            .route("/api/labs/available", get(labs::available_labs))
            .route("/api/bookings", post(labs::create_booking))
            .route("/api/bookings/mine", get(labs::my_bookings))
            .route(
                "/api/bookings/{id}",
                put(labs::update_booking).delete(labs::delete_booking),
            )
            .route(
                "/api/tournaments",
                get(tournaments::available_tournaments).post(tournaments::create_tournament),
            )
            .route("/api/tournaments/mine", get(tournaments::my_tournaments))
            .route(
                "/api/tournaments/options",
                get(tournaments::tournament_options),
            )
            .route(
                "/api/tournaments/{id}",
                put(tournaments::update_tournament).delete(tournaments::delete_tournament),
            )
            .route(
                "/api/tournaments/{id}/register",
                post(tournaments::register_for_tournament),
            )
            .route(
                "/api/tournaments/{id}/unregister",
                post(tournaments::unregister_from_tournament),
            )
            .route(
                "/api/watch-parties",
                get(watch_parties::available_watch_parties)
                    .post(watch_parties::create_watch_party),
            )
            .route(
                "/api/watch-parties/mine",
                get(watch_parties::my_watch_parties),
            )
            .route(
                "/api/watch-parties/{id}",
                put(watch_parties::update_watch_party).delete(watch_parties::delete_watch_party),
            )
            .route(
                "/api/watch-parties/{id}/attendees",
                get(watch_parties::attendee_count),
            )
            .route(
                "/api/watch-parties/{id}/join",
                post(watch_parties::join_watch_party),
            )
            .route(
                "/api/watch-parties/{id}/leave",
                post(watch_parties::leave_watch_party),
            )
            .with_state(self.state.clone())
            .layer(axum_middleware::from_fn_with_state(
                auth_state,
                middleware::require_auth,
            ));

        let mut router = Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", ApiDoc::openapi()))
            .merge(public_router)
            .merge(protected_router)
            .layer(TraceLayer::new_for_http());

        if self.config.enable_cors {
            // Cookie sessions need credentials, so origins are listed rather than `Any`
            let cors = CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
                .allow_credentials(true)
                .allow_origin(AllowOrigin::predicate(|origin: &HeaderValue, _| {
                    let origin = origin.to_str().unwrap_or("");
                    origin.starts_with("http://localhost:")
                        || origin.starts_with("http://127.0.0.1:")
                        || origin.starts_with("https://localhost:")
                        || origin.starts_with("https://127.0.0.1:")
                }));
            router = router.layer(cors);
        }

        router
    }

    /// Serve until `shutdown` resolves
    pub async fn start<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let router = self.build_router();

        info!("Starting API server on {}", self.config.bind_addr);
        info!(
            "OpenAPI document: http://{}/api/openapi.json",
            self.config.bind_addr
        );
        info!("Swagger UI: http://{}/swagger-ui", self.config.bind_addr);

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr)
            .await
            .with_context(|| format!("Failed to bind {}", self.config.bind_addr))?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .context("API server error")?;

        info!("API server stopped");
        Ok(())
    }
}
