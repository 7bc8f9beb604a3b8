use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use std::sync::Arc;

use crate::{boxes, crew, distribution, invoices, user};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

async fn auth(
    auth_header: TypedHeader<Authorization<Basic>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user: Option<user::Model> = user::Entity::find()
        .filter(user::Column::Username.eq(auth_header.username()))
        .filter(user::Column::Password.eq(auth_header.password()))
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let Some(user) = user else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/crew", get(crew::list).post(crew::create))
        .route(
            "/crew/{id}",
            get(crew::get)
                .patch(crew::update)
                .delete(crew::delete),
        )
        .route(
            "/crew/{id}/debts",
            get(crew::debt_history).post(crew::add_debt),
        )
        .route(
            "/crew/{id}/debts/{entry_id}",
            axum::routing::delete(crew::delete_debt),
        )
        .route("/boxes", get(boxes::list).post(boxes::create))
        .route(
            "/boxes/{id}",
            get(boxes::get)
                .patch(boxes::update)
                .delete(boxes::delete),
        )
        .route("/boxes/{id}/status", post(boxes::set_status))
        .route(
            "/boxes/{id}/members",
            get(boxes::roster).put(boxes::set_roster),
        )
        .route(
            "/boxes/{id}/invoices",
            get(invoices::list).post(invoices::create),
        )
        .route("/boxes/{id}/invoices/summary", get(invoices::summary))
        .route(
            "/invoices/{id}",
            axum::routing::patch(invoices::update).delete(invoices::delete),
        )
        .route(
            "/boxes/{id}/distribution/preview",
            post(distribution::preview),
        )
        .route(
            "/boxes/{id}/payments/select",
            post(distribution::select_for_payment),
        )
        .route(
            "/boxes/{id}/payments/confirm",
            post(distribution::confirm_payments),
        )
        .route("/boxes/{id}/close", post(distribution::confirm_final))
        .route("/boxes/{id}/cycle/reset", post(distribution::reset_cycle))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(engine: Engine, db: DatabaseConnection) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, db, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, db, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
