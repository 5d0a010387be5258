use async_graphql::Data;
use async_graphql::http::{ALL_WEBSOCKET_PROTOCOLS, GraphiQLSource};
use async_graphql_axum::{GraphQLProtocol, GraphQLRequest, GraphQLResponse, GraphQLWebSocket};
use axum::{
    Router,
    extract::{State, WebSocketUpgrade},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use murmur_api::ChatSchema;
use murmur_types::models::Viewer;

#[derive(Clone)]
pub struct ServerState {
    pub schema: ChatSchema,
    /// Attached to every request and subscription connection.
    pub viewer: Viewer,
}

/// Queries and mutations are POSTed to `/graphql`; subscriptions upgrade
/// a GET on the same path to a WebSocket.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/graphql", get(graphql_ws).post(graphql_http))
        .route("/playground", get(playground))
        .route("/health", get(health))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn graphql_http(State(state): State<ServerState>, req: GraphQLRequest) -> GraphQLResponse {
    let request = req.into_inner().data(state.viewer.clone());
    state.schema.execute(request).await.into()
}

async fn graphql_ws(
    State(state): State<ServerState>,
    protocol: GraphQLProtocol,
    ws: WebSocketUpgrade,
) -> Response {
    ws.protocols(ALL_WEBSOCKET_PROTOCOLS)
        .on_upgrade(move |socket| async move {
            info!(viewer = %state.viewer.user_id, "subscription connection opened");

            let mut data = Data::default();
            data.insert(state.viewer.clone());

            // Ends when the client goes away; its subscriptions are dropped
            // with it, which unregisters them from the bus.
            GraphQLWebSocket::new(socket, state.schema.clone(), protocol)
                .with_data(data)
                .serve()
                .await;

            debug!(viewer = %state.viewer.user_id, "subscription connection closed");
        })
}

async fn playground() -> impl IntoResponse {
    Html(
        GraphiQLSource::build()
            .endpoint("/graphql")
            .subscription_endpoint("/graphql")
            .finish(),
    )
}

async fn health() -> &'static str {
    "OK"
}
