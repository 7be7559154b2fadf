use axum::{Router, middleware, routing::get};

use crate::middleware::role::require_admin;
use crate::state::AppState;

use super::controller::{
    create_user, dashboard, delete_user, get_user, list_logs, list_users, log_stats, update_user,
};

pub fn init_admin_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/logs", get(list_logs))
        .route("/logs/stats", get(log_stats))
        .route_layer(middleware::from_fn_with_state(state, require_admin))
}
