pub mod admin;
pub mod health;
pub mod search;

use actix_web::web;

/// Wires the HTTP surface of spec §6.1 onto the actix-web app.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health))
        .route("/search", web::post().to(search::search))
        .route(
            "/search/session/{session_id}",
            web::get().to(search::get_session_page),
        )
        .route(
            "/search/session/{session_id}/filtered",
            web::get().to(search::get_session_page_filtered),
        )
        .route("/admin/stats", web::get().to(admin::stats))
        .route("/admin/features", web::get().to(admin::features))
        .route("/admin/cache/clear", web::post().to(admin::clear_cache));
}
