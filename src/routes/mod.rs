// Route exports
pub mod calls;
pub mod recommendations;

pub use recommendations::AppState;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(recommendations::configure)
            .configure(calls::configure),
    );
}
