use actix_web::web;
use expertsearch_common::SearchError;

use crate::error::ApiError;

pub mod search;
pub mod system;

/// Register every route plus the JSON body error handler
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        ApiError(SearchError::invalid_input(err.to_string())).into()
    }))
    .service(search::vector_search)
    .service(search::traditional_search)
    .service(search::search_stats)
    .service(system::health_check);
}
