pub mod admin;
pub mod errors;
pub mod link;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod utils;

use crate::{config, repo};

pub struct AppState {
    pub repo: repo::ImplAppRepo,
    pub config: config::AppConfig,
}
