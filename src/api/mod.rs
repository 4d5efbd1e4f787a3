// JSON API over the engine

pub mod handlers;
pub mod models;
pub mod routes;
