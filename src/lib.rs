pub mod audit;
pub mod availability;
pub mod client;
pub mod config;
pub mod db;
pub mod dto;
pub mod entity;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod pipeline;
pub mod response;
pub mod routes;
pub mod services;
pub mod snapshot;
pub mod state;
pub mod status;
pub mod theme;
