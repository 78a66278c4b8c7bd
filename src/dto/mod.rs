pub mod auth;
pub mod cars;
pub mod contracts;
pub mod customers;
pub mod preferences;
