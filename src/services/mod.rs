pub mod auth_service;
pub mod car_service;
pub mod contract_service;
pub mod customer_service;
pub mod dashboard_service;
pub mod preference_service;
