use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    availability::BookingEvent,
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cars::{BookingEventList, CarList, CreateCarRequest, UpdateCarRequest},
        contracts::{ContractList, CreateContractRequest, UpdateContractRequest},
        customers::{CreateCustomerRequest, CustomerList, UpdateCustomerRequest},
        preferences::ThemePreference,
    },
    metrics::{
        CategoryCount, ContractSummary, DashboardMetrics, FleetSummary, MonthlyRevenue,
        UpcomingReturn,
    },
    models::{Car, CarWithStatus, Contract, ContractDetail, Customer, User},
    pipeline::SortDirection,
    response::{ApiResponse, Meta},
    routes::{auth, cars, contracts, customers, dashboard, health, params, preferences},
    status::{CarStatus, RentalStatus},
    theme::Theme,
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::me,
        cars::list_cars,
        cars::get_car,
        cars::create_car,
        cars::update_car,
        cars::delete_car,
        cars::car_availability,
        customers::list_customers,
        customers::get_customer,
        customers::customer_contracts,
        customers::create_customer,
        customers::update_customer,
        customers::delete_customer,
        contracts::list_contracts,
        contracts::calendar,
        contracts::get_contract,
        contracts::create_contract,
        contracts::update_contract,
        contracts::delete_contract,
        dashboard::dashboard,
        preferences::get_theme,
        preferences::set_theme
    ),
    components(
        schemas(
            User,
            Car,
            CarWithStatus,
            Customer,
            Contract,
            ContractDetail,
            BookingEvent,
            CarStatus,
            RentalStatus,
            SortDirection,
            Theme,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            CreateCarRequest,
            UpdateCarRequest,
            CreateCustomerRequest,
            UpdateCustomerRequest,
            CreateContractRequest,
            UpdateContractRequest,
            ThemePreference,
            CarList,
            CustomerList,
            ContractList,
            BookingEventList,
            FleetSummary,
            ContractSummary,
            MonthlyRevenue,
            CategoryCount,
            UpcomingReturn,
            DashboardMetrics,
            params::AtQuery,
            health::HealthData,
            Meta,
            ApiResponse<CarList>,
            ApiResponse<ContractList>,
            ApiResponse<CustomerList>,
            ApiResponse<DashboardMetrics>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Cars", description = "Fleet endpoints"),
        (name = "Customers", description = "Customer endpoints"),
        (name = "Contracts", description = "Rental contract and calendar endpoints"),
        (name = "Dashboard", description = "Aggregated fleet and revenue figures"),
        (name = "Preferences", description = "Per-user display preferences"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_resource() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/cars",
            "/api/cars/{id}/availability",
            "/api/customers/{id}/contracts",
            "/api/contracts/calendar",
            "/api/dashboard",
            "/api/preferences/theme",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
