use std::env;

use chrono::Utc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use car_rental_api::{
    client::ApiClient,
    metrics::{DashboardMetrics, compute_dashboard},
    models::{CarWithStatus, ContractDetail, Customer},
    pipeline::{PipelineQuery, SortDirection, SortState, view_pipeline},
    snapshot::RecordSnapshot,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,car_rental_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_url =
        env::var("DASHBOARD_API_URL").unwrap_or_else(|_| "http://127.0.0.1:3000".to_string());
    let email = env::var("DASHBOARD_EMAIL")?;
    let password = env::var("DASHBOARD_PASSWORD")?;
    let search = env::var("DASHBOARD_SEARCH").unwrap_or_default();
    let page = env::var("DASHBOARD_PAGE")
        .ok()
        .and_then(|p| p.parse::<usize>().ok())
        .unwrap_or(1);

    let mut client = ApiClient::new(base_url)?;
    client.login(&email, &password).await?;
    tracing::info!(%email, "logged in");

    let cars = RecordSnapshot::<CarWithStatus>::new();
    let contracts = RecordSnapshot::<ContractDetail>::new();
    let customers = RecordSnapshot::<Customer>::new();

    tokio::join!(
        cars.refresh(client.list_cars()),
        contracts.refresh(client.list_contracts()),
        customers.refresh(client.list_customers()),
    );

    let now = Utc::now();
    let cars = cars.items().await;
    let contracts = contracts.items().await;
    let customers = customers.items().await;

    let query = PipelineQuery {
        search,
        status_filter: None,
        sort: SortState::by("start_date", SortDirection::Desc),
        page,
        ..PipelineQuery::default()
    };
    let view = view_pipeline(&contracts, &query, now);

    println!(
        "Contracts (page {}/{}, {} matching)",
        view.page,
        view.total_pages.max(1),
        view.total_count
    );
    for detail in &view.items {
        println!(
            "  {:<10} {:<24} {:<10} {} -> {}  {:>10}",
            detail.contract.status_at(now).as_str(),
            detail.customer.full_name(),
            detail.car.license_plate,
            detail.contract.start_date.format("%Y-%m-%d %H:%M"),
            detail.contract.end_date.format("%Y-%m-%d %H:%M"),
            detail.contract.total_amount,
        );
    }

    let metrics = match client.dashboard().await {
        Ok(metrics) => metrics,
        Err(err) => {
            tracing::warn!(error = %err, "dashboard endpoint failed, computing locally");
            compute_dashboard(&cars, &contracts, customers.len(), now)
        }
    };
    print_metrics(&metrics);

    Ok(())
}

fn print_metrics(metrics: &DashboardMetrics) {
    println!();
    println!(
        "Fleet: {} cars, {} available, {} busy ({:.1}% utilization)",
        metrics.fleet.total, metrics.fleet.available, metrics.fleet.busy, metrics.fleet.utilization
    );
    println!(
        "Contracts: {} total, {} confirmed, {} active, {} completed",
        metrics.contracts.total,
        metrics.contracts.confirmed,
        metrics.contracts.active,
        metrics.contracts.completed
    );
    println!("Customers: {}", metrics.customers);
    println!(
        "Revenue: {} paid, {} outstanding",
        metrics.revenue_paid, metrics.revenue_outstanding
    );
    for month in &metrics.monthly_revenue {
        println!("  {}  {:>12}  ({} contracts)", month.month, month.amount, month.contracts);
    }
    if !metrics.upcoming_returns.is_empty() {
        println!("Returns due soon:");
        for ret in &metrics.upcoming_returns {
            println!(
                "  {:<10} {:<24} {}",
                ret.license_plate,
                ret.customer_name,
                ret.end_date.format("%Y-%m-%d %H:%M")
            );
        }
    }
}
