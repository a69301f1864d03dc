//! Dashboard demo binary
//!
//! Refreshes a three-panel dashboard a few times to show caching, forced
//! refreshes and failure handling.

use dashboard::{Dashboard, DashboardConfig};
use fetch_lifecycle_testing::MockOutcome;
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const CONFIG: &str = r#"{
    "panels": [
        { "id": "users", "url": "https://api.example.com/users" },
        {
            "id": "Orders",
            "url": "https://api.example.com/orders",
            "options": { "headers": { "Accept": "application/json" }, "credentials": "include" }
        },
        {
            "id": "search",
            "url": "https://api.example.com/search",
            "options": { "method": "post", "body": { "q": "rust" } }
        }
    ]
}"#;

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dashboard=debug,fetch_lifecycle_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Dashboard Example: Fetch Lifecycles ===\n");

    let mut dashboard = Dashboard::from_config(DashboardConfig::from_json(CONFIG)?)?;

    println!(">>> First refresh (orders endpoint is down)");
    let report = dashboard.refresh(|descriptor| {
        if descriptor.endpoint.ends_with("/orders") {
            MockOutcome::status(502, None)
        } else {
            MockOutcome::ok(json!({ "endpoint": descriptor.endpoint }))
        }
    });
    println!("Fetched: {:?}, skipped: {:?}", report.fetched, report.skipped);
    print_status(&dashboard);

    println!("\n>>> Second refresh (everything cached)");
    let report = dashboard.refresh(|_| MockOutcome::network_error("unreachable"));
    println!("Fetched: {:?}, skipped: {:?}", report.fetched, report.skipped);
    print_status(&dashboard);

    println!("\n>>> Forced refresh");
    let report = dashboard.force_refresh(|descriptor| {
        MockOutcome::ok(json!({ "endpoint": descriptor.endpoint, "fresh": true }))
    });
    println!("Fetched: {:?}, skipped: {:?}", report.fetched, report.skipped);
    print_status(&dashboard);

    println!("\n>>> Dispatched actions");
    for action_type in dashboard.history() {
        println!("  {action_type}");
    }

    println!("\n>>> Store");
    println!("{}", serde_json::to_string_pretty(dashboard.store())?);

    Ok(())
}

fn print_status(dashboard: &Dashboard) {
    for line in dashboard.status_lines() {
        println!("  {line}");
    }
}
