//! Headless monitoring dashboard.
//!
//! Restores the saved session (or logs in with `MONITORING_USER` and
//! `MONITORING_PASSWORD`), then reports this month's performance and the
//! first page of work items for the default division.

use anyhow::{bail, Context};
use tracing::{info, warn};

use monitoring_api::ClientConfig;
use monitoring_shared::constants::APP_NAME;
use monitoring_client::events::event_channel;
use monitoring_client::pages::{HomePage, LoginPage, PerformancePage};
use monitoring_client::{init_tracing, AppState, Route};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    info!("Starting {} v{}", APP_NAME, env!("CARGO_PKG_VERSION"));

    let config = ClientConfig::from_env();
    info!(?config, "Loaded configuration");

    let (events, mut event_rx) = event_channel();
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            info!(event = event.name(), "UI event");
        }
    });

    let mut app = AppState::new(config, events).context("failed to start the client")?;

    if app.route == Route::Login {
        let (Ok(user), Ok(password)) = (
            std::env::var("MONITORING_USER"),
            std::env::var("MONITORING_PASSWORD"),
        ) else {
            bail!("no saved session; set MONITORING_USER and MONITORING_PASSWORD to log in");
        };

        let mut login = LoginPage::new(app.api.clone());
        login.choose_user(&user);
        login.password = password;
        let next = login.submit().await.context("login failed")?;
        app.navigate(next.path());
    }

    let identity = app.identity()?;
    info!(user = %identity.user_name, user_id = %identity.user_id, "Signed in");
    let hub = app.hub_endpoint()?;
    info!(url = %hub.url, "Chat hub endpoint");

    app.navigate(Route::Performance.path());
    let today = chrono::Local::now().date_naive();
    let mut performance = PerformancePage::new(app.api.clone(), today);
    performance.mount().await?;
    let (from, to) = performance.range();
    for row in performance.rows() {
        info!(
            division = %row.division_name,
            plan = row.plan_count,
            fact = row.fact_count,
            percentage = format_args!("{:.1}", row.percentage),
            "Performance"
        );
    }
    let totals = performance.totals();
    info!(
        %from,
        %to,
        plan = totals.plan,
        fact = totals.fact,
        percentage = format_args!("{:.1}", totals.percentage),
        "Performance total"
    );

    app.navigate(Route::Home.path());
    let mut home = HomePage::new(app.api.clone(), app.config.page_size);
    if let Err(e) = home.mount().await {
        if e.redirect() == Some(Route::Login) {
            warn!("Session rejected by the server, clearing it");
            app.logout().await?;
        }
        return Err(e.into());
    }

    match (home.division(), home.items()) {
        (Some(division), Some(page)) => {
            info!(
                division,
                name = %home.division_name(),
                page = page.current_page,
                pages = page.total_pages,
                total = page.total_count,
                "Work items"
            );
            for item in &page.items {
                info!(
                    document = %item.document_number,
                    work = %item.work_name,
                    executor = %item.executor,
                    deadline = ?item.effective_deadline(),
                    closed = item.is_closed(),
                    "Work item"
                );
            }
            for notice in home.notifications() {
                info!(title = %notice.title, by = %notice.user_name, "Notification");
            }
        }
        _ => warn!("No division available to this user"),
    }

    Ok(())
}
