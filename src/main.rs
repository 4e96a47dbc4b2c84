use chrono::{Duration, NaiveDate};
use kvansum::{
    catalog::seed,
    habit::{InMemoryHabitRepository, InMemoryLogRepository},
    progress::{InMemoryProgressRepository, InMemoryStatsRepository},
    AppState, Clock, EventBus, FixedClock, InMemoryCatalogRepository, LogStatus,
    ProgressionConfig, ProgressionService,
};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEMO_USER: &str = "demo-user";
const DEMO_DAYS: i64 = 35;

/// Outcome of each starter habit on the `n`th demo day
fn scripted_outcome(habit_id: &str, n: i64) -> Option<LogStatus> {
    match habit_id {
        "h-water" | "h-bed" => Some(LogStatus::Success),
        "h-stretch" if n % 5 == 4 => Some(LogStatus::Fail),
        "h-stretch" => Some(LogStatus::Success),
        "h-cold" if n % 7 >= 5 => Some(LogStatus::Skipped),
        "h-cold" => Some(LogStatus::Success),
        _ => None,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kvansum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ProgressionConfig::from_env();
    info!(?config, "Starting Kvansum progression demo");

    let start = NaiveDate::from_ymd_opt(2025, 9, 1).ok_or("invalid demo start date")?;
    let clock = Arc::new(FixedClock::at_day(start));
    let events = Arc::new(EventBus::new());
    let habits = seed::starter_habits(DEMO_USER);

    let state = AppState {
        habit_repository: Arc::new(InMemoryHabitRepository::with_habits(habits.clone())),
        log_repository: Arc::new(InMemoryLogRepository::new()),
        progress_repository: Arc::new(InMemoryProgressRepository::new()),
        stats_repository: Arc::new(InMemoryStatsRepository::new()),
        catalog: Arc::new(InMemoryCatalogRepository::seeded()),
        notifications: events.clone(),
        clock: clock.clone(),
        config,
    };
    let service = ProgressionService::new(state);

    let mut receiver = events.subscribe_to_user(DEMO_USER).await;
    let listener = tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(event) => info!(event_type = event.event_type(), ?event, "Notification"),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Notification listener lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    for n in 0..DEMO_DAYS {
        let date = (start + Duration::days(n)).to_string();
        for habit in &habits {
            let Some(status) = scripted_outcome(&habit.id, n) else {
                continue;
            };
            if let Err(err) = service
                .log_completion(DEMO_USER, &habit.id, &date, status, None)
                .await
            {
                warn!(habit_id = %habit.id, %date, error = %err, "Completion rejected");
            }
        }
        clock.advance_days(1);
        tokio::task::yield_now().await;
    }

    let (today, week) = service.dashboard(DEMO_USER).await?;
    info!(
        date = %today.date,
        completed = today.completed,
        total = today.total,
        days = week.len(),
        "Dashboard"
    );

    let snapshot = service.snapshot(DEMO_USER).await?;
    info!(
        as_of = %clock.today(),
        "Final snapshot:\n{}",
        serde_json::to_string_pretty(&snapshot)?
    );

    drop(service);
    drop(events);
    listener.abort();
    Ok(())
}
