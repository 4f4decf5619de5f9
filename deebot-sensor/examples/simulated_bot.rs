use std::sync::Arc;
use std::time::Duration;

use deebot_sensor::prelude::*;
use deebot_sensor::{init_logging, LoggingMode};
use tokio::time::timeout;

/// Replay a short cleaning run on `bot`
async fn simulate_run(bot: Arc<VacuumBot>) {
    let events = bot.events();
    let pause = Duration::from_millis(200);

    events.status.notify(StatusEvent::available());
    events
        .water_info
        .notify(WaterInfoEvent::with_amount(WaterAmount::Medium));
    events.lifespan.notify(
        LifeSpanEvent::new()
            .with(LifeSpan::Brush, 91.0)
            .with(LifeSpan::SideBrush, 77.5)
            .with(LifeSpan::Filter, 40.0),
    );
    tokio::time::sleep(pause).await;

    for minute in 1..=3u64 {
        events.stats.notify(StatsEvent {
            area: Some(minute as u32 * 4),
            time: Some(minute * 60),
            clean_type: Some("auto".to_string()),
            cid: Some("1001".to_string()),
            start: Some(1_700_000_000),
        });
        tokio::time::sleep(pause).await;
    }

    events.error.notify(ErrorEvent::new(102, Some("wheel stuck")));
    events.clean_logs.notify(CleanLogEvent::new(vec![CleanLogEntry::new(
        1_700_000_180,
        "https://maps.example/run-1001.png",
    )]));
    events
        .total_stats
        .notify(TotalStatsEvent::new(1240, 93_600, 57));
    tokio::time::sleep(pause).await;

    events.status.notify(StatusEvent::unavailable());
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LoggingMode::Development)?;

    println!("1. Building hub...");
    let config = HubConfig::new()
        .with_device(
            DeviceInfo::new("E0001")
                .with_nick("Downstairs")
                .with_device_name("DEEBOT OZMO 950"),
        )
        .with_legacy_room_sensors(true);
    let hub = DeebotHub::from_config(config)?;

    let bot = Arc::clone(hub.bot("E0001").ok_or("bot missing")?);
    bot.set_rooms(vec![
        Room::new(1, "Kitchen"),
        Room::new(2, "Bedroom"),
        Room::new(5, "Bedroom"),
    ]);

    println!("2. Registering sensors...");
    let platform = EntityPlatform::new();
    let count = setup_entry(&hub, &platform);
    println!("✓ {} sensors registered", count);

    println!("\n3. Replaying a cleaning run...");
    let mut changes = platform.store().subscribe_changes();
    let run = tokio::spawn(simulate_run(Arc::clone(&bot)));

    loop {
        match timeout(Duration::from_secs(2), changes.recv()).await {
            Ok(Ok(change)) => {
                if let Some(state) = change.new_state {
                    let unit = state.unit_of_measurement.unwrap_or_default();
                    println!("  {} = {} {}", state.name, state.state, unit);
                }
            }
            Ok(Err(e)) => {
                println!("✗ Change stream error: {}", e);
                break;
            }
            Err(_) => break,
        }
    }
    run.await?;

    println!("\n4. Polling room sensors...");
    bot.set_rooms(vec![Room::new(1, "Kitchen"), Room::new(7, "Kitchen")]);
    platform.update_polled();
    if let Some(state) = platform.store().get("E0001_room_kitchen") {
        println!("  {} = {}", state.name, state.state);
    }

    println!("\n5. Unloading...");
    platform.unload();
    println!("✓ {} listeners left", bot.events().listener_count());

    Ok(())
}
