use realtime_notifications::{
    ClientEvent, EventKind, NotificationClient, NotificationClientOptions, NotificationDraft,
    NotificationType,
};
use std::time::Duration;

/// Connects to a notification server and prints every event for a while
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "realtime_notifications=debug".into()),
        )
        .init();

    let endpoint =
        std::env::var("NOTIFICATIONS_URL").unwrap_or_else(|_| "http://localhost:3000/api".into());
    let user_id = std::env::var("NOTIFICATIONS_USER_ID").unwrap_or_else(|_| "demo-user".into());

    println!("📡 Connecting to: {} as {}\n", endpoint, user_id);

    let client = NotificationClient::new(
        &endpoint,
        NotificationClientOptions {
            user_id: Some(user_id.clone()),
            ..Default::default()
        },
    )?;

    client.on(EventKind::Connection, |event| {
        if let ClientEvent::Connection { connected } = event {
            println!("🔌 connected = {}", connected);
        }
    });
    client.on(EventKind::Notification, |event| {
        if let ClientEvent::Notification(n) = event {
            println!("🔔 [{}] {}: {}", n.kind, n.title, n.message);
        }
    });
    client.on(EventKind::LeadUpdate, |event| println!("📈 {:?}", event));
    client.on(EventKind::Error, |event| println!("❌ {:?}", event));

    if let Err(e) = client.initialize().await {
        println!("⚠️  Initial connection failed, retrying in background: {}", e);
    }

    tokio::time::sleep(Duration::from_secs(2)).await;

    if client.is_connected().await {
        let draft = NotificationDraft {
            kind: NotificationType::Info,
            title: "Hello".to_string(),
            message: "Sent from the demo".to_string(),
            url: None,
            actions: None,
        };
        if let Err(e) = client.api().send(&draft, &user_id).await {
            println!("⚠️  Could not send test notification: {}", e);
        }
    }

    tokio::time::sleep(Duration::from_secs(60)).await;

    client.dispose().await;
    println!("👋 Done");
    Ok(())
}
