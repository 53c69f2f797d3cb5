//! Arcade session replay
//!
//! Seeds a catalog into an in-memory store, replays a short play session
//! through the evaluation pipeline and shows the resulting unlocks through
//! the notification scheduler, one at a time.
//!
//! Usage: `arcade [catalog.ron] [engine.ron]`. Set `RUST_LOG=debug` to see
//! the scheduler transitions.

use laurel_core::{GameId, UserId, Value, ValueMap};
use laurel_db::Store;
use laurel_engine::{EngineConfig, EvaluationPipeline};
use laurel_notify::{
    ApiClient, Delivery, NotificationService, NotificationView, SchedulerConfig, SchedulerEvent,
    ScoreResponse,
};
use laurel_script::Loader;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

const BUILTIN_CATALOG: &str = include_str!("../data/catalog.ron");

/// Prints notifications and reports each dismissal back to `main`
struct ConsoleView {
    dismissed: mpsc::UnboundedSender<String>,
}

impl NotificationView for ConsoleView {
    fn render(&mut self, event: &SchedulerEvent) {
        match event {
            SchedulerEvent::Shown { item, at } => {
                println!("[{at:>6} ms] {} {} (+{} XP)", item.icon, item.title, item.xp_reward);
            }
            SchedulerEvent::Dismissed { id, reason, at } => {
                println!("[{at:>6} ms]   {id} dismissed ({reason:?})");
                let _ = self.dismissed.send(id.clone());
            }
            SchedulerEvent::Cleared { dropped, .. } => println!("cleared {dropped} notifications"),
        }
    }
}

/// One replayed submission
struct Play {
    game: &'static str,
    score: f64,
    metadata: ValueMap,
}

impl Play {
    fn new(game: &'static str, score: f64) -> Self {
        Self {
            game,
            score,
            metadata: ValueMap::new(),
        }
    }

    fn with(mut self, key: &str, value: Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let mut loader = Loader::new();
    match args.next() {
        Some(path) => loader.load_file(&path)?,
        None => loader.load_str(BUILTIN_CATALOG)?,
    }
    let config = match args.next() {
        Some(path) => EngineConfig::load(&path)?,
        None => EngineConfig::default(),
    };

    let store = Arc::new(Store::in_memory()?);
    let seeded = loader.finish().seed(&store)?;
    println!("Seeded {seeded} achievements");

    let player = UserId::new("ada");
    store.register_user(&player, "Ada")?;
    let pipeline = Arc::new(EvaluationPipeline::new(store.clone(), &config));

    let session = vec![
        Play::new("snake", 120.0),
        Play::new("snake", 540.0),
        Play::new("memory", 18.0).with("time", Value::Float(24.5)),
        Play::new("tetris", 3_200.0),
        Play::new("snake", 610.0).with("secret", Value::Bool(true)),
    ];

    // Server side: each submission yields a response body
    let mut bodies = Vec::new();
    for play in session {
        let pipeline = pipeline.clone();
        let player = player.clone();
        let unlocked = tokio::task::spawn_blocking(move || {
            pipeline.check_achievements(&player, &GameId::new(play.game), play.score, play.metadata)
        })
        .await?;
        bodies.push(ScoreResponse::with_achievements(unlocked).to_json()?);
    }

    // Client side: one subscriber, registered once
    let (dismissed_tx, mut dismissed_rx) = mpsc::unbounded_channel();
    let service = NotificationService::spawn(
        SchedulerConfig::default(),
        ConsoleView {
            dismissed: dismissed_tx,
        },
    );
    let delivery = Arc::new(Delivery::new());
    delivery.register_sender(service.sender());
    let client = ApiClient::new(delivery);

    // Wait only for what the scheduler accepted; rejected payloads never show
    let mut accepted = 0;
    for body in &bodies {
        accepted += client.handle_score_body(body)?;
    }
    for _ in 0..accepted {
        if dismissed_rx.recv().await.is_none() {
            break;
        }
    }
    drop(service);

    if let Some(state) = store.reward_state(&player)? {
        println!(
            "{player}: {} XP, {} coins, {} achievements",
            state.total_xp,
            state.currency_balance,
            store.unlocks_for_user(&player)?.len()
        );
    }
    for status in pipeline.progress(&player)? {
        let mark = if status.unlocked_at.is_some() { "x" } else { " " };
        println!("  [{mark}] {}", status.title);
    }
    Ok(())
}
