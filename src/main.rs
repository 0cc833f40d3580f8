use std::sync::Arc;

use ideaboard::config::AppConfig;
use ideaboard::replay;
use ideaboard::session::BoardSession;
use ideaboard::store::{IdeaStore, MemoryStore};
use ideaboard::todo;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env().expect("invalid configuration");

    let store = match &config.seed_path {
        Some(path) => {
            let snapshot = replay::load_seed(path).await.expect("seed load failed");
            Arc::new(MemoryStore::from_snapshot(snapshot))
        }
        None => Arc::new(MemoryStore::new()),
    };

    let (mut session, mut notices) = BoardSession::start(store.clone(), &config);
    session.load().await.expect("board load failed");

    if let Some(path) = &config.script_path {
        let events = replay::load_script(path).await.expect("script load failed");
        tracing::info!(path = %path.display(), events = events.len(), "replaying script");
        replay::run(&mut session, &events).await;
    }

    session.shutdown().await;
    while let Ok(notice) = notices.try_recv() {
        tracing::warn!(?notice, "persistence notice");
    }

    let board = store.fetch_board().await.expect("board fetch failed");
    let columns = todo::todo_columns(&board);
    let output = serde_json::json!({
        "ideas": board.ideas,
        "groups": board.groups,
        "todo": columns,
    });
    println!("{}", serde_json::to_string_pretty(&output).expect("board serialization failed"));
}
