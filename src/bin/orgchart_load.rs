use std::path::PathBuf;
use std::time::Duration;

use orgchart_rs::config::OrgConfig;
use orgchart_rs::remote::RemoteStore;
use orgchart_rs::{batch, Engine, EntityCounters, ReplayScope};

fn parse_arg(flag: &str) -> Option<String> {
    let mut args = std::env::args();
    while let Some(arg) = args.next() {
        if arg == flag {
            return args.next();
        }
    }
    None
}

fn has_flag(flag: &str) -> bool {
    std::env::args().any(|arg| arg == flag)
}

fn parse_scope(value: Option<String>) -> anyhow::Result<ReplayScope> {
    match value.as_deref() {
        Some("person") => Ok(ReplayScope::Person),
        Some("organisation") | None => Ok(ReplayScope::Organisation),
        Some(other) => anyhow::bail!("unknown scope '{}': expected organisation or person", other),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = OrgConfig::load(parse_arg("--config").as_deref())?;
    let data_dir = parse_arg("--data-dir")
        .map(PathBuf::from)
        .unwrap_or_else(|| config.data_dir.clone());
    let scope = parse_scope(parse_arg("--scope"))?;

    let store = RemoteStore::new(&config.store.update_url, &config.store.query_url)?;
    store.wait_until_ready(
        config.store.probe_attempts,
        Duration::from_millis(config.store.probe_delay_ms),
    )?;

    let mut engine = Engine::with_policy(Box::new(store), config.policy.into());
    if has_flag("--seed-government") {
        let government = engine.create_government_node()?;
        println!("Seeded government node {}", government.id);
    }

    let transactions = batch::load_directory(&data_dir)?;
    println!(
        "Loaded {} transactions from {}",
        transactions.len(),
        data_dir.display()
    );

    let mut counters = EntityCounters::new();
    let summary = engine.replay(&transactions, scope, &mut counters)?;
    println!(
        "Replayed {} transactions ({} outside scope)",
        summary.processed, summary.skipped
    );
    Ok(())
}
