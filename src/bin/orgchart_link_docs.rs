use std::path::PathBuf;
use std::time::Duration;

use orgchart_rs::config::OrgConfig;
use orgchart_rs::documents;
use orgchart_rs::remote::RemoteStore;

fn parse_arg(flag: &str) -> Option<String> {
    let mut args = std::env::args();
    while let Some(arg) = args.next() {
        if arg == flag {
            return args.next();
        }
    }
    None
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = OrgConfig::load(parse_arg("--config").as_deref())?;
    let links_dir = parse_arg("--links-dir")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("docs_linking_data"));

    let mut store = RemoteStore::new(&config.store.update_url, &config.store.query_url)?;
    store.wait_until_ready(
        config.store.probe_attempts,
        Duration::from_millis(config.store.probe_delay_ms),
    )?;

    let mut files: Vec<_> = std::fs::read_dir(&links_dir)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    files.sort();
    if files.is_empty() {
        anyhow::bail!("no CSV files found in {}", links_dir.display());
    }

    let mut linked = 0;
    let mut failed = 0;
    for path in &files {
        println!("Processing {}", path.display());
        let links = documents::load_links(path)?;
        let summary = documents::link_documents(&mut store, &links);
        linked += summary.linked;
        failed += summary.failed;
    }
    println!(
        "Linked {} document pairs across {} files ({} failures)",
        linked,
        files.len(),
        failed
    );
    Ok(())
}
