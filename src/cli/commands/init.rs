//! Initialize command.

use console::style;

use acordaos::config::Config;
use acordaos::repository::RecordStore;

/// Create the candidate table in the configured database.
pub fn cmd_init(config: &Config) -> anyhow::Result<()> {
    if let Some(parent) = config.db.name.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let store = RecordStore::open(&config.db)?;
    store.ensure_schema()?;
    let counts = store.counts()?;
    let table = store.table_name().to_string();
    store.close()?;

    println!(
        "{} Table {} ready in {} ({} pending, {} downloaded)",
        style("✓").green(),
        table,
        config.db.name.display(),
        counts.pending,
        counts.downloaded
    );

    Ok(())
}
