//! Status command.

use console::style;

use acordaos::config::Config;
use acordaos::repository::RecordStore;

/// Print pending and downloaded counts.
pub fn cmd_status(config: &Config) -> anyhow::Result<()> {
    let store = RecordStore::open(&config.db)?;
    let counts = store.counts()?;
    store.close()?;

    let total = counts.pending + counts.downloaded;
    println!("{}", style(&config.db.tablename).bold());
    println!("  {:<12} {}", "Pending:", style(counts.pending).yellow());
    println!("  {:<12} {}", "Downloaded:", style(counts.downloaded).green());
    println!("  {:<12} {}", "Total:", total);

    Ok(())
}
