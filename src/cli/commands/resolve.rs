//! Resolve command.

use acordaos::urn;

/// Print the URN the crawler would derive from `url`.
pub fn cmd_resolve(url: &str) -> anyhow::Result<()> {
    println!("{}", urn::resolve(url)?);
    Ok(())
}
