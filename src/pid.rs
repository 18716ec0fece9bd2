use std::path::Path;

use anyhow::Context as _;

pub async fn write_pid_file(path: &Path) -> anyhow::Result<()> {
    let pid = std::process::id();
    tokio::fs::write(path, format!("{pid}\n"))
        .await
        .with_context(|| format!("write pid file: {}", path.display()))?;
    tracing::debug!(pid, path = %path.display(), "wrote pid file");
    Ok(())
}
