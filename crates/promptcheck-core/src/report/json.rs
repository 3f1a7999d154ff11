use crate::report::RunReport;
use std::path::Path;

pub fn write_json(report: &RunReport, out: &Path) -> anyhow::Result<()> {
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(out, serde_json::to_string_pretty(report)?)?;
    tracing::debug!(path = %out.display(), "wrote JSON report");
    Ok(())
}
