use std::path::{Path, PathBuf};

use crate::alerts::Alert;
use crate::client::BackendClient;

/// Request an AI-drafted Suspicious Activity Report for `alert`.
pub async fn generate(client: &BackendClient, alert: &Alert) -> eyre::Result<String> {
    tracing::info!(alert_id = %alert.alert_id, "Generating SAR report");
    let response = client
        .generate_sar(alert.id)
        .await
        .map_err(|e| eyre::Report::new(e).wrap_err("SAR generation failed"))?;
    tracing::info!(
        alert_id = %alert.alert_id,
        chars = response.report.len(),
        "SAR report generated"
    );
    Ok(response.report)
}

/// File name a downloaded report is saved under.
pub fn report_file_name(account_id: &str) -> String {
    let safe: String = account_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("SAR_Report_{}.txt", safe)
}

/// Save `report` as plain text in `dir`, overwriting any earlier copy.
pub fn download(report: &str, account_id: &str, dir: &Path) -> eyre::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .map_err(|e| eyre::eyre!("Failed to create report directory '{}': {}", dir.display(), e))?;
    let path = dir.join(report_file_name(account_id));
    std::fs::write(&path, report)
        .map_err(|e| eyre::eyre!("Failed to write report '{}': {}", path.display(), e))?;
    tracing::info!(path = %path.display(), "SAR report saved");
    Ok(path)
}
