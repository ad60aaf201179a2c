use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::session::get_config_dir;

/// Create the configuration directory and the resources/ drop-in folder.
pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let dir = get_config_dir()?;
    let resources_dir = dir.join("resources");
    if !resources_dir.exists() {
        std::fs::create_dir_all(&resources_dir)?;
    }

    output_success(
        &output_format,
        &format!("Configuration directory ready at {}", dir.display()),
        Some(json!({
            "config_dir": dir.display().to_string(),
            "resources_dir": resources_dir.display().to_string(),
        })),
    )
}
