//! CLI command implementations

use std::path::Path;

use colored::Colorize;

use super::CliError;
use crate::api::validation::parse_list_params;
use crate::config::StaticConfig;
use crate::services::AdService;

pub async fn reset_counter(service: &AdService) -> Result<(), CliError> {
    service.reset_counter().await?;
    println!("{}", "Ad creation counter has been reset".green());
    Ok(())
}

pub async fn show_quota(service: &AdService) -> Result<(), CliError> {
    let quota = service.quota_status().await?;
    let used = quota.used.to_string();
    let used = if quota.used >= quota.limit {
        used.red().bold()
    } else {
        used.green()
    };
    println!(
        "{} {} / {}",
        "Ads created in current window:".bold(),
        used,
        quota.limit
    );
    Ok(())
}

/// Run a query through the same validation as `GET /api/v1/ad`.
pub async fn list_ads(service: &AdService, pairs: Vec<(String, String)>) -> Result<(), CliError> {
    let params = parse_list_params(pairs)?;
    let items = service
        .list(
            &params.query,
            chrono::Utc::now(),
            params.offset,
            params.limit,
        )
        .await?;

    let json = serde_json::to_string_pretty(&items)
        .map_err(|e| CliError::CommandError(format!("Failed to encode ads: {}", e)))?;
    println!("{}", json);
    Ok(())
}

/// Print the sample configuration, or write it to `output_path`.
pub fn config_generate(output_path: Option<String>, force: bool) -> Result<(), CliError> {
    let sample = StaticConfig::generate_sample_config();

    let Some(path) = output_path else {
        print!("{}", sample);
        return Ok(());
    };

    if !force && Path::new(&path).exists() {
        return Err(CliError::CommandError(format!(
            "{} already exists, pass --force to overwrite",
            path
        )));
    }

    std::fs::write(&path, sample)
        .map_err(|e| CliError::CommandError(format!("Failed to write {}: {}", path, e)))?;
    println!(
        "{} {}",
        "Configuration file generated:".green(),
        path.blue()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_generate_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let path_str = path.to_string_lossy().to_string();

        config_generate(Some(path_str.clone()), false).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("[store]"));

        assert!(config_generate(Some(path_str.clone()), false).is_err());
        assert!(config_generate(Some(path_str), true).is_ok());
    }
}
