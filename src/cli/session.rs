//! Browser session setup for CLI commands

use crate::browser::{ChromeBrowser, ChromePage};
use crate::commands::TargetArgs;
use crate::common::config::Config;
use crate::common::Result;

/// Resolve configuration from the file and command-line overrides
pub fn resolve_config(target: &TargetArgs) -> Result<Config> {
    let config = match &target.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    Ok(apply_overrides(config, target))
}

fn apply_overrides(mut config: Config, target: &TargetArgs) -> Config {
    if let Some(url) = &target.url {
        config.target.url = url.clone();
    }
    if target.headed {
        config.browser.headless = false;
    }
    if target.no_sandbox {
        config.browser.no_sandbox = true;
    }
    config
}

/// Launch the browser and open the target page
pub async fn open_page(config: &Config) -> Result<(ChromeBrowser, ChromePage)> {
    let browser = ChromeBrowser::launch(config).await?;
    match browser
        .open(&config.target.url, config.timeouts.navigation())
        .await
    {
        Ok(page) => Ok((browser, page)),
        Err(e) => {
            let _ = browser.close().await;
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_flags_override_config() {
        let args = TargetArgs {
            url: Some("http://localhost:8080/".to_string()),
            headed: true,
            no_sandbox: true,
            ..TargetArgs::default()
        };

        let config = apply_overrides(Config::default(), &args);
        assert_eq!(config.target.url, "http://localhost:8080/");
        assert!(!config.browser.headless);
        assert!(config.browser.no_sandbox);
    }

    #[test]
    fn test_explicit_config_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[target]\nurl = \"http://127.0.0.1:3000/\"\n\n[timeouts]\nsuite_secs = 60").unwrap();

        let args = TargetArgs {
            config: Some(file.path().to_path_buf()),
            ..TargetArgs::default()
        };
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.target.url, "http://127.0.0.1:3000/");
        assert_eq!(config.timeouts.suite_secs, 60);
        assert!(config.browser.headless);
    }
}
