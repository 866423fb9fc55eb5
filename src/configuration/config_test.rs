use std::fs;

use anyhow::Result;
use once_cell::sync::Lazy;
use test_utils::temp_dir;
use test_utils::write_file;
use tokio::sync::Mutex;

use super::Config;
use super::ConfigKey;
use crate::application::cli;

// Config is process wide, so tests loading it must not interleave.
static LOCK: Lazy<Mutex<()>> = Lazy::new(|| return Mutex::new(()));

#[test]
fn it_serializes_to_valid_toml() -> Result<()> {
    let res = Config::serialize_default(cli::build());
    let doc = res.parse::<toml_edit::Document>()?;

    assert_eq!(doc["model"].as_str(), Some("gpt-4-1106-preview"));
    assert_eq!(doc["poll-interval"].as_integer(), Some(2000));
    assert_eq!(doc["poll-backoff"].as_str(), Some("fixed"));
    assert!(doc.get("openai-token").is_none());
    assert!(doc.get("config-file").is_none());
    assert!(res.contains("# openai-token = \"\""));
    return Ok(());
}

#[test]
fn it_documents_possible_values() {
    let res = Config::serialize_default(cli::build());
    assert!(res.contains("[possible values: fixed, exponential]"));
}

#[tokio::test]
async fn it_loads_config_from_file() -> Result<()> {
    let _guard = LOCK.lock().await;
    let root = temp_dir("config");
    let config_path = write_file(
        &root,
        "config.toml",
        "model = \"gpt-4\"\npoll-interval = 500\npoll-backoff = \"exponential\"\nupload-dir = \"\"\n",
    );

    let matches = cli::build().try_get_matches_from(vec![
        "parley",
        "-c",
        config_path.to_str().unwrap(),
        "--poll-max-attempts",
        "12",
    ])?;
    Config::load(cli::build(), vec![&matches]).await?;

    assert_eq!(Config::get(ConfigKey::Model), "gpt-4");
    assert_eq!(Config::get(ConfigKey::PollInterval), "500");
    assert_eq!(Config::get(ConfigKey::PollBackoff), "exponential");
    assert_eq!(Config::get(ConfigKey::PollMaxAttempts), "12");
    assert_eq!(Config::get(ConfigKey::UploadDir), "context_update");

    fs::remove_dir_all(root)?;
    return Ok(());
}

#[tokio::test]
async fn it_fails_to_load_config_with_invalid_values() -> Result<()> {
    let _guard = LOCK.lock().await;
    let root = temp_dir("bad-config");
    let config_path = write_file(&root, "config.toml", "poll-backoff = \"linear\"\n");

    let matches =
        cli::build().try_get_matches_from(vec!["parley", "-c", config_path.to_str().unwrap()])?;
    let res = Config::load(cli::build(), vec![&matches]).await;

    assert!(res.is_err());
    fs::remove_dir_all(root)?;
    return Ok(());
}

#[tokio::test]
async fn it_loads_defaults_without_a_config_file() -> Result<()> {
    let _guard = LOCK.lock().await;
    let root = temp_dir("no-config");

    let matches = cli::build().try_get_matches_from(vec![
        "parley",
        "-c",
        root.join("missing.toml").to_str().unwrap(),
    ])?;
    Config::load(cli::build(), vec![&matches]).await?;

    assert_eq!(Config::get(ConfigKey::PollInterval), "2000");
    assert_eq!(Config::get(ConfigKey::OpenAiURL), "https://api.openai.com");

    fs::remove_dir_all(root)?;
    return Ok(());
}
