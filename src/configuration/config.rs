#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::env;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::ArgMatches;
use clap::Command;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;
use tokio::fs;

static CONFIG: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);

#[derive(Clone, Copy, Debug, Eq, PartialEq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKey {
    AssistantDescription,
    AssistantInstructions,
    AssistantName,
    AssistantTools,
    ConfigFile,
    HealthCheckTimeout,
    Model,
    #[strum(serialize = "openai-token")]
    OpenAiToken,
    #[strum(serialize = "openai-url")]
    OpenAiURL,
    PollBackoff,
    PollInterval,
    PollMaxAttempts,
    PollMaxElapsed,
    PollMaxInterval,
    PollReminderEvery,
    UploadDir,
}

pub struct Config {}

impl Config {
    pub fn get(key: ConfigKey) -> String {
        if let Some(val) = CONFIG.get(&key.to_string()) {
            return val.to_string();
        }

        return "".to_string();
    }

    pub fn set(key: ConfigKey, value: &str) {
        CONFIG.insert(key.to_string(), value.to_string());
    }

    pub fn default(key: ConfigKey) -> String {
        #[cfg(not(target_os = "macos"))]
        let config_dir = dirs::config_dir().unwrap_or_else(|| return path::PathBuf::from("."));
        #[cfg(target_os = "macos")]
        let config_dir = dirs::home_dir()
            .unwrap_or_else(|| return path::PathBuf::from("."))
            .join(".config");
        let config_path = config_dir.join("parley/config.toml");

        let res = match key {
            ConfigKey::AssistantDescription => "The ultimate librarian",
            ConfigKey::AssistantInstructions => "You are the ultimate librarian, you know everything about the files attached to you and you review them and answer primarily from their content.",
            ConfigKey::AssistantName => "Laura",
            ConfigKey::AssistantTools => "code_interpreter,retrieval",
            ConfigKey::HealthCheckTimeout => "1000",
            ConfigKey::Model => "gpt-4-1106-preview",
            ConfigKey::OpenAiToken => "",
            ConfigKey::OpenAiURL => "https://api.openai.com",
            ConfigKey::PollBackoff => "fixed",
            ConfigKey::PollInterval => "2000",
            ConfigKey::PollMaxAttempts => "0",
            ConfigKey::PollMaxElapsed => "600000",
            ConfigKey::PollMaxInterval => "30000",
            ConfigKey::PollReminderEvery => "10",
            ConfigKey::UploadDir => "context_update",

            // Special
            ConfigKey::ConfigFile => return config_path.to_string_lossy().to_string(),
        };

        return res.to_string();
    }

    pub async fn load(cmd: Command, clap_arg_matches: Vec<&ArgMatches>) -> Result<()> {
        for key in ConfigKey::iter() {
            Config::set(key, &Config::default(key))
        }

        let mut config_file = Config::default(ConfigKey::ConfigFile);
        for matches in clap_arg_matches.as_slice() {
            if let Ok(Some(arg_config_file)) =
                matches.try_get_one::<String>(&ConfigKey::ConfigFile.to_string())
            {
                config_file = arg_config_file.to_string();
            }
        }

        let config_path = path::PathBuf::from(config_file);
        if config_path.exists() {
            let toml_str = fs::read_to_string(config_path).await?;
            let doc = toml_str.parse::<toml_edit::Document>()?;

            for key in ConfigKey::iter() {
                if let Some(val) = doc.get(&key.to_string()) {
                    // Use clap value parsers to do validation.
                    let mut possible_values = vec![];
                    if let Some(arg) = cmd
                        .get_arguments()
                        .find(|e| return e.get_long() == Some(key.to_string().as_str()))
                    {
                        possible_values = arg
                            .get_possible_values()
                            .iter()
                            .map(|e| return e.get_name().to_string())
                            .collect::<Vec<String>>();
                    }

                    if let Some(val_int) = val.as_integer() {
                        Config::set(key, &val_int.to_string());
                    } else if let Some(val_str) = val.as_str() {
                        if val_str.is_empty() {
                            continue;
                        }
                        if !possible_values.is_empty()
                            && !possible_values.contains(&val_str.to_string())
                        {
                            bail!(format!("config.toml has an invalid value for key '{key}': {val_str}\nPossible values are: {}", possible_values.join(", ")));
                        }
                        Config::set(key, val_str);
                    }
                }
            }
        }

        for key in ConfigKey::iter() {
            for matches in clap_arg_matches.as_slice() {
                if let Ok(Some(val)) = matches.try_get_one::<String>(&key.to_string()) {
                    if val.is_empty() {
                        continue;
                    }
                    Config::set(key, val)
                }
            }
        }

        tracing::debug!(
            url = Config::get(ConfigKey::OpenAiURL),
            model = Config::get(ConfigKey::Model),
            upload_dir = Config::get(ConfigKey::UploadDir),
            poll_interval = Config::get(ConfigKey::PollInterval),
            poll_backoff = Config::get(ConfigKey::PollBackoff),
            "config"
        );

        return Ok(());
    }

    pub fn serialize_default(cmd: Command) -> String {
        let toml_str = ConfigKey::iter()
            .filter_map(|key| {
                if key == ConfigKey::ConfigFile {
                    return None;
                }

                let arg = cmd
                    .get_arguments()
                    .find(|e| return e.get_long() == Some(key.to_string().as_str()))?;

                let mut description = arg
                    .get_help()
                    .map(|help| return help.to_string())
                    .unwrap_or_default();

                description = description
                    .split("[default:")
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string();

                if !arg.get_possible_values().is_empty() {
                    let possible_values = arg
                        .get_possible_values()
                        .iter()
                        .map(|e| return e.get_name())
                        .collect::<Vec<_>>()
                        .join(", ");
                    description = format!("{description} [possible values: {}]", possible_values);
                }

                let mut val = Config::default(key);
                if val.is_empty() {
                    val = format!("# {key} = \"\"");
                } else if val.parse::<i64>().is_ok() {
                    val = format!("{key} = {val}");
                } else {
                    val = format!("{key} = {}", toml_edit::value(val));
                }

                return Some(format!("# {description}\n{val}"));
            })
            .collect::<Vec<String>>()
            .join("\n\n");

        return toml_str;
    }

    /// Where the debug log is written when `RUST_LOG` mentions parley.
    pub fn log_dir() -> path::PathBuf {
        if let Ok(dir) = env::var("PARLEY_LOG_DIR") {
            return path::PathBuf::from(dir);
        }

        return dirs::cache_dir()
            .unwrap_or_else(env::temp_dir)
            .join("parley");
    }
}
