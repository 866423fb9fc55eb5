#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Backoff;

/// What to run once the command line has been handled.
#[derive(Debug, PartialEq, Eq)]
pub enum Mode {
    Menu,
    Chat {
        assistant_id: Option<String>,
    },
    Ask {
        assistant_id: String,
        question: String,
        files: Vec<path::PathBuf>,
    },
}

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(&config_file_path).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_debug() -> Command {
    return Command::new("debug")
        .about("Debug helpers for Parley")
        .hide(true)
        .subcommand(
            Command::new("log-path").about("Output path to debug log file generated when running Parley with environment variable RUST_LOG=parley")
        )
        .subcommand(
            Command::new("enum-config").about("List all config keys as strings.")
        );
}

fn arg_assistant_id() -> Arg {
    return Arg::new("assistant-id")
        .short('a')
        .long("assistant-id")
        .env("PARLEY_ASSISTANT_ID")
        .num_args(1)
        .help("ID of the assistant to talk to.");
}

fn subcommand_chat() -> Command {
    return Command::new("chat")
        .about("Chat with an assistant in a new thread. Omit the assistant ID to pick one interactively.")
        .arg(arg_assistant_id());
}

fn subcommand_ask() -> Command {
    return Command::new("ask")
        .about("Ask an assistant a single question, optionally attaching local files, and print the answer.")
        .arg(arg_assistant_id().required(true))
        .arg(
            Arg::new("question")
                .short('q')
                .long("question")
                .num_args(1)
                .required(true)
                .help("The question to ask."),
        )
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .action(ArgAction::Append)
                .value_parser(value_parser!(path::PathBuf))
                .help("Local file to upload and attach to the question. Can be repeated."),
        );
}

fn arg_config(key: ConfigKey, env: &str, help: &str) -> Arg {
    let mut help = help.to_string();
    let default = Config::default(key);
    if !default.is_empty() {
        help = format!("{help} [default: {default}]");
    }

    return Arg::new(key.to_string())
        .long(key.to_string())
        .env(env.to_string())
        .num_args(1)
        .help(help)
        .global(true);
}

pub fn build() -> Command {
    let about = format!(
        "{}\n\nVersion: {}\nCommit: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    );

    return Command::new("parley")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .arg_required_else_help(false)
        .subcommand(Command::new("menu").about("Open the interactive menu to manage files and assistants. This is the default."))
        .subcommand(subcommand_chat())
        .subcommand(subcommand_ask())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_debug())
        .subcommand(Command::new("manpages").about("Generates manpages and outputs to stdout."))
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("PARLEY_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true)
        )
        .arg(
            Arg::new(ConfigKey::OpenAiToken.to_string())
                .long(ConfigKey::OpenAiToken.to_string())
                .env("PARLEY_OPENAI_TOKEN")
                .num_args(1)
                .help("OpenAI API token.")
                .global(true),
        )
        .arg(arg_config(ConfigKey::OpenAiURL, "PARLEY_OPENAI_URL", "OpenAI API URL. Can be swapped to a compatible proxy."))
        .arg(arg_config(ConfigKey::HealthCheckTimeout, "PARLEY_HEALTH_CHECK_TIMEOUT", "Time to wait in milliseconds before timing out when health checking a custom API URL."))
        .arg(arg_config(ConfigKey::Model, "PARLEY_MODEL", "Model used when creating a new assistant."))
        .arg(arg_config(ConfigKey::AssistantName, "PARLEY_ASSISTANT_NAME", "Name used when creating a new assistant."))
        .arg(arg_config(ConfigKey::AssistantInstructions, "PARLEY_ASSISTANT_INSTRUCTIONS", "Instructions used when creating a new assistant."))
        .arg(arg_config(ConfigKey::AssistantDescription, "PARLEY_ASSISTANT_DESCRIPTION", "Description used when creating a new assistant."))
        .arg(arg_config(ConfigKey::AssistantTools, "PARLEY_ASSISTANT_TOOLS", "Comma separated tool types enabled when creating a new assistant."))
        .arg(arg_config(ConfigKey::UploadDir, "PARLEY_UPLOAD_DIR", "Directory searched recursively for files to upload."))
        .arg(arg_config(ConfigKey::PollInterval, "PARLEY_POLL_INTERVAL", "Milliseconds to wait between run status checks."))
        .arg(
            arg_config(ConfigKey::PollBackoff, "PARLEY_POLL_BACKOFF", "How the wait between run status checks grows.")
                .value_parser(PossibleValuesParser::new(Backoff::VARIANTS)),
        )
        .arg(arg_config(ConfigKey::PollMaxInterval, "PARLEY_POLL_MAX_INTERVAL", "Upper bound in milliseconds for the wait between run status checks."))
        .arg(arg_config(ConfigKey::PollMaxAttempts, "PARLEY_POLL_MAX_ATTEMPTS", "Give up on a run after this many status checks. 0 never gives up."))
        .arg(arg_config(ConfigKey::PollMaxElapsed, "PARLEY_POLL_MAX_ELAPSED", "Give up on a run after this many milliseconds. 0 never gives up."))
        .arg(arg_config(ConfigKey::PollReminderEvery, "PARLEY_POLL_REMINDER_EVERY", "Print a reminder to check the API status every this many status checks. 0 disables it."));
}

fn assistant_id(matches: &ArgMatches) -> Option<String> {
    return matches
        .get_one::<String>("assistant-id")
        .map(|id| return id.to_string());
}

pub async fn parse() -> Result<Option<Mode>> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("debug", debug_matches)) => {
            match debug_matches.subcommand() {
                Some(("log-path", _)) => {
                    let log_path = Config::log_dir().join("debug.log");
                    println!("{}", log_path.to_string_lossy());
                }
                Some(("enum-config", _)) => {
                    let res = ConfigKey::VARIANTS.join("\n");
                    println!("{}", res);
                }
                _ => {
                    subcommand_debug().print_long_help()?;
                }
            }

            return Ok(None);
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
            return Ok(None);
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(None);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(None);
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(None);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(None);
            }
        },
        Some(("manpages", _)) => {
            clap_mangen::Man::new(build()).render(&mut io::stdout())?;
            return Ok(None);
        }
        Some(("chat", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            return Ok(Some(Mode::Chat {
                assistant_id: assistant_id(subcmd_matches),
            }));
        }
        Some(("ask", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            return Ok(Some(mode_ask(subcmd_matches)?));
        }
        Some(("menu", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
        }
        _ => {
            Config::load(build(), vec![&matches]).await?;
        }
    }

    return Ok(Some(Mode::Menu));
}

fn mode_ask(matches: &ArgMatches) -> Result<Mode> {
    let assistant_id = match assistant_id(matches) {
        Some(id) => id,
        None => bail!("An assistant ID is required"),
    };
    let question = match matches.get_one::<String>("question") {
        Some(question) => question.to_string(),
        None => bail!("A question is required"),
    };
    let files = matches
        .get_many::<path::PathBuf>("file")
        .map(|files| return files.cloned().collect::<Vec<path::PathBuf>>())
        .unwrap_or_default();

    return Ok(Mode::Ask {
        assistant_id,
        question,
        files,
    });
}
