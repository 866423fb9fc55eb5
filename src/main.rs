#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

mod application;
mod configuration;
mod domain;
mod infrastructure;

use std::env;
use std::process;

use anyhow::Error;
use anyhow::Result;
use yansi::Paint;

use crate::application::cli;
use crate::application::cli::Mode;
use crate::application::console::Console;
use crate::application::menu::Menu;
use crate::application::menu::MenuSettings;
use crate::configuration::Config;
use crate::domain::models::ApiBox;
use crate::domain::models::AssistantsApi;
use crate::infrastructure::api::openai::OpenAI;

fn handle_error(err: Error) {
    eprintln!(
        "{}",
        Paint::red(format!(
            "Oh no! Parley has failed with the following app version and error.\n\nVersion: {}\nCommit: {}\nError: {}",
            env!("CARGO_PKG_VERSION"),
            env!("VERGEN_GIT_DESCRIBE"),
            err
        ))
    );

    let backtrace = err.backtrace();
    if backtrace.to_string() == "disabled backtrace" {
        let args = env::args().collect::<Vec<String>>().join(" ");
        eprintln!("\nRunning the following can help explain further what the issue is:");
        eprintln!("\nRUST_BACKTRACE=1 {args}");
        eprintln!(
            "\nA debug log can be written by setting RUST_LOG=parley, see `parley debug log-path` for its location."
        );
    } else {
        eprintln!("\n{}", backtrace);
    }

    process::exit(1);
}

async fn start(mode: Mode) -> Result<()> {
    let api: ApiBox = Box::<OpenAI>::default();
    api.health_check().await?;

    let settings = MenuSettings::from_config()?;
    let mut menu = Menu::new(&*api, Console::stdio(), settings);

    match mode {
        Mode::Menu => return menu.run().await,
        Mode::Chat { assistant_id } => return menu.chat_with(assistant_id).await,
        Mode::Ask {
            assistant_id,
            question,
            files,
        } => return menu.ask(&assistant_id, &question, &files).await,
    }
}

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));

    let file_appender = tracing_appender::rolling::never(Config::log_dir(), "debug.log");
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);
    if env::var("RUST_LOG")
        .unwrap_or_else(|_| return "".to_string())
        .contains("parley")
    {
        tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(writer)
            .init();
    }

    let mode = match cli::parse().await {
        Ok(Some(mode)) => mode,
        Ok(None) => process::exit(0),
        Err(err) => {
            handle_error(err);
            return;
        }
    };

    if let Err(err) = start(mode).await {
        handle_error(err);
    }

    process::exit(0);
}
