#[cfg(test)]
#[path = "menu_test.rs"]
mod tests;

use std::io::BufRead;
use std::io::Write;
use std::path;

use anyhow::Result;
use strum::IntoEnumIterator;

use super::console::Choice;
use super::console::Console;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::AssistantField;
use crate::domain::models::AssistantTemplate;
use crate::domain::models::AssistantUpdate;
use crate::domain::models::AssistantsApi;
use crate::domain::models::FilePurpose;
use crate::domain::models::PollPolicy;
use crate::domain::models::RunStatus;
use crate::domain::services::AssistantRegistry;
use crate::domain::services::ChatSession;
use crate::domain::services::FileRegistry;
use crate::domain::services::UploadCandidates;
use crate::domain::services::WaitProgress;

const STATUS_PAGE: &str = "https://status.openai.com/";

/// Everything the menus need that comes from configuration.
#[derive(Clone, Debug)]
pub struct MenuSettings {
    pub upload_dir: path::PathBuf,
    pub template: AssistantTemplate,
    pub policy: PollPolicy,
}

impl MenuSettings {
    pub fn from_config() -> Result<MenuSettings> {
        let policy = PollPolicy::parse(
            &Config::get(ConfigKey::PollInterval),
            &Config::get(ConfigKey::PollBackoff),
            &Config::get(ConfigKey::PollMaxInterval),
            &Config::get(ConfigKey::PollMaxAttempts),
            &Config::get(ConfigKey::PollMaxElapsed),
            &Config::get(ConfigKey::PollReminderEvery),
        )?;

        return Ok(MenuSettings {
            upload_dir: path::PathBuf::from(Config::get(ConfigKey::UploadDir)),
            template: AssistantTemplate {
                model: Config::get(ConfigKey::Model),
                name: Config::get(ConfigKey::AssistantName),
                instructions: Config::get(ConfigKey::AssistantInstructions),
                description: Config::get(ConfigKey::AssistantDescription),
                tools: AssistantTemplate::tools_from_list(&Config::get(ConfigKey::AssistantTools)),
                file_ids: vec![],
            },
            policy,
        });
    }
}

fn show_progress<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    progress: WaitProgress,
) -> Result<()> {
    match progress {
        WaitProgress::Polled { status, .. } => {
            if !status.is_terminal() && status != RunStatus::RequiresAction {
                console.say("...")?;
            }
        }
        WaitProgress::Reminder { attempt } => {
            console.say(&format!(
                "Still waiting after {attempt} status checks. Please check the API status on {STATUS_PAGE}"
            ))?;
        }
    }

    return Ok(());
}

/// Numbered menus for managing files and assistants, and chatting with them.
pub struct Menu<'a, R, W> {
    api: &'a dyn AssistantsApi,
    console: Console<R, W>,
    settings: MenuSettings,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(
        api: &'a dyn AssistantsApi,
        console: Console<R, W>,
        settings: MenuSettings,
    ) -> Menu<'a, R, W> {
        return Menu {
            api,
            console,
            settings,
        };
    }

    pub fn console(&self) -> &Console<R, W> {
        return &self.console;
    }

    /// Failed actions are shown to the user and the menu carries on.
    fn report(&mut self, res: Result<()>) -> Result<()> {
        if let Err(err) = res {
            tracing::error!(error = ?err, "Menu action failed");
            self.console.error(&format!("Error: {err}"))?;
        }
        return Ok(());
    }

    pub async fn run(&mut self) -> Result<()> {
        loop {
            self.console.say(
                "\nMain Menu\n--------------------------------\n1. Manage Files - Handle file-related operations.\n2. Manage Assistants - View, modify, or delete assistants.\n3. Create a New Assistant - Create an assistant from the configured template.\n0. Exit\n--------------------------------",
            )?;

            let res = match self.console.choose("Enter your choice (0-3): ", 3)? {
                Choice::Cancel => {
                    self.console.say("Goodbye.")?;
                    return Ok(());
                }
                Choice::Invalid => continue,
                Choice::Index(0) => self.manage_files().await,
                Choice::Index(1) => self.manage_assistants().await,
                Choice::Index(_) => self.create_assistant().await,
            };
            self.report(res)?;
        }
    }

    async fn create_assistant(&mut self) -> Result<()> {
        let assistant = AssistantRegistry::new(self.api)
            .create(&self.settings.template)
            .await?;
        self.console.say(&format!(
            "New assistant created with ID: {}",
            assistant.id
        ))?;
        return Ok(());
    }

    async fn manage_files(&mut self) -> Result<()> {
        loop {
            self.console.say(
                "\nFile Management\n----------------------\n1. List Files - Display available files.\n2. Delete File - Remove a specific file.\n3. Upload File - Add a new file.\n0. Back\n----------------------",
            )?;

            let res = match self.console.choose("Select an option (0-3): ", 3)? {
                Choice::Cancel => return Ok(()),
                Choice::Invalid => continue,
                Choice::Index(0) => self.list_files().await,
                Choice::Index(1) => self.delete_file().await,
                Choice::Index(_) => self.upload_file().await,
            };
            self.report(res)?;
        }
    }

    async fn list_files(&mut self) -> Result<()> {
        let files = FileRegistry::new(self.api).list().await?;
        if files.is_empty() {
            self.console.say("No files found.")?;
            return Ok(());
        }

        self.console.say("Available Files:")?;
        for file in files {
            self.console.say(&format!(
                "ID: {}, Filename: {}, Purpose: {}, Bytes: {}, Created: {}",
                file.id,
                file.filename,
                file.purpose,
                file.bytes,
                file.created_at_display()
            ))?;
        }

        return Ok(());
    }

    async fn delete_file(&mut self) -> Result<()> {
        let registry = FileRegistry::new(self.api);
        let files = registry.list().await?;
        if files.is_empty() {
            self.console.say("No files available to delete.")?;
            return Ok(());
        }

        self.console.say("Select the file to delete:")?;
        for (idx, file) in files.iter().enumerate() {
            self.console
                .say(&format!("{}. {} (ID: {})", idx + 1, file.filename, file.id))?;
        }

        match self.console.choose(
            "Enter the number of the file you want to delete or '0' to cancel: ",
            files.len(),
        )? {
            Choice::Index(idx) => {
                let status = registry.delete(&files[idx].id).await?;
                self.console.say(&status)?;
            }
            Choice::Cancel => self.console.say("Operation canceled.")?,
            Choice::Invalid => {}
        }

        return Ok(());
    }

    async fn upload_file(&mut self) -> Result<()> {
        self.upload_flow().await?;
        return Ok(());
    }

    /// Picks a file below the upload directory and a purpose for it, then
    /// uploads it. Returns the new file id unless the user backed out.
    async fn upload_flow(&mut self) -> Result<Option<String>> {
        let candidates = UploadCandidates::new(self.settings.upload_dir.clone())
            .collect()
            .await?;
        if candidates.is_empty() {
            self.console.say(&format!(
                "No files found in {}.",
                self.settings.upload_dir.display()
            ))?;
            return Ok(None);
        }

        self.console.say("Please select a file to upload:")?;
        for (idx, candidate) in candidates.iter().enumerate() {
            self.console
                .say(&format!("{}. {}", idx + 1, candidate.display()))?;
        }

        let file_path = match self.console.choose(
            "Enter the number of the file you want to upload or '0' to cancel: ",
            candidates.len(),
        )? {
            Choice::Index(idx) => &candidates[idx],
            _ => return Ok(None),
        };

        self.console.say("Select the purpose of the file:")?;
        for (idx, purpose) in FilePurpose::iter().enumerate() {
            self.console
                .say(&format!("{}. {}", idx + 1, purpose.label()))?;
        }

        let purpose_count = FilePurpose::iter().count();
        let purpose = match self.console.choose(
            &format!("Enter the number for the purpose (1-{purpose_count}): "),
            purpose_count,
        )? {
            Choice::Index(idx) => FilePurpose::from_choice(idx + 1),
            _ => None,
        };
        let purpose = match purpose {
            Some(purpose) => purpose,
            None => return Ok(None),
        };

        let file_id = FileRegistry::new(self.api)
            .upload(file_path, purpose)
            .await?;
        self.console
            .say(&format!("File uploaded successfully with ID: {file_id}"))?;

        return Ok(Some(file_id));
    }

    async fn pick_assistant(&mut self) -> Result<Option<String>> {
        let assistants = AssistantRegistry::new(self.api).list().await?;
        if assistants.is_empty() {
            self.console.say("No assistants available.")?;
            return Ok(None);
        }

        self.console.say("\nSelect an Assistant\n-------------------")?;
        for (idx, assistant) in assistants.iter().enumerate() {
            self.console.say(&format!(
                "{}. {} (ID: {})",
                idx + 1,
                assistant.display_name(),
                assistant.id
            ))?;
        }
        self.console
            .say("0. Cancel - Return to the previous menu.\n-------------------")?;

        return match self.console.choose(
            "Enter the number of the assistant you want to manage or '0' to cancel: ",
            assistants.len(),
        )? {
            Choice::Index(idx) => Ok(Some(assistants[idx].id.to_string())),
            Choice::Cancel => {
                self.console.say("Operation canceled.")?;
                Ok(None)
            }
            Choice::Invalid => Ok(None),
        };
    }

    async fn manage_assistants(&mut self) -> Result<()> {
        let assistant_id = match self.pick_assistant().await? {
            Some(assistant_id) => assistant_id,
            None => return Ok(()),
        };

        let details = AssistantRegistry::new(self.api)
            .details(&assistant_id)
            .await?;
        self.console.say(&details)?;

        self.console.say(
            "\nChoose an Action for the Assistant\n------------------------------------\n1. Chat - Chat with this assistant.\n2. Add File - Add a file to this assistant.\n3. Update - Update this assistant's parameters.\n4. Delete - Delete this assistant.\n5. Check Files - Remove files from this assistant that no longer exist.\n0. Cancel - Return to the previous menu.\n------------------------------------",
        )?;

        match self.console.choose("Choose an option (0-5): ", 5)? {
            Choice::Index(0) => self.chat(&assistant_id).await?,
            Choice::Index(1) => self.add_file(&assistant_id).await?,
            Choice::Index(2) => self.update_assistant(&assistant_id).await?,
            Choice::Index(3) => {
                let status = AssistantRegistry::new(self.api)
                    .delete(&assistant_id)
                    .await?;
                self.console.say(&status)?;
            }
            Choice::Index(_) => self.clean_files(&assistant_id).await?,
            Choice::Cancel => self.console.say("Operation canceled.")?,
            Choice::Invalid => {}
        }

        return Ok(());
    }

    async fn clean_files(&mut self, assistant_id: &str) -> Result<()> {
        let missing = AssistantRegistry::new(self.api)
            .clean_missing_files(assistant_id)
            .await?;
        if missing.is_empty() {
            self.console.say("There are no missing files.")?;
            return Ok(());
        }

        for file_id in missing {
            self.console.say(&format!(
                "Removed missing file {file_id} from assistant {assistant_id}."
            ))?;
        }

        return Ok(());
    }

    async fn add_file(&mut self, assistant_id: &str) -> Result<()> {
        self.clean_files(assistant_id).await?;

        let files = FileRegistry::new(self.api).list().await?;
        if files.is_empty() {
            self.console
                .say("No files available. Upload one from the file menu first.")?;
            return Ok(());
        }

        self.console.say("Available Files:")?;
        for (idx, file) in files.iter().enumerate() {
            self.console
                .say(&format!("{}. {} (ID: {})", idx + 1, file.filename, file.id))?;
        }

        match self.console.choose(
            "Select the number of the file you want to add or '0' to cancel: ",
            files.len(),
        )? {
            Choice::Index(idx) => {
                AssistantRegistry::new(self.api)
                    .add_file(assistant_id, &files[idx].id)
                    .await?;
                self.console.say("File added successfully.")?;
            }
            Choice::Cancel => self.console.say("Operation canceled.")?,
            Choice::Invalid => {}
        }

        return Ok(());
    }

    async fn update_assistant(&mut self, assistant_id: &str) -> Result<()> {
        self.clean_files(assistant_id).await?;

        let registry = AssistantRegistry::new(self.api);
        let assistant = registry.load(assistant_id).await?;
        let mut update = AssistantUpdate::from_assistant(&assistant);

        for field in AssistantField::iter() {
            self.console.say(&format!(
                "Current value of {field}: {}",
                update.current_value(field)
            ))?;

            let input = match self.console.read_line(&format!(
                "Press Enter to keep the current value or enter a new value for {field}: "
            ))? {
                Some(input) => input,
                None => {
                    self.console.say("Operation canceled.")?;
                    return Ok(());
                }
            };

            if let Err(err) = update.apply(field, &input) {
                self.console
                    .error(&format!("{err}. Using the current value instead."))?;
            }
        }

        registry.update(assistant_id, &update).await?;
        self.console.say("Assistant updated successfully.")?;

        return Ok(());
    }

    /// Reads message lines until `done`. Returns `None` when the user asked
    /// to leave the chat.
    fn read_message(&mut self) -> Result<Option<String>> {
        self.console
            .say("You: \nWrite your message and finish it with a line 'done', or write 'quit' to leave the chat.")?;

        let mut lines: Vec<String> = vec![];
        loop {
            let line = match self.console.read_line("")? {
                Some(line) => line,
                None => return Ok(None),
            };

            if line.trim().eq_ignore_ascii_case("quit") {
                return Ok(None);
            }
            if line.trim().eq_ignore_ascii_case("done") {
                break;
            }
            lines.push(line);
        }

        return Ok(Some(lines.join("\n")));
    }

    /// Lets the user attach uploaded files to the next message. Returns
    /// `None` when the user left the chat.
    async fn collect_attachments(&mut self) -> Result<Option<Vec<String>>> {
        let mut file_ids: Vec<String> = vec![];
        loop {
            self.console
                .say("1. Attach a file\n2. Continue to write your message")?;

            match self.console.choose("Choose an option: ", 2)? {
                Choice::Cancel => return Ok(None),
                Choice::Invalid => continue,
                Choice::Index(0) => {
                    let res = self.upload_flow().await;
                    match res {
                        Ok(Some(file_id)) => file_ids.push(file_id),
                        Ok(None) => self.console.say("No file was attached.")?,
                        Err(err) => self.report(Err(err))?,
                    }
                }
                Choice::Index(_) => return Ok(Some(file_ids)),
            }
        }
    }

    pub async fn chat(&mut self, assistant_id: &str) -> Result<()> {
        let session =
            ChatSession::start(self.api, assistant_id, self.settings.policy.clone()).await?;
        self.console.say(&format!(
            "Welcome to the Assistant Chat! Thread: {}",
            session.thread_id()
        ))?;

        loop {
            let file_ids = match self.collect_attachments().await? {
                Some(file_ids) => file_ids,
                None => break,
            };
            let message = match self.read_message()? {
                Some(message) => message,
                None => break,
            };
            if message.trim().is_empty() {
                self.console.say("No message entered.")?;
                continue;
            }

            let console = &mut self.console;
            let res = session
                .send(&message, &file_ids, |progress| {
                    if let Err(err) = show_progress(console, progress) {
                        tracing::warn!(error = ?err, "Failed to show progress");
                    }
                })
                .await;

            match res {
                Ok(turn) => {
                    let replies = turn.replies();
                    if replies.is_empty() {
                        self.console.say("The assistant did not reply.")?;
                    }
                    for reply in replies {
                        self.console.say(&format!("Assistant: {}", reply.text()))?;
                    }
                }
                Err(err) => self.report(Err(err))?,
            }

            self.console
                .say("\nContinue chatting, or type 'quit' to exit.")?;
        }

        self.console.say("Exiting chat.")?;
        return Ok(());
    }

    /// Chats with the given assistant, or one picked from the list.
    pub async fn chat_with(&mut self, assistant_id: Option<String>) -> Result<()> {
        let assistant_id = match assistant_id {
            Some(assistant_id) => assistant_id,
            None => match self.pick_assistant().await? {
                Some(assistant_id) => assistant_id,
                None => return Ok(()),
            },
        };

        return self.chat(&assistant_id).await;
    }

    /// Uploads the given files, asks a single question in a fresh thread,
    /// and prints the assistant's answer.
    pub async fn ask(
        &mut self,
        assistant_id: &str,
        question: &str,
        files: &[path::PathBuf],
    ) -> Result<()> {
        let file_registry = FileRegistry::new(self.api);
        let mut file_ids: Vec<String> = vec![];
        for file in files {
            file_ids.push(file_registry.upload(file, FilePurpose::Assistants).await?);
        }

        let session =
            ChatSession::start(self.api, assistant_id, self.settings.policy.clone()).await?;
        let console = &mut self.console;
        let turn = session
            .send(question, &file_ids, |progress| {
                if let WaitProgress::Reminder { .. } = progress {
                    if let Err(err) = show_progress(console, progress) {
                        tracing::warn!(error = ?err, "Failed to show progress");
                    }
                }
            })
            .await?;

        for reply in turn.replies() {
            self.console.say(&reply.text())?;
        }

        return Ok(());
    }
}
