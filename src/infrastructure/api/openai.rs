#[cfg(test)]
#[path = "openai_test.rs"]
mod tests;

use std::path;
use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::multipart;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;
use tokio::fs;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Assistant;
use crate::domain::models::AssistantTemplate;
use crate::domain::models::AssistantUpdate;
use crate::domain::models::AssistantsApi;
use crate::domain::models::FileObject;
use crate::domain::models::FilePurpose;
use crate::domain::models::NewMessage;
use crate::domain::models::Run;
use crate::domain::models::Thread;
use crate::domain::models::ThreadMessage;

const OFFICIAL_URL: &str = "https://api.openai.com";
const PAGE_LIMIT: &str = "100";

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ListResponse<T> {
    data: Vec<T>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    last_id: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct DeletedResponse {
    id: String,
    deleted: bool,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct RunRequest {
    assistant_id: String,
}

/// Turns a non 2xx response into an error carrying the vendor's message, and
/// decodes the body otherwise.
async fn parse_response<T: DeserializeOwned>(res: reqwest::Response, action: &str) -> Result<T> {
    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        tracing::error!(status = status.as_u16(), body = body, "Failed to {action}");

        let message = match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(err) => err.error.message,
            Err(_) => format!("HTTP {}", status.as_u16()),
        };
        bail!(format!("Failed to {action}: {message}"));
    }

    let text = res.text().await?;
    tracing::debug!(body = text, "{action}");
    return Ok(serde_json::from_str::<T>(&text)?);
}

pub struct OpenAI {
    url: String,
    token: String,
    timeout: String,
    client: reqwest::Client,
}

impl Default for OpenAI {
    fn default() -> OpenAI {
        return OpenAI::new(
            Config::get(ConfigKey::OpenAiURL),
            Config::get(ConfigKey::OpenAiToken),
            Config::get(ConfigKey::HealthCheckTimeout),
        );
    }
}

impl OpenAI {
    pub fn new(url: String, token: String, timeout: String) -> OpenAI {
        return OpenAI {
            url: url.trim_end_matches('/').to_string(),
            token,
            timeout,
            client: reqwest::Client::new(),
        };
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        return self
            .client
            .request(method, format!("{url}/v1/{path}", url = self.url))
            .header("Authorization", format!("Bearer {}", self.token))
            .header("OpenAI-Beta", "assistants=v1");
    }

    /// Follows `after` cursors until the vendor reports no more pages.
    async fn list_all<T: DeserializeOwned>(
        &self,
        path: &str,
        order: &str,
        action: &str,
    ) -> Result<Vec<T>> {
        let mut items: Vec<T> = vec![];
        let mut after: Option<String> = None;

        loop {
            let mut req = self
                .request(Method::GET, path)
                .query(&[("order", order), ("limit", PAGE_LIMIT)]);
            if let Some(cursor) = &after {
                req = req.query(&[("after", cursor.as_str())]);
            }

            let page: ListResponse<T> = parse_response(req.send().await?, action).await?;
            items.extend(page.data);

            if !page.has_more {
                break;
            }
            match page.last_id {
                Some(last_id) => after = Some(last_id),
                None => {
                    tracing::warn!(path = path, "More pages reported without a cursor");
                    break;
                }
            }
        }

        return Ok(items);
    }
}

#[async_trait]
impl AssistantsApi for OpenAI {
    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        if self.url.is_empty() {
            bail!("OpenAI URL is not defined");
        }
        if self.token.is_empty() {
            bail!("OpenAI token is not defined");
        }

        // The official API has no useful index route. Only health check
        // proxies and compatible servers.
        if self.url == OFFICIAL_URL {
            return Ok(());
        }

        let res = self
            .client
            .get(&self.url)
            .timeout(Duration::from_millis(self.timeout.parse::<u64>()?))
            .send()
            .await;

        let status = match res {
            Ok(res) => res.status().as_u16(),
            Err(err) => {
                tracing::error!(error = ?err, "OpenAI is not reachable");
                bail!("OpenAI is not reachable");
            }
        };
        if status >= 500 {
            tracing::error!(status = status, "OpenAI health check failed");
            bail!("OpenAI health check failed");
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn list_assistants(&self) -> Result<Vec<Assistant>> {
        return self
            .list_all("assistants", "desc", "list assistants")
            .await;
    }

    #[allow(clippy::implicit_return)]
    async fn create_assistant(&self, template: &AssistantTemplate) -> Result<Assistant> {
        let res = self
            .request(Method::POST, "assistants")
            .json(template)
            .send()
            .await?;

        return parse_response(res, "create assistant").await;
    }

    #[allow(clippy::implicit_return)]
    async fn retrieve_assistant(&self, assistant_id: &str) -> Result<Assistant> {
        let res = self
            .request(Method::GET, &format!("assistants/{assistant_id}"))
            .send()
            .await?;

        return parse_response(res, "load assistant").await;
    }

    #[allow(clippy::implicit_return)]
    async fn update_assistant(
        &self,
        assistant_id: &str,
        update: &AssistantUpdate,
    ) -> Result<Assistant> {
        let res = self
            .request(Method::POST, &format!("assistants/{assistant_id}"))
            .json(update)
            .send()
            .await?;

        return parse_response(res, "update assistant").await;
    }

    #[allow(clippy::implicit_return)]
    async fn delete_assistant(&self, assistant_id: &str) -> Result<()> {
        let res = self
            .request(Method::DELETE, &format!("assistants/{assistant_id}"))
            .send()
            .await?;

        let deleted: DeletedResponse = parse_response(res, "delete assistant").await?;
        if !deleted.deleted {
            bail!(format!("Assistant {} was not deleted", deleted.id));
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn list_files(&self) -> Result<Vec<FileObject>> {
        let res = self.request(Method::GET, "files").send().await?;

        let list: ListResponse<FileObject> = parse_response(res, "list files").await?;
        return Ok(list.data);
    }

    #[allow(clippy::implicit_return)]
    async fn upload_file(
        &self,
        file_path: &path::Path,
        purpose: FilePurpose,
    ) -> Result<FileObject> {
        let file_name = match file_path.file_name() {
            Some(name) => name.to_string_lossy().to_string(),
            None => bail!(format!("{} has no file name", file_path.display())),
        };
        let bytes = fs::read(file_path).await?;

        let form = multipart::Form::new()
            .text("purpose", purpose.to_string())
            .part("file", multipart::Part::bytes(bytes).file_name(file_name));

        let res = self
            .request(Method::POST, "files")
            .multipart(form)
            .send()
            .await?;

        return parse_response(res, "upload file").await;
    }

    #[allow(clippy::implicit_return)]
    async fn delete_file(&self, file_id: &str) -> Result<()> {
        let res = self
            .request(Method::DELETE, &format!("files/{file_id}"))
            .send()
            .await?;

        let deleted: DeletedResponse = parse_response(res, "delete file").await?;
        if !deleted.deleted {
            bail!(format!("File {} was not deleted", deleted.id));
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn create_thread(&self) -> Result<Thread> {
        let res = self
            .request(Method::POST, "threads")
            .json(&serde_json::json!({}))
            .send()
            .await?;

        return parse_response(res, "create thread").await;
    }

    #[allow(clippy::implicit_return)]
    async fn create_message(
        &self,
        thread_id: &str,
        message: &NewMessage,
    ) -> Result<ThreadMessage> {
        let res = self
            .request(Method::POST, &format!("threads/{thread_id}/messages"))
            .json(message)
            .send()
            .await?;

        return parse_response(res, "create message").await;
    }

    #[allow(clippy::implicit_return)]
    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>> {
        return self
            .list_all(
                &format!("threads/{thread_id}/messages"),
                "asc",
                "list messages",
            )
            .await;
    }

    #[allow(clippy::implicit_return)]
    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run> {
        let req = RunRequest {
            assistant_id: assistant_id.to_string(),
        };

        let res = self
            .request(Method::POST, &format!("threads/{thread_id}/runs"))
            .json(&req)
            .send()
            .await?;

        return parse_response(res, "create run").await;
    }

    #[allow(clippy::implicit_return)]
    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        let res = self
            .request(Method::GET, &format!("threads/{thread_id}/runs/{run_id}"))
            .send()
            .await?;

        return parse_response(res, "check run status").await;
    }

    #[allow(clippy::implicit_return)]
    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        let res = self
            .request(
                Method::POST,
                &format!("threads/{thread_id}/runs/{run_id}/cancel"),
            )
            .send()
            .await?;

        return parse_response(res, "cancel run").await;
    }
}
