//! Vision-language queries: an image plus a spoken question

use std::path::Path;

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::config::VisionModel;
use crate::{Error, Result};

const GROQ_CHAT_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Asks a vision-capable model about an image
pub struct VisionQueryClient {
    client: reqwest::Client,
    api_key: String,
    model: VisionModel,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: Vec<ContentPart>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl VisionQueryClient {
    /// Create a new vision client
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the API key is empty
    pub fn new(api_key: String, model: VisionModel) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "Groq API key required for vision queries".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        })
    }

    /// Ask a question about an image
    ///
    /// The image is read and base64-encoded once per call. A missing image
    /// is a fatal configuration error: with nothing to look at there is no
    /// useful question to ask, so the run fails fast rather than soft.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the image cannot be read,
    /// [`Error::Transport`] on service failure, and [`Error::EmptyResult`]
    /// if the model returns no text
    pub async fn ask(&self, prompt: &str, image_path: &Path) -> Result<String> {
        let data_url = encode_image(image_path)?;

        let request = ChatCompletionRequest {
            model: self.model.as_str(),
            messages: vec![Message {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: prompt.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: data_url },
                    },
                ],
            }],
        };

        tracing::debug!(model = self.model.as_str(), prompt, "sending vision query");

        let response = self
            .client
            .post(GROQ_CHAT_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "vision request failed");
                Error::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "vision API error");
            return Err(Error::Transport(format!(
                "vision API error {status}: {body}"
            )));
        }

        let result: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Transport(format!("failed to parse response: {e}")))?;

        let answer = result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if answer.trim().is_empty() {
            return Err(Error::EmptyResult(
                "vision model returned no text".to_string(),
            ));
        }

        tracing::info!(answer = %answer, "vision query complete");
        Ok(answer)
    }
}

/// Read an image file and encode it as a base64 data URL
///
/// # Errors
///
/// Returns [`Error::Config`] if the file cannot be read (fail-fast policy)
pub fn encode_image(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)
        .map_err(|e| Error::Config(format!("image file '{}': {e}", path.display())))?;

    let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
    Ok(format!("data:{};base64,{encoded}", media_type(path)))
}

/// Media type from the file extension; unknown extensions default to jpeg
fn media_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn empty_api_key_rejected() {
        let result = VisionQueryClient::new(String::new(), VisionModel::default());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn missing_image_is_config_error() {
        let err = encode_image(Path::new("/nonexistent/face.jpg")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn encode_produces_data_url() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(&[0x89, b'P', b'N', b'G']).unwrap();

        let url = encode_image(file.path()).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn unknown_extension_defaults_to_jpeg() {
        assert_eq!(media_type(&PathBuf::from("photo.jpg")), "image/jpeg");
        assert_eq!(media_type(&PathBuf::from("photo.bin")), "image/jpeg");
        assert_eq!(media_type(&PathBuf::from("photo.WEBP")), "image/webp");
    }
}
