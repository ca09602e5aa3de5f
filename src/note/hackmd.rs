//! HackMD-style note publisher: authenticated PATCH with a full body replace.

use crate::defaults;
use crate::error::{LivenoteError, Result};
use crate::note::NotePublisher;
use serde::Serialize;

/// PATCH request body accepted by the note API.
#[derive(Debug, Serialize)]
struct NoteUpdate<'a> {
    content: &'a str,
}

/// Publisher backed by a HackMD-compatible notes API.
pub struct HackmdPublisher {
    client: reqwest::Client,
    note_url: String,
    token: String,
}

impl HackmdPublisher {
    /// Create a publisher for one note.
    ///
    /// # Arguments
    /// * `api_url` - Base notes endpoint, e.g. `https://api.hackmd.io/v1/notes`
    /// * `note_id` - Identifier of the note to update
    /// * `token` - Bearer token for the API
    ///
    /// # Errors
    /// Returns `LivenoteError::Sync` if the HTTP client cannot be built.
    pub fn new(api_url: &str, note_id: &str, token: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(defaults::HTTP_TIMEOUT)
            .build()
            .map_err(|e| LivenoteError::Sync {
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            note_url: format!("{}/{}", api_url.trim_end_matches('/'), note_id),
            token: token.to_string(),
        })
    }

    /// Full URL of the note being updated.
    pub fn note_url(&self) -> &str {
        &self.note_url
    }
}

#[async_trait::async_trait]
impl NotePublisher for HackmdPublisher {
    async fn replace(&self, content: &str) -> Result<()> {
        let response = self
            .client
            .patch(&self.note_url)
            .bearer_auth(&self.token)
            .json(&NoteUpdate { content })
            .send()
            .await
            .map_err(|e| LivenoteError::Sync {
                message: format!("Note request failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(LivenoteError::Sync {
                message: format!("Note endpoint returned status {}", response.status()),
            });
        }

        Ok(())
    }
}
