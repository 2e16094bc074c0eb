use std::path::{Path, PathBuf};
use std::sync::Arc;

use reqwest::Url;

use crate::{
    config::PollinationsConfig,
    error::{ArtGenError, Result},
    models::{GalleryRecord, GenerationRequest, SpeechClip, SpeechRequest},
    pollinations::{ImageGenerator, SpeechClient, Transport, UpstreamRequest},
    storage::GalleryStore,
};

/// A user's session: submits generations, keeps the gallery, and saves
/// results to disk.
///
/// `generating` is the double-submit guard. Only one generation may be in
/// flight per studio; a second submission while the first is pending is
/// refused with [`ArtGenError::Busy`]. The flag is held by a
/// `GeneratingGuard`, so it is cleared even when the pending generation
/// is cancelled by dropping its future.
pub struct Studio {
    generator: Arc<dyn ImageGenerator>,
    speech: SpeechClient,
    transport: Arc<dyn Transport>,
    user_agent: String,
    gallery: GalleryStore,
    generating: bool,
}

/// Raises the in-flight flag for as long as it lives.
struct GeneratingGuard<'a>(&'a mut bool);

impl<'a> GeneratingGuard<'a> {
    fn hold(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for GeneratingGuard<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

impl Studio {
    pub fn new(
        generator: Arc<dyn ImageGenerator>,
        transport: Arc<dyn Transport>,
        config: &PollinationsConfig,
        gallery: GalleryStore,
    ) -> Self {
        Self {
            generator,
            speech: SpeechClient::new(transport.clone(), config.clone()),
            transport,
            user_agent: config.user_agent.clone(),
            gallery,
            generating: false,
        }
    }

    pub fn gallery(&self) -> &GalleryStore {
        &self.gallery
    }

    pub fn gallery_mut(&mut self) -> &mut GalleryStore {
        &mut self.gallery
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    /// Generates an image and, on success, saves it at the top of the gallery.
    pub async fn generate(&mut self, request: GenerationRequest) -> Result<GalleryRecord> {
        if self.generating {
            return Err(ArtGenError::Busy);
        }
        if !request.has_prompt() {
            return Err(ArtGenError::MissingPrompt);
        }
        let request = Self::normalize(request);

        let outcome = {
            let _guard = GeneratingGuard::hold(&mut self.generating);
            self.generator.generate(request.clone()).await
        };

        let result = outcome?;
        let draft = GalleryRecord::new(result.image_url, request.prompt);
        let record = draft.clone().with_id(self.gallery.next_id(&draft));
        self.gallery.add(record.clone())?;
        log::info!("✅ Saved image {} to the gallery", record.id);
        Ok(record)
    }

    pub async fn speak(&self, request: SpeechRequest) -> Result<SpeechClip> {
        self.speech.synthesize(request).await
    }

    /// Fetches a gallery image and writes it into `dir`.
    pub async fn download(&self, id: &str, dir: &Path) -> Result<PathBuf> {
        let record = self
            .gallery
            .get(id)
            .ok_or_else(|| ArtGenError::RequestError(format!("No gallery image with id {}", id)))?;
        let url = Url::parse(&record.url)
            .map_err(|e| ArtGenError::RequestError(format!("Invalid image URL: {}", e)))?;

        let response = self
            .transport
            .fetch(UpstreamRequest::new(url, &self.user_agent))
            .await?;
        if !response.head.is_success() {
            return Err(ArtGenError::UpstreamError {
                status: response.head.status,
            });
        }

        let path = dir.join(record.download_file_name());
        tokio::fs::write(&path, &response.body).await?;
        log::info!("💾 Image saved to: {}", path.display());
        Ok(path)
    }

    /// Writes a speech clip into `dir` under a name derived from its prompt.
    pub async fn save_clip(
        &self,
        request: &SpeechRequest,
        clip: &SpeechClip,
        dir: &Path,
    ) -> Result<PathBuf> {
        let path = dir.join(request.download_file_name());
        tokio::fs::write(&path, &clip.audio).await?;
        log::info!("💾 Audio saved to: {}", path.display());
        Ok(path)
    }

    // The form only offers transparency for gptimage; blank optional
    // fields are not sent at all.
    fn normalize(mut request: GenerationRequest) -> GenerationRequest {
        if !request.wants_transparency() {
            request.transparent = None;
        }
        request.image = request.image.filter(|s| !s.is_empty());
        request.referrer = request.referrer.filter(|s| !s.is_empty());
        request
    }
}
