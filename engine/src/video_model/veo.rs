use std::pin::Pin;

use log::debug;
use tokio_util::sync::CancellationToken;

use crate::{
    job::{self, GenerationError},
    video_model::{GenerationRequest, GenerationResult, ProgressFn, VideoModel},
};

pub mod veo_api;

#[derive(Clone)]
pub struct Veo {
    api_key: String,
    client: reqwest::Client,
}

impl Veo {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
        }
    }

    /// Fetches the generated video bytes. The result locator requires
    /// the API key as an extra query parameter.
    pub async fn download(&self, result: &GenerationResult) -> Result<Vec<u8>, GenerationError> {
        veo_api::download(&result.video_url, &self.api_key, &self.client).await
    }
}

impl VideoModel for Veo {
    fn generate<'a>(
        &'a self,
        request: &'a GenerationRequest,
        on_progress: ProgressFn<'a>,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<GenerationResult, GenerationError>> + Send + 'a>> {
        Box::pin(async move {
            if self.api_key.is_empty() {
                return Err(GenerationError::Configuration);
            }
            request.validate()?;

            on_progress("Sending request to the video model...");
            let handle = veo_api::submit(request, &self.api_key, &self.client).await?;
            debug!("Started operation {}", handle.0);

            let ops = veo_api::Operations {
                api_key: &self.api_key,
                client: &self.client,
            };
            job::await_completion(&ops, handle, on_progress, cancel).await
        })
    }

    fn clone(&self) -> Box<dyn VideoModel + Send + 'static> {
        Box::new(Clone::clone(self))
    }
}
