use std::pin::Pin;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use tokio_util::sync::CancellationToken;

pub mod veo;
pub use veo::Veo;

use crate::job::GenerationError;

#[derive(
    Debug,
    Clone,
    Copy,
    Display,
    clap::ValueEnum,
    Serialize,
    Deserialize,
    Hash,
    PartialEq,
    Eq,
    EnumIter,
    Default,
)]
pub enum AnimationCategory {
    #[default]
    #[strum(to_string = "Product Showcase")]
    ProductShowcase,
    #[strum(to_string = "Logo Animation")]
    LogoAnimation,
    #[strum(to_string = "Text to Video")]
    TextToVideo,
}

impl AnimationCategory {
    pub fn requires_reference_image(&self) -> bool {
        !matches!(self, AnimationCategory::TextToVideo)
    }
}

#[derive(Debug, Clone)]
pub struct ReferenceImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub reference_image: Option<ReferenceImage>,
    pub category: AnimationCategory,
}

impl GenerationRequest {
    /// Checks the request invariants. Must pass before anything goes
    /// over the wire.
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.prompt.trim().is_empty() {
            return Err(GenerationError::Validation(
                "Please enter a prompt to generate the video.".into(),
            ));
        }

        if self.category.requires_reference_image() && self.reference_image.is_none() {
            return Err(GenerationError::Validation(format!(
                "The {} category needs a reference image.",
                self.category
            )));
        }

        Ok(())
    }
}

/// Terminal success value. The URL still needs the API key appended for
/// retrieval, see [`Veo::download`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub video_url: String,
}

pub type ProgressFn<'a> = &'a (dyn Fn(&str) + Send + Sync);

pub trait VideoModel {
    fn generate<'a>(
        &'a self,
        request: &'a GenerationRequest,
        on_progress: ProgressFn<'a>,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<GenerationResult, GenerationError>> + Send + 'a>>;

    fn clone(&self) -> Box<dyn VideoModel + Send + 'static>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(
        prompt: &str,
        category: AnimationCategory,
        image: Option<ReferenceImage>,
    ) -> GenerationRequest {
        GenerationRequest {
            prompt: prompt.into(),
            reference_image: image,
            category,
        }
    }

    fn png() -> ReferenceImage {
        ReferenceImage {
            bytes: vec![1, 2, 3],
            mime_type: "image/png".into(),
        }
    }

    #[test]
    fn empty_prompt_is_rejected() {
        for prompt in ["", "   \n"] {
            let err = request(prompt, AnimationCategory::TextToVideo, None)
                .validate()
                .unwrap_err();
            assert!(matches!(err, GenerationError::Validation(_)));
        }
    }

    #[test]
    fn image_categories_need_an_image() {
        for category in [
            AnimationCategory::ProductShowcase,
            AnimationCategory::LogoAnimation,
        ] {
            let err = request("logo spin", category, None).validate().unwrap_err();
            assert!(matches!(err, GenerationError::Validation(_)));

            request("logo spin", category, Some(png()))
                .validate()
                .unwrap();
        }
    }

    #[test]
    fn text_to_video_needs_no_image() {
        request("sunset", AnimationCategory::TextToVideo, None)
            .validate()
            .unwrap();
    }

    #[test]
    fn category_display_names() {
        assert_eq!(
            AnimationCategory::ProductShowcase.to_string(),
            "Product Showcase"
        );
        assert_eq!(
            AnimationCategory::LogoAnimation.to_string(),
            "Logo Animation"
        );
        assert_eq!(AnimationCategory::TextToVideo.to_string(), "Text to Video");
    }
}
