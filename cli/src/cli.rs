use std::path::PathBuf;

use engine::video_model::AnimationCategory;

#[derive(Debug, clap::Parser)]
pub struct Cli {
    /// Text prompt describing the video
    pub prompt: String,

    /// Reference image, required unless the category is text-to-video
    #[arg(short, long)]
    pub image: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value = "product-showcase")]
    pub category: AnimationCategory,

    /// API key, read from GEMINI_API_KEY when omitted
    #[arg(short, long)]
    pub key: Option<String>,

    /// Where to write the downloaded video
    #[arg(short, long, default_value = "output.mp4")]
    pub output: PathBuf,
}
