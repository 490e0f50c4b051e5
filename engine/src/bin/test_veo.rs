use color_eyre::{Result, eyre::eyre};
use engine::video_model::{AnimationCategory, GenerationRequest, Veo, VideoModel};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let api_key = std::env::args()
        .nth(1)
        .ok_or(eyre!("Missing api key as first arg"))?;
    let prompt = std::env::args()
        .nth(2)
        .unwrap_or_else(|| "A sunset over the ocean".into());

    let veo = Veo::new(api_key);
    let request = GenerationRequest {
        prompt,
        reference_image: None,
        category: AnimationCategory::TextToVideo,
    };

    let result = veo
        .generate(&request, &|msg| println!("{msg}"), &CancellationToken::new())
        .await?;
    println!("Video URL: {}", result.video_url);

    let bytes = veo.download(&result).await?;
    std::fs::write("output.mp4", &bytes)?;
    println!("Saved video, {} bytes", bytes.len());

    Ok(())
}
