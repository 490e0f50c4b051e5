use std::path::Path;

use clap::Parser;
use color_eyre::{Result, eyre::eyre};
use engine::{
    job::GenerationError,
    video_model::{GenerationRequest, ReferenceImage, Veo, VideoModel},
};
use log::debug;
use tokio_util::sync::CancellationToken;

mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    pretty_env_logger::init();
    let args = cli::Cli::parse();

    let api_key = match args.key {
        Some(key) => key,
        None => std::env::var("GEMINI_API_KEY")
            .map_err(|_| eyre!("No API key, pass --key or set GEMINI_API_KEY"))?,
    };

    let reference_image = match &args.image {
        Some(path) => Some(ReferenceImage {
            bytes: std::fs::read(path)?,
            mime_type: mime_type_for(path).into(),
        }),
        None => None,
    };

    let request = GenerationRequest {
        prompt: args.prompt,
        reference_image,
        category: args.category,
    };

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let veo = Veo::new(api_key);
    let result = match veo
        .generate(&request, &|msg| println!("{msg}"), &cancel)
        .await
    {
        Ok(result) => result,
        Err(e @ GenerationError::InvalidCredential { .. }) => {
            eprintln!("Your API key is invalid. Please select a valid key.");
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    debug!("Result locator: {}", result.video_url);
    println!("Fetching the video file...");
    let bytes = veo.download(&result).await?;
    std::fs::write(&args.output, &bytes)?;
    println!("Saved {}, {} bytes", args.output.display(), bytes.len());

    Ok(())
}

fn mime_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/png",
    }
}
