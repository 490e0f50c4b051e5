pub mod job;
pub mod video_model;

pub use video_model::{Veo, VideoModel};
