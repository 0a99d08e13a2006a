//! Render farm workflow backends for images and image-to-video.

mod image;
mod video;
mod workflow;

pub use image::RenderFarmImageGenerator;
pub use video::RenderFarmVideoGenerator;
pub use workflow::WorkflowTemplate;
