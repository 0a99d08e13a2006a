//! Vendor task API image-to-video backend.

mod video;

pub use video::TaskApiVideoGenerator;
