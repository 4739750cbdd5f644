pub mod analysis_types;
pub mod camera_types;
pub mod image_types;
