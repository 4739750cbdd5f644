pub mod camera;
pub mod face_api;
pub mod image_service;
