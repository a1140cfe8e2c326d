pub mod image_helper;
pub mod weights_file;
