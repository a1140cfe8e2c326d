pub mod centering;
pub mod chunk;
pub mod dense_layer;
pub mod error;
pub mod grayscale;
pub mod grid_manager;
pub mod network;
pub mod pixel;
pub mod prediction;
pub mod raw_image;
pub mod utils;
