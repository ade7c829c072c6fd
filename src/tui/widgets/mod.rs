pub mod image_preview;
pub mod input_buffer;
