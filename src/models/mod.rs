pub mod data_type;
pub mod event;
pub mod image;

pub use data_type::{ClipboardDataType, NotificationType};
pub use event::ClipboardChangeEvent;
pub use image::{ClipboardImage, ImageFormat, detect_image_format};
