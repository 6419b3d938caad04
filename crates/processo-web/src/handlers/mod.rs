pub mod download;
pub mod page_image;
pub mod process_ai;
pub mod process_pdf;
