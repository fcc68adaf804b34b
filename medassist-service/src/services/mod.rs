pub mod cleaner;
pub mod prompts;
pub mod providers;
pub mod uploads;

pub use uploads::UploadStore;
