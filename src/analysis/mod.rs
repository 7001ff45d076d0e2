pub mod analyzer;
pub mod server;
pub mod store;

pub use analyzer::{FixedPostureAnalyzer, PostureAnalyzer};
pub use server::{router, serve, ApiState, NO_PHOTO_MESSAGE};
pub use store::{InMemoryPhotoStore, PhotoStore, SqlitePhotoStore};
