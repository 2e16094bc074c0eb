pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod pollinations;
#[cfg(feature = "server")]
pub mod server;
pub mod storage;
pub mod studio;

pub use config::{Config, PollinationsConfig, ServerConfig, StoreConfig};
pub use error::{ArtGenError, Result};
pub use models::*;
pub use pollinations::{
    ImageClient, ImageGenerator, ModelClient, PollinationsClient, RemoteGateway, SpeechClient,
};
pub use storage::{FileStore, GalleryStore, KeyValueStore, MemoryStore};
pub use studio::Studio;
