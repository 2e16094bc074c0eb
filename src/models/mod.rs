pub mod common;
pub mod gallery;
pub mod image;
pub mod request;
pub mod speech;

pub use common::*;
pub use gallery::*;
pub use image::*;
pub use request::*;
pub use speech::*;
