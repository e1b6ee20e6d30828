//! Block codecs for TIFF pixel data
//!
//! Each supported `Compression` tag value maps to a `CompressionHandler`
//! created through `CompressionFactory`.

mod handler;
mod uncompressed;
mod deflate;
mod factory;
mod lzw;
mod zstd;

pub use handler::CompressionHandler;
pub use uncompressed::UncompressedHandler;
pub use deflate::AdobeDeflateHandler;
pub use factory::CompressionFactory;
pub use lzw::LzwHandler;
pub use zstd::ZstdHandler;
