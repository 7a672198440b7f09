pub mod slru;

pub use slru::SlruCache;
