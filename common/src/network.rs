pub mod interface;
pub mod space;
pub mod subnet;
pub mod target;
