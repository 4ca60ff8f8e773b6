pub mod email;
pub mod image;
pub mod storage;
