pub mod archive;
pub mod assets;
pub mod contacts;
