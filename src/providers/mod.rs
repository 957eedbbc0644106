pub mod discord;
pub mod image;
