pub mod convert;
pub mod download;
pub mod formats;
pub mod health;
pub mod ping;
