//! `sheetdb-client`: the grid service over HTTP.
//!
//! [`HttpGridClient`] implements the engine's `GridBackend`, so a
//! `GridStore` can be opened directly on it. Credentials live in
//! `<config_dir>/sheetdb/credentials.json`.

pub mod auth;
pub mod client;

pub use auth::{
    credentials_path, delete_credentials, load_credentials, save_credentials, Credentials,
};
pub use client::{ClientError, HttpGridClient};
