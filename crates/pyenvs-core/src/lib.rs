//! Core types and configuration for python-environments.
//!
//! This crate defines the `environments.toml` schema ([`Config`]), the
//! image/tag model ([`Image`], [`ImagesContainer`]), registry prefixes
//! ([`Repo`]), template data ([`Template`]), and shared error types.

pub mod config;
pub mod env;
pub mod error;
pub mod image;
pub mod repo;
pub mod template;

pub use config::Config;
pub use env::{Labels, environment_info, git_commit, release};
pub use error::{Error, Result};
pub use image::{Image, ImageKind, ImagesContainer};
pub use repo::Repo;
pub use template::{Template, TemplateData, TemplateSpec};
