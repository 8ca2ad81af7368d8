#![doc = "geopublisher: copy feature datasets between workspaces, with dated zip archives."]

//! This crate publishes a feature dataset from one workspace to another,
//! optionally zipping a shapefile representation of the result and reporting
//! the outcome through a run log or a notification email.
//!
//! # Usage
//! Call [`publish::publish`] with a [`store::DatasetStore`] backend, or drive
//! a whole job through the `geopublisher publish` CLI with a YAML config.

pub mod archive;
pub mod cli;
pub mod config;
pub mod load_config;
pub mod mailer;
pub mod publish;
pub mod runlog;
pub mod shapefile;
pub mod store;
