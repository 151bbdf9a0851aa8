//! # razator-utils
//!
//! A grab bag of small helpers.
//!
//! - [`batch`]: split a sequence into fixed-size batches
//! - [`case`]: camelCase to snake_case conversion
//! - [`flatten`]: flatten nested JSON objects into single-level maps
//! - [`chrome`]: detect the installed Chrome major version
//! - [`webhook`]: post messages to a Discord webhook
//! - [`log`]: build console and file loggers, capture process stdout into a logger
//!
//! ## Quick Start
//!
//! ```rust
//! use razator_utils::{batchify, camel_to_snake};
//!
//! let batches: Vec<_> = batchify(&[1, 2, 3, 4, 5], 2).unwrap().collect();
//! assert_eq!(batches, vec![&[1, 2][..], &[3, 4][..], &[5][..]]);
//! assert_eq!(camel_to_snake("thisIsTest"), "this_is_test");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod batch;
pub mod case;
pub mod chrome;
pub mod cli;
pub mod error;
pub mod flatten;
pub mod log;
pub mod utils;
pub mod webhook;

pub use crate::batch::{batchify, batchify_iter};
pub use crate::case::camel_to_snake;
pub use crate::chrome::{get_chrome_major_version, ChromeProbe, ChromeVersion};
pub use crate::cli::Cli;
pub use crate::error::{Error, Result};
pub use crate::flatten::{flatten, flatten_dict, unflatten_dict, FlattenOptions};
pub use crate::webhook::{send_discord_message, DiscordNotifier};

/// The current version of razator-utils.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
