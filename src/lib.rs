//! nbsetup - Notebook environment setup.
//!
//! nbsetup makes sure a notebook project has what it needs to run: a
//! Python interpreter in the supported range and, optionally, a
//! Docker-compatible container runtime. It looks for what is already
//! installed, installs what is missing through the platform's package
//! manager, and pins the interpreter it settled on in
//! `<install-root>/.python_cmd` for downstream build tooling.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - The optional `.nbsetup.yml` file
//! - [`environment`] - Host platform detection
//! - [`error`] - Error types and result aliases
//! - [`kernel`] - Jupyter kernel registration
//! - [`requirements`] - Version probing, candidates, installers and the resolver
//! - [`shell`] - Process execution
//! - [`state`] - The write-once interpreter pin
//! - [`ui`] - Terminal output and prompts
//!
//! # Example
//!
//! ```
//! use nbsetup::requirements::{Version, VersionRange};
//!
//! let range: VersionRange = "3.11-3.13".parse().unwrap();
//! let found = Version::parse_from_output("Python 3.12.4").unwrap();
//! assert!(range.accepts(&found));
//! assert!(!range.accepts(&Version::new(3, 14, 0)));
//! ```

pub mod cli;
pub mod config;
pub mod environment;
pub mod error;
pub mod kernel;
pub mod requirements;
pub mod shell;
pub mod state;
pub mod ui;

pub use error::{Result, SetupError};
