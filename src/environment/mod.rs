//! Host platform detection.
//!
//! Determines which installer variant applies to this machine. The
//! priority chain is:
//!
//! 1. Explicit `--platform` flag / `NBSETUP_PLATFORM`
//! 2. Windows-style environment (`OS=Windows_NT`, `MSYSTEM`)
//! 3. Kernel name, refined by `/etc/os-release` on Linux
//!
//! Anything outside the supported set is an
//! [`UnsupportedPlatform`](crate::SetupError::UnsupportedPlatform) error.

pub mod host;

pub use host::{HostIdentity, HostPlatform, OsRelease};
