//! Host identity and the supported platform set.

use crate::error::{Result, SetupError};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Default location of the os-release file on Linux.
pub const OS_RELEASE_PATH: &str = "/etc/os-release";

/// The fields of `/etc/os-release` that select an installer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OsRelease {
    /// Distribution id (`ID=`), lowercased.
    pub id: String,
    /// Parent distributions (`ID_LIKE=`), lowercased.
    pub id_like: Vec<String>,
}

impl OsRelease {
    /// Parse os-release contents. Unknown keys and comments are ignored.
    pub fn parse(contents: &str) -> Self {
        let mut release = Self::default();
        for line in contents.lines() {
            let Some((key, value)) = line.trim().split_once('=') else {
                continue;
            };
            let value = value.trim().trim_matches('"').trim_matches('\'');
            match key {
                "ID" => release.id = value.to_lowercase(),
                "ID_LIKE" => {
                    release.id_like = value
                        .split_whitespace()
                        .map(|s| s.to_lowercase())
                        .collect();
                }
                _ => {}
            }
        }
        release
    }

    /// Read and parse an os-release file, `None` if it is unreadable.
    pub fn read(path: &Path) -> Option<Self> {
        std::fs::read_to_string(path).ok().map(|c| Self::parse(&c))
    }

    fn is(&self, distro: &str) -> bool {
        self.id == distro || self.id_like.iter().any(|like| like == distro)
    }
}

/// Raw facts about the host, gathered before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostIdentity {
    /// Kernel / OS name (`linux`, `macos`, `windows`, ...).
    pub kernel: String,
    /// Parsed `/etc/os-release`, when present.
    pub os_release: Option<OsRelease>,
    /// Whether a Windows-style environment was observed.
    pub windows_env: bool,
}

impl HostIdentity {
    /// Detect the identity of the running host.
    pub fn detect() -> Self {
        Self::detect_with_env(
            |key| std::env::var(key),
            std::env::consts::OS,
            Path::new(OS_RELEASE_PATH),
        )
    }

    /// Detect with a custom env var lookup, kernel name and os-release path
    /// (for testing).
    pub fn detect_with_env<F>(env_fn: F, kernel: &str, os_release_path: &Path) -> Self
    where
        F: Fn(&str) -> std::result::Result<String, std::env::VarError>,
    {
        let windows_env =
            env_fn("OS").as_deref() == Ok("Windows_NT") || env_fn("MSYSTEM").is_ok();
        let os_release = if kernel == "linux" {
            OsRelease::read(os_release_path)
        } else {
            None
        };
        Self {
            kernel: kernel.to_string(),
            os_release,
            windows_env,
        }
    }
}

/// Platforms with a known installer variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPlatform {
    Ubuntu,
    Debian,
    MacOS,
    Windows,
}

impl HostPlatform {
    /// Classify a detected host.
    pub fn from_identity(identity: &HostIdentity) -> Result<Self> {
        if identity.windows_env || identity.kernel == "windows" {
            return Ok(HostPlatform::Windows);
        }
        match identity.kernel.as_str() {
            "macos" => Ok(HostPlatform::MacOS),
            "linux" => match &identity.os_release {
                Some(release) if release.is("ubuntu") => Ok(HostPlatform::Ubuntu),
                Some(release) if release.is("debian") => Ok(HostPlatform::Debian),
                Some(release) => Err(SetupError::UnsupportedPlatform {
                    platform: release.id.clone(),
                    reason: "only Ubuntu and Debian based distributions are supported on Linux"
                        .to_string(),
                }),
                None => Err(SetupError::UnsupportedPlatform {
                    platform: "linux".to_string(),
                    reason: format!("could not identify the distribution ({} missing)", OS_RELEASE_PATH),
                }),
            },
            other => Err(SetupError::UnsupportedPlatform {
                platform: other.to_string(),
                reason: "supported platforms are Ubuntu, Debian, macOS and Windows".to_string(),
            }),
        }
    }

    /// Detect and classify the running host.
    pub fn detect() -> Result<Self> {
        let identity = HostIdentity::detect();
        tracing::debug!("Host identity: {:?}", identity);
        Self::from_identity(&identity)
    }

    /// The platform named by `id`, or the detected one.
    pub fn resolve(id: Option<&str>) -> Result<Self> {
        match id {
            Some(id) => id.parse(),
            None => Self::detect(),
        }
    }

    /// Stable identifier, accepted back by [`FromStr`].
    pub fn id(&self) -> &'static str {
        match self {
            HostPlatform::Ubuntu => "ubuntu",
            HostPlatform::Debian => "debian",
            HostPlatform::MacOS => "macos",
            HostPlatform::Windows => "windows",
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, HostPlatform::Windows)
    }

    pub fn is_linux(&self) -> bool {
        matches!(self, HostPlatform::Ubuntu | HostPlatform::Debian)
    }
}

impl fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for HostPlatform {
    type Err = SetupError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ubuntu" => Ok(HostPlatform::Ubuntu),
            "debian" => Ok(HostPlatform::Debian),
            "macos" | "darwin" | "osx" => Ok(HostPlatform::MacOS),
            "windows" | "windows_nt" | "win32" => Ok(HostPlatform::Windows),
            other => Err(SetupError::UnsupportedPlatform {
                platform: other.to_string(),
                reason: "supported platforms are ubuntu, debian, macos and windows".to_string(),
            }),
        }
    }
}
