//! Audio playback through OS-native players
//!
//! Playback shells out to whatever the host platform ships: `afplay` on
//! macOS, `aplay` on Linux, and Windows Media Foundation via a PowerShell
//! one-liner on Windows. The player strategy is selected once at
//! construction, not re-detected per call.

use std::path::Path;
use std::process::Command;

use crate::{Error, Result};

/// Host operating system, detected once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformTarget {
    /// Microsoft Windows
    Windows,
    /// Apple macOS
    MacOs,
    /// Linux
    Linux,
    /// Anything else; playback is unsupported
    Other,
}

impl PlatformTarget {
    /// Detect the platform this process is running on
    #[must_use]
    pub fn detect() -> Self {
        match std::env::consts::OS {
            "windows" => Self::Windows,
            "macos" => Self::MacOs,
            "linux" => Self::Linux,
            _ => Self::Other,
        }
    }
}

/// One native playback strategy
pub trait NativePlayer: Send + Sync {
    /// Play an audio file, blocking until the player exits
    ///
    /// # Errors
    ///
    /// Returns error if the player binary is missing or exits nonzero
    fn play(&self, path: &Path) -> Result<()>;

    /// Player name for logging
    fn name(&self) -> &'static str;
}

/// `afplay`, shipped with macOS
struct Afplay;

impl NativePlayer for Afplay {
    fn play(&self, path: &Path) -> Result<()> {
        let mut command = Command::new(locate("afplay")?);
        command.arg(path);
        run_player("afplay", &mut command)
    }

    fn name(&self) -> &'static str {
        "afplay"
    }
}

/// ALSA `aplay`
struct Aplay;

impl NativePlayer for Aplay {
    fn play(&self, path: &Path) -> Result<()> {
        let mut command = Command::new(locate("aplay")?);
        command.arg(path);
        run_player("aplay", &mut command)
    }

    fn name(&self) -> &'static str {
        "aplay"
    }
}

/// Windows Media Foundation via PowerShell's `MediaPlayer`
struct WindowsMedia;

impl NativePlayer for WindowsMedia {
    fn play(&self, path: &Path) -> Result<()> {
        // MediaPlayer loads asynchronously; wait for the duration to be
        // known, then sleep it out so the call blocks like the others
        let script = format!(
            "Add-Type -AssemblyName PresentationCore; \
             $p = New-Object System.Windows.Media.MediaPlayer; \
             $p.Open([uri]'{}'); $p.Play(); \
             while (-not $p.NaturalDuration.HasTimeSpan) {{ Start-Sleep -Milliseconds 100 }}; \
             Start-Sleep -Seconds $p.NaturalDuration.TimeSpan.TotalSeconds",
            path.display().to_string().replace('\'', "''")
        );

        let mut command = Command::new(locate("powershell")?);
        command.args(["-NoProfile", "-Command", &script]);
        run_player("powershell", &mut command)
    }

    fn name(&self) -> &'static str {
        "powershell-mediaplayer"
    }
}

/// Stub for platforms without a known player
struct Unsupported;

impl NativePlayer for Unsupported {
    fn play(&self, _path: &Path) -> Result<()> {
        Err(Error::UnsupportedPlatform(format!(
            "no native audio player for {}",
            std::env::consts::OS
        )))
    }

    fn name(&self) -> &'static str {
        "unsupported"
    }
}

/// Locate a player binary on `PATH`
fn locate(binary: &str) -> Result<std::path::PathBuf> {
    which::which(binary).map_err(|_| Error::Device(format!("player binary not found: {binary}")))
}

/// Run a player command, mapping a nonzero exit to a soft failure
fn run_player(name: &str, command: &mut Command) -> Result<()> {
    let status = command
        .status()
        .map_err(|e| Error::Audio(format!("{name} failed to start: {e}")))?;

    if status.success() {
        Ok(())
    } else {
        Err(Error::Audio(format!("{name} exited with {status}")))
    }
}

/// Plays audio files via the platform's native player
pub struct AudioPlayback {
    platform: PlatformTarget,
    player: Box<dyn NativePlayer>,
}

impl AudioPlayback {
    /// Select the player for the detected host platform
    #[must_use]
    pub fn new() -> Self {
        Self::for_platform(PlatformTarget::detect())
    }

    /// Select the player for a specific platform
    #[must_use]
    pub fn for_platform(platform: PlatformTarget) -> Self {
        let player: Box<dyn NativePlayer> = match platform {
            PlatformTarget::Windows => Box::new(WindowsMedia),
            PlatformTarget::MacOs => Box::new(Afplay),
            PlatformTarget::Linux => Box::new(Aplay),
            PlatformTarget::Other => Box::new(Unsupported),
        };

        Self { platform, player }
    }

    /// The platform this playback instance was built for
    #[must_use]
    pub const fn platform(&self) -> PlatformTarget {
        self.platform
    }

    /// Play an audio file, blocking until playback finishes
    ///
    /// # Errors
    ///
    /// Returns [`Error::Audio`] if the file is missing or the player exits
    /// nonzero, [`Error::Device`] if the player binary is absent, and
    /// [`Error::UnsupportedPlatform`] on platforms with no known player
    pub fn play(&self, path: &Path) -> Result<()> {
        if !path.is_file() {
            return Err(Error::Audio(format!(
                "audio file not found: {}",
                path.display()
            )));
        }

        tracing::info!(player = self.player.name(), path = %path.display(), "playing audio");
        self.player.play(path)
    }
}

impl Default for AudioPlayback {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_matches_compile_target() {
        let platform = PlatformTarget::detect();
        #[cfg(target_os = "linux")]
        assert_eq!(platform, PlatformTarget::Linux);
        #[cfg(target_os = "macos")]
        assert_eq!(platform, PlatformTarget::MacOs);
        #[cfg(target_os = "windows")]
        assert_eq!(platform, PlatformTarget::Windows);
    }

    #[test]
    fn unsupported_platform_always_fails() {
        let playback = AudioPlayback::for_platform(PlatformTarget::Other);
        let file = tempfile::NamedTempFile::new().unwrap();

        let err = playback.play(file.path()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedPlatform(_)));
    }

    #[test]
    fn missing_file_fails_before_player_dispatch() {
        // Even the unsupported stub is never reached for a missing file
        let playback = AudioPlayback::for_platform(PlatformTarget::Other);

        let err = playback.play(Path::new("/nonexistent/reply.mp3")).unwrap_err();
        assert!(matches!(err, Error::Audio(_)));
    }
}
