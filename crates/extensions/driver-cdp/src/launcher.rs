//! Locates and starts Chrome with remote debugging enabled.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use amex_config::BrowserConfig;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::cdp::CdpError;
use crate::driver::CdpDriver;

const STARTUP_ATTEMPTS: u32 = 30;
const STARTUP_POLL: Duration = Duration::from_millis(200);

/// Owns the Chrome process if this launcher started it.
pub struct BrowserLauncher {
    config: BrowserConfig,
    child: Option<Child>,
}

impl BrowserLauncher {
    pub fn new(config: BrowserConfig) -> Self {
        Self {
            config,
            child: None,
        }
    }

    /// Find a Chrome or Chromium executable in the usual install locations.
    pub fn find_chrome() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        let paths: &[&str] = &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
        ];

        #[cfg(target_os = "linux")]
        let paths: &[&str] = &[
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
        ];

        #[cfg(target_os = "windows")]
        let paths: &[&str] = &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
        ];

        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        let paths: &[&str] = &[];

        paths.iter().map(|p| PathBuf::from(*p)).find(|p| p.exists())
    }

    /// Command-line flags Chrome is started with.
    pub fn chrome_args(&self) -> Vec<String> {
        let mut args = vec![
            format!("--remote-debugging-port={}", self.config.debug_port),
            format!("--user-data-dir={}", self.config.profile_dir().display()),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            "--disable-background-networking".to_string(),
            "--disable-sync".to_string(),
            "--disable-translate".to_string(),
        ];
        if self.config.headless {
            args.push("--headless=new".to_string());
        }
        args
    }

    /// Whether something answers CDP discovery on the configured port.
    pub async fn is_running(&self) -> bool {
        let client = match reqwest::Client::builder().timeout(STARTUP_POLL * 5).build() {
            Ok(client) => client,
            Err(_) => return false,
        };
        client
            .get(format!("{}/json/version", self.config.endpoint()))
            .send()
            .await
            .is_ok_and(|r| r.status().is_success())
    }

    async fn spawn(&mut self) -> Result<(), CdpError> {
        let chrome_path = match &self.config.chrome_path {
            Some(path) => path.clone(),
            None => Self::find_chrome().ok_or(CdpError::ChromeNotFound)?,
        };

        let profile_dir = self.config.profile_dir();
        if let Err(e) = std::fs::create_dir_all(&profile_dir) {
            warn!("Failed to create profile directory: {}", e);
        }

        info!("Launching Chrome with profile at: {}", profile_dir.display());

        let child = Command::new(&chrome_path)
            .args(self.chrome_args())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CdpError::LaunchFailed(format!("{}: {}", chrome_path.display(), e)))?;

        debug!("Chrome launched with PID: {:?}", child.id());
        self.child = Some(child);

        for _ in 0..STARTUP_ATTEMPTS {
            tokio::time::sleep(STARTUP_POLL).await;
            if self.is_running().await {
                return Ok(());
            }
        }

        self.shutdown().await;
        Err(CdpError::LaunchFailed(
            "Chrome did not open its debugging port in time".to_string(),
        ))
    }

    /// Reuse a browser already listening on the debug port, or start one,
    /// then open a tab to drive.
    pub async fn launch(&mut self) -> Result<CdpDriver, CdpError> {
        if self.is_running().await {
            info!("Chrome already running on port {}", self.config.debug_port);
        } else {
            info!("Chrome not running on port {}, launching", self.config.debug_port);
            self.spawn().await?;
        }

        CdpDriver::connect(&self.config.endpoint(), self.config.request_timeout()).await
    }

    /// Kill Chrome if this launcher started it.
    pub async fn shutdown(&mut self) {
        if let Some(mut child) = self.child.take() {
            info!("Shutting down Chrome");
            if let Err(e) = child.kill().await {
                warn!("Failed to stop Chrome: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chrome_args_headless() {
        let launcher = BrowserLauncher::new(BrowserConfig {
            debug_port: 9333,
            profile_dir: Some(PathBuf::from("/tmp/amex-profile")),
            ..BrowserConfig::default()
        });
        let args = launcher.chrome_args();
        assert!(args.contains(&"--remote-debugging-port=9333".to_string()));
        assert!(args.contains(&"--user-data-dir=/tmp/amex-profile".to_string()));
        assert!(args.contains(&"--headless=new".to_string()));
    }

    #[test]
    fn test_chrome_args_headed() {
        let launcher = BrowserLauncher::new(BrowserConfig {
            headless: false,
            ..BrowserConfig::default()
        });
        assert!(!launcher.chrome_args().iter().any(|a| a.starts_with("--headless")));
    }

    #[test]
    fn test_find_chrome() {
        if let Some(path) = BrowserLauncher::find_chrome() {
            assert!(path.exists());
        }
    }

    #[tokio::test]
    async fn test_shutdown_without_launch() {
        let mut launcher = BrowserLauncher::new(BrowserConfig::default());
        launcher.shutdown().await;
    }
}
