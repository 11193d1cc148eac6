use std::io;
use std::path::PathBuf;
use std::time::Duration;

use engine::{resolve_app_paths, AppPaths, LoopConfig, Scene, StartupError};
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::village::{
    load_layout, FileStatusSource, HttpStatusSource, InlineStatusChannel, LayoutError,
    StatusError, StatusPoller, StatusWorker, VillageScene, SCENE_HEIGHT, SCENE_WIDTH,
};

const LAYOUT_ENV_VAR: &str = "VILLAGE_LAYOUT";
const STATUS_URL_ENV_VAR: &str = "VILLAGE_STATUS_URL";
const STATUS_FILE_ENV_VAR: &str = "VILLAGE_STATUS_FILE";
const POLL_MS_ENV_VAR: &str = "VILLAGE_POLL_MS";
const DEFAULT_POLL_MS: u64 = 3000;
const HTTP_TIMEOUT: Duration = Duration::from_secs(2);

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("failed to create status client: {0}")]
    StatusClient(#[from] StatusError),
    #[error("failed to spawn status worker: {0}")]
    StatusWorker(#[source] io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StatusTarget {
    Http(String),
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct VillageSettings {
    pub(crate) layout_path: PathBuf,
    pub(crate) status: StatusTarget,
    pub(crate) poll_interval: Duration,
}

impl VillageSettings {
    pub(crate) fn from_env(paths: &AppPaths) -> Self {
        Self::from_lookup(paths, |name| std::env::var(name).ok())
    }

    fn from_lookup(paths: &AppPaths, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let layout_path = non_empty(LAYOUT_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| paths.assets_dir.join("base").join("village.json"));
        let status = match non_empty(STATUS_URL_ENV_VAR) {
            Some(url) => StatusTarget::Http(url),
            None => StatusTarget::File(
                non_empty(STATUS_FILE_ENV_VAR)
                    .map(PathBuf::from)
                    .unwrap_or_else(|| paths.root.join("status.json")),
            ),
        };
        let poll_ms = match non_empty(POLL_MS_ENV_VAR) {
            None => DEFAULT_POLL_MS,
            Some(raw) => match raw.parse::<u64>() {
                Ok(value) if value > 0 => value,
                _ => {
                    warn!(
                        var = POLL_MS_ENV_VAR,
                        value = %raw,
                        default_ms = DEFAULT_POLL_MS,
                        "invalid_poll_interval_using_default"
                    );
                    DEFAULT_POLL_MS
                }
            },
        };

        Self {
            layout_path,
            status,
            poll_interval: Duration::from_millis(poll_ms),
        }
    }
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Pixel Village Startup ===");

    let paths = resolve_app_paths()?;
    let settings = VillageSettings::from_env(&paths);
    info!(
        root = %paths.root.display(),
        layout = %settings.layout_path.display(),
        status = ?settings.status,
        poll_ms = settings.poll_interval.as_millis() as u64,
        "village_config"
    );

    let layout = load_layout(&settings.layout_path)?;
    let poller = build_status_poller(&settings)?;
    let scene = VillageScene::new(settings.layout_path, layout, Some(poller));
    let config = LoopConfig {
        scene_width: SCENE_WIDTH,
        scene_height: SCENE_HEIGHT,
        sprites_dir: paths.sprites_dir,
        ..LoopConfig::default()
    };

    Ok(AppWiring {
        config,
        scene: Box::new(scene),
    })
}

fn build_status_poller(settings: &VillageSettings) -> Result<StatusPoller, BootstrapError> {
    let period_seconds = settings.poll_interval.as_secs_f32();
    let poller = match &settings.status {
        StatusTarget::Http(url) => {
            let source = HttpStatusSource::new(url.clone(), HTTP_TIMEOUT)?;
            let worker =
                StatusWorker::spawn(Box::new(source)).map_err(BootstrapError::StatusWorker)?;
            StatusPoller::new(period_seconds, Box::new(worker))
        }
        StatusTarget::File(path) => {
            let source = FileStatusSource::new(path.clone());
            StatusPoller::new(
                period_seconds,
                Box::new(InlineStatusChannel::new(Box::new(source))),
            )
        }
    };
    Ok(poller)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::Path;

    fn settings_with(vars: &[(&str, &str)]) -> VillageSettings {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        let paths = AppPaths::from_root(PathBuf::from("/srv/village"));
        VillageSettings::from_lookup(&paths, |name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_point_into_project_root() {
        let settings = settings_with(&[]);
        assert_eq!(
            settings.layout_path,
            Path::new("/srv/village/assets/base/village.json")
        );
        assert_eq!(
            settings.status,
            StatusTarget::File(PathBuf::from("/srv/village/status.json"))
        );
        assert_eq!(settings.poll_interval, Duration::from_millis(3000));
    }

    #[test]
    fn status_url_takes_precedence_over_file() {
        let settings = settings_with(&[
            (STATUS_URL_ENV_VAR, "http://localhost:8080/status.json"),
            (STATUS_FILE_ENV_VAR, "/tmp/status.json"),
        ]);
        assert_eq!(
            settings.status,
            StatusTarget::Http("http://localhost:8080/status.json".to_string())
        );
    }

    #[test]
    fn blank_values_are_treated_as_unset() {
        let settings = settings_with(&[(STATUS_URL_ENV_VAR, "  "), (LAYOUT_ENV_VAR, "")]);
        assert!(matches!(settings.status, StatusTarget::File(_)));
        assert!(settings.layout_path.ends_with("village.json"));
    }

    #[test]
    fn invalid_poll_interval_falls_back_to_default() {
        assert_eq!(
            settings_with(&[(POLL_MS_ENV_VAR, "fast")]).poll_interval,
            Duration::from_millis(DEFAULT_POLL_MS)
        );
        assert_eq!(
            settings_with(&[(POLL_MS_ENV_VAR, "0")]).poll_interval,
            Duration::from_millis(DEFAULT_POLL_MS)
        );
        assert_eq!(
            settings_with(&[(POLL_MS_ENV_VAR, "500")]).poll_interval,
            Duration::from_millis(500)
        );
    }

    #[test]
    fn file_status_target_builds_inline_poller() {
        let temp = tempfile::tempdir().expect("tempdir");
        let settings = VillageSettings {
            layout_path: temp.path().join("village.json"),
            status: StatusTarget::File(temp.path().join("status.json")),
            poll_interval: Duration::from_millis(100),
        };
        assert!(build_status_poller(&settings).is_ok());
    }
}
