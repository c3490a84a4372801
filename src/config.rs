use std::env;
use std::path::PathBuf;

const DEFAULT_PREVIEW_LEN: usize = 80;

fn env_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_path(key: &str, default: &str) -> PathBuf {
    env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

/// Runtime settings; command-line flags take precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubConfig {
    pub views_path: PathBuf,
    pub preview_len: usize,
}

impl HubConfig {
    pub fn from_env() -> Self {
        Self {
            views_path: env_path("THREADHUB_VIEWS_PATH", "threadhub-views.json"),
            preview_len: env_usize("THREADHUB_PREVIEW_LEN", DEFAULT_PREVIEW_LEN).max(1),
        }
    }

    pub fn with_overrides(
        mut self,
        views_path: Option<PathBuf>,
        preview_len: Option<usize>,
    ) -> Self {
        if let Some(path) = views_path {
            self.views_path = path;
        }
        if let Some(len) = preview_len {
            self.preview_len = len.max(1);
        }
        self
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
