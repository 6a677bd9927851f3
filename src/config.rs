use chrono::Offset;
use std::path::PathBuf;

const ENV_MODELS_DIR: &str = "PREDICTION_PAGE_MODELS_DIR";
const ENV_TOP_K: &str = "PREDICTION_PAGE_TOP_K";
const ENV_FAKE: &str = "PREDICTION_PAGE_FAKE";

#[derive(Debug, Clone)]
pub struct Config {
    pub models_dir: PathBuf,
    pub top_k: usize,
    pub image_display_width: f32,
    pub logger_timezone: chrono::FixedOffset,
    pub use_fake_collaborators: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from("../models"),
            top_k: 3,
            image_display_width: 150.0,
            logger_timezone: local_offset(),
            use_fake_collaborators: false,
        }
    }
}

impl Config {
    /// Defaults with `PREDICTION_PAGE_*` environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup(ENV_MODELS_DIR).filter(|dir| !dir.trim().is_empty()) {
            self.models_dir = PathBuf::from(dir);
        }

        if let Some(top_k) = lookup(ENV_TOP_K)
            .and_then(|value| value.trim().parse::<usize>().ok())
            .filter(|top_k| *top_k > 0)
        {
            self.top_k = top_k;
        }

        if let Some(fake) = lookup(ENV_FAKE) {
            self.use_fake_collaborators = matches!(
                fake.trim().to_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }

        self
    }
}

fn local_offset() -> chrono::FixedOffset {
    chrono::Local::now().offset().fix()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.models_dir, PathBuf::from("../models"));
        assert_eq!(config.top_k, 3);
        assert_eq!(config.image_display_width, 150.0);
        assert!(!config.use_fake_collaborators);
    }

    #[test]
    fn test_overrides_applied() {
        let config = Config::default().with_overrides(lookup_from(&[
            (ENV_MODELS_DIR, "/srv/models"),
            (ENV_TOP_K, "5"),
            (ENV_FAKE, "true"),
        ]));

        assert_eq!(config.models_dir, PathBuf::from("/srv/models"));
        assert_eq!(config.top_k, 5);
        assert!(config.use_fake_collaborators);
    }

    #[test]
    fn test_invalid_overrides_ignored() {
        let config = Config::default().with_overrides(lookup_from(&[
            (ENV_MODELS_DIR, "  "),
            (ENV_TOP_K, "0"),
            (ENV_FAKE, "nope"),
        ]));

        assert_eq!(config.models_dir, PathBuf::from("../models"));
        assert_eq!(config.top_k, 3);
        assert!(!config.use_fake_collaborators);
    }
}
