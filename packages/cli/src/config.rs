//! Layout configuration, assembled from an options file and flag overrides.

use std::fs;
use std::path::Path;

use mettagraph::LayoutOptions;

/// Per-flag overrides applied on top of the options file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub iterations: Option<usize>,
    pub duration_ms: Option<u64>,
    pub level_height: Option<f64>,
    pub node_width: Option<f64>,
}

/// Build [`LayoutOptions`]: defaults, then the JSON file at `path` (if any),
/// then `overrides`.
///
/// The file may be a partial object such as `{"iterations": 50}`; missing
/// keys keep their defaults.
pub fn load_layout_options(path: Option<&Path>, overrides: &Overrides) -> Result<LayoutOptions, String> {
    let mut options = match path {
        Some(p) => {
            let text = fs::read_to_string(p)
                .map_err(|e| format!("failed to read options file {}: {}", p.display(), e))?;
            serde_json::from_str::<LayoutOptions>(&text)
                .map_err(|e| format!("invalid options file {}: {}", p.display(), e))?
        }
        None => LayoutOptions::default(),
    };

    if let Some(n) = overrides.iterations {
        options.iterations = n;
    }
    if let Some(ms) = overrides.duration_ms {
        options.animation_duration = ms;
    }
    if let Some(h) = overrides.level_height {
        options.level_height = h;
    }
    if let Some(w) = overrides.node_width {
        options.node_width = w;
    }

    tracing::debug!(?options, "layout options");
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file() {
        let opts = load_layout_options(None, &Overrides::default()).unwrap();
        assert_eq!(opts, LayoutOptions::default());
    }

    #[test]
    fn file_then_overrides() {
        let path = std::env::temp_dir().join(format!("mgraph-opts-{}.json", std::process::id()));
        fs::write(&path, r#"{"iterations": 10, "damping": 0.5}"#).unwrap();

        let overrides = Overrides {
            iterations: Some(25),
            ..Overrides::default()
        };
        let opts = load_layout_options(Some(path.as_path()), &overrides).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(opts.iterations, 25);
        assert_eq!(opts.damping, 0.5);
        assert_eq!(opts.spring_length, 200.0);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_layout_options(Some(Path::new("/nonexistent/opts.json")), &Overrides::default());
        assert!(err.is_err());
    }
}
