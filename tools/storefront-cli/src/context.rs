//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use storefront_cart::{CartEngine, CartEventKind, Detached};

use crate::config::{CliConfig, CONFIG_NAMES};
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Where the configuration was read from, if anywhere.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&Path>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = match config_path {
            Some(path) => (CliConfig::load(path)?, Some(path.to_path_buf())),
            None => match find_config(&cwd) {
                Some(path) => (CliConfig::load(&path)?, Some(path)),
                None => (CliConfig::default(), None),
            },
        };

        if let Some(path) = &config_path {
            tracing::debug!(path = %path.display(), "loaded config");
        }

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// A fresh cart priced with the loaded configuration.
    ///
    /// In verbose mode every event the cart emits is echoed.
    pub fn engine(&self) -> CartEngine {
        let mut engine = CartEngine::new(self.config.cart.clone(), Detached);
        if self.output.is_verbose() {
            for kind in CartEventKind::ALL {
                let output = self.output.clone();
                engine.on(kind, move |event| {
                    output.debug(&format!(
                        "{} ({} items, total {})",
                        event.kind(),
                        event.cart().item_count,
                        event.cart().total_formatted
                    ));
                });
            }
        }
        engine
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }
}

/// Find a config file in the directory tree.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    start.ancestors().find_map(|dir| {
        CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_config_walks_up() {
        let root = std::env::temp_dir().join(format!("storefront-cli-{}", std::process::id()));
        let nested = root.join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.join(".storefront.toml"), "[cart]\n").unwrap();

        let found = find_config(&nested);
        std::fs::remove_dir_all(&root).unwrap();

        assert_eq!(found, Some(root.join(".storefront.toml")));
    }
}
