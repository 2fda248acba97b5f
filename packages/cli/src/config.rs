use serde::{Deserialize, Serialize};
use sitegen_compiler_html::CompileOptions;
use sitegen_decomposer::DecomposeOptions;
use sitegen_editor::EditorConfig;
use sitegen_tree::PREVIEW_MOUNT_ID;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "sitegen.config.json";

/// Sitegen configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory holding one folder per project
    #[serde(default = "default_projects_dir")]
    pub projects_dir: String,

    /// Where `compile` writes bundles
    #[serde(default = "default_out_dir")]
    pub out_dir: String,

    /// Undo levels kept while editing (0 = unlimited)
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Element the first decomposed body node is anchored to
    #[serde(default = "default_mount_selector")]
    pub mount_selector: String,

    /// Title for pages without a head node
    #[serde(default = "default_title")]
    pub title: String,
}

fn default_projects_dir() -> String {
    "projects".to_string()
}

fn default_out_dir() -> String {
    "dist".to_string()
}

fn default_history_limit() -> usize {
    100
}

fn default_mount_selector() -> String {
    format!("#{}", PREVIEW_MOUNT_ID)
}

fn default_title() -> String {
    CompileOptions::default().title
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            tracing::debug!(path = %config_path.display(), "loaded config");
            Ok(config)
        } else {
            tracing::debug!("no config file, using defaults");
            Ok(Config::default())
        }
    }

    pub fn projects_path(&self, cwd: &str) -> PathBuf {
        Path::new(cwd).join(&self.projects_dir)
    }

    pub fn out_path(&self, cwd: &str) -> PathBuf {
        Path::new(cwd).join(&self.out_dir)
    }

    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            title: self.title.clone(),
        }
    }

    pub fn decompose_options(&self) -> DecomposeOptions {
        DecomposeOptions::with_mount_selector(&self.mount_selector)
    }

    pub fn editor_config(&self, project_id: &str) -> EditorConfig {
        EditorConfig {
            project_id: project_id.to_string(),
            history_limit: self.history_limit,
            compile: self.compile_options(),
            ..EditorConfig::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            projects_dir: default_projects_dir(),
            out_dir: default_out_dir(),
            history_limit: default_history_limit(),
            mount_selector: default_mount_selector(),
            title: default_title(),
        }
    }
}
