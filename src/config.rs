use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CimonError, Result};
use crate::model::{Project, ProjectId};

/// On-disk configuration: tokens, API endpoints and the monitored projects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub gitlab: GitLabConfig,

    #[serde(default)]
    pub github: GitHubConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GitLabConfig {
    /// GitLab personal access token
    #[serde(default)]
    pub token: Option<String>,

    /// GitLab instance base URL
    #[serde(default = "default_gitlab_base_url")]
    pub base_url: String,

    /// Pipelines fetched per project page
    #[serde(default = "default_gitlab_limit")]
    pub limit: usize,

    #[serde(default)]
    pub projects: Vec<Project>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GitHubConfig {
    #[serde(default)]
    pub token: Option<String>,

    /// GitHub API base URL
    #[serde(default = "default_github_base_url")]
    pub base_url: String,

    /// Workflow runs fetched per repository
    #[serde(default = "default_github_limit")]
    pub limit: usize,
}

impl Default for GitLabConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: default_gitlab_base_url(),
            limit: default_gitlab_limit(),
            projects: Vec::new(),
        }
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: default_github_base_url(),
            limit: default_github_limit(),
        }
    }
}

fn default_gitlab_base_url() -> String {
    "https://gitlab.com".to_string()
}

fn default_github_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_gitlab_limit() -> usize {
    3
}

fn default_github_limit() -> usize {
    5
}

impl Config {
    fn parse(path: &Path, contents: &str) -> Result<Self> {
        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        let parsed = match extension {
            "toml" => toml::from_str(contents).map_err(|e| e.to_string()),
            "json" => serde_json::from_str(contents).map_err(|e| e.to_string()),
            "yaml" | "yml" => serde_yaml::from_str(contents).map_err(|e| e.to_string()),
            _ => toml::from_str(contents)
                .map_err(|e| e.to_string())
                .or_else(|_| serde_json::from_str(contents).map_err(|e| e.to_string()))
                .or_else(|_| serde_yaml::from_str(contents).map_err(|e| e.to_string())),
        };

        parsed.map_err(|e| {
            CimonError::Config(format!("Failed to parse config {}: {e}", path.display()))
        })
    }

    fn render(&self, path: &Path) -> Result<String> {
        let rendered = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => toml::to_string_pretty(self)
                .map_err(|e| CimonError::Config(format!("Failed to encode TOML: {e}")))?,
            _ => serde_yaml::to_string(self)
                .map_err(|e| CimonError::Config(format!("Failed to encode YAML: {e}")))?,
        };
        Ok(rendered)
    }
}

/// File-backed configuration store.
///
/// Reads once at construction and writes through on every mutation, so the
/// file always mirrors what the running process believes.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    config: Config,
}

impl ConfigStore {
    /// Default location: `<config_dir>/cimon/config.yaml`.
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .ok_or_else(|| CimonError::Config("No config directory found".into()))?;
        Ok(dir.join("cimon").join("config.yaml"))
    }

    /// Opens the store at `path`, creating a default file when none exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if !path.exists() {
            let store = Self {
                path,
                config: Config::default(),
            };
            store.save()?;
            info!("Created default config at: {}", store.path.display());
            return Ok(store);
        }

        let contents = std::fs::read_to_string(&path).map_err(|e| {
            CimonError::Config(format!("Failed to read config {}: {e}", path.display()))
        })?;
        let config = Config::parse(&path, &contents)?;
        debug!(
            "Loaded config from {} ({} projects)",
            path.display(),
            config.gitlab.projects.len()
        );

        Ok(Self { path, config })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn projects(&self) -> &[Project] {
        &self.config.gitlab.projects
    }

    pub fn token(&self) -> Option<&str> {
        self.config.gitlab.token.as_deref()
    }

    pub fn github_token(&self) -> Option<&str> {
        self.config.github.token.as_deref()
    }

    /// Adds a project, or renames it when `id` is already configured.
    pub fn add_project(&mut self, id: ProjectId, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CimonError::InvalidInput("project name is empty".into()));
        }
        let projects = &mut self.config.gitlab.projects;
        match projects.iter_mut().find(|p| p.id == id) {
            Some(existing) => {
                info!("Renamed project {id} from {} to {name}", existing.name);
                existing.name = name.to_string();
            }
            None => {
                projects.push(Project {
                    id,
                    name: name.to_string(),
                });
                info!("Added project {id} ({name})");
            }
        }
        self.save()
    }

    pub fn set_token(&mut self, token: &str) -> Result<()> {
        self.config.gitlab.token = Some(token.trim().to_string());
        self.save()
    }

    pub fn set_github_token(&mut self, token: &str) -> Result<()> {
        self.config.github.token = Some(token.trim().to_string());
        self.save()
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let contents = self.config.render(&self.path)?;
        std::fs::write(&self.path, contents)?;
        debug!("Wrote config to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.gitlab.base_url, "https://gitlab.com");
        assert_eq!(config.gitlab.limit, 3);
        assert_eq!(config.github.base_url, "https://api.github.com");
        assert_eq!(config.github.limit, 5);
        assert!(config.gitlab.projects.is_empty());
    }

    #[test]
    fn test_open_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let store = ConfigStore::open(&path).unwrap();

        assert!(path.exists());
        assert!(store.projects().is_empty());
        assert!(store.token().is_none());
    }

    #[test]
    fn test_load_yaml_config() {
        let mut temp_file = NamedTempFile::with_suffix(".yaml").unwrap();
        let yaml = r#"
gitlab:
  token: glpat-yaml
  projects:
    - id: 42
      name: api
    - id: 7
      name: web
"#;
        write!(temp_file, "{yaml}").unwrap();

        let store = ConfigStore::open(temp_file.path()).unwrap();

        assert_eq!(store.token(), Some("glpat-yaml"));
        assert_eq!(store.projects().len(), 2);
        assert_eq!(store.projects()[0].id, 42);
        assert_eq!(store.projects()[1].name, "web");
        assert_eq!(store.config().gitlab.base_url, "https://gitlab.com");
    }

    #[test]
    fn test_load_toml_config() {
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        let toml_content = r#"
[gitlab]
token = "glpat-toml"
base-url = "https://gitlab.example.com"
limit = 10

[github]
token = "ghp-toml"
"#;
        write!(temp_file, "{toml_content}").unwrap();

        let store = ConfigStore::open(temp_file.path()).unwrap();

        assert_eq!(store.token(), Some("glpat-toml"));
        assert_eq!(store.github_token(), Some("ghp-toml"));
        assert_eq!(store.config().gitlab.base_url, "https://gitlab.example.com");
        assert_eq!(store.config().gitlab.limit, 10);
    }

    #[test]
    fn test_malformed_config_is_config_error() {
        let mut temp_file = NamedTempFile::with_suffix(".json").unwrap();
        write!(temp_file, "{{ not json").unwrap();

        let err = ConfigStore::open(temp_file.path()).unwrap_err();

        assert!(matches!(err, CimonError::Config(_)));
    }

    #[test]
    fn test_mutations_are_written_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let mut store = ConfigStore::open(&path).unwrap();
        store.add_project(42, "api").unwrap();
        store.set_token(" glpat-new ").unwrap();
        store.set_github_token("ghp-new").unwrap();

        let reopened = ConfigStore::open(&path).unwrap();
        assert_eq!(
            reopened.projects(),
            &[Project {
                id: 42,
                name: "api".to_string()
            }]
        );
        assert_eq!(reopened.token(), Some("glpat-new"));
        assert_eq!(reopened.github_token(), Some("ghp-new"));
    }

    #[test]
    fn test_add_project_rejects_blank_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ConfigStore::open(dir.path().join("config.yaml")).unwrap();

        let err = store.add_project(1, "   ").unwrap_err();

        assert!(matches!(err, CimonError::InvalidInput(_)));
        assert!(store.projects().is_empty());
    }

    #[test]
    fn test_add_project_with_known_id_renames_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let mut store = ConfigStore::open(&path).unwrap();
        store.add_project(42, "api").unwrap();
        store.add_project(7, "web").unwrap();

        store.add_project(42, "backend").unwrap();

        let reopened = ConfigStore::open(&path).unwrap();
        let projects: Vec<(ProjectId, &str)> = reopened
            .projects()
            .iter()
            .map(|p| (p.id, p.name.as_str()))
            .collect();
        assert_eq!(projects, vec![(42, "backend"), (7, "web")]);
    }
}
