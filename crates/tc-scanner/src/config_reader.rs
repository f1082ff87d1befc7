//! Project configuration discovery, merging, and updates.
//!
//! Only JSON-formatted files are understood; see
//! [`ConfigFileKind::KNOWN_FILES`] for the names looked for.

use async_trait::async_trait;
use camino::Utf8Path;
use rustc_hash::FxHashMap;
use serde_json::Value;
use tc_core::{
    ConfigConflict, ConfigError, ConfigFile, ConfigFileKind, ConfigReader, ConfigResolver,
    ConfigUpdater, ConflictValue, RawConfig, ResolvedConfig,
};
use tracing::{debug, info};

/// Reads, discovers, and updates JSON configuration files.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonConfigReader;

impl JsonConfigReader {
    /// Reads and parses `path` synchronously.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file can't be read,
    /// [`ConfigError::Parse`] if it isn't JSON, and
    /// [`ConfigError::NotAnObject`] if the top level isn't an object.
    pub fn read_sync(path: &Utf8Path) -> Result<RawConfig, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        parse(path, &text)
    }
}

fn parse(path: &Utf8Path, text: &str) -> Result<RawConfig, ConfigError> {
    match serde_json::from_str(text).map_err(|e| ConfigError::parse(path, e))? {
        Value::Object(map) => Ok(map),
        _ => Err(ConfigError::NotAnObject(path.to_owned())),
    }
}

async fn write_json(path: &Utf8Path, content: &RawConfig) -> Result<(), ConfigError> {
    let mut text = serde_json::to_string_pretty(content).map_err(|e| ConfigError::parse(path, e))?;
    text.push('\n');
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ConfigError::io(parent, e))?;
    }
    tokio::fs::write(path, text)
        .await
        .map_err(|e| ConfigError::io(path, e))
}

#[async_trait]
impl ConfigReader for JsonConfigReader {
    async fn read_config(&self, path: &Utf8Path) -> anyhow::Result<RawConfig> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::io(path, e))?;
        Ok(parse(path, &text)?)
    }

    async fn find_configs(&self, dir: &Utf8Path) -> anyhow::Result<Vec<ConfigFile>> {
        let mut found = Vec::new();
        for (name, kind) in ConfigFileKind::KNOWN_FILES {
            let path = dir.join(name);
            let is_file = tokio::fs::metadata(&path)
                .await
                .is_ok_and(|meta| meta.is_file());
            if !is_file {
                continue;
            }
            let content = self.read_config(&path).await?;
            debug!(path = %path, kind = ?kind, keys = content.len(), "Found configuration");
            found.push(ConfigFile {
                path,
                kind: *kind,
                content,
            });
        }
        Ok(found)
    }
}

#[async_trait]
impl ConfigUpdater for JsonConfigReader {
    async fn update_config(&self, path: &Utf8Path, changes: &RawConfig) -> anyhow::Result<()> {
        let mut content = self.read_config(path).await?;
        for (key, value) in changes {
            content.insert(key.clone(), value.clone());
        }
        write_json(path, &content).await?;
        info!(path = %path, keys = changes.len(), "Updated configuration");
        Ok(())
    }

    async fn create_config(&self, path: &Utf8Path, content: &RawConfig) -> anyhow::Result<()> {
        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(ConfigError::InvalidPath {
                path: path.to_owned(),
                reason: "file already exists".to_owned(),
            }
            .into());
        }
        write_json(path, content).await?;
        info!(path = %path, "Created configuration");
        Ok(())
    }
}

/// Merges mappings in order. Nested objects merge key by key; any other
/// value from a later mapping replaces the earlier one.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use tc_scanner::merge_raw;
///
/// let base = json!({ "compilerOptions": { "strict": true, "target": "es2017" } });
/// let over = json!({ "compilerOptions": { "target": "es2022" } });
///
/// let merged = merge_raw(&[
///     base.as_object().unwrap().clone(),
///     over.as_object().unwrap().clone(),
/// ]);
/// assert_eq!(
///     serde_json::Value::Object(merged),
///     json!({ "compilerOptions": { "strict": true, "target": "es2022" } })
/// );
/// ```
#[must_use]
pub fn merge_raw(configs: &[RawConfig]) -> RawConfig {
    let mut merged = RawConfig::new();
    for config in configs {
        merge_into(&mut merged, config);
    }
    merged
}

fn merge_into(target: &mut RawConfig, source: &RawConfig) {
    for (key, value) in source {
        match (target.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                merge_into(existing, incoming);
            }
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Merges configuration files in order and reports every top-level key
/// they disagree on.
///
/// A conflict lists each source/value pair for the key, in merge order,
/// and records the merged value as its resolution.
#[must_use]
pub fn merge_configs(configs: &[ConfigFile]) -> ResolvedConfig {
    let contents: Vec<RawConfig> = configs.iter().map(|c| c.content.clone()).collect();
    let merged = merge_raw(&contents);

    let mut index: FxHashMap<&str, usize> = FxHashMap::default();
    let mut candidates: Vec<(&str, Vec<ConflictValue>)> = Vec::new();
    for config in configs {
        for (key, value) in &config.content {
            let slot = *index.entry(key.as_str()).or_insert_with(|| {
                candidates.push((key.as_str(), Vec::new()));
                candidates.len() - 1
            });
            candidates[slot].1.push(ConflictValue {
                source: config.path.to_string(),
                value: value.clone(),
            });
        }
    }

    let conflicts: Vec<ConfigConflict> = candidates
        .into_iter()
        .filter(|(_, values)| values.iter().any(|v| v.value != values[0].value))
        .map(|(key, values)| ConfigConflict {
            key: key.to_owned(),
            values,
            resolution: merged.get(key).cloned(),
        })
        .collect();

    if !conflicts.is_empty() {
        debug!(conflicts = conflicts.len(), sources = configs.len(), "Configuration conflicts");
    }
    ResolvedConfig {
        config: merged,
        conflicts,
    }
}

/// [`ConfigResolver`] backed by [`merge_raw`] and [`merge_configs`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigMerger;

impl ConfigResolver for ConfigMerger {
    fn merge(&self, configs: &[RawConfig]) -> RawConfig {
        merge_raw(configs)
    }

    fn resolve(&self, configs: &[ConfigFile]) -> ResolvedConfig {
        merge_configs(configs)
    }
}
