//! Project configuration files touched by a migration.
//!
//! These are the records exchanged with configuration readers and
//! resolvers. Contents are kept as raw JSON mappings because every tool
//! (Babel, ESLint, TypeScript, npm) has its own schema.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

/// A raw configuration mapping.
pub type RawConfig = serde_json::Map<String, serde_json::Value>;

/// The tool a configuration file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigFileKind {
    /// `.babelrc`, `babel.config.json`.
    Babel,
    /// `.eslintrc.json`.
    Eslint,
    /// `tsconfig.json`.
    Typescript,
    /// `jsconfig.json`.
    Jsconfig,
    /// `package.json`.
    Package,
}

impl ConfigFileKind {
    /// Well-known file names and the kind each maps to.
    pub const KNOWN_FILES: &'static [(&'static str, Self)] = &[
        (".babelrc", Self::Babel),
        ("babel.config.json", Self::Babel),
        (".eslintrc.json", Self::Eslint),
        ("tsconfig.json", Self::Typescript),
        ("jsconfig.json", Self::Jsconfig),
        ("package.json", Self::Package),
    ];

    /// Detects the kind from a file name.
    ///
    /// # Examples
    ///
    /// ```
    /// use tc_core::ConfigFileKind;
    /// use camino::Utf8Path;
    ///
    /// assert_eq!(
    ///     ConfigFileKind::from_path(Utf8Path::new("web/tsconfig.json")),
    ///     Some(ConfigFileKind::Typescript)
    /// );
    /// assert_eq!(ConfigFileKind::from_path(Utf8Path::new("README.md")), None);
    /// ```
    #[must_use]
    pub fn from_path(path: &Utf8Path) -> Option<Self> {
        let name = path.file_name()?;
        Self::KNOWN_FILES
            .iter()
            .find(|(known, _)| *known == name)
            .map(|(_, kind)| *kind)
    }
}

/// A configuration file and its parsed content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Where the file lives.
    pub path: Utf8PathBuf,

    /// The tool it configures.
    pub kind: ConfigFileKind,

    /// Parsed content.
    pub content: RawConfig,
}

/// One competing value for a conflicting key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictValue {
    /// Where the value came from.
    pub source: String,

    /// The value.
    pub value: serde_json::Value,
}

/// A key that more than one source set to different values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigConflict {
    /// The conflicting key.
    pub key: String,

    /// Every source/value pair that set the key, in merge order.
    pub values: Vec<ConflictValue>,

    /// The value chosen, if resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<serde_json::Value>,
}

/// The result of merging several configurations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedConfig {
    /// The merged mapping.
    pub config: RawConfig,

    /// Keys whose sources disagreed.
    pub conflicts: Vec<ConfigConflict>,
}

impl ResolvedConfig {
    /// Returns `true` if every source agreed.
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }
}

/// Category of a conflict offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// Configuration values disagree.
    Config,
    /// Two targets would get the same name.
    Naming,
    /// Incompatible dependency versions.
    Dependency,
    /// A source pattern has several possible rewrites.
    Pattern,
}

/// A choice offered for a conflict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionOption {
    /// Option identifier.
    pub id: String,

    /// Short label.
    pub label: String,

    /// What the option does.
    pub description: String,

    /// Consequences of choosing it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
}

/// A conflict together with the ways it can be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictResolution {
    /// Conflict category.
    pub kind: ConflictKind,

    /// Description of the conflict.
    pub description: String,

    /// Available options.
    pub options: Vec<ResolutionOption>,

    /// Identifier of the option taken when nobody chooses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_option: Option<String>,
}

impl ConflictResolution {
    /// Returns the default option, if it names one of the available options.
    #[must_use]
    pub fn default_choice(&self) -> Option<&ResolutionOption> {
        let id = self.default_option.as_deref()?;
        self.options.iter().find(|option| option.id == id)
    }
}
