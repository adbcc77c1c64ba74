// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{LoopCount, RunConfig};
use crate::{
    errors::{ConfigParseError, ConfigParseErrorKind, ProfileNotFound},
    test_filter::TagFilter,
};
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, builder::DefaultState};
use itertools::Itertools;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Overall configuration for contest.
///
/// This is the root data structure for contest configuration. Per-run settings are managed
/// through profiles, resolved into a [`RunConfig`] by [`profile`](Self::profile).
#[derive(Clone, Debug)]
pub struct ContestConfig {
    workspace_root: Utf8PathBuf,
    default_profile: DefaultProfileImpl,
    other_profiles: BTreeMap<String, CustomProfileImpl>,
}

impl ContestConfig {
    /// The default location of the config within the path: `.config/contest.toml`, used to read
    /// the config from the given directory.
    pub const CONFIG_PATH: &'static str = ".config/contest.toml";

    /// Contains the default config as a TOML file.
    ///
    /// Repository-specific configuration is layered on top of the default config.
    pub const DEFAULT_CONFIG: &'static str = include_str!("../../default-config.toml");

    /// Reads the contest config from the given file, or if not specified from
    /// `.config/contest.toml` in the workspace root.
    ///
    /// If no config file is specified and the workspace doesn't have `.config/contest.toml`, uses
    /// the default config options.
    pub fn from_sources(
        workspace_root: impl Into<Utf8PathBuf>,
        config_file: Option<&Utf8Path>,
    ) -> Result<Self, ConfigParseError> {
        let workspace_root = workspace_root.into();

        let (config_file, source) = match config_file {
            Some(file) => (file.to_owned(), File::new(file.as_str(), FileFormat::Toml)),
            None => {
                let config_file = workspace_root.join(Self::CONFIG_PATH);
                let source = File::new(config_file.as_str(), FileFormat::Toml).required(false);
                (config_file, source)
            }
        };
        debug!(%config_file, "reading contest config");

        let builder = Self::make_default_config().add_source(source);
        let (config, unknown) = Self::build_and_deserialize_config(&builder)
            .map_err(|kind| ConfigParseError::new(&config_file, kind))?;

        if !unknown.is_empty() {
            warn!(
                "ignoring unknown configuration keys in {config_file}: {}",
                unknown.iter().join(", ")
            );
        }

        Ok(Self::from_deserialized(workspace_root, config))
    }

    /// Returns the default contest config, without reading any files.
    #[cfg(test)]
    pub(crate) fn default_config(workspace_root: impl Into<Utf8PathBuf>) -> Self {
        let (config, unknown) = Self::build_and_deserialize_config(&Self::make_default_config())
            .expect("default config is always valid");

        // Make sure there aren't any unknown keys in the default config, since it is
        // embedded/shipped with this binary.
        if !unknown.is_empty() {
            panic!(
                "found unknown keys in default config: {}",
                unknown.iter().join(", ")
            );
        }

        Self::from_deserialized(workspace_root.into(), config)
    }

    /// Returns the workspace root this config was read for.
    pub fn workspace_root(&self) -> &Utf8Path {
        &self.workspace_root
    }

    /// Returns the names of all known profiles, including the default profile.
    pub fn profile_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(RunConfig::DEFAULT_PROFILE)
            .chain(self.other_profiles.keys().map(|name| name.as_str()))
    }

    /// Resolves the profile with the given name into a [`RunConfig`].
    ///
    /// Settings that a custom profile leaves unset fall back to the default profile.
    pub fn profile(&self, name: impl AsRef<str>) -> Result<RunConfig, ProfileNotFound> {
        let name = name.as_ref();
        let default = &self.default_profile;
        let custom = if name == RunConfig::DEFAULT_PROFILE {
            None
        } else {
            Some(
                self.other_profiles
                    .get(name)
                    .ok_or_else(|| ProfileNotFound::new(name, self.profile_names()))?,
            )
        };

        macro_rules! resolve {
            ($field:ident) => {
                custom
                    .and_then(|profile| profile.$field.clone())
                    .unwrap_or_else(|| default.$field.clone())
            };
        }

        Ok(RunConfig {
            profile_name: name.to_owned(),
            loop_count: resolve!(loop_count),
            random_execution: resolve!(random_execution),
            seed: custom.and_then(|profile| profile.seed).or(default.seed),
            reverse_selection: resolve!(reverse_selection),
            stop_on_first_failure: resolve!(stop_on_first_failure),
            filters: resolve!(filter),
            selected_tests: resolve!(selected_tests),
            setup_file: custom
                .and_then(|profile| profile.setup_file.clone())
                .or_else(|| default.setup_file.clone()),
        })
    }

    // ---
    // Helper methods
    // ---

    fn make_default_config() -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(Self::DEFAULT_CONFIG, FileFormat::Toml))
    }

    fn from_deserialized(workspace_root: Utf8PathBuf, config: ContestConfigDeserialize) -> Self {
        let mut profiles = config.profile;
        let default_profile = profiles
            .remove(RunConfig::DEFAULT_PROFILE)
            .map(DefaultProfileImpl::new)
            .unwrap_or_default();
        Self {
            workspace_root,
            default_profile,
            other_profiles: profiles,
        }
    }

    /// This returns a tuple of (config, ignored paths).
    fn build_and_deserialize_config(
        builder: &ConfigBuilder<DefaultState>,
    ) -> Result<(ContestConfigDeserialize, BTreeSet<String>), ConfigParseErrorKind> {
        let config = builder
            .build_cloned()
            .map_err(|error| ConfigParseErrorKind::BuildError(Box::new(error)))?;

        let mut ignored = BTreeSet::new();
        let mut cb = |path: serde_ignored::Path| {
            ignored.insert(path.to_string());
        };
        let ignored_de = serde_ignored::Deserializer::new(config, &mut cb);
        let config: ContestConfigDeserialize = serde_path_to_error::deserialize(ignored_de)
            .map_err(|error| {
                // Both serde_path_to_error and the config crate report the key. Drop the key
                // from the config error for consistency.
                let path = error.path().clone();
                let config_error = error.into_inner();
                let error = match config_error {
                    ConfigError::At { error, .. } => *error,
                    other => other,
                };
                ConfigParseErrorKind::DeserializeError(Box::new(serde_path_to_error::Error::new(
                    path, error,
                )))
            })?;

        Ok((config, ignored))
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ContestConfigDeserialize {
    #[serde(default)]
    profile: BTreeMap<String, CustomProfileImpl>,
}

/// The default profile, with every setting filled in.
#[derive(Clone, Debug, Default)]
struct DefaultProfileImpl {
    loop_count: LoopCount,
    random_execution: bool,
    seed: Option<u64>,
    reverse_selection: bool,
    stop_on_first_failure: bool,
    setup_file: Option<String>,
    selected_tests: Vec<String>,
    filter: Vec<TagFilter>,
}

impl DefaultProfileImpl {
    fn new(p: CustomProfileImpl) -> Self {
        Self {
            loop_count: p.loop_count.unwrap_or_default(),
            random_execution: p.random_execution.unwrap_or_default(),
            seed: p.seed,
            reverse_selection: p.reverse_selection.unwrap_or_default(),
            stop_on_first_failure: p.stop_on_first_failure.unwrap_or_default(),
            setup_file: p.setup_file,
            selected_tests: p.selected_tests.unwrap_or_default(),
            filter: p.filter.unwrap_or_default(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct CustomProfileImpl {
    #[serde(default)]
    loop_count: Option<LoopCount>,
    #[serde(default)]
    random_execution: Option<bool>,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    reverse_selection: Option<bool>,
    #[serde(default)]
    stop_on_first_failure: Option<bool>,
    #[serde(default)]
    setup_file: Option<String>,
    #[serde(default)]
    selected_tests: Option<Vec<String>>,
    #[serde(default)]
    filter: Option<Vec<TagFilter>>,
}
