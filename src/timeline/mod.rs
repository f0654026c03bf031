//! Persisted timeline of versions and composed rename mappings
//!
//! A timeline is a directory: `sources/` holds one stored image artifact
//! per version (file name = version), `diffs/` holds one JSON mapping file
//! per direction per version pair (file name `{from}-{to}`), and a small
//! config file records the artifact format. Pairwise mappings are computed
//! lazily by the diff core and published atomically, so a concurrent reader
//! never observes a half-written mapping.

use crate::dex::{ImageLoader, JsonImageLoader};
use crate::diff::{ClassesDiffer, RenameMapping};
use crate::Error;
use serde::{Deserialize, Serialize};

pub use semver::Version;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "timeline";
const SOURCES_DIR: &str = "sources";
const DIFFS_DIR: &str = "diffs";

/// Artifact format recorded when the timeline is created
const JSON_FORMAT: &str = "json";

#[derive(Serialize, Deserialize)]
struct Config {
    format: String,
}

/// What [`Timeline::map_range_with`] does with a class that an intermediate
/// link fails to resolve
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum GapPolicy {
    /// Keep the value from the last link that resolved the class
    ///
    /// This is the historical behavior: the retained value names the class
    /// as of some intermediate version, not the requested target version.
    RetainStale,
    /// Drop the class from the composed mapping
    Drop,
}

/// Parse a strict semantic version, reporting the offending string on failure
pub fn parse_version(version: &str) -> Result<Version, Error> {
    Version::parse(version).map_err(|error| Error::InvalidVersion {
        version: version.to_owned(),
        error,
    })
}

/// A timeline directory and the loader used to read its stored artifacts
pub struct Timeline {
    root: PathBuf,
    loader: Box<dyn ImageLoader>,
}

impl std::fmt::Debug for Timeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timeline")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl Timeline {
    /// Create a fresh timeline directory at `root`
    ///
    /// Fails if `root` already exists.
    pub fn init(root: impl AsRef<Path>) -> Result<Timeline, Error> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir(&root)?;
        fs::create_dir(root.join(SOURCES_DIR))?;
        fs::create_dir(root.join(DIFFS_DIR))?;
        let config = Config {
            format: JSON_FORMAT.to_owned(),
        };
        fs::write(root.join(CONFIG_FILE), serde_json::to_vec(&config)?)?;
        Ok(Timeline {
            root,
            loader: Box::new(JsonImageLoader),
        })
    }

    /// Open an existing timeline directory
    ///
    /// The loader is picked from the format recorded in the config file; a
    /// format with no known loader is an error.
    pub fn open(root: impl AsRef<Path>) -> Result<Timeline, Error> {
        let root = root.as_ref().to_path_buf();
        let config_path = root.join(CONFIG_FILE);
        if !root.join(SOURCES_DIR).is_dir()
            || !root.join(DIFFS_DIR).is_dir()
            || !config_path.is_file()
        {
            return Err(Error::NotATimeline(root));
        }

        let config: Config = serde_json::from_slice(&fs::read(config_path)?)?;
        let loader: Box<dyn ImageLoader> = match config.format.as_str() {
            JSON_FORMAT => Box::new(JsonImageLoader),
            other => return Err(Error::InvalidFormat(other.to_owned())),
        };
        Ok(Timeline { root, loader })
    }

    /// Swap in a different artifact loader (eg. a real bytecode parser)
    pub fn with_loader(mut self, loader: Box<dyn ImageLoader>) -> Timeline {
        self.loader = loader;
        self
    }

    /// All stored versions, in ascending version order
    pub fn versions(&self) -> Result<Vec<Version>, Error> {
        let mut versions = vec![];
        for entry in fs::read_dir(self.root.join(SOURCES_DIR))? {
            let name = entry?.file_name();
            versions.push(parse_version(&name.to_string_lossy())?);
        }
        versions.sort();
        Ok(versions)
    }

    /// Store `artifact` as `version` and compute mappings to its neighbors
    ///
    /// Refuses to replace an existing version unless `force` is set. With
    /// `compute_maps`, the mappings to the closest earlier and later stored
    /// versions are computed eagerly; without it they are left to lazy
    /// computation by the query operations.
    pub fn insert_version(
        &self,
        version: &Version,
        artifact: &Path,
        force: bool,
        compute_maps: bool,
    ) -> Result<(), Error> {
        let destination = self.source_path(version);
        if destination.is_file() {
            if !force {
                return Err(Error::VersionExists(version.clone()));
            }
            fs::remove_file(&destination)?;
        }
        fs::copy(artifact, &destination)?;

        if compute_maps {
            let versions = self.versions()?;
            let previous = versions.iter().filter(|v| *v < version).next_back();
            let next = versions.iter().find(|v| *v > version);
            if let Some(previous) = previous {
                self.compute_maps(previous, version)?;
            }
            if let Some(next) = next {
                self.compute_maps(version, next)?;
            }
        }
        Ok(())
    }

    /// The stored mapping from `from` to `to`, computing it if missing
    ///
    /// Computing a pair always publishes both directions, so asking for
    /// either order of an adjacent pair costs one diff.
    pub fn pairwise_diff(
        &self,
        from: &Version,
        to: &Version,
    ) -> Result<HashMap<String, String>, Error> {
        if from == to {
            return Err(Error::SameVersion(from.clone()));
        }
        self.check_known(from)?;
        self.check_known(to)?;

        let path = self.diff_path(from, to);
        if !path.is_file() {
            self.compute_maps(from, to)?;
        }
        let bytes = fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Compose the mapping from `from` to `to` across every stored version
    /// in between, retaining stale values over composition gaps
    pub fn map_range(&self, from: &Version, to: &Version) -> Result<HashMap<String, String>, Error> {
        self.map_range_with(from, to, GapPolicy::RetainStale)
    }

    /// Compose the mapping from `from` to `to` with an explicit gap policy
    ///
    /// The chain is walked version by version in whichever direction the
    /// endpoints imply; walking backwards uses the stored reverse mappings.
    pub fn map_range_with(
        &self,
        from: &Version,
        to: &Version,
        gap: GapPolicy,
    ) -> Result<HashMap<String, String>, Error> {
        if from == to {
            return Err(Error::SameVersion(from.clone()));
        }
        self.check_known(from)?;
        self.check_known(to)?;

        let (lower, upper) = if from > to { (to, from) } else { (from, to) };
        let mut chain: Vec<Version> = self
            .versions()?
            .into_iter()
            .filter(|v| lower <= v && v <= upper)
            .collect();
        if from > to {
            chain.reverse();
        }

        let mut total = self.pairwise_diff(&chain[0], &chain[1])?;
        for link in chain[1..].windows(2) {
            let link = self.pairwise_diff(&link[0], &link[1])?;
            match gap {
                GapPolicy::RetainStale => {
                    for value in total.values_mut() {
                        if let Some(next) = link.get(value) {
                            *value = next.clone();
                        }
                    }
                }
                GapPolicy::Drop => {
                    total = total
                        .into_iter()
                        .filter_map(|(key, value)| {
                            link.get(&value).map(|next| (key, next.clone()))
                        })
                        .collect();
                }
            }
        }
        Ok(total)
    }

    /// Last version at which `class_name` (under its then-current name) is
    /// still confirmed present, walking forward from `version`
    pub fn until(&self, version: &Version, class_name: &str) -> Result<Version, Error> {
        self.check_known(version)?;

        let mut current = version.clone();
        let mut name = class_name.to_owned();
        for next in self.versions()? {
            if next <= current {
                continue;
            }
            let mapping = self.pairwise_diff(&current, &next)?;
            match mapping.get(&name) {
                Some(next_name) => {
                    name = next_name.clone();
                    current = next;
                }
                None => break,
            }
        }
        Ok(current)
    }

    /// First version since which `class_name` is confirmed present, walking
    /// backward from `version`
    pub fn since(&self, version: &Version, class_name: &str) -> Result<Version, Error> {
        self.check_known(version)?;

        let mut current = version.clone();
        let mut name = class_name.to_owned();
        for previous in self.versions()?.into_iter().rev() {
            if previous >= current {
                continue;
            }
            let mapping = self.pairwise_diff(&current, &previous)?;
            match mapping.get(&name) {
                Some(previous_name) => {
                    name = previous_name.clone();
                    current = previous;
                }
                None => break,
            }
        }
        Ok(current)
    }

    fn check_known(&self, version: &Version) -> Result<(), Error> {
        if self.source_path(version).is_file() {
            Ok(())
        } else {
            Err(Error::UnknownVersion(version.clone()))
        }
    }

    fn source_path(&self, version: &Version) -> PathBuf {
        self.root.join(SOURCES_DIR).join(version.to_string())
    }

    fn diff_path(&self, from: &Version, to: &Version) -> PathBuf {
        self.root.join(DIFFS_DIR).join(format!("{}-{}", from, to))
    }

    fn compute_maps(&self, from: &Version, to: &Version) -> Result<(), Error> {
        let old_classes = self.loader.load(&self.source_path(from))?;
        let new_classes = self.loader.load(&self.source_path(to))?;
        log::info!(
            "total classes: {} -> {}",
            old_classes.len(),
            new_classes.len()
        );

        let mapping: RenameMapping = ClassesDiffer::new().diff(&old_classes, &new_classes);
        log::info!("{} -> {} matched {} classes", from, to, mapping.len());

        self.publish(self.diff_path(from, to), mapping.forward())?;
        self.publish(self.diff_path(to, from), mapping.backward())?;
        Ok(())
    }

    /// Compute-then-atomically-publish: a reader either sees no mapping file
    /// or a complete one
    fn publish(&self, path: PathBuf, table: &HashMap<String, String>) -> Result<(), Error> {
        let temporary = path.with_extension("tmp");
        fs::write(&temporary, serde_json::to_vec(table)?)?;
        fs::rename(temporary, path)?;
        Ok(())
    }
}
