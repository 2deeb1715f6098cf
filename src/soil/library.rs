//! Site profile packages and the on-disk library
//!
//! A package bundles everything one jack-up location needs: site metadata,
//! the rig's spudcan, and the layered soil profile. Packages round-trip
//! through JSON so surveys can be archived and reloaded between analyses.

use crate::soil::profile::{ProfileError, SoilLayer, SoilProfile};
use crate::spudcan::Spudcan;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Profile package not found for site: {0} {1}")]
    PackageNotFound(String, String),

    #[error(transparent)]
    Profile(#[from] ProfileError),
}

/// Survey site metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteInfo {
    pub operator: String,
    pub site_name: String,

    /// Free-form location description (field, block, coordinates)
    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub water_depth_m: Option<f64>,
}

/// One site's worth of analysis input: metadata, spudcan, soil layers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilePackage {
    pub site_info: SiteInfo,
    pub spudcan: Spudcan,
    pub layers: Vec<SoilLayer>,
}

impl ProfilePackage {
    /// Validate the stored layers into a queryable profile
    pub fn to_profile(&self) -> Result<SoilProfile, ProfileError> {
        SoilProfile::new(self.layers.clone())
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, LibraryError> {
        let json = fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), LibraryError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        Ok(())
    }
}

/// Library of profile packages for multiple sites
#[derive(Debug, Default)]
pub struct ProfileLibrary {
    /// Maps "Operator:Site" -> ProfilePackage
    packages: HashMap<String, ProfilePackage>,

    /// Base directory the packages were loaded from
    base_path: Option<PathBuf>,
}

impl ProfileLibrary {
    pub fn new() -> Self {
        Self {
            packages: HashMap::new(),
            base_path: None,
        }
    }

    /// Create a library and load every JSON package in a directory
    pub fn from_directory(path: impl AsRef<Path>) -> Result<Self, LibraryError> {
        let mut library = Self::new();
        library.base_path = Some(path.as_ref().to_path_buf());
        library.load_all_from_directory(path)?;
        Ok(library)
    }

    /// Load all JSON package files from a directory. Unreadable files are
    /// skipped with a note rather than aborting the whole load.
    pub fn load_all_from_directory(&mut self, path: impl AsRef<Path>) -> Result<(), LibraryError> {
        let dir = fs::read_dir(path)?;

        for entry in dir {
            let entry = entry?;
            let path = entry.path();

            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                match self.load_package_from_file(&path) {
                    Ok(_) => {}
                    Err(e) => eprintln!("Skipped {}: {}", path.display(), e),
                }
            }
        }
        Ok(())
    }

    pub fn load_package_from_file(&mut self, path: impl AsRef<Path>) -> Result<(), LibraryError> {
        let package = ProfilePackage::load_from_file(path)?;
        self.add_package(package);
        Ok(())
    }

    pub fn add_package(&mut self, package: ProfilePackage) {
        let key = Self::key(&package.site_info.operator, &package.site_info.site_name);
        self.packages.insert(key, package);
    }

    pub fn get_package(&self, operator: &str, site_name: &str) -> Option<&ProfilePackage> {
        self.packages.get(&Self::key(operator, site_name))
    }

    /// Validated profile for one site
    pub fn profile_for(&self, operator: &str, site_name: &str) -> Result<SoilProfile, LibraryError> {
        let package = self
            .get_package(operator, site_name)
            .ok_or_else(|| LibraryError::PackageNotFound(operator.into(), site_name.into()))?;
        Ok(package.to_profile()?)
    }

    /// All operators with at least one package, sorted and deduplicated
    pub fn operators(&self) -> Vec<String> {
        let mut operators: Vec<String> = self
            .packages
            .values()
            .map(|p| p.site_info.operator.clone())
            .collect();
        operators.sort();
        operators.dedup();
        operators
    }

    /// All site names for one operator
    pub fn sites(&self, operator: &str) -> Vec<String> {
        self.packages
            .values()
            .filter(|p| p.site_info.operator == operator)
            .map(|p| p.site_info.site_name.clone())
            .collect()
    }

    /// Run profile validation on every package, collecting failures per key
    pub fn validate_all(&self) -> Vec<(String, ProfileError)> {
        let mut failures = Vec::new();
        for (key, package) in &self.packages {
            if let Err(e) = package.to_profile() {
                failures.push((key.clone(), e));
            }
        }
        failures
    }

    pub fn remove_package(&mut self, operator: &str, site_name: &str) -> Option<ProfilePackage> {
        self.packages.remove(&Self::key(operator, site_name))
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    pub fn base_path(&self) -> Option<&Path> {
        self.base_path.as_deref()
    }

    fn key(operator: &str, site_name: &str) -> String {
        format!("{}:{}", operator, site_name)
    }
}
