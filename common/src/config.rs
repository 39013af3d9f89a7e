//! This is the `ConfigFile` struct.
//!
//! This is for finding the right default locations for the configuration files of the
//! Pegasus tools.  This is a configuration file/struct neutral loading engine, storing only the
//! base directory and with `load()` read the proper file, the default one or fall back to the
//! built-in defaults of `T`.
//!
//! This encapsulates the configuration file, available with `.inner()` or `.into_inner()`.
//!

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use eyre::Result;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, trace};

use crate::makepath;

/// Main name for the directory base
const TAG: &str = "pegasus";

/// Every configuration file carries a version number we can check before use.
///
pub trait Versioned {
    fn version(&self) -> usize;
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown config file {0:?}")]
    MissingFile(PathBuf),
    #[error("Bad file version {found} in {path:?}, expected {expected}")]
    BadVersion {
        path: PathBuf,
        found: usize,
        expected: usize,
    },
    #[error("No home directory, can not find {0}")]
    NoHome(String),
}

/// Configuration file for one of the tools, `T` being the on-disk structure.
///
#[derive(Debug)]
pub struct ConfigFile<T: Debug + Default + DeserializeOwned + Versioned> {
    /// Tag is the project name.
    tag: String,
    /// This is the base directory for all files.
    basedir: PathBuf,
    /// Name of the file inside `basedir`.
    fname: String,
    /// Where the data came from, `None` for the built-in defaults.
    source: Option<PathBuf>,
    inner: T,
}

impl<T> ConfigFile<T>
where
    T: Debug + Default + DeserializeOwned + Versioned,
{
    #[tracing::instrument]
    fn new(tag: &str, fname: &str) -> Result<Self> {
        let basedir: PathBuf = match BaseDirs::new() {
            Some(base) => {
                #[cfg(unix)]
                let base = base.home_dir().join(".config");

                #[cfg(windows)]
                let base = base.data_local_dir().to_path_buf();

                debug!("base = {base:?}");
                makepath!(base, tag)
            }
            None => {
                #[cfg(unix)]
                let homedir =
                    std::env::var("HOME").map_err(|_| ConfigError::NoHome(fname.to_string()))?;

                #[cfg(windows)]
                let homedir = std::env::var("LOCALAPPDATA")
                    .map_err(|_| ConfigError::NoHome(fname.to_string()))?;

                debug!("base = {homedir}");

                #[cfg(unix)]
                let base: PathBuf = makepath!(homedir, ".config", tag);

                #[cfg(windows)]
                let base: PathBuf = makepath!(homedir, tag);

                base
            }
        };
        Ok(ConfigFile {
            tag: String::from(tag),
            basedir,
            fname: fname.to_string(),
            source: None,
            inner: T::default(),
        })
    }

    /// Returns the path of the default config file
    ///
    pub fn default_file(&self) -> PathBuf {
        let cfg = self.basedir.join(&self.fname);
        debug!("default = {cfg:?}");
        cfg
    }

    /// Returns the file the configuration was read from, if any.
    ///
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Load the file and return a struct T in the right format.
    ///
    /// Use the following search path:
    /// - file specified on CLI, which must exist
    /// - default file in basedir (based on $HOME or $LOCALAPPDATA)
    /// - built-in defaults
    ///
    /// The version found in the file must be `version`.
    ///
    #[tracing::instrument]
    pub fn load(fname: Option<&Path>, default: &str, version: usize) -> Result<ConfigFile<T>> {
        let mut cfg = ConfigFile::<T>::new(TAG, default)?;

        let fname = match fname {
            Some(fname) => {
                if !fname.exists() {
                    return Err(ConfigError::MissingFile(fname.to_path_buf()).into());
                }
                fname.to_path_buf()
            }
            None => {
                let def = cfg.default_file();
                if !def.exists() {
                    trace!("No {def:?}, using defaults for {}", cfg.tag);
                    return Ok(cfg);
                }
                def
            }
        };

        // Use a full path
        //
        let fname = fname.canonicalize()?;
        trace!("Loading config file {fname:?}");

        let data = fs::read_to_string(&fname)?;
        debug!("string data = {data}");

        let data: T = hcl::from_str(&data)?;
        debug!("struct data = {data:?}");

        if data.version() != version {
            return Err(ConfigError::BadVersion {
                path: fname,
                found: data.version(),
                expected: version,
            }
            .into());
        }

        cfg.source = Some(fname);
        cfg.inner = data;
        Ok(cfg)
    }

    /// Return the inner configuration file
    ///
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Consume the wrapper
    ///
    pub fn into_inner(self) -> T {
        self.inner
    }
}
