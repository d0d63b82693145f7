//! Bridge configuration.
use std::{
    env,
    path::{Path, PathBuf},
};

use kfuzz::KfuzzConf;
use serde::Deserialize;

use crate::error::AppError;

/// Environment variable naming the YAML configuration file.
pub const CONF_ENV: &str = "KFUZZ_CONF";

/// Directory holding one control directory per fuzz target.
pub const DEFAULT_CONTROL_ROOT: &str = "/sys/kernel/debug/kfuzztest";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BridgeConf {
    pub control_root: PathBuf,
    /// Log a dump of the blob before it is written.
    pub dump: bool,
    /// Library settings, at the top level of the file.
    #[serde(flatten)]
    pub kfuzz: KfuzzConf,
}

impl Default for BridgeConf {
    fn default() -> Self {
        Self {
            control_root: PathBuf::from(DEFAULT_CONTROL_ROOT),
            dump: false,
            kfuzz: KfuzzConf::default(),
        }
    }
}

impl BridgeConf {
    /// Load from the file named by `KFUZZ_CONF`, or fall back to defaults.
    pub fn from_env() -> Result<Self, AppError> {
        match env::var_os(CONF_ENV) {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(filepath: impl AsRef<Path>) -> Result<Self, AppError> {
        let filepath = filepath.as_ref();
        let file = std::fs::File::open(filepath)?;

        let conf: Self = serde_yaml::from_reader(file)?;
        log::debug!("loaded configuration from {}: {:#?}", filepath.display(), conf);

        Ok(conf)
    }
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "seed_cache_size: 64").unwrap();
        writeln!(file, "dump: true").unwrap();
        file.flush().unwrap();

        let conf = BridgeConf::from_file(file.path()).unwrap();
        assert_eq!(conf.kfuzz.seed_cache_size, 64);
        assert!(conf.dump);
        assert_eq!(conf.control_root, Path::new(DEFAULT_CONTROL_ROOT));
    }

    #[test]
    fn test_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "seed_cache_size: lots").unwrap();
        file.flush().unwrap();

        let err = BridgeConf::from_file(file.path()).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Config(_)));
    }

    #[test]
    fn test_defaults() {
        let conf = BridgeConf::default();
        assert_eq!(conf.kfuzz.seed_cache_size, kfuzz::constants::DEFAULT_CACHE_SIZE);
        assert!(!conf.dump);
    }
}
