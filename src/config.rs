//! Persistent runtime configuration, stored as JSON on the flash filesystem.

use derive_more::Display;
use log::LevelFilter;
use serde::{Deserialize, Serialize};

#[cfg(feature = "littlefs")]
use hal::fs::FileSystem;

pub const PATH: &str = "/littlefs/config.json";
pub const MAX_SIZE: usize = 512;
/// Files written by hand or by older firmware may carry extra sections
pub const MAX_FILE_SIZE: usize = 2048;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotorConfig {
    /// Percent of full duty at the lowest speed step
    pub min_power: u8,
    pub max_power: u8,
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self { min_power: 50, max_power: 100 }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermalConfig {
    pub max_celsius: i16,
    pub hysteresis: u8,
}

impl Default for ThermalConfig {
    fn default() -> Self {
        Self { max_celsius: 60, hysteresis: 5 }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => Self::Off,
            LogLevel::Error => Self::Error,
            LogLevel::Warn => Self::Warn,
            LogLevel::Info => Self::Info,
            LogLevel::Debug => Self::Debug,
            LogLevel::Trace => Self::Trace,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: LogLevel,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: LogLevel::Info }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub motor: MotorConfig,
    pub thermal: ThermalConfig,
    pub log: LogConfig,
}

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum Error<E> {
    #[display(fmt = "storage error {:?}", _0)]
    Storage(E),
    #[display(fmt = "malformed config")]
    Malformed,
    #[display(fmt = "config exceeds {} bytes", MAX_SIZE)]
    Encode,
}

pub fn parse(bytes: &[u8]) -> Result<Config, Error<()>> {
    serde_json_core::from_slice(bytes).map(|(config, _)| config).map_err(|_| Error::Malformed)
}

pub fn to_json(config: &Config, buffer: &mut [u8]) -> Result<usize, Error<()>> {
    serde_json_core::to_slice(config, buffer).map_err(|_| Error::Encode)
}

#[cfg(feature = "littlefs")]
pub fn save<F: FileSystem>(fs: &mut F, config: &Config) -> Result<(), Error<F::Error>> {
    let mut buffer = [0u8; MAX_SIZE];
    let size = to_json(config, &mut buffer).map_err(|_| Error::Encode)?;
    fs.write(PATH, &buffer[..size]).map_err(Error::Storage)
}

/// Reads the stored config, creating it with defaults when absent.
///
/// A malformed or unreadable file is left in place and defaults are used instead.
#[cfg(feature = "littlefs")]
pub fn load_or_create<F: FileSystem>(fs: &mut F) -> Result<Config, Error<F::Error>> {
    if !fs.exists(PATH).map_err(Error::Storage)? {
        let config = Config::default();
        save(fs, &config)?;
        info!("Created default config at {}", PATH);
        return Ok(config);
    }
    let mut buffer = [0u8; MAX_FILE_SIZE];
    let size = match fs.read(PATH, &mut buffer) {
        Ok(size) => size,
        Err(e) => {
            warn!("Unable to read {}: {:?}, using defaults", PATH, e);
            return Ok(Config::default());
        }
    };
    match parse(&buffer[..size]) {
        Ok(config) => Ok(config),
        Err(e) => {
            warn!("{} at {}, using defaults", e, PATH);
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod test {
    #[test]
    fn test_partial_config() {
        use super::{parse, Config, LogLevel, MotorConfig};

        let config = parse(br#"{"motor":{"min_power":30},"log":{"level":"debug"}}"#).unwrap();
        let expected = Config {
            motor: MotorConfig { min_power: 30, max_power: 100 },
            log: super::LogConfig { level: LogLevel::Debug },
            ..Default::default()
        };
        assert_eq!(config, expected);
        assert_eq!(parse(b"{}").unwrap(), Config::default());
        assert!(parse(b"{\"motor\":").is_err());
    }

    #[test]
    fn test_json_layout() {
        use super::{to_json, Config};

        let mut buffer = [0u8; super::MAX_SIZE];
        let size = to_json(&Config::default(), &mut buffer).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buffer[..size]).unwrap();
        let expected = serde_json::json!({
            "motor": {"min_power": 50, "max_power": 100},
            "thermal": {"max_celsius": 60, "hysteresis": 5},
            "log": {"level": "info"},
        });
        assert_eq!(value, expected);
        assert!(to_json(&Config::default(), &mut buffer[..16]).is_err());
    }

    #[cfg(feature = "littlefs")]
    #[test]
    fn test_load_or_create() {
        use drivers::logfs::{LogFs, RamFlash};
        use hal::fs::{FileSystem, MountConfig};

        use super::{load_or_create, Config, PATH};

        let mut fs = LogFs::new(RamFlash::<256>::new(), 256);
        fs.mount(&MountConfig::default()).unwrap();
        assert_eq!(load_or_create(&mut fs).unwrap(), Config::default());
        assert!(fs.exists(PATH).unwrap());

        fs.write(PATH, br#"{"thermal":{"max_celsius":45}}"#).unwrap();
        assert_eq!(load_or_create(&mut fs).unwrap().thermal.max_celsius, 45);

        fs.write(PATH, b"not json").unwrap();
        assert_eq!(load_or_create(&mut fs).unwrap(), Config::default());
    }

    #[cfg(feature = "littlefs")]
    #[test]
    fn test_large_config() {
        use std::vec::Vec;

        use drivers::logfs::{LogFs, RamFlash};
        use hal::fs::{FileSystem, MountConfig};

        use super::{load_or_create, Config, MAX_FILE_SIZE, PATH};

        let mut fs = LogFs::new(RamFlash::<1024>::new(), 1024);
        fs.mount(&MountConfig::default()).unwrap();

        let mut padded: Vec<u8> = br#"{"motor":{"min_power":40}"#.to_vec();
        padded.resize(625, b' ');
        padded.push(b'}');
        fs.write(PATH, &padded).unwrap();
        assert_eq!(load_or_create(&mut fs).unwrap().motor.min_power, 40);

        let mut oversized: Vec<u8> = br#"{"motor":{"min_power":40}"#.to_vec();
        oversized.resize(MAX_FILE_SIZE + 100, b' ');
        oversized.push(b'}');
        fs.write(PATH, &oversized).unwrap();
        assert_eq!(load_or_create(&mut fs).unwrap(), Config::default());
        assert!(fs.exists(PATH).unwrap());
    }
}
