//! 設定モジュール（YAML 読み込み）
//!
//! `ConfigSet` は設定ディレクトリ配下のYAMLファイルを読み込み、
//! 再分割器と入力ソースの設定値を型安全に提供します。
mod error;
mod resegment;
mod source;

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

pub use error::ConfigError;
pub use resegment::*;
pub use source::*;

/// 設定ディレクトリを指す環境変数名
pub const CONFIG_DIR_ENV: &str = "SAMPLE_RECHUNKER_CONFIG_DIR";

/// すべての設定をひとまとめにした構造体
#[derive(Debug, Clone)]
pub struct ConfigSet {
    pub resegmenter: ResegmentConfig,
    pub source: SourceConfig,
    root: PathBuf,
}

impl ConfigSet {
    /// ルートディレクトリから各YAMLを読み込み、値を検証
    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, ConfigError> {
        let root = dir.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(ConfigError::MissingRoot(root));
        }

        let resegmenter = load_yaml(root.join("resegmenter.yaml"))?;
        let source = load_yaml(root.join("source.yaml"))?;

        let config = Self {
            resegmenter,
            source,
            root,
        };
        config.validate()?;
        Ok(config)
    }

    /// 環境変数（未設定時は `config/`）から設定を読み込み
    pub fn load_from_env() -> Result<Self, ConfigError> {
        let dir = std::env::var(CONFIG_DIR_ENV).unwrap_or_else(|_| "config".to_string());
        Self::load_from_dir(dir)
    }

    /// 設定ルートのパス（デバッグ等に利用）
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = self.resegmenter.required_size;
        if required == 0 {
            return Err(invalid("resegmenter.required_size must be at least 1"));
        }
        if self.resegmenter.require_power_of_two && !required.is_power_of_two() {
            return Err(invalid(format!(
                "resegmenter.required_size {required} is not a power of two"
            )));
        }
        if self.source.read_size_bytes == 0 {
            return Err(invalid("source.read_size_bytes must be at least 1"));
        }
        self.source
            .pcm
            .validate()
            .map_err(|err| invalid(format!("source.pcm: {err}")))
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        message: message.into(),
    }
}

/// YAMLファイルを読み込み、型 `T` へデシリアライズ
fn load_yaml<T>(path: PathBuf) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let data = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    serde_yaml::from_str(&data).map_err(|source| ConfigError::Parse { path, source })
}
