//! Configuration of the pipeline, read from JSON. Every field has a default.

use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{
    classifier::train::{TrainingOptions, BEST_DIR, MODEL_FILE},
    filter::FilterOptions,
    generate::GeneratorOptions,
    m2::ExtractionMode,
    Error,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionOptions {
    pub mode: ExtractionMode,
    /// m2 files relative to the data directory.
    pub m2_files: Vec<PathBuf>,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        ExtractionOptions {
            mode: ExtractionMode::default(),
            m2_files: ["fce.m2", "lang8.m2", "nucle.m2", "wi_locness.m2"]
                .iter()
                .map(PathBuf::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seeds generation, splitting, sampling and training.
    pub seed: u64,
    pub data_dir: PathBuf,
    pub model_dir: PathBuf,
    /// Plain text corpus of real-world sentences, relative to the data directory.
    pub real_corpus: PathBuf,
    pub extraction: ExtractionOptions,
    pub generation: GeneratorOptions,
    pub filter: FilterOptions,
    pub training: TrainingOptions,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            seed: 42,
            data_dir: PathBuf::from("data"),
            model_dir: PathBuf::from("model"),
            real_corpus: PathBuf::from("pg8448.txt"),
            extraction: ExtractionOptions::default(),
            generation: GeneratorOptions::default(),
            filter: FilterOptions::default(),
            training: TrainingOptions::default(),
        }
    }
}

impl Config {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let text = fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Reads the config at `path`, the default config if there is none.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self, Error> {
        match path {
            Some(path) => Config::from_path(path),
            None => Ok(Config::default()),
        }
    }

    pub fn data_paths(&self) -> DataPaths {
        DataPaths::new(self)
    }

    pub fn model_paths(&self) -> ModelPaths {
        ModelPaths::new(&self.model_dir)
    }
}

/// Inputs and outputs of the data configuration stage.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPaths {
    pub m2_files: Vec<PathBuf>,
    pub real_corpus: PathBuf,
    pub extracted_csv: PathBuf,
    pub generated_csv: PathBuf,
    pub train_json: PathBuf,
    pub valid_json: PathBuf,
    pub test_json: PathBuf,
    pub real_json: PathBuf,
    pub parsed_csv: PathBuf,
}

impl DataPaths {
    fn new(config: &Config) -> Self {
        let p = config.data_dir.as_path();
        DataPaths {
            m2_files: config.extraction.m2_files.iter().map(|x| p.join(x)).collect(),
            real_corpus: p.join(&config.real_corpus),
            extracted_csv: p.join("extracted_sentences.csv"),
            generated_csv: p.join("generated_sentences.csv"),
            train_json: p.join("train_sva_data.json"),
            valid_json: p.join("valid_sva_data.json"),
            test_json: p.join("test_sva_data.json"),
            real_json: p.join("test_real_sentences.json"),
            parsed_csv: p.join("parsed_results.csv"),
        }
    }

    /// The files the training and test stages read.
    pub fn configured(&self) -> [&Path; 4] {
        [
            self.real_json.as_path(),
            self.test_json.as_path(),
            self.train_json.as_path(),
            self.valid_json.as_path(),
        ]
    }

    pub fn is_configured(&self) -> bool {
        self.configured().iter().all(|x| x.exists())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelPaths {
    pub model_dir: PathBuf,
    pub best_dir: PathBuf,
    pub best_model: PathBuf,
}

impl ModelPaths {
    fn new<P: AsRef<Path>>(model_dir: P) -> Self {
        let p = model_dir.as_ref();
        ModelPaths {
            model_dir: p.to_path_buf(),
            best_dir: p.join(BEST_DIR),
            best_model: p.join(BEST_DIR).join(MODEL_FILE),
        }
    }

    pub fn is_trained(&self) -> bool {
        self.best_model.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_are_defaulted() {
        let config: Config = serde_json::from_str(
            r#"{"seed": 1, "training": {"epochs": 3}, "extraction": {"mode": "single_sva"}}"#,
        )
        .unwrap();

        assert_eq!(config.seed, 1);
        assert_eq!(config.training.epochs, 3);
        assert_eq!(config.training.batch_size, 8);
        assert_eq!(config.extraction.mode, ExtractionMode::SingleSva);
        assert_eq!(config.extraction.m2_files.len(), 4);
        assert_eq!(config.filter.min_words, 35);
        assert_eq!(config.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn paths_are_derived_from_directories() {
        let config = Config {
            data_dir: PathBuf::from("/tmp/sva"),
            ..Config::default()
        };
        let paths = config.data_paths();

        assert_eq!(paths.m2_files[0], PathBuf::from("/tmp/sva/fce.m2"));
        assert_eq!(paths.real_json, PathBuf::from("/tmp/sva/test_real_sentences.json"));
        assert_eq!(
            config.model_paths().best_model,
            PathBuf::from("model/best/model.bin")
        );
    }

    #[test]
    fn can_read_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"model_dir": "checkpoints"}"#).unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.model_dir, PathBuf::from("checkpoints"));
        assert_eq!(Config::load::<&Path>(None).unwrap(), Config::default());
        assert!(!config.data_paths().is_configured());
    }
}
