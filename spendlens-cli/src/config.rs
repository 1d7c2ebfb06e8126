use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use spendlens_core::KeywordTables;
use spendlens_ingest::{LineMode, Pdftoppm, TesseractCli, TextExtractor};
use spendlens_narrative::{LlmConfig, NarrativeError};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::state::{ensure_spendlens_home, spendlens_home};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Optional keyword-table TOML replacing the built-in tables
    pub keywords: Option<PathBuf>,
    pub llm: LlmSection,
    pub extraction: ExtractionSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Raw statement characters sent by `summarize`
    pub max_text_chars: usize,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            base_url: spendlens_narrative::client::DEFAULT_BASE_URL.to_string(),
            model: spendlens_narrative::client::DEFAULT_MODEL.to_string(),
            temperature: 0.4,
            timeout_secs: spendlens_narrative::client::DEFAULT_TIMEOUT.as_secs(),
            api_key_env: spendlens_narrative::client::DEFAULT_API_KEY_ENV.to_string(),
            max_text_chars: spendlens_narrative::generator::DEFAULT_MAX_TEXT_CHARS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSection {
    pub tesseract_command: String,
    pub pdftoppm_command: String,
    pub dpi: u32,
    pub line_mode: LineMode,
    /// Tesseract language pack (tesseract's own default when unset)
    pub tesseract_lang: Option<String>,
}

impl Default for ExtractionSection {
    fn default() -> Self {
        Self {
            tesseract_command: "tesseract".to_string(),
            pdftoppm_command: "pdftoppm".to_string(),
            dpi: spendlens_ingest::raster::DEFAULT_DPI,
            line_mode: LineMode::Preserve,
            tesseract_lang: None,
        }
    }
}

impl Config {
    pub fn keyword_tables(&self) -> Result<KeywordTables> {
        match &self.keywords {
            Some(p) => KeywordTables::load(p).with_context(|| format!("keyword table {}", p.display())),
            None => Ok(KeywordTables::default()),
        }
    }

    pub fn text_extractor(&self) -> TextExtractor {
        let ex = &self.extraction;
        let mut ocr = TesseractCli::new(&ex.tesseract_command);
        if let Some(lang) = &ex.tesseract_lang {
            ocr = ocr.with_lang(lang);
        }
        TextExtractor::new(ocr, Pdftoppm::new(&ex.pdftoppm_command, ex.dpi)).with_line_mode(ex.line_mode)
    }

    /// Completion settings with the API key pulled from the environment
    pub fn llm_config(&self) -> Result<LlmConfig, NarrativeError> {
        let mut cfg = LlmConfig::from_env(&self.llm.api_key_env)?;
        cfg.base_url = self.llm.base_url.clone();
        cfg.model = self.llm.model.clone();
        cfg.temperature = self.llm.temperature;
        cfg.timeout = Duration::from_secs(self.llm.timeout_secs);
        Ok(cfg)
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(spendlens_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    load_config_from(&p)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = ensure_spendlens_home()?.join("config.toml");
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}
