use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Code of the auto-detect sentinel. Only valid as a source language.
pub const AUTO_DETECT: &str = "auto";

/// Default source language code
pub const DEFAULT_SOURCE_LANG: &str = AUTO_DETECT;
/// Default target language code
pub const DEFAULT_TARGET_LANG: &str = "en";

/// Language codes following ISO 639-1 with regional variants
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lang(pub String);

impl Lang {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn auto() -> Self {
        Self::new(AUTO_DETECT)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_auto(&self) -> bool {
        self.0 == AUTO_DETECT
    }

    /// Entry in the language table, `None` for the sentinel and unknown codes.
    pub fn option(&self) -> Option<&'static LanguageOption> {
        LANGUAGES.iter().find(|l| l.code == self.0)
    }

    /// Valid as a source: the sentinel or any table entry.
    pub fn is_valid_source(&self) -> bool {
        self.is_auto() || self.option().is_some()
    }

    /// Valid as a target: any table entry, never the sentinel.
    pub fn is_valid_target(&self) -> bool {
        self.option().is_some()
    }

    /// Human-readable name ("Auto-detect" for the sentinel).
    pub fn display_name(&self) -> &'static str {
        if self.is_auto() {
            "Auto-detect"
        } else {
            self.option().map_or("Unknown", |l| l.name)
        }
    }
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Lang {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Lang {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A language option for UI dropdowns
#[derive(Debug, Clone)]
pub struct LanguageOption {
    /// ISO language code (e.g., "en", "fr", "zh-CN")
    pub code: &'static str,
    /// Display name (e.g., "English", "French")
    pub name: &'static str,
    /// Flag emoji
    pub flag: &'static str,
}

/// Fixed set of concrete languages offered for translation.
pub static LANGUAGES: &[LanguageOption] = &[
    LanguageOption { code: "en", name: "English", flag: "🇬🇧" },
    LanguageOption { code: "es", name: "Spanish", flag: "🇪🇸" },
    LanguageOption { code: "ca", name: "Catalan", flag: "🏴" },
    LanguageOption { code: "fr", name: "French", flag: "🇫🇷" },
    LanguageOption { code: "de", name: "German", flag: "🇩🇪" },
    LanguageOption { code: "it", name: "Italian", flag: "🇮🇹" },
    LanguageOption { code: "pt", name: "Portuguese", flag: "🇵🇹" },
    LanguageOption { code: "nl", name: "Dutch", flag: "🇳🇱" },
    LanguageOption { code: "pl", name: "Polish", flag: "🇵🇱" },
    LanguageOption { code: "sv", name: "Swedish", flag: "🇸🇪" },
    LanguageOption { code: "da", name: "Danish", flag: "🇩🇰" },
    LanguageOption { code: "fi", name: "Finnish", flag: "🇫🇮" },
    LanguageOption { code: "ru", name: "Russian", flag: "🇷🇺" },
    LanguageOption { code: "uk", name: "Ukrainian", flag: "🇺🇦" },
    LanguageOption { code: "tr", name: "Turkish", flag: "🇹🇷" },
    LanguageOption { code: "ar", name: "Arabic", flag: "🇸🇦" },
    LanguageOption { code: "hi", name: "Hindi", flag: "🇮🇳" },
    LanguageOption { code: "zh-CN", name: "Simplified Chinese", flag: "🇨🇳" },
    LanguageOption { code: "zh-TW", name: "Traditional Chinese", flag: "🇹🇼" },
    LanguageOption { code: "ja", name: "Japanese", flag: "🇯🇵" },
    LanguageOption { code: "ko", name: "Korean", flag: "🇰🇷" },
    LanguageOption { code: "vi", name: "Vietnamese", flag: "🇻🇳" },
    LanguageOption { code: "th", name: "Thai", flag: "🇹🇭" },
];

/// Languages available as translation source (the table plus auto-detect).
pub fn source_languages() -> Vec<LanguageOption> {
    let mut options = Vec::with_capacity(LANGUAGES.len() + 1);
    options.push(LanguageOption { code: AUTO_DETECT, name: "Auto-detect", flag: "🔍" });
    options.extend(LANGUAGES.iter().cloned());
    options
}

/// Languages available as translation target.
pub fn target_languages() -> Vec<LanguageOption> {
    LANGUAGES.to_vec()
}

/// Get flag emoji for a language code.
///
/// Returns a globe emoji for unknown language codes.
pub fn flag_for_lang(code: &str) -> &'static str {
    if code == AUTO_DETECT {
        return "🔍";
    }
    LANGUAGES
        .iter()
        .find(|l| l.code == code)
        .map_or("🌐", |l| l.flag)
}

/// Source/target pair. The target is never the auto-detect sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageSelection {
    source: Lang,
    target: Lang,
}

impl LanguageSelection {
    pub fn new(source: Lang, target: Lang) -> Result<Self> {
        validate_source(&source)?;
        validate_target(&target)?;
        Ok(Self { source, target })
    }

    pub const fn source(&self) -> &Lang {
        &self.source
    }

    pub const fn target(&self) -> &Lang {
        &self.target
    }

    /// Auto-translate mode is active whenever the source is auto-detect.
    pub fn is_auto_detect(&self) -> bool {
        self.source.is_auto()
    }

    pub fn set_source(&mut self, source: Lang) -> Result<()> {
        validate_source(&source)?;
        self.source = source;
        Ok(())
    }

    pub fn set_target(&mut self, target: Lang) -> Result<()> {
        validate_target(&target)?;
        self.target = target;
        Ok(())
    }

    pub fn swap(&mut self) -> Result<()> {
        if self.source.is_auto() {
            return Err(Error::SwapWithAutoDetect);
        }
        std::mem::swap(&mut self.source, &mut self.target);
        Ok(())
    }
}

impl Default for LanguageSelection {
    fn default() -> Self {
        Self {
            source: Lang::new(DEFAULT_SOURCE_LANG),
            target: Lang::new(DEFAULT_TARGET_LANG),
        }
    }
}

fn validate_source(lang: &Lang) -> Result<()> {
    if lang.is_valid_source() {
        Ok(())
    } else {
        Err(Error::UnknownLanguage(lang.to_string()))
    }
}

fn validate_target(lang: &Lang) -> Result<()> {
    if lang.is_auto() {
        Err(Error::AutoDetectTarget)
    } else if lang.is_valid_target() {
        Ok(())
    } else {
        Err(Error::UnknownLanguage(lang.to_string()))
    }
}
