use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Document language. Each variant has matching `title_<code>` and
/// `description_<code>` fields analyzed for that language.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    Ar,
    Bn,
    De,
    #[default]
    En,
    Es,
    Fa,
    Fr,
    He,
    Hi,
    Hy,
    It,
    Ja,
    Km,
    Ko,
    Pt,
    Ru,
    Sq,
    Sr,
    Uk,
    Ur,
    Vi,
    Zh,
}

const ALL: [Lang; 22] = [
    Lang::Ar,
    Lang::Bn,
    Lang::De,
    Lang::En,
    Lang::Es,
    Lang::Fa,
    Lang::Fr,
    Lang::He,
    Lang::Hi,
    Lang::Hy,
    Lang::It,
    Lang::Ja,
    Lang::Km,
    Lang::Ko,
    Lang::Pt,
    Lang::Ru,
    Lang::Sq,
    Lang::Sr,
    Lang::Uk,
    Lang::Ur,
    Lang::Vi,
    Lang::Zh,
];

impl Lang {
    pub fn code(self) -> &'static str {
        match self {
            Lang::Ar => "ar",
            Lang::Bn => "bn",
            Lang::De => "de",
            Lang::En => "en",
            Lang::Es => "es",
            Lang::Fa => "fa",
            Lang::Fr => "fr",
            Lang::He => "he",
            Lang::Hi => "hi",
            Lang::Hy => "hy",
            Lang::It => "it",
            Lang::Ja => "ja",
            Lang::Km => "km",
            Lang::Ko => "ko",
            Lang::Pt => "pt",
            Lang::Ru => "ru",
            Lang::Sq => "sq",
            Lang::Sr => "sr",
            Lang::Uk => "uk",
            Lang::Ur => "ur",
            Lang::Vi => "vi",
            Lang::Zh => "zh",
        }
    }

    /// Name of the language-analyzed sub-field for `base` (e.g. `title_en`).
    pub fn analyzed_field(self, base: &str) -> String {
        format!("{base}_{}", self.code())
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unsupported language code: '{0}'")]
pub struct UnknownLang(pub String);

impl FromStr for Lang {
    type Err = UnknownLang;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        ALL.into_iter()
            .find(|lang| lang.code() == code)
            .ok_or_else(|| UnknownLang(s.to_string()))
    }
}
