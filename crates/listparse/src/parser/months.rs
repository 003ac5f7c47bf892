use crate::conf::ConfigError;

const ENGLISH: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Short month names by server language code. Unknown codes fall back to English.
const LANGUAGES: &[(&str, [&str; 12])] = &[
    ("en", ENGLISH),
    ("de", ["Jan", "Feb", "Mär", "Apr", "Mai", "Jun", "Jul", "Aug", "Sep", "Okt", "Nov", "Dez"]),
    ("it", ["gen", "feb", "mar", "apr", "mag", "giu", "lug", "ago", "set", "ott", "nov", "dic"]),
    ("es", ["ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sep", "oct", "nov", "dic"]),
    ("pt", ["jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez"]),
    ("da", ["jan", "feb", "mar", "apr", "maj", "jun", "jul", "aug", "sep", "okt", "nov", "dec"]),
    ("sv", ["jan", "feb", "mar", "apr", "maj", "jun", "jul", "aug", "sep", "okt", "nov", "dec"]),
    ("no", ["jan", "feb", "mar", "apr", "mai", "jun", "jul", "aug", "sep", "okt", "nov", "des"]),
    ("nl", ["jan", "feb", "mrt", "apr", "mei", "jun", "jul", "aug", "sep", "okt", "nov", "dec"]),
    ("ro", ["Ian", "Feb", "Mar", "Apr", "Mai", "Iun", "Iul", "Aug", "Sep", "Oct", "Nov", "Dec"]),
    ("sq", ["Jan", "Shk", "Mar", "Pri", "Maj", "Qer", "Kor", "Gsh", "Sht", "Tet", "Nën", "Dhj"]),
    ("sh", ["jan", "feb", "mar", "apr", "maj", "jun", "jul", "avg", "sep", "okt", "nov", "dec"]),
    ("sk", ["jan", "feb", "mar", "apr", "máj", "jún", "júl", "aug", "sep", "okt", "nov", "dec"]),
    ("sl", ["jan", "feb", "mar", "apr", "maj", "jun", "jul", "avg", "sep", "okt", "nov", "dec"]),
    ("fr", ["jan", "fév", "mar", "avr", "mai", "jun", "jui", "aoû", "sep", "oct", "nov", "déc"]),
];

/// Month-name table used by `MMM` pattern fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthNames {
    names: [String; 12],
}

impl MonthNames {
    pub fn english() -> Self {
        Self::from_table(&ENGLISH)
    }

    pub fn for_language(code: &str) -> Self {
        let code = code.to_ascii_lowercase();
        match LANGUAGES.iter().find(|(lang, _)| *lang == code) {
            Some((_, table)) => Self::from_table(table),
            None => {
                tracing::debug!(language = %code, "no month table for language, using English");
                Self::english()
            }
        }
    }

    /// Parse `jan|feb|...|dec`. Exactly twelve tokens are required.
    pub fn from_pipe_list(list: &str) -> Result<Self, ConfigError> {
        let tokens: Vec<&str> = list.split('|').filter(|t| !t.is_empty()).collect();
        let names: [String; 12] = tokens
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .try_into()
            .map_err(|_| ConfigError::MonthNames(tokens.len()))?;
        Ok(Self { names })
    }

    pub fn name(&self, month: u32) -> Option<&str> {
        let index = usize::try_from(month).ok()?.checked_sub(1)?;
        self.names.get(index).map(String::as_str)
    }

    /// Longest case-insensitive month name at the start of `text`.
    ///
    /// Returns the month number (1-12) and the number of bytes consumed.
    pub fn match_prefix(&self, text: &str) -> Option<(u32, usize)> {
        self.names
            .iter()
            .zip(1u32..)
            .filter_map(|(name, month)| prefix_len_ignore_case(text, name).map(|len| (month, len)))
            .max_by_key(|&(_, len)| len)
    }

    fn from_table(table: &[&str; 12]) -> Self {
        Self {
            names: table.map(str::to_string),
        }
    }
}

impl Default for MonthNames {
    fn default() -> Self {
        Self::english()
    }
}

fn prefix_len_ignore_case(text: &str, name: &str) -> Option<usize> {
    if name.is_empty() {
        return None;
    }
    let mut consumed = 0;
    let mut text_chars = text.chars();
    for expected in name.chars() {
        let actual = text_chars.next()?;
        if !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
        consumed += actual.len_utf8();
    }
    Some(consumed)
}
