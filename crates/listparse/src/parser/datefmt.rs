//! Date patterns in the `SimpleDateFormat` letter syntax used by listing configs.
//!
//! Supported letters: `y M d H k h K m s S a`. `MMM` (three or more) is a
//! month name looked up in a [`MonthNames`] table. Text between single
//! quotes is literal and `''` is a quote. Parsing is strict: the whole input
//! must be consumed and every field must be in range.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::months::MonthNames;
use crate::conf::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Year,
    Month,
    Day,
    /// `H`
    Hour0To23,
    /// `k`
    Hour1To24,
    /// `h`
    Hour1To12,
    /// `K`
    Hour0To11,
    Minute,
    Second,
    Millis,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Number { field: Field, width: usize },
    MonthName,
    Meridiem,
    Literal(String),
}

impl Token {
    fn is_numeric(&self) -> bool {
        matches!(self, Token::Number { .. })
    }
}

/// A compiled date pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePattern {
    source: String,
    tokens: Vec<Token>,
}

impl DatePattern {
    pub fn compile(pattern: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            reason,
        };

        let mut tokens = Vec::new();
        let mut chars = pattern.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\'' {
                if chars.peek() == Some(&'\'') {
                    chars.next();
                    push_literal(&mut tokens, "'");
                    continue;
                }
                let mut text = String::new();
                let mut closed = false;
                while let Some(q) = chars.next() {
                    if q != '\'' {
                        text.push(q);
                    } else if chars.peek() == Some(&'\'') {
                        chars.next();
                        text.push('\'');
                    } else {
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    return Err(invalid("unterminated quote".to_string()));
                }
                push_literal(&mut tokens, &text);
            } else if c.is_ascii_alphabetic() {
                let mut width = 1;
                while chars.peek() == Some(&c) {
                    chars.next();
                    width += 1;
                }
                let token = letter_token(c, width)
                    .ok_or_else(|| invalid(format!("unsupported pattern letter '{c}'")))?;
                tokens.push(token);
            } else {
                push_literal(&mut tokens, c.encode_utf8(&mut [0; 4]));
            }
        }

        if tokens.is_empty() {
            return Err(invalid("pattern is empty".to_string()));
        }

        Ok(Self {
            source: pattern.to_string(),
            tokens,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn has_year(&self) -> bool {
        self.tokens
            .iter()
            .any(|t| matches!(t, Token::Number { field: Field::Year, .. }))
    }

    /// This pattern followed by `" yyyy"`.
    pub fn with_year_suffix(&self) -> Self {
        let mut tokens = self.tokens.clone();
        tokens.push(Token::Literal(" ".to_string()));
        tokens.push(Token::Number {
            field: Field::Year,
            width: 4,
        });
        Self {
            source: format!("{} yyyy", self.source),
            tokens,
        }
    }

    /// Parse `text` completely. Missing fields default to 1970-01-01 00:00:00.000.
    ///
    /// `now_year` anchors two-digit `yy` years into the window
    /// `[now_year - 80, now_year + 20)`.
    pub fn parse(&self, text: &str, months: &MonthNames, now_year: i32) -> Option<NaiveDateTime> {
        let mut fields = ParsedFields::default();
        let mut pos = 0;

        for (index, token) in self.tokens.iter().enumerate() {
            pos = match token {
                Token::Literal(literal) => match_literal(text, pos, literal)?,
                Token::MonthName => {
                    let start = skip_whitespace(text, pos);
                    let (month, len) = months.match_prefix(&text[start..])?;
                    fields.month = Some(month);
                    start + len
                }
                Token::Meridiem => {
                    let start = skip_whitespace(text, pos);
                    let marker = text.get(start..start + 2)?;
                    fields.pm = Some(if marker.eq_ignore_ascii_case("PM") {
                        true
                    } else if marker.eq_ignore_ascii_case("AM") {
                        false
                    } else {
                        return None;
                    });
                    start + 2
                }
                Token::Number { field, width } => {
                    let start = skip_whitespace(text, pos);
                    let available = text[start..].bytes().take_while(u8::is_ascii_digit).count();
                    // Adjacent numeric fields (yyyyMMdd) split by width.
                    let abutting = self.tokens.get(index + 1).is_some_and(Token::is_numeric);
                    let take = if abutting { *width } else { available };
                    if take == 0 || take > available {
                        return None;
                    }
                    let value: u32 = text[start..start + take].parse().ok()?;
                    fields.set(*field, *width, take, value);
                    start + take
                }
            };
        }

        if pos != text.len() {
            return None;
        }
        fields.resolve(now_year)
    }
}

impl std::fmt::Display for DatePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

#[derive(Debug, Clone, Copy)]
struct YearField {
    value: u32,
    width: usize,
    digits: usize,
}

#[derive(Debug, Default)]
struct ParsedFields {
    year: Option<YearField>,
    month: Option<u32>,
    day: Option<u32>,
    hour: Option<(Field, u32)>,
    minute: Option<u32>,
    second: Option<u32>,
    millis: Option<u32>,
    pm: Option<bool>,
}

impl ParsedFields {
    fn set(&mut self, field: Field, width: usize, digits: usize, value: u32) {
        match field {
            Field::Year => self.year = Some(YearField { value, width, digits }),
            Field::Month => self.month = Some(value),
            Field::Day => self.day = Some(value),
            Field::Minute => self.minute = Some(value),
            Field::Second => self.second = Some(value),
            Field::Millis => self.millis = Some(value),
            hour => self.hour = Some((hour, value)),
        }
    }

    fn resolve(self, now_year: i32) -> Option<NaiveDateTime> {
        let year = match self.year {
            None => 1970,
            Some(y) if y.width == 2 && y.digits == 2 => expand_two_digit_year(y.value, now_year),
            Some(y) => i32::try_from(y.value).ok()?,
        };
        let date = NaiveDate::from_ymd_opt(year, self.month.unwrap_or(1), self.day.unwrap_or(1))?;

        let pm_offset = if self.pm == Some(true) { 12 } else { 0 };
        let hour = match self.hour {
            None => 0,
            Some((Field::Hour1To24, 24)) => 0,
            Some((Field::Hour1To24, h)) if h < 24 => h,
            Some((Field::Hour1To12, 12)) => pm_offset,
            Some((Field::Hour1To12 | Field::Hour0To11, h)) if h < 12 => h + pm_offset,
            Some((Field::Hour0To23, h)) if h < 24 => h,
            Some(_) => return None,
        };

        let time = NaiveTime::from_hms_milli_opt(
            hour,
            self.minute.unwrap_or(0),
            self.second.unwrap_or(0),
            self.millis.unwrap_or(0),
        )?;
        Some(NaiveDateTime::new(date, time))
    }
}

fn expand_two_digit_year(two_digits: u32, now_year: i32) -> i32 {
    let window_start = now_year - 80;
    // two_digits < 100, guaranteed by the two-digit check
    let value = window_start.div_euclid(100) * 100 + two_digits as i32;
    if value < window_start {
        value + 100
    } else {
        value
    }
}

fn letter_token(letter: char, width: usize) -> Option<Token> {
    let field = match letter {
        'M' if width >= 3 => return Some(Token::MonthName),
        'a' => return Some(Token::Meridiem),
        'y' => Field::Year,
        'M' => Field::Month,
        'd' => Field::Day,
        'H' => Field::Hour0To23,
        'k' => Field::Hour1To24,
        'h' => Field::Hour1To12,
        'K' => Field::Hour0To11,
        'm' => Field::Minute,
        's' => Field::Second,
        'S' => Field::Millis,
        _ => return None,
    };
    Some(Token::Number { field, width })
}

fn push_literal(tokens: &mut Vec<Token>, text: &str) {
    if let Some(Token::Literal(existing)) = tokens.last_mut() {
        existing.push_str(text);
    } else {
        tokens.push(Token::Literal(text.to_string()));
    }
}

fn skip_whitespace(text: &str, pos: usize) -> usize {
    pos + text[pos..].len() - text[pos..].trim_start_matches([' ', '\t']).len()
}

/// Whitespace in a literal matches one or more whitespace characters.
fn match_literal(text: &str, mut pos: usize, literal: &str) -> Option<usize> {
    let mut expected = literal.chars().peekable();
    while let Some(p) = expected.next() {
        if p.is_whitespace() {
            while expected.peek().is_some_and(|c| c.is_whitespace()) {
                expected.next();
            }
            let next = skip_whitespace(text, pos);
            if next == pos {
                return None;
            }
            pos = next;
        } else {
            let actual = text[pos..].chars().next()?;
            if actual != p {
                return None;
            }
            pos += actual.len_utf8();
        }
    }
    Some(pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn parse(pattern: &str, text: &str) -> Option<NaiveDateTime> {
        DatePattern::compile(pattern)
            .unwrap()
            .parse(text, &MonthNames::english(), 2024)
    }

    #[test]
    fn test_unix_default_format() {
        let dt = parse("MMM d yyyy", "Jan 15 2020").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2020, 1, 15));
    }

    #[test]
    fn test_extra_spaces_between_fields() {
        let dt = parse("MMM d yyyy", "Nov  9  2001").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2001, 11, 9));
    }

    #[test]
    fn test_recent_format_defaults_to_1970() {
        let dt = parse("MMM d HH:mm", "Mar 3 14:05").unwrap();
        assert_eq!(dt.year(), 1970);
        assert_eq!((dt.hour(), dt.minute()), (14, 5));
    }

    #[test]
    fn test_recent_format_rejects_feb_29_without_year() {
        assert!(parse("MMM d HH:mm", "Feb 29 12:00").is_none());
        let dt = DatePattern::compile("MMM d HH:mm")
            .unwrap()
            .with_year_suffix()
            .parse("Feb 29 12:00 2024", &MonthNames::english(), 2024)
            .unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 2, 29));
    }

    #[test]
    fn test_partial_match_is_rejected() {
        assert!(parse("MMM d yyyy", "Jan 15 2020 junk").is_none());
        assert!(parse("MMM d HH:mm", "Jan 15 2020").is_none());
    }

    #[test]
    fn test_twelve_hour_clock() {
        let dt = parse("MM-dd-yy hh:mma", "11-09-01 12:30PM").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2001, 11, 9));
        assert_eq!((dt.hour(), dt.minute()), (12, 30));

        let dt = parse("MM-dd-yy hh:mma", "11-09-01 12:30AM").unwrap();
        assert_eq!(dt.hour(), 0);

        let dt = parse("MM-dd-yy hh:mma", "01-02-99 07:15pm").unwrap();
        assert_eq!((dt.year(), dt.hour()), (1999, 19));

        assert!(parse("MM-dd-yy hh:mma", "11-09-01 13:30PM").is_none());
    }

    #[test]
    fn test_one_to_twenty_four_clock() {
        let dt = parse("MM-dd-yy kk:mm", "11-09-01 24:10").unwrap();
        assert_eq!(dt.hour(), 0);
        let dt = parse("MM-dd-yy kk:mm", "11-09-01 18:30").unwrap();
        assert_eq!(dt.hour(), 18);
    }

    #[test]
    fn test_two_digit_year_window() {
        // window for 2024 is [1944, 2044)
        assert_eq!(parse("yy/MM/dd", "43/01/01").unwrap().year(), 2043);
        assert_eq!(parse("yy/MM/dd", "44/01/01").unwrap().year(), 1944);
        assert_eq!(parse("yy/MM/dd", "99/12/31").unwrap().year(), 1999);
    }

    #[test]
    fn test_abutting_fields_use_width() {
        let dt = parse("yyyyMMddHHmmss", "20100313224553").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2010, 3, 13));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (22, 45, 53));

        let dt = parse("yyyyMMddHHmmss.SSS", "20100313224553.250").unwrap();
        assert_eq!(dt.nanosecond(), 250_000_000);
    }

    #[test]
    fn test_vms_format_uppercase_month() {
        let dt = parse("d-MMM-yyyy HH:mm:ss", "9-NOV-2001 12:30:24").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2001, 11, 9));
        assert_eq!(dt.second(), 24);
    }

    #[test]
    fn test_out_of_range_fields() {
        assert!(parse("yyyy-MM-dd HH:mm", "2001-13-09 20:06").is_none());
        assert!(parse("yyyy-MM-dd HH:mm", "2001-02-30 20:06").is_none());
        assert!(parse("yyyy-MM-dd HH:mm", "2001-11-09 24:00").is_none());
    }

    #[test]
    fn test_quoted_literals() {
        let dt = parse("yyyy'T'HH'h'", "2020T07h").unwrap();
        assert_eq!((dt.year(), dt.hour()), (2020, 7));
    }

    #[test]
    fn test_compile_errors() {
        assert!(DatePattern::compile("EEE").is_err());
        assert!(DatePattern::compile("yyyy 'open").is_err());
        assert!(DatePattern::compile("").is_err());
    }

    #[test]
    fn test_has_year() {
        assert!(DatePattern::compile("MMM d yyyy").unwrap().has_year());
        assert!(!DatePattern::compile("MMM d HH:mm").unwrap().has_year());
        assert!(DatePattern::compile("MMM d HH:mm").unwrap().with_year_suffix().has_year());
    }
}
