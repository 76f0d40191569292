//! Bind parameter placeholders for bookkeeping statements.
//!
//! Different databases spell positional parameters differently: PostgreSQL
//! wants `$1, $2, ...` while MySQL and SQLite take a bare `?`.

use std::fmt;
use std::str::FromStr;

use crate::error::MigrateError;

/// Placeholder syntax used when building bookkeeping statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamType {
    /// `?` for every parameter (MySQL, SQLite).
    QuestionMark,
    /// `$1`, `$2`, ... (PostgreSQL).
    #[default]
    DollarSign,
}

impl ParamType {
    /// Fresh placeholder generator for one statement.
    ///
    /// Numbering restarts with every call, so never share a generator
    /// between two statements.
    pub fn placeholders(self) -> Placeholders {
        Placeholders {
            param_type: self,
            issued: 0,
        }
    }

    /// Guess the placeholder style from a connection URL scheme.
    pub fn for_url(url: &str) -> Option<Self> {
        let scheme = url.split_once(':').map(|(scheme, _)| scheme)?;
        match scheme {
            "postgres" | "postgresql" => Some(ParamType::DollarSign),
            "mysql" | "mariadb" | "sqlite" => Some(ParamType::QuestionMark),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ParamType::QuestionMark => "question-mark",
            ParamType::DollarSign => "dollar-sign",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamType {
    type Err = MigrateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "question-mark" | "question_mark" | "?" => Ok(ParamType::QuestionMark),
            "dollar-sign" | "dollar_sign" | "$" => Ok(ParamType::DollarSign),
            _ => Err(MigrateError::UnknownParamType {
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<i64> for ParamType {
    type Error = MigrateError;

    /// Numeric codes: `0` is question-mark, `1` is dollar-sign.
    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(ParamType::QuestionMark),
            1 => Ok(ParamType::DollarSign),
            _ => Err(MigrateError::UnknownParamType {
                value: code.to_string(),
            }),
        }
    }
}

/// Yields successive placeholders for a single statement.
#[derive(Debug, Clone)]
pub struct Placeholders {
    param_type: ParamType,
    issued: usize,
}

impl Placeholders {
    /// Next placeholder token.
    pub fn next_placeholder(&mut self) -> String {
        self.issued += 1;
        match self.param_type {
            ParamType::QuestionMark => "?".to_string(),
            ParamType::DollarSign => format!("${}", self.issued),
        }
    }
}

impl Iterator for Placeholders {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        Some(self.next_placeholder())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_mark_repeats() {
        let mut p = ParamType::QuestionMark.placeholders();
        for _ in 0..100 {
            assert_eq!(p.next_placeholder(), "?");
        }
    }

    #[test]
    fn test_dollar_sign_counts_up() {
        let tokens: Vec<String> = ParamType::DollarSign.placeholders().take(100).collect();
        for (i, token) in tokens.iter().enumerate() {
            assert_eq!(token, &format!("${}", i + 1));
        }
    }

    #[test]
    fn test_generators_do_not_share_numbering() {
        let mut first = ParamType::DollarSign.placeholders();
        first.next_placeholder();
        first.next_placeholder();

        let mut second = ParamType::DollarSign.placeholders();
        assert_eq!(second.next_placeholder(), "$1");
    }

    #[test]
    fn test_parse_param_type() {
        assert_eq!("dollar-sign".parse::<ParamType>().unwrap(), ParamType::DollarSign);
        assert_eq!("?".parse::<ParamType>().unwrap(), ParamType::QuestionMark);
        assert_eq!(" Question_Mark ".parse::<ParamType>().unwrap(), ParamType::QuestionMark);
    }

    #[test]
    fn test_unknown_param_type() {
        let err = "colon".parse::<ParamType>().unwrap_err();
        assert!(matches!(err, MigrateError::UnknownParamType { value } if value == "colon"));

        let err = ParamType::try_from(9999).unwrap_err();
        assert!(matches!(err, MigrateError::UnknownParamType { value } if value == "9999"));
    }

    #[test]
    fn test_for_url() {
        assert_eq!(ParamType::for_url("postgres://u@h/db"), Some(ParamType::DollarSign));
        assert_eq!(ParamType::for_url("sqlite://app.db"), Some(ParamType::QuestionMark));
        assert_eq!(ParamType::for_url("mysql://root@localhost/app"), Some(ParamType::QuestionMark));
        assert_eq!(ParamType::for_url("redis://localhost"), None);
        assert_eq!(ParamType::for_url("no-scheme"), None);
    }
}
