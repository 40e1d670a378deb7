//! Validation for player-supplied names and free text (school names,
//! blackboard messages, graffiti).

use std::collections::HashSet;

/// Text validation errors with helpful messages
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    #[error("too short (minimum {min} characters)")]
    TooShort { min: usize },

    #[error("too long (maximum {max} characters)")]
    TooLong { max: usize },

    #[error("cannot start or end with whitespace")]
    InvalidWhitespace,

    #[error("contains invalid characters: {chars}")]
    InvalidCharacters { chars: String },

    #[error("that name is reserved")]
    Reserved,
}

/// Length and character rules for one kind of text.
#[derive(Debug, Clone)]
pub struct TextRules {
    pub min_length: usize,
    pub max_length: usize,
    pub allow_special_chars: bool,
    pub allow_newlines: bool,
    pub check_reserved: bool,
}

impl TextRules {
    pub fn player_name() -> Self {
        TextRules {
            min_length: 2,
            max_length: 24,
            allow_special_chars: false,
            allow_newlines: false,
            check_reserved: true,
        }
    }

    pub fn school_name() -> Self {
        TextRules {
            min_length: 3,
            max_length: 40,
            allow_special_chars: true,
            allow_newlines: false,
            check_reserved: true,
        }
    }

    /// Blackboard posts and graffiti.
    pub fn message() -> Self {
        TextRules {
            min_length: 1,
            max_length: 120,
            allow_special_chars: true,
            allow_newlines: true,
            check_reserved: false,
        }
    }
}

fn reserved_names() -> HashSet<&'static str> {
    [
        "admin", "administrator", "system", "moderator", "root", "guest", "anonymous",
        "principal", "teacher", "janitor", "null", "undefined",
    ]
    .iter()
    .copied()
    .collect()
}

/// Validate `text` against `rules`, returning the accepted string.
pub fn validate_text(text: &str, rules: &TextRules) -> Result<String, TextError> {
    let trimmed = text.trim();
    let len = trimmed.chars().count();

    if len < rules.min_length {
        return Err(TextError::TooShort { min: rules.min_length });
    }
    if len > rules.max_length {
        return Err(TextError::TooLong { max: rules.max_length });
    }
    if trimmed != text {
        return Err(TextError::InvalidWhitespace);
    }
    if rules.check_reserved && reserved_names().contains(trimmed.to_lowercase().as_str()) {
        return Err(TextError::Reserved);
    }

    let mut invalid: Vec<char> = Vec::new();
    for ch in trimmed.chars() {
        let ok = if ch == '\n' {
            rules.allow_newlines
        } else if ch.is_control() {
            false
        } else if ch.is_alphanumeric() || ch == ' ' || ch == '_' || ch == '-' || ch == '.' || ch == '\'' {
            true
        } else {
            rules.allow_special_chars
        };
        if !ok && !invalid.contains(&ch) {
            invalid.push(ch);
        }
    }
    if !invalid.is_empty() {
        let chars = invalid
            .iter()
            .map(|c| {
                if c.is_control() {
                    format!("\\u{{{:04x}}}", *c as u32)
                } else {
                    c.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        return Err(TextError::InvalidCharacters { chars });
    }

    Ok(trimmed.to_string())
}

pub fn validate_player_name(name: &str) -> Result<String, TextError> {
    validate_text(name, &TextRules::player_name())
}

pub fn validate_school_name(name: &str) -> Result<String, TextError> {
    validate_text(name, &TextRules::school_name())
}

pub fn validate_message(text: &str) -> Result<String, TextError> {
    validate_text(text, &TextRules::message())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_names() {
        assert_eq!(validate_player_name("Pat"), Ok("Pat".to_string()));
        assert_eq!(validate_player_name("Zoë O'Neil"), Ok("Zoë O'Neil".to_string()));
        assert_eq!(validate_player_name("p"), Err(TextError::TooShort { min: 2 }));
        assert_eq!(validate_player_name(" Pat"), Err(TextError::InvalidWhitespace));
        assert_eq!(validate_player_name("Admin"), Err(TextError::Reserved));
        assert!(matches!(
            validate_player_name("pat<script>"),
            Err(TextError::InvalidCharacters { .. })
        ));
    }

    #[test]
    fn messages_allow_newlines_but_not_control() {
        assert!(validate_message("homework is\nbad!").is_ok());
        assert!(validate_message("bell\u{7}").is_err());
        assert_eq!(validate_message(""), Err(TextError::TooShort { min: 1 }));
        let long = "x".repeat(121);
        assert_eq!(validate_message(&long), Err(TextError::TooLong { max: 120 }));
    }

    #[test]
    fn school_names() {
        assert!(validate_school_name("St. Custard's #2").is_ok());
        assert!(validate_school_name("ab").is_err());
    }
}
