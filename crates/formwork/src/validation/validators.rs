// File: src/validation/validators.rs
// Purpose: Leaf checks shared by the evaluation pass

use std::collections::HashMap;
use std::sync::Mutex;

use once_cell::sync::Lazy;
use regex::Regex;

// Email validation regex
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
});

// URL validation regex
static URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").unwrap()
});

// User-declared patterns, compiled once at schema build time
static PATTERN_CACHE: Lazy<Mutex<HashMap<String, Regex>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Validate email format
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Validate URL format
pub fn is_valid_url(url: &str) -> bool {
    URL_REGEX.is_match(url)
}

/// Compile a schema pattern into the process-wide cache. Called when the
/// schema is built, so evaluation never sees an uncompiled pattern.
pub fn compile_pattern(pattern: &str) -> Result<(), regex::Error> {
    let mut cache = PATTERN_CACHE.lock().unwrap();
    if !cache.contains_key(pattern) {
        let regex = Regex::new(pattern)?;
        cache.insert(pattern.to_string(), regex);
    }
    Ok(())
}

/// Check a value against a previously compiled pattern
pub fn matches_pattern(value: &str, pattern: &str) -> bool {
    let mut cache = PATTERN_CACHE.lock().unwrap();
    let regex = match cache.get(pattern) {
        Some(regex) => regex,
        None => {
            // Unreachable through a built schema; compile on demand anyway
            match Regex::new(pattern) {
                Ok(regex) => {
                    cache.insert(pattern.to_string(), regex);
                    cache.get(pattern).unwrap()
                }
                Err(_) => return false,
            }
        }
    };
    regex.is_match(value)
}

/// Password strength bands for the display meter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordStrength {
    Weak,
    Medium,
    Strong,
}

impl PasswordStrength {
    pub fn label(&self) -> &'static str {
        match self {
            PasswordStrength::Weak => "Weak",
            PasswordStrength::Medium => "Medium",
            PasswordStrength::Strong => "Strong",
        }
    }
}

/// Rate a password for the strength meter
pub fn password_strength(password: &str) -> PasswordStrength {
    if password.len() < 4 {
        PasswordStrength::Weak
    } else if password.len() < 8 {
        PasswordStrength::Medium
    } else {
        PasswordStrength::Strong
    }
}
