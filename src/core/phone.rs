use crate::core::constants::PHONE_DIGITS;
use std::fmt;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PhoneError {
    #[error("Please enter your phone number")]
    Empty,
    #[error("Please enter a valid phone number")]
    Invalid,
}

/// A validated North American phone number, stored in E.164 form.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Accepts `5551234567`, `555-123-4567`, `555.123.4567`, `555 123 4567`
    /// and `(555) 123-4567` after trimming.
    pub fn parse(input: &str) -> Result<Self, PhoneError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(PhoneError::Empty);
        }
        if !matches_national_format(s) {
            return Err(PhoneError::Invalid);
        }
        Ok(Self(to_e164(s)))
    }

    /// Accepts an already-normalized `+<digits>` number (11–15 digits).
    pub fn parse_e164(input: &str) -> Result<Self, PhoneError> {
        let s = input.trim();
        let digits = s.strip_prefix('+').ok_or(PhoneError::Invalid)?;
        if (11..=15).contains(&digits.len()) && digits.bytes().all(|c| c.is_ascii_digit()) {
            Ok(Self(s.to_string()))
        } else {
            Err(PhoneError::Invalid)
        }
    }

    pub fn e164(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Digits of `input` with everything else removed.
pub fn digits_only(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Submit is enabled once exactly ten digits have been typed.
pub fn is_submittable(input: &str) -> bool {
    digits_only(input).len() == PHONE_DIGITS
}

/// `+` followed by the digits, adding the `1` country code unless the digits
/// already start with it.
pub fn to_e164(input: &str) -> String {
    let digits = digits_only(input);
    if digits.starts_with('1') {
        format!("+{}", digits)
    } else {
        format!("+1{}", digits)
    }
}

/// `\(?ddd\)?[-. ]?ddd[-. ]?dddd`, anchored at both ends.
fn matches_national_format(s: &str) -> bool {
    let b = s.as_bytes();
    let mut i = 0;
    let eat = |i: &mut usize, c: u8| {
        if b.get(*i) == Some(&c) {
            *i += 1;
        }
    };
    let digits = |i: &mut usize, n: usize| -> bool {
        for _ in 0..n {
            match b.get(*i) {
                Some(c) if c.is_ascii_digit() => *i += 1,
                _ => return false,
            }
        }
        true
    };
    let sep = |i: &mut usize| {
        if matches!(b.get(*i), Some(b'-' | b'.' | b' ')) {
            *i += 1;
        }
    };
    eat(&mut i, b'(');
    if !digits(&mut i, 3) {
        return false;
    }
    eat(&mut i, b')');
    sep(&mut i);
    if !digits(&mut i, 3) {
        return false;
    }
    sep(&mut i);
    if !digits(&mut i, 4) {
        return false;
    }
    i == b.len()
}
