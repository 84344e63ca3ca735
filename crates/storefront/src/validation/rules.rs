//! Sanitize, format and validate rules for every checkout input.

use std::sync::LazyLock;

use greenmarket_core::Email;
use regex::Regex;

static LETTERS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]+$").expect("Invalid regex"));

static CARD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{16}$").expect("Invalid regex"));

static EXPIRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0[1-9]|1[0-2])/\d{2}$").expect("Invalid regex"));

static CVC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{3}$").expect("Invalid regex"));

static FIVE_DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5}$").expect("Invalid regex"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,10}$").expect("Invalid regex"));

/// What to keep from a keystroke.
#[derive(Debug, Clone, Copy)]
enum Filter {
    None,
    Digits(usize),
    Letters,
}

/// One input on the address or payment form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldRule {
    Country,
    Street,
    City,
    PostalCode,
    Phone,
    Email,
    FirstName,
    LastName,
    CardNumber,
    ExpirationDate,
    Cvc,
    Zip,
}

/// Result of running a rule over one keystroke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOutcome {
    /// Sanitized and formatted value to store and display.
    pub value: String,
    /// Message for the field's error key, `None` when valid.
    pub error: Option<&'static str>,
}

impl FieldRule {
    const fn filter(self) -> Filter {
        match self {
            Self::Country | Self::Street | Self::City | Self::Email => Filter::None,
            Self::FirstName | Self::LastName => Filter::Letters,
            Self::PostalCode | Self::Zip => Filter::Digits(5),
            Self::Phone => Filter::Digits(10),
            Self::CardNumber => Filter::Digits(16),
            Self::ExpirationDate => Filter::Digits(4),
            Self::Cvc => Filter::Digits(3),
        }
    }

    /// Message shown while the field is invalid.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Country => "Country is required",
            Self::Street => "Street is required",
            Self::City => "City is required",
            Self::PostalCode => "Postal code must be exactly 5 digits",
            Self::Phone => "Phone number must contain 1 to 10 digits",
            Self::Email => "Please enter a valid email address",
            Self::FirstName => "First Name can only contain letters",
            Self::LastName => "Last Name can only contain letters",
            Self::CardNumber => "Card Number must be exactly 16 digits",
            Self::ExpirationDate => "Expiration Date must follow the MM/YY format",
            Self::Cvc => "CVC must be exactly 3 digits.",
            Self::Zip => "ZIP code must be exactly 5 digits.",
        }
    }

    /// Strip characters the field never accepts and cap its length.
    ///
    /// Formatting characters (card spaces, the expiry slash) are stripped
    /// too, so `sanitize` followed by [`FieldRule::format`] is idempotent.
    #[must_use]
    pub fn sanitize(self, raw: &str) -> String {
        match self.filter() {
            Filter::None => raw.to_string(),
            Filter::Letters => raw.chars().filter(char::is_ascii_alphabetic).collect(),
            Filter::Digits(max) => raw.chars().filter(char::is_ascii_digit).take(max).collect(),
        }
    }

    /// Display formatting over an already sanitized value.
    ///
    /// ```
    /// use greenmarket_storefront::validation::FieldRule;
    ///
    /// assert_eq!(FieldRule::CardNumber.format("4111111111111111"), "4111 1111 1111 1111");
    /// assert_eq!(FieldRule::ExpirationDate.format("0125"), "01/25");
    /// assert_eq!(FieldRule::ExpirationDate.format("01"), "01");
    /// ```
    #[must_use]
    pub fn format(self, sanitized: &str) -> String {
        match self {
            Self::CardNumber => group_in_fours(sanitized),
            Self::ExpirationDate => insert_expiry_slash(sanitized),
            _ => sanitized.to_string(),
        }
    }

    /// Check a formatted value against the field's acceptance pattern.
    ///
    /// # Errors
    ///
    /// Returns the field's [`FieldRule::message`] when the value is invalid.
    pub fn check(self, value: &str) -> Result<(), &'static str> {
        let valid = match self {
            Self::Country | Self::Street | Self::City => !value.trim().is_empty(),
            Self::PostalCode | Self::Zip => FIVE_DIGITS_RE.is_match(value),
            Self::Phone => PHONE_RE.is_match(value),
            Self::Email => Email::parse(value).is_ok(),
            Self::FirstName | Self::LastName => LETTERS_RE.is_match(value),
            Self::CardNumber => CARD_RE.is_match(&value.replace(' ', "")),
            Self::ExpirationDate => EXPIRY_RE.is_match(value),
            Self::Cvc => CVC_RE.is_match(value),
        };
        if valid { Ok(()) } else { Err(self.message()) }
    }

    /// Run one keystroke through sanitize, format and check.
    #[must_use]
    pub fn apply(self, raw: &str) -> FieldOutcome {
        let value = self.format(&self.sanitize(raw));
        let error = self.check(&value).err();
        FieldOutcome { value, error }
    }
}

fn group_in_fours(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 4);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && i % 4 == 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

fn insert_expiry_slash(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + 1);
    for (i, c) in digits.chars().enumerate() {
        // Slash only appears once a third digit exists.
        if i == 2 {
            out.push('/');
        }
        out.push(c);
    }
    out
}
