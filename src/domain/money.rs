use std::fmt;

/// Money is represented as integer cents so balances never drift.
/// 1 unit = 100 cents, so 90.00 = 9000 cents.
pub type Cents = i64;

/// Largest amount or share a ledger accepts: 10 billion units.
/// Keeps every sum over a realistic ledger far from `i64` overflow.
pub const MAX_AMOUNT: Cents = 1_000_000_000_000;

/// Format cents as a human-readable amount.
/// Example: 9000 -> "90.00", -3333 -> "-33.33"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs_cents / 100, abs_cents % 100)
}

/// Parse a decimal string into cents.
/// Example: "90.00" -> 9000, "12.5" -> 1250, "100" -> 10000
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    let (negative, digits) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };

    let (units_str, decimal_str) = match digits.split_once('.') {
        Some((units, decimals)) if !decimals.contains('.') => (units, decimals),
        Some(_) => return Err(ParseCentsError::InvalidFormat),
        None => (digits, ""),
    };

    if (units_str.is_empty() && decimal_str.is_empty()) || !decimal_str.is_ascii() {
        return Err(ParseCentsError::InvalidFormat);
    }

    let units: i64 = if units_str.is_empty() {
        0
    } else {
        parse_digits(units_str)?
    };

    // Pad or truncate the fractional part to exactly two digits
    let decimal_cents: i64 = match decimal_str.len() {
        0 => 0,
        1 => parse_digits(decimal_str)? * 10,
        _ => parse_digits(&decimal_str[..2])?,
    };

    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(decimal_cents))
        .ok_or(ParseCentsError::Overflow)?;
    Ok(if negative { -cents } else { cents })
}

fn parse_digits(s: &str) -> Result<i64, ParseCentsError> {
    if !s.chars().all(|c| c.is_ascii_digit()) {
        return Err(ParseCentsError::InvalidFormat);
    }
    s.parse().map_err(|_| ParseCentsError::Overflow)
}

/// Apportion `amount` into `parts` shares that sum exactly to `amount`.
///
/// Every share gets `amount / parts` cents; the leftover cents go one each to
/// the trailing shares, so 100.00 over three yields 33.33, 33.33, 33.34.
pub fn split_evenly(amount: Cents, parts: usize) -> Vec<Cents> {
    if parts == 0 {
        return Vec::new();
    }
    let n = parts as i64;
    let base = amount / n;
    let remainder = (amount % n) as usize;
    (0..parts)
        .map(|i| if i >= parts - remainder { base + 1 } else { base })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCentsError {
    InvalidFormat,
    Overflow,
}

impl fmt::Display for ParseCentsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCentsError::InvalidFormat => write!(f, "invalid money format"),
            ParseCentsError::Overflow => write!(f, "amount is too large"),
        }
    }
}

impl std::error::Error for ParseCentsError {}
