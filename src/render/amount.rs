//! Signed big-number amounts carried in `{"type":"amount"}` envelopes.

use serde_json::Value;

/// An amount read from a JSON value, with the sign character it was written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Amount {
    pub value: u128,
    pub sign: Option<char>,
}

impl Amount {
    /// Read an amount from a number or a decimal string with an optional
    /// leading `-`/`+`. The digits must run to the end of the string.
    pub fn read(v: &Value) -> Option<Self> {
        match v {
            Value::Number(n) => n.as_u64().map(|x| Amount {
                value: u128::from(x),
                sign: None,
            }),
            Value::String(s) => {
                let (sign, digits) = match s.chars().next() {
                    Some(c @ ('-' | '+')) => (Some(c), &s[1..]),
                    _ => (None, s.as_str()),
                };
                scan_decimal(digits).map(|value| Amount { value, sign })
            }
            _ => None,
        }
    }

    /// Color used by the html renderer.
    pub fn color(&self) -> &'static str {
        match self.sign {
            Some('-') => "red",
            Some('+') => "green",
            _ => "blue",
        }
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(c) = self.sign {
            write!(f, "{}", c)?;
        }
        write!(f, "{}", self.value)
    }
}

// An empty digit run scans as zero.
fn scan_decimal(s: &str) -> Option<u128> {
    s.bytes().try_fold(0u128, |acc, b| {
        if !b.is_ascii_digit() {
            return None;
        }
        acc.checked_mul(10)?.checked_add(u128::from(b - b'0'))
    })
}
