// Edit rate: nominal frames per second as a rational number

use crate::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Edit rate of a track file, e.g. 24/1 or 48000/1001
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct EditRate {
    pub numerator: i32,
    pub denominator: i32,
}

impl EditRate {
    /// 24 frames per second
    pub const FPS_24: EditRate = EditRate {
        numerator: 24,
        denominator: 1,
    };

    /// Create a validated edit rate
    pub fn new(numerator: i32, denominator: i32) -> Result<Self> {
        let rate = EditRate {
            numerator,
            denominator,
        };
        rate.validate()?;
        Ok(rate)
    }

    /// Both terms must be strictly positive
    pub fn validate(&self) -> Result<()> {
        if self.denominator <= 0 {
            return Err(Error::InvalidEditRate(format!(
                "{self}: denominator must be positive"
            )));
        }
        if self.numerator <= 0 {
            return Err(Error::InvalidEditRate(format!(
                "{self}: numerator must be positive"
            )));
        }
        Ok(())
    }

    /// Edit units per second
    pub fn as_f64(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }
}

impl Default for EditRate {
    fn default() -> Self {
        EditRate::FPS_24
    }
}

impl fmt::Display for EditRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Accepts `<numerator>/<denominator>` or a bare `<numerator>` (denominator 1)
impl FromStr for EditRate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split('/').collect();
        if parts.len() > 2 {
            return Err(Error::InvalidEditRate(format!(
                "{s}: expected <numerator>/<denominator>"
            )));
        }

        let parse_term = |term: &str| {
            term.trim()
                .parse::<i32>()
                .map_err(|e| Error::InvalidEditRate(format!("{s}: {e}")))
        };

        let numerator = parse_term(parts[0])?;
        let denominator = match parts.get(1) {
            Some(term) => parse_term(term)?,
            None => 1,
        };

        EditRate::new(numerator, denominator)
    }
}
