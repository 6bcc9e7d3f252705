//! Tenor (period) type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// A period of time expressed in months and days.
///
/// Years are stored as twelve months and weeks as seven days, so `1Y` and
/// `12M` compare equal.
///
/// Tenors serialize as their market code (`"3M"`, `"1Y"`, `"2W"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Tenor {
    months: i32,
    days: i32,
}

impl Tenor {
    /// The zero-length tenor.
    pub const ZERO: Tenor = Tenor { months: 0, days: 0 };

    /// A tenor of whole years.
    #[must_use]
    pub const fn years(years: i32) -> Self {
        Self {
            months: years * 12,
            days: 0,
        }
    }

    /// A tenor of whole months.
    #[must_use]
    pub const fn months(months: i32) -> Self {
        Self { months, days: 0 }
    }

    /// A tenor of whole weeks.
    #[must_use]
    pub const fn weeks(weeks: i32) -> Self {
        Self {
            months: 0,
            days: weeks * 7,
        }
    }

    /// A tenor of calendar days.
    #[must_use]
    pub const fn days(days: i32) -> Self {
        Self { months: 0, days }
    }

    /// Month component.
    #[must_use]
    pub const fn total_months(&self) -> i32 {
        self.months
    }

    /// Day component.
    #[must_use]
    pub const fn day_part(&self) -> i32 {
        self.days
    }

    /// Returns true if both components are zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.months == 0 && self.days == 0
    }

    /// Multiplies the tenor by an integer count.
    #[must_use]
    pub const fn times(&self, count: i32) -> Self {
        Self {
            months: self.months * count,
            days: self.days * count,
        }
    }

    /// Approximate length in years, used only for ordering and sizing.
    #[must_use]
    pub fn approx_years(&self) -> f64 {
        f64::from(self.months) / 12.0 + f64::from(self.days) / 365.0
    }
}

impl fmt::Display for Tenor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0D");
        }
        if self.months != 0 {
            if self.months % 12 == 0 {
                write!(f, "{}Y", self.months / 12)?;
            } else {
                write!(f, "{}M", self.months)?;
            }
        }
        if self.days != 0 {
            if self.days % 7 == 0 {
                write!(f, "{}W", self.days / 7)?;
            } else {
                write!(f, "{}D", self.days)?;
            }
        }
        Ok(())
    }
}

impl FromStr for Tenor {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_uppercase();
        let code = code.strip_prefix('P').unwrap_or(&code);
        if code.is_empty() {
            return Err(CoreError::invalid_tenor("empty tenor"));
        }

        let mut tenor = Tenor::ZERO;
        let mut digits = String::new();
        for c in code.chars() {
            if c.is_ascii_digit() || (c == '-' && digits.is_empty()) {
                digits.push(c);
                continue;
            }
            let amount: i32 = digits
                .parse()
                .map_err(|_| CoreError::invalid_tenor(format!("missing amount in {s}")))?;
            digits.clear();
            tenor = match c {
                'Y' => Tenor {
                    months: tenor.months + amount * 12,
                    ..tenor
                },
                'M' => Tenor {
                    months: tenor.months + amount,
                    ..tenor
                },
                'W' => Tenor {
                    days: tenor.days + amount * 7,
                    ..tenor
                },
                'D' => Tenor {
                    days: tenor.days + amount,
                    ..tenor
                },
                other => {
                    return Err(CoreError::invalid_tenor(format!(
                        "unknown unit '{other}' in {s}"
                    )))
                }
            };
        }
        if !digits.is_empty() {
            return Err(CoreError::invalid_tenor(format!("missing unit in {s}")));
        }
        Ok(tenor)
    }
}

impl TryFrom<String> for Tenor {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Tenor> for String {
    fn from(tenor: Tenor) -> Self {
        tenor.to_string()
    }
}
