//! Payment frequency.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Tenor;

/// Payment or reset frequency of a swap leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Frequency {
    /// Every 12 months.
    Annual,
    /// Every 6 months.
    #[default]
    SemiAnnual,
    /// Every 3 months.
    Quarterly,
    /// Every month.
    Monthly,
}

impl Frequency {
    /// Length of one accrual period.
    #[must_use]
    pub fn tenor(&self) -> Tenor {
        let months = match self {
            Frequency::Annual => 12,
            Frequency::SemiAnnual => 6,
            Frequency::Quarterly => 3,
            Frequency::Monthly => 1,
        };
        Tenor::months(months)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Frequency::Annual => "1Y",
            Frequency::SemiAnnual => "6M",
            Frequency::Quarterly => "3M",
            Frequency::Monthly => "1M",
        })
    }
}
