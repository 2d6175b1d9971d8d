//! EPA region table.
//!
//! See: https://www.epa.gov/aboutepa/regional-and-geographic-offices

use serde::Serialize;
use std::collections::HashSet;

use crate::error::{Error, Result};

/// One of the 10 EPA administrative regions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Region {
    /// Region number, 1 through 10
    pub number: u8,

    /// Regional office location, e.g. "Denver"
    pub office: &'static str,

    /// States/territories as 2-letter postal codes,
    /// e.g. "CO" (Colorado), "PR" (Puerto Rico), "GU" (Guam)
    pub constituents: &'static [&'static str],
}

/// Region definitions, ordered by number.
///
/// Tribal Nations are part of every region but have no postal code,
/// so they are not listed.
pub static REGIONS: [Region; 10] = [
    Region {
        number: 1,
        office: "Boston",
        constituents: &["CT", "ME", "MA", "NH", "RI", "VT"],
    },
    Region {
        number: 2,
        office: "New York City",
        constituents: &[
            "NJ", "NY", "PR", // Puerto Rico
            "VI", // US Virgin Islands
        ],
    },
    Region {
        number: 3,
        office: "Philadelphia",
        constituents: &[
            "DE", "DC", // Washington DC
            "MD", "PA", "VA", "WV",
        ],
    },
    Region {
        number: 4,
        office: "Atlanta",
        constituents: &["AL", "FL", "GA", "KY", "MS", "NC", "SC", "TN"],
    },
    Region {
        number: 5,
        office: "Chicago",
        constituents: &["IL", "IN", "MI", "MN", "OH", "WI"],
    },
    Region {
        number: 6,
        office: "Dallas",
        constituents: &["AR", "LA", "NM", "OK", "TX"],
    },
    Region {
        number: 7,
        office: "Kansas City",
        constituents: &["IA", "KS", "MO", "NE"],
    },
    Region {
        number: 8,
        office: "Denver",
        constituents: &["CO", "MT", "ND", "SD", "UT", "WY"],
    },
    Region {
        number: 9,
        office: "San Francisco",
        // Pacific islands: https://www.epa.gov/pi
        constituents: &[
            "AZ", "CA", "HI", "NV", "AS", // American Samoa
            "MP", // Northern Mariana Islands
            "GU", // Guam
            "UM", // United States Minor Outlying Islands
            "FM", // Federated States of Micronesia
            "MH", // Marshall Islands
            "PW", // Palau
        ],
    },
    Region {
        number: 10,
        office: "Seattle",
        constituents: &["AK", "ID", "OR", "WA"],
    },
];

/// Constituents that are not states, keyed to their Natural Earth `admin` name
static TERRITORY_ADMIN_NAMES: [(&str, &str); 9] = [
    ("PR", "Puerto Rico"),
    ("VI", "United States Virgin Islands"),
    ("AS", "American Samoa"),
    ("MP", "Northern Mariana Islands"),
    ("GU", "Guam"),
    ("UM", "United States Minor Outlying Islands"),
    ("FM", "Federated States of Micronesia"),
    ("MH", "Marshall Islands"),
    ("PW", "Palau"),
];

impl Region {
    /// Short label, e.g. "R8"
    pub fn label(&self) -> String {
        format!("R{}", self.number)
    }

    /// Look up a region by its number
    pub fn by_number(number: u8) -> Option<&'static Region> {
        REGIONS.iter().find(|r| r.number == number)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.constituents.contains(&code)
    }
}

/// Find the region a state/territory code belongs to
pub fn region_for(code: &str) -> Option<&'static Region> {
    REGIONS.iter().find(|r| r.contains(code))
}

/// Natural Earth `admin` name for a territory code
pub fn territory_admin_name(code: &str) -> Option<&'static str> {
    TERRITORY_ADMIN_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, admin)| *admin)
}

/// Territory code for a Natural Earth `admin` name
pub fn territory_code(admin: &str) -> Option<&'static str> {
    TERRITORY_ADMIN_NAMES
        .iter()
        .find(|(_, a)| *a == admin)
        .map(|(code, _)| *code)
}

/// Every territory code the table knows an admin name for
pub fn territory_codes() -> impl Iterator<Item = &'static str> {
    TERRITORY_ADMIN_NAMES.iter().map(|(code, _)| *code)
}

/// Total number of constituents across all regions
pub fn constituent_count() -> usize {
    REGIONS.iter().map(|r| r.constituents.len()).sum()
}

/// Check that the table is a partition: numbered 1..=10 in order,
/// no empty regions, no duplicates within or across regions.
pub fn validate_partition() -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::new();

    for (i, r) in REGIONS.iter().enumerate() {
        if usize::from(r.number) != i + 1 {
            return Err(Error::InvalidTable(format!(
                "{} is out of order at position {}",
                r.label(),
                i
            )));
        }
        if r.constituents.is_empty() {
            return Err(Error::InvalidTable(format!("{} is empty", r.label())));
        }

        let own: HashSet<&str> = r.constituents.iter().copied().collect();
        if own.len() != r.constituents.len() {
            return Err(Error::InvalidTable(format!("{} has duplicates", r.label())));
        }

        for code in r.constituents {
            if !seen.insert(code) {
                let other = REGIONS[..i]
                    .iter()
                    .find(|o| o.contains(code))
                    .map(|o| o.label())
                    .unwrap_or_default();
                return Err(Error::InvalidTable(format!(
                    "{} and {} share constituent {}",
                    other,
                    r.label(),
                    code
                )));
            }
        }
    }

    Ok(())
}
