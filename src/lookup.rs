//! Region lookup by state/territory code.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::region::region_for;

/// One resolved code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupRow {
    pub code: String,
    pub region_number: u8,
    pub office: &'static str,
}

impl LookupRow {
    /// Region label, e.g. "R2"
    pub fn label(&self) -> String {
        format!("R{}", self.region_number)
    }
}

/// Look up the EPA region for each 2-letter state/territory code,
/// e.g. "CO" (Colorado), "PR" (Puerto Rico), "GU" (Guam).
///
/// Output order and duplicates follow the input. Codes must match exactly;
/// the first unknown code fails the whole call.
pub fn look_up<I, S>(codes: I) -> Result<Vec<LookupRow>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    codes
        .into_iter()
        .map(|code| {
            let code = code.as_ref();
            let region = region_for(code).ok_or_else(|| Error::KeyNotFound(code.to_string()))?;
            Ok(LookupRow {
                code: code.to_string(),
                region_number: region.number,
                office: region.office,
            })
        })
        .collect()
}
