use std::collections::HashSet;

use crate::error::ReconError;
use crate::registry::Registry;

/// Anything that can list the country codes it has data for.
pub trait CodeSource {
    /// Codes in the source's own deterministic order.
    fn available_codes(&self) -> Vec<&str>;
}

impl CodeSource for Registry {
    fn available_codes(&self) -> Vec<&str> {
        self.all_codes()
    }
}

impl<S: AsRef<str>> CodeSource for [S] {
    fn available_codes(&self) -> Vec<&str> {
        self.iter().map(AsRef::as_ref).collect()
    }
}

/// Codes present in both sources, in `left`'s order, without duplicates.
pub fn common_codes<L, R>(left: &L, right: &R) -> Vec<String>
where
    L: CodeSource + ?Sized,
    R: CodeSource + ?Sized,
{
    let right_codes: HashSet<&str> = right.available_codes().into_iter().collect();
    let mut seen = HashSet::new();

    left.available_codes()
        .into_iter()
        .filter(|code| right_codes.contains(code) && seen.insert(*code))
        .map(str::to_string)
        .collect()
}

/// [`common_codes`] minus the aggregate code (`WLD` by default).
///
/// The aggregate must be present in the intersection; its absence means one of
/// the inputs is not shaped like the datasets this join expects.
pub fn common_codes_sanitized<L, R>(
    left: &L,
    right: &R,
    aggregate_code: &str,
) -> Result<Vec<String>, ReconError>
where
    L: CodeSource + ?Sized,
    R: CodeSource + ?Sized,
{
    let mut codes = common_codes(left, right);
    let idx = codes
        .iter()
        .position(|c| c == aggregate_code)
        .ok_or_else(|| ReconError::Sanitization {
            code: aggregate_code.into(),
        })?;
    codes.remove(idx);
    Ok(codes)
}
