//! The at-risk set

use std::collections::BTreeSet;

use routewise_types::ZipCode;

/// Zips in `customer_zips` that no zip in `coverage_zips` covers
///
/// Both inputs are already normalized, so this is a plain set difference.
/// The result is sorted and free of duplicates.
pub fn at_risk_zips<'a, C, V>(customer_zips: C, coverage_zips: V) -> BTreeSet<ZipCode>
where
    C: IntoIterator<Item = &'a ZipCode>,
    V: IntoIterator<Item = &'a ZipCode>,
{
    let covered: BTreeSet<&ZipCode> = coverage_zips.into_iter().collect();
    customer_zips
        .into_iter()
        .filter(|zip| !covered.contains(zip))
        .cloned()
        .collect()
}
