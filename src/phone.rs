//! Phone input normalization for lookup keys.
//!
//! User-entered phone numbers arrive in every imaginable shape. Before
//! querying the registry, parse with the configured default region and
//! reformat to E.164 so equivalent entries hit the same registry key.
//! Input that cannot be parsed is passed through unchanged; the
//! registry may still match it verbatim.

use rlibphonenumber::{region_code::RegionCode, PhoneNumberFormat, PHONE_NUMBER_UTIL};

pub fn normalize_lookup_phone(input: &str, default_region: Option<&str>) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let util = &*PHONE_NUMBER_UTIL;
    let mut candidates: Vec<&str> = Vec::new();

    if let Some(region) = default_region {
        if !region.is_empty() {
            candidates.push(region);
        }
    }

    let unknown = RegionCode::get_unknown();
    if candidates
        .iter()
        .all(|candidate| !candidate.eq_ignore_ascii_case(unknown))
    {
        candidates.push(unknown);
    }

    for region in candidates {
        if let Ok(parsed) = util.parse(trimmed, region) {
            return util.format(&parsed, PhoneNumberFormat::E164).into_owned();
        }
    }

    trimmed.to_string()
}
