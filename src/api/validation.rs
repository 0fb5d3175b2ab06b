//! Request validation for the ad endpoints
//!
//! The core trusts its inputs; everything range- or enum-shaped is checked
//! here before a request reaches `AdService`.

use std::collections::HashMap;
use std::str::FromStr;

use crate::errors::{AdError, Result};
use crate::services::AdQuery;
use crate::storage::{Ad, Gender, Platform};
use crate::utils::country::CountryCatalog;

/// Query parameters accepted by `GET /api/v1/ad`.
pub const LIST_PARAMS: [&str; 6] = ["age", "gender", "country", "platform", "limit", "offset"];

const AGE_MIN: i32 = 1;
const AGE_MAX: i32 = 100;

/// Check a decoded ad body before it is stored.
pub fn validate_new_ad(ad: &Ad, countries: &dyn CountryCatalog) -> Result<()> {
    if ad.title.trim().is_empty() {
        return Err(AdError::validation("Title must not be empty"));
    }

    let cond = &ad.conditions;
    let in_range = |age: i32| (AGE_MIN..=AGE_MAX).contains(&age);
    if cond.has_age_restriction() && !(in_range(cond.age_start) && in_range(cond.age_end)) {
        return Err(AdError::validation("Age range must be between 1 and 100"));
    }

    if !cond.gender.is_empty() && Gender::from_str(&cond.gender).is_err() {
        return Err(AdError::validation("Gender must be 'M' or 'F'"));
    }

    if cond
        .country
        .iter()
        .any(|c| !c.is_empty() && !countries.is_known(c))
    {
        return Err(AdError::validation("Invalid country code"));
    }

    if cond
        .platform
        .iter()
        .any(|p| !p.is_empty() && Platform::from_str(p).is_err())
    {
        return Err(AdError::validation("Invalid platform"));
    }

    Ok(())
}

/// Validated form of the list query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pub query: AdQuery,
    pub offset: usize,
    pub limit: Option<i64>,
}

/// Parse raw query pairs into `ListParams`.
///
/// Unknown names are rejected. When a name repeats, the first value wins.
/// Empty `age`, `country`, `limit` and `offset` values count as absent.
pub fn parse_list_params<I>(pairs: I) -> Result<ListParams>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut values: HashMap<String, String> = HashMap::new();
    for (name, value) in pairs {
        if !LIST_PARAMS.contains(&name.as_str()) {
            return Err(AdError::validation(format!(
                "Invalid parameter name: '{}'",
                name
            )));
        }
        values.entry(name).or_insert(value);
    }

    let mut params = ListParams::default();

    if let Some(age) = values.get("age").filter(|v| !v.is_empty()) {
        let age = age
            .parse::<u8>()
            .ok()
            .filter(|a| (AGE_MIN..=AGE_MAX).contains(&i32::from(*a)))
            .ok_or_else(|| {
                AdError::validation(
                    "Invalid 'age' parameter, must be an integer between 1 and 100",
                )
            })?;
        params.query.age = Some(age);
    }

    if let Some(gender) = values.get("gender") {
        let gender = Gender::from_str(gender).map_err(|_| {
            AdError::validation("Invalid 'gender' parameter, must be 'M' or 'F'")
        })?;
        params.query.gender = Some(gender);
    }

    if let Some(country) = values.get("country").filter(|v| !v.is_empty()) {
        if country.parse::<i64>().is_ok() {
            return Err(AdError::validation(
                "Invalid 'country' parameter, must be a non-numeric string",
            ));
        }
        params.query.country = Some(country.clone());
    }

    if let Some(platform) = values.get("platform") {
        let platform = Platform::from_str(platform).map_err(|_| {
            AdError::validation("Invalid 'platform' parameter, must be 'ios', 'web' or 'android'")
        })?;
        params.query.platform = Some(platform);
    }

    if let Some(limit) = values.get("limit").filter(|v| !v.is_empty()) {
        let limit = limit.parse::<i64>().ok().filter(|l| *l > 0).ok_or_else(|| {
            AdError::validation("Invalid 'limit' parameter, must be an integer greater than 0")
        })?;
        params.limit = Some(limit);
    }

    if let Some(offset) = values.get("offset").filter(|v| !v.is_empty()) {
        params.offset = offset.parse::<usize>().map_err(|_| {
            AdError::validation(
                "Invalid 'offset' parameter, must be an integer greater than or equal to 0",
            )
        })?;
    }

    Ok(params)
}
