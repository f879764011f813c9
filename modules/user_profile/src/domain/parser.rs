//! Defensive conversion of an untrusted graph response into a [`Profile`].
//!
//! Every access checks the JSON shape first. A field with the wrong shape is
//! treated as absent; only a missing or empty `id` rejects the whole record.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};
use url::Url;

use crate::contract::model::{AgeRange, Place, Profile};

type Object = Map<String, Value>;

/// Parse `raw` into a profile stamped with `fetched_at`.
///
/// Returns `None` ("no profile") when `raw` is not an object or carries no
/// usable `id`. Never panics on any input.
pub fn parse_profile(raw: &Value, fetched_at: DateTime<Utc>) -> Option<Profile> {
    let obj = raw.as_object()?;
    let user_id = string_field(obj, "id").filter(|id| !id.is_empty())?;

    let profile = Profile::new(user_id, fetched_at)?
        .with_first_name(string_field(obj, "first_name"))
        .with_middle_name(string_field(obj, "middle_name"))
        .with_last_name(string_field(obj, "last_name"))
        .with_name(string_field(obj, "name"))
        .with_email(string_field(obj, "email"))
        .with_link_url(link_field(obj))
        .with_friend_ids(friend_ids(obj))
        .with_birthday(birthday(obj))
        .with_age_range(age_range(obj))
        .with_hometown(place(obj, "hometown"))
        .with_location(place(obj, "location"))
        .with_gender(string_field(obj, "gender"));
    Some(profile)
}

fn string_field(obj: &Object, key: &str) -> Option<String> {
    obj.get(key)?.as_str().map(str::to_owned)
}

fn link_field(obj: &Object) -> Option<Url> {
    let raw = obj.get("link")?.as_str()?.trim();
    if raw.is_empty() {
        return None;
    }
    Url::parse(raw).ok()
}

/// All-or-nothing: one malformed entry drops the whole list.
fn friend_ids(obj: &Object) -> Option<Vec<String>> {
    let data = obj.get("friends")?.as_object()?.get("data")?.as_array()?;
    if data.is_empty() {
        return None;
    }
    data.iter()
        .map(|entry| entry.as_object()?.get("id")?.as_str().map(str::to_owned))
        .collect()
}

fn birthday(obj: &Object) -> Option<NaiveDate> {
    let raw = obj.get("birthday")?.as_str()?;
    NaiveDate::parse_from_str(raw.trim(), "%m/%d/%Y").ok()
}

fn bound(obj: &Object, key: &str) -> Option<u32> {
    obj.get(key)?.as_u64().and_then(|v| u32::try_from(v).ok())
}

fn age_range(obj: &Object) -> Option<AgeRange> {
    let range = obj.get("age_range")?.as_object()?;
    let (min, max) = (bound(range, "min"), bound(range, "max"));
    if min.is_none() && max.is_none() {
        return None;
    }
    Some(AgeRange { min, max })
}

fn place(obj: &Object, key: &str) -> Option<Place> {
    let place = obj.get(key)?.as_object()?;
    let id = string_field(place, "id").filter(|id| !id.is_empty())?;
    Some(Place {
        id,
        name: string_field(place, "name"),
    })
}
