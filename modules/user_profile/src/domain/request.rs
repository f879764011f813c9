use crate::contract::model::AccessToken;
use crate::domain::ports::GraphRequest;

pub const PROFILE_GRAPH_PATH: &str = "me";

/// Always requested, in this order.
pub const BASE_FIELDS: [&str; 5] = ["id", "first_name", "middle_name", "last_name", "name"];

/// Permission-gated fields, appended after the base set in table order.
/// Each permission is checked independently.
pub const PERMISSION_FIELDS: [(&str, &str); 8] = [
    ("user_link", "link"),
    ("email", "email"),
    ("user_friends", "friends"),
    ("user_birthday", "birthday"),
    ("user_age_range", "age_range"),
    ("user_hometown", "hometown"),
    ("user_location", "location"),
    ("user_gender", "gender"),
];

/// Field list a profile fetch for `identity` selects.
pub fn profile_fields(identity: &AccessToken) -> Vec<&'static str> {
    let mut fields = BASE_FIELDS.to_vec();
    fields.extend(
        PERMISSION_FIELDS
            .iter()
            .filter(|(permission, _)| identity.has_granted(permission))
            .map(|(_, field)| *field),
    );
    fields
}

pub fn build_profile_request(identity: &AccessToken) -> GraphRequest {
    GraphRequest::new(PROFILE_GRAPH_PATH)
        .with_fields(profile_fields(identity))
        .with_token(identity.token_string())
}
