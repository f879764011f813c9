use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use url::Url;

/// Cached user profile. Immutable value; the `with_*` setters return a new
/// value and are only used while assembling a parsed record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    user_id: String,
    first_name: Option<String>,
    middle_name: Option<String>,
    last_name: Option<String>,
    name: Option<String>,
    email: Option<String>,
    link_url: Option<Url>,
    friend_ids: Option<Vec<String>>,
    birthday: Option<NaiveDate>,
    age_range: Option<AgeRange>,
    hometown: Option<Place>,
    location: Option<Place>,
    gender: Option<String>,
    last_fetched_at: DateTime<Utc>,
}

impl Profile {
    /// Returns `None` for an empty user id; a profile always has one.
    pub fn new(user_id: impl Into<String>, last_fetched_at: DateTime<Utc>) -> Option<Self> {
        let user_id = user_id.into();
        if user_id.is_empty() {
            return None;
        }
        Some(Self {
            user_id,
            first_name: None,
            middle_name: None,
            last_name: None,
            name: None,
            email: None,
            link_url: None,
            friend_ids: None,
            birthday: None,
            age_range: None,
            hometown: None,
            location: None,
            gender: None,
            last_fetched_at,
        })
    }

    pub fn with_first_name(mut self, v: Option<String>) -> Self {
        self.first_name = v;
        self
    }

    pub fn with_middle_name(mut self, v: Option<String>) -> Self {
        self.middle_name = v;
        self
    }

    pub fn with_last_name(mut self, v: Option<String>) -> Self {
        self.last_name = v;
        self
    }

    pub fn with_name(mut self, v: Option<String>) -> Self {
        self.name = v;
        self
    }

    pub fn with_email(mut self, v: Option<String>) -> Self {
        self.email = v;
        self
    }

    pub fn with_link_url(mut self, v: Option<Url>) -> Self {
        self.link_url = v;
        self
    }

    /// An empty list is stored as absent ("no friends known").
    pub fn with_friend_ids(mut self, v: Option<Vec<String>>) -> Self {
        self.friend_ids = v.filter(|ids| !ids.is_empty());
        self
    }

    pub fn with_birthday(mut self, v: Option<NaiveDate>) -> Self {
        self.birthday = v;
        self
    }

    pub fn with_age_range(mut self, v: Option<AgeRange>) -> Self {
        self.age_range = v;
        self
    }

    pub fn with_hometown(mut self, v: Option<Place>) -> Self {
        self.hometown = v;
        self
    }

    pub fn with_location(mut self, v: Option<Place>) -> Self {
        self.location = v;
        self
    }

    pub fn with_gender(mut self, v: Option<String>) -> Self {
        self.gender = v;
        self
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    pub fn middle_name(&self) -> Option<&str> {
        self.middle_name.as_deref()
    }

    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn link_url(&self) -> Option<&Url> {
        self.link_url.as_ref()
    }

    pub fn friend_ids(&self) -> Option<&[String]> {
        self.friend_ids.as_deref()
    }

    pub fn birthday(&self) -> Option<NaiveDate> {
        self.birthday
    }

    pub fn age_range(&self) -> Option<AgeRange> {
        self.age_range
    }

    pub fn hometown(&self) -> Option<&Place> {
        self.hometown.as_ref()
    }

    pub fn location(&self) -> Option<&Place> {
        self.location.as_ref()
    }

    pub fn gender(&self) -> Option<&str> {
        self.gender.as_deref()
    }

    pub fn last_fetched_at(&self) -> DateTime<Utc> {
        self.last_fetched_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgeRange {
    pub min: Option<u32>,
    pub max: Option<u32>,
}

/// A named location reference (hometown, current location).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Place {
    pub id: String,
    pub name: Option<String>,
}

/// Rendering variant requested from the picture endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PictureMode {
    Square,
    #[default]
    Normal,
    Album,
    Small,
    Large,
}

impl PictureMode {
    /// Map a raw wire/ABI value; anything unknown falls back to `Normal`.
    pub fn from_raw(raw: i64) -> Self {
        match raw {
            0 => Self::Square,
            1 => Self::Normal,
            2 => Self::Album,
            3 => Self::Small,
            4 => Self::Large,
            _ => Self::Normal,
        }
    }

    /// Case-insensitive name lookup; unknown names fall back to `Normal`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "square" => Self::Square,
            "album" => Self::Album,
            "small" => Self::Small,
            "large" => Self::Large,
            _ => Self::Normal,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Square => "square",
            Self::Normal => "normal",
            Self::Album => "album",
            Self::Small => "small",
            Self::Large => "large",
        }
    }
}

impl fmt::Display for PictureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested picture dimensions, passed to the endpoint verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PictureSize {
    pub width: i32,
    pub height: i32,
}

impl PictureSize {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Identity context supplied by the hosting application.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    token_string: String,
    user_id: String,
    granted_permissions: BTreeSet<String>,
}

impl AccessToken {
    pub fn new<I, S>(token_string: impl Into<String>, user_id: impl Into<String>, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            token_string: token_string.into(),
            user_id: user_id.into(),
            granted_permissions: permissions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn token_string(&self) -> &str {
        &self.token_string
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn granted_permissions(&self) -> &BTreeSet<String> {
        &self.granted_permissions
    }

    pub fn has_granted(&self, permission: &str) -> bool {
        self.granted_permissions.contains(permission)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token_string", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("granted_permissions", &self.granted_permissions)
            .finish()
    }
}

/// Change notification delivered to observers: the value before and after.
#[derive(Debug, Clone)]
pub struct ProfileChanged {
    pub old: Option<Arc<Profile>>,
    pub new: Option<Arc<Profile>>,
}

/// Handle returned by observer registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub(crate) u64);
