use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// A delivery channel for notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Medium {
    Email,
}

/// Every medium a user can toggle, in display order.
pub const NOTICE_MEDIA: &[Medium] = &[Medium::Email];

impl Medium {
    /// Key used in stored settings and submitted forms.
    pub fn as_str(self) -> &'static str {
        match self {
            Medium::Email => "email",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Medium::Email => "Email",
        }
    }

    /// Delivers by default for notice types whose `default_level` is at least this.
    pub fn default_level(self) -> i32 {
        match self {
            Medium::Email => 2,
        }
    }

    pub fn enabled_by_default(self, notice_type_level: i32) -> bool {
        self.default_level() <= notice_type_level
    }
}

impl fmt::Display for Medium {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Medium {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NOTICE_MEDIA
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown medium '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_media() {
        assert_eq!("email".parse::<Medium>(), Ok(Medium::Email));
        assert!("sms".parse::<Medium>().is_err());
        assert!("Email".parse::<Medium>().is_err());
    }

    #[test]
    fn email_default_follows_type_level() {
        assert!(!Medium::Email.enabled_by_default(1));
        assert!(Medium::Email.enabled_by_default(2));
        assert!(Medium::Email.enabled_by_default(3));
    }
}
