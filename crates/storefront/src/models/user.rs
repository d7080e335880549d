//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bosco_core::{Email, UserId};

/// A customer account.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "uid")]
    pub id: UserId,
    /// Fixed at signup; never updated.
    pub email: Email,
    pub username: String,
    pub phone: Option<String>,
    pub delivery_address: Option<String>,
    #[serde(rename = "accountCreatedAt")]
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable profile fields. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub phone: Option<String>,
    pub delivery_address: Option<String>,
}

impl ProfileUpdate {
    /// Trim values; a blank username is dropped rather than stored.
    #[must_use]
    pub fn normalized(self) -> Self {
        let trim = |v: Option<String>| v.map(|s| s.trim().to_owned());
        Self {
            username: trim(self.username).filter(|s| !s.is_empty()),
            phone: trim(self.phone),
            delivery_address: trim(self.delivery_address),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_update_rejects_email_field() {
        let result = serde_json::from_str::<ProfileUpdate>(r#"{"email":"new@bosco.com"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_profile_update_normalized() {
        let update: ProfileUpdate =
            serde_json::from_str(r#"{"username":"  ","deliveryAddress":" 5 Marina, Lagos "}"#)
                .unwrap();
        let update = update.normalized();
        assert_eq!(update.username, None);
        assert_eq!(update.delivery_address.as_deref(), Some("5 Marina, Lagos"));
        assert_eq!(update.phone, None);
    }
}
