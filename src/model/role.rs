use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, EnumString, Display, AsRefStr, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Employee,
    Manager,
    Hr,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn parses_lowercase_names_only() {
        assert_eq!(Role::from_str("employee").unwrap(), Role::Employee);
        assert_eq!(Role::from_str("manager").unwrap(), Role::Manager);
        assert_eq!(Role::from_str("hr").unwrap(), Role::Hr);
        assert!(Role::from_str("admin").is_err());
        assert!(Role::from_str("").is_err());
    }

    #[test]
    fn stored_name_round_trips() {
        assert_eq!(Role::Hr.as_ref(), "hr");
        assert_eq!(Role::Manager.to_string(), "manager");
    }
}
