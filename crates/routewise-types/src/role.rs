//! Roles carried in session tokens

use serde::{Deserialize, Serialize};

use crate::ParseEnumError;

/// Role of the authenticated principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Back-office administrator
    Admin,
    /// Field employee
    Employee,
    /// Paying customer
    Customer,
}

impl Role {
    /// Staff roles can see dispatch data; customers only their own
    pub const fn is_staff(&self) -> bool {
        matches!(self, Self::Admin | Self::Employee)
    }

    /// Wire representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Employee => "EMPLOYEE",
            Self::Customer => "CUSTOMER",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Self::Admin),
            "EMPLOYEE" => Ok(Self::Employee),
            "CUSTOMER" => Ok(Self::Customer),
            _ => Err(ParseEnumError::new("role", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_case_insensitive() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("EMPLOYEE".parse::<Role>().unwrap(), Role::Employee);
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_staff_roles() {
        assert!(Role::Admin.is_staff());
        assert!(Role::Employee.is_staff());
        assert!(!Role::Customer.is_staff());
    }

    #[test]
    fn test_role_serde_matches_display() {
        let json = serde_json::to_string(&Role::Admin).unwrap();
        assert_eq!(json, "\"ADMIN\"");
    }
}
