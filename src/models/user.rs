use serde::{Deserialize, Serialize};

/// Role carried in the admin JWT. Accounts themselves live in the auth service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Customer,
    Admin,
    Superadmin,
}

impl UserRole {
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Superadmin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Customer => "customer",
            UserRole::Admin => "admin",
            UserRole::Superadmin => "superadmin",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_roles() {
        assert!(!UserRole::Customer.is_admin());
        assert!(UserRole::Admin.is_admin());
        assert!(UserRole::Superadmin.is_admin());
    }

    #[test]
    fn test_role_wire_format() {
        let role: UserRole = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, UserRole::Admin);
        assert_eq!(serde_json::to_string(&UserRole::Superadmin).unwrap(), "\"superadmin\"");
        assert_eq!(UserRole::Superadmin.as_str(), "superadmin");
    }
}
