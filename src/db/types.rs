use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "userrole", rename_all = "lowercase")]
pub(crate) enum UserRole {
    Student,
    Teacher,
    Admin,
}

impl UserRole {
    pub(crate) fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    pub(crate) fn can_author(self) -> bool {
        matches!(self, Self::Teacher | Self::Admin)
    }
}
