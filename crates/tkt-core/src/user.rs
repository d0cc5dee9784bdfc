//! # Users and Companies
//!
//! Read-only reference data. The rule engine queries users by company and
//! role; companies only appear in the denormalized ticket listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::identity::{CompanyId, UserId};

/// The role a user holds inside their company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UserRole {
    /// Board member.
    Director,
    /// Company secretary responsible for statutory filings.
    CorporateSecretary,
    /// Bookkeeper / financial reporter.
    Accountant,
}

impl UserRole {
    /// Return all roles as a slice.
    pub fn all() -> &'static [UserRole] {
        &[Self::Director, Self::CorporateSecretary, Self::Accountant]
    }

    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Director => "director",
            Self::CorporateSecretary => "corporateSecretary",
            Self::Accountant => "accountant",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidUserRole(s.to_string()))
    }
}

/// A member of a company's staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Store-assigned identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Role within the company.
    pub role: UserRole,
    /// Employing company.
    pub company_id: CompanyId,
    /// Creation time; the ordering key for most-recent selection.
    pub created_at: DateTime<Utc>,
}

/// A company that tickets are raised for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    /// Store-assigned identifier.
    pub id: CompanyId,
    /// Registered name.
    pub name: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}
