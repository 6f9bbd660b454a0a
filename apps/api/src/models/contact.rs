use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Network distance between the user and a contact.
///
/// Only 1, 2 and 3 are representable; anything else is rejected when the value
/// enters the system (JSON body or database row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[serde(try_from = "u8", into = "u8")]
#[repr(i16)]
pub enum ConnectionDegree {
    First = 1,
    Second = 2,
    Third = 3,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("connection degree must be 1, 2 or 3 (got {0})")]
pub struct InvalidDegree(pub i64);

impl TryFrom<i64> for ConnectionDegree {
    type Error = InvalidDegree;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ConnectionDegree::First),
            2 => Ok(ConnectionDegree::Second),
            3 => Ok(ConnectionDegree::Third),
            other => Err(InvalidDegree(other)),
        }
    }
}

impl TryFrom<u8> for ConnectionDegree {
    type Error = InvalidDegree;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        ConnectionDegree::try_from(i64::from(value))
    }
}

impl From<ConnectionDegree> for u8 {
    fn from(degree: ConnectionDegree) -> Self {
        degree as u8
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContactRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub connection_degree: ConnectionDegree,
    pub relationship_strength: f64,
    pub last_contacted_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    /// "manual" or "suggested"
    pub source: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TargetCompanyRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_name: String,
    pub target_role: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OutreachSequenceRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub contact_id: Uuid,
    pub target_company: String,
    pub subject: String,
    pub body: String,
    pub referral_likelihood: i16,
    /// "draft" | "sent" | "replied"
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degree_accepts_one_to_three() {
        assert_eq!(ConnectionDegree::try_from(1u8), Ok(ConnectionDegree::First));
        assert_eq!(ConnectionDegree::try_from(2u8), Ok(ConnectionDegree::Second));
        assert_eq!(ConnectionDegree::try_from(3u8), Ok(ConnectionDegree::Third));
    }

    #[test]
    fn test_degree_rejects_out_of_range() {
        assert_eq!(ConnectionDegree::try_from(0u8), Err(InvalidDegree(0)));
        assert_eq!(ConnectionDegree::try_from(4u8), Err(InvalidDegree(4)));
        assert_eq!(ConnectionDegree::try_from(-1i64), Err(InvalidDegree(-1)));
    }

    #[test]
    fn test_degree_serde_is_numeric() {
        let degree: ConnectionDegree = serde_json::from_str("2").unwrap();
        assert_eq!(degree, ConnectionDegree::Second);
        assert_eq!(serde_json::to_string(&ConnectionDegree::Third).unwrap(), "3");
        assert!(serde_json::from_str::<ConnectionDegree>("4").is_err());
        assert!(serde_json::from_str::<ConnectionDegree>("0").is_err());
    }
}
