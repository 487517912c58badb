use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TypeError;

/// Server-assigned identifier for a catalog [`Title`](crate::Title).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TitleId(Uuid);

/// Server-assigned identifier for a [`Loan`](crate::Loan).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanId(Uuid);

/// Server-assigned identifier for an [`Announcement`](crate::Announcement).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnouncementId(Uuid);

macro_rules! uuid_id {
    ($name:ident) => {
        impl $name {
            /// Mint a fresh identifier.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// The underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = TypeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|e| TypeError::InvalidId(e.to_string()))
            }
        }
    };
}

uuid_id!(TitleId);
uuid_id!(LoanId);
uuid_id!(AnnouncementId);

/// Externally issued borrower identifier (student or card number).
///
/// Unlike [`TitleId`] and [`LoanId`], reader identifiers are not minted by
/// the system: they arrive with the borrower and are stable for their
/// lifetime. The only structural requirement is that they are non-blank.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReaderId(String);

impl ReaderId {
    /// Create a reader id, rejecting empty or whitespace-only input.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(TypeError::EmptyReaderId);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ReaderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReaderId({})", self.0)
    }
}

impl fmt::Display for ReaderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ReaderId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_ids_are_unique() {
        assert_ne!(TitleId::new(), TitleId::new());
    }

    #[test]
    fn title_id_round_trips_through_display() {
        let id = TitleId::new();
        let parsed: TitleId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn malformed_title_id_is_rejected() {
        let err = "not-a-uuid".parse::<TitleId>().unwrap_err();
        assert!(matches!(err, TypeError::InvalidId(_)));
    }

    #[test]
    fn loan_ids_are_unique() {
        assert_ne!(LoanId::new(), LoanId::new());
    }

    #[test]
    fn reader_id_accepts_plain_strings() {
        let id = ReaderId::new("S2024-0142").unwrap();
        assert_eq!(id.as_str(), "S2024-0142");
    }

    #[test]
    fn reader_id_rejects_blank_input() {
        assert_eq!(ReaderId::new("").unwrap_err(), TypeError::EmptyReaderId);
        assert_eq!(ReaderId::new("   ").unwrap_err(), TypeError::EmptyReaderId);
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = ReaderId::new("S1").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"S1\"");

        let tid = TitleId::new();
        let json = serde_json::to_string(&tid).unwrap();
        assert_eq!(json, format!("\"{tid}\""));
    }
}
