//! Application statuses, move rules and board grouping.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::application::ApplicationRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Saved,
    Applied,
    Interviewing,
    Offer,
    Rejected,
    Withdrawn,
}

/// Board column order.
pub const COLUMN_ORDER: [ApplicationStatus; 6] = [
    ApplicationStatus::Saved,
    ApplicationStatus::Applied,
    ApplicationStatus::Interviewing,
    ApplicationStatus::Offer,
    ApplicationStatus::Rejected,
    ApplicationStatus::Withdrawn,
];

#[derive(Debug, Error, PartialEq)]
pub enum TrackerError {
    #[error("unknown application status '{0}'")]
    UnknownStatus(String),
    #[error("cannot move an application from {from} to {to}; re-open it as saved first")]
    IllegalMove {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
}

impl ApplicationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Saved => "saved",
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Interviewing => "interviewing",
            ApplicationStatus::Offer => "offer",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Rejected | ApplicationStatus::Withdrawn
        )
    }

    /// Terminal cards may only be re-opened to `Saved`. Same-status moves are always allowed.
    pub fn can_move_to(self, to: ApplicationStatus) -> bool {
        self == to || !self.is_terminal() || to == ApplicationStatus::Saved
    }

    /// Every status a card may be moved to `to` from, as stored strings.
    pub fn movable_from(to: ApplicationStatus) -> Vec<&'static str> {
        COLUMN_ORDER
            .into_iter()
            .filter(|from| from.can_move_to(to))
            .map(ApplicationStatus::as_str)
            .collect()
    }

    pub fn check_move(self, to: ApplicationStatus) -> Result<(), TrackerError> {
        if self.can_move_to(to) {
            Ok(())
        } else {
            Err(TrackerError::IllegalMove { from: self, to })
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        COLUMN_ORDER
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| TrackerError::UnknownStatus(s.to_string()))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardColumn {
    pub status: ApplicationStatus,
    pub cards: Vec<ApplicationRow>,
}

/// Groups cards into one column per status in `COLUMN_ORDER`.
///
/// Within a column cards sort by `position`, then most recently updated first.
/// Rows carrying an unknown status are dropped.
pub fn group_board(rows: Vec<ApplicationRow>) -> Vec<BoardColumn> {
    let mut columns: Vec<BoardColumn> = COLUMN_ORDER
        .into_iter()
        .map(|status| BoardColumn {
            status,
            cards: Vec::new(),
        })
        .collect();

    for row in rows {
        let Ok(status) = row.status.parse::<ApplicationStatus>() else {
            tracing::warn!("Skipping application {} with unknown status '{}'", row.id, row.status);
            continue;
        };
        if let Some(column) = columns.iter_mut().find(|c| c.status == status) {
            column.cards.push(row);
        }
    }

    for column in &mut columns {
        column.cards.sort_by(|a, b| {
            a.position
                .cmp(&b.position)
                .then_with(|| b.updated_at.cmp(&a.updated_at))
        });
    }
    columns
}
