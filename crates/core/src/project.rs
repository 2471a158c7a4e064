//! Project lifecycle status, savings derivation, and board grouping.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of a project. Declaration order is the board column order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ProjectStatus {
    #[default]
    Possible,
    Scoping,
    Procurement,
    Execution,
    Completed,
    Closed,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 6] = [
        ProjectStatus::Possible,
        ProjectStatus::Scoping,
        ProjectStatus::Procurement,
        ProjectStatus::Execution,
        ProjectStatus::Completed,
        ProjectStatus::Closed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Possible => "Possible",
            Self::Scoping => "Scoping",
            Self::Procurement => "Procurement",
            Self::Execution => "Execution",
            Self::Completed => "Completed",
            Self::Closed => "Closed",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProjectStatus::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let valid: Vec<&str> = ProjectStatus::ALL.iter().map(|st| st.as_str()).collect();
                format!("Invalid status '{s}'. Must be one of: {}", valid.join(", "))
            })
    }
}

// ---------------------------------------------------------------------------
// Savings
// ---------------------------------------------------------------------------

/// Savings derived from a budget and the awarded contract amount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Savings {
    /// `budget - award_amount`, in OMR.
    pub omr: f64,
    /// `(budget - award_amount) / budget * 100`, rounded to two decimals.
    pub percentage: f64,
}

/// Derive savings when both inputs are present.
///
/// A zero budget yields a zero percentage rather than a division by zero.
pub fn derive_savings(budget: Option<f64>, award_amount: Option<f64>) -> Option<Savings> {
    let (budget, award) = (budget?, award_amount?);
    let omr = budget - award;
    let percentage = if budget == 0.0 {
        0.0
    } else {
        round2(omr / budget * 100.0)
    };
    Some(Savings { omr, percentage })
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Archive partition and board grouping
// ---------------------------------------------------------------------------

/// Anything that can be shown on the project board.
pub trait BoardItem {
    fn status_label(&self) -> &str;
    fn is_archived(&self) -> bool;
}

/// Split a full read into `(active, archived)`, preserving order.
pub fn partition_archived<T: BoardItem>(items: Vec<T>) -> (Vec<T>, Vec<T>) {
    items.into_iter().partition(|p| !p.is_archived())
}

/// One board column.
#[derive(Debug, Serialize)]
pub struct BoardColumn<T> {
    pub status: ProjectStatus,
    pub items: Vec<T>,
}

/// Group active items into one column per status, in status order.
///
/// Archived items are dropped. Items whose stored status no longer parses
/// are returned separately so callers can surface them.
pub fn group_by_status<T: BoardItem>(items: Vec<T>) -> (Vec<BoardColumn<T>>, Vec<T>) {
    let mut columns: Vec<BoardColumn<T>> = ProjectStatus::ALL
        .into_iter()
        .map(|status| BoardColumn {
            status,
            items: Vec::new(),
        })
        .collect();
    let mut unrecognized = Vec::new();

    for item in items.into_iter().filter(|p| !p.is_archived()) {
        match item.status_label().parse::<ProjectStatus>() {
            Ok(status) => columns[status as usize].items.push(item),
            Err(_) => unrecognized.push(item),
        }
    }

    (columns, unrecognized)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Card {
        status: &'static str,
        archived: bool,
    }

    impl BoardItem for Card {
        fn status_label(&self) -> &str {
            self.status
        }
        fn is_archived(&self) -> bool {
            self.archived
        }
    }

    #[test]
    fn savings_example() {
        let s = derive_savings(Some(1000.0), Some(800.0)).unwrap();
        assert_eq!(s.omr, 200.0);
        assert_eq!(s.percentage, 20.00);
    }

    #[test]
    fn savings_rounds_to_two_decimals() {
        let s = derive_savings(Some(3.0), Some(2.0)).unwrap();
        assert_eq!(s.percentage, 33.33);
    }

    #[test]
    fn savings_requires_both_inputs() {
        assert_eq!(derive_savings(Some(1000.0), None), None);
        assert_eq!(derive_savings(None, Some(800.0)), None);
    }

    #[test]
    fn zero_budget_has_zero_percentage() {
        let s = derive_savings(Some(0.0), Some(0.0)).unwrap();
        assert_eq!(s.percentage, 0.0);
    }

    #[test]
    fn overspend_is_negative_savings() {
        let s = derive_savings(Some(100.0), Some(150.0)).unwrap();
        assert_eq!(s.omr, -50.0);
        assert_eq!(s.percentage, -50.0);
    }

    #[test]
    fn status_parse_round_trips() {
        for st in ProjectStatus::ALL {
            assert_eq!(st.as_str().parse::<ProjectStatus>(), Ok(st));
        }
        assert_eq!("execution".parse::<ProjectStatus>(), Ok(ProjectStatus::Execution));
        assert!("Cancelled".parse::<ProjectStatus>().is_err());
    }

    #[test]
    fn partition_keeps_order() {
        let cards = vec![
            Card { status: "Possible", archived: false },
            Card { status: "Closed", archived: true },
            Card { status: "Scoping", archived: false },
        ];
        let (active, archived) = partition_archived(cards);
        assert_eq!(active.len(), 2);
        assert_eq!(active[1].status, "Scoping");
        assert_eq!(archived.len(), 1);
    }

    #[test]
    fn board_groups_active_items_in_status_order() {
        let cards = vec![
            Card { status: "Execution", archived: false },
            Card { status: "Possible", archived: false },
            Card { status: "Execution", archived: true },
            Card { status: "Legacy", archived: false },
        ];
        let (columns, unrecognized) = group_by_status(cards);
        assert_eq!(columns.len(), 6);
        assert_eq!(columns[0].status, ProjectStatus::Possible);
        assert_eq!(columns[0].items.len(), 1);
        assert_eq!(columns[3].status, ProjectStatus::Execution);
        assert_eq!(columns[3].items.len(), 1);
        assert_eq!(unrecognized.len(), 1);
    }
}
