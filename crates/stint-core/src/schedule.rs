//! Session boundary computation

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use stint_api::{Grid, LeadMinutes, TimeWindow};
use stint_util::{Result, StintError, add_minutes};

use crate::early_warning;

/// Ordered session boundaries for one window and grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    boundaries: Vec<DateTime<Local>>,
    grid: Grid,
    per_boundary_minutes: i64,
}

impl Schedule {
    /// Divide the window into `sessions × groups` equal runs.
    ///
    /// The first boundary is always `window.start`. Boundaries are appended
    /// until one reaches or passes `window.end`; the last one is not clipped.
    /// A window too short for the grid (or running backwards) yields only the
    /// start boundary.
    pub fn compute(window: &TimeWindow, grid: Grid) -> Result<Self> {
        let total_runs = grid.total_runs();
        if total_runs == 0 {
            return Err(StintError::InvalidGrid {
                sessions: grid.sessions,
                groups: grid.groups,
            });
        }

        let total_minutes = window.total_minutes();
        let per_boundary_minutes = total_minutes.div_euclid(total_runs as i64);

        let mut boundaries = vec![window.start];

        if per_boundary_minutes > 0 {
            let mut current = window.start;
            while current < window.end {
                let Some(next) = add_minutes(current, per_boundary_minutes) else {
                    break;
                };
                if next <= current {
                    break;
                }
                boundaries.push(next);
                current = next;
            }
        }

        Ok(Self {
            boundaries,
            grid,
            per_boundary_minutes,
        })
    }

    pub fn boundaries(&self) -> &[DateTime<Local>] {
        &self.boundaries
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    /// Length of one run in minutes; zero or negative for degenerate windows
    pub fn per_boundary_minutes(&self) -> i64 {
        self.per_boundary_minutes
    }

    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    /// Only the window start, no real runs
    pub fn is_degenerate(&self) -> bool {
        self.boundaries.len() <= 1
    }

    /// Boundary shown in grid cell (session, group), both zero-based
    pub fn cell(&self, session: usize, group: usize) -> Option<DateTime<Local>> {
        if group >= self.grid.groups as usize {
            return None;
        }
        let index = session * self.grid.groups as usize + group;
        self.boundaries.get(index).copied()
    }

    /// Grid view: one row per session, one column per group
    pub fn rows(&self) -> Vec<Vec<Option<DateTime<Local>>>> {
        (0..self.grid.sessions as usize)
            .map(|session| {
                (0..self.grid.groups as usize)
                    .map(|group| self.cell(session, group))
                    .collect()
            })
            .collect()
    }

    /// Early-warning instant for every boundary, paired with the boundary
    pub fn warnings(&self, lead: LeadMinutes) -> Vec<(DateTime<Local>, DateTime<Local>)> {
        self.boundaries
            .iter()
            .filter_map(|b| early_warning(*b, lead).map(|w| (*b, w)))
            .collect()
    }

    /// 1-based position of a boundary in the schedule
    pub fn position(&self, boundary: DateTime<Local>) -> Option<usize> {
        self.boundaries.iter().position(|b| *b == boundary).map(|i| i + 1)
    }
}
