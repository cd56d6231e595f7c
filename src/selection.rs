// Selected-year state machine.
//
// The controller is the only mutable state besides the dataset store. A
// successful transition invalidates every derived view: the caller rebuilds
// all reports from scratch, there is no partial update.
use std::fmt;

use crate::types::YEARS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Uninitialized,
    Ready(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// Year changes are only valid after the initial data load.
    NotLoaded,
    UnknownYear(String),
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionError::NotLoaded => {
                write!(f, "No data loaded. Please load the data files first.")
            }
            SelectionError::UnknownYear(y) => {
                write!(
                    f,
                    "Invalid year '{}'. Please choose a year between {} and {}.",
                    y,
                    YEARS[0],
                    YEARS[YEARS.len() - 1]
                )
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionController {
    state: Selection,
}

impl SelectionController {
    pub fn new() -> Self {
        SelectionController {
            state: Selection::Uninitialized,
        }
    }

    /// First transition out of `Uninitialized`, performed once the data
    /// load completes.
    pub fn initialize(&mut self, year: &str) -> Result<(), SelectionError> {
        if !YEARS.contains(&year) {
            return Err(SelectionError::UnknownYear(year.to_string()));
        }
        self.state = Selection::Ready(year.to_string());
        Ok(())
    }

    /// Change the selected year. Rejected before the initial load and for
    /// years outside the known set; the previous selection is kept on error.
    pub fn set_year(&mut self, year: &str) -> Result<(), SelectionError> {
        if self.state == Selection::Uninitialized {
            return Err(SelectionError::NotLoaded);
        }
        if !YEARS.contains(&year) {
            return Err(SelectionError::UnknownYear(year.to_string()));
        }
        self.state = Selection::Ready(year.to_string());
        Ok(())
    }

    /// Currently selected year, `None` before the initial load.
    pub fn year(&self) -> Option<&str> {
        match &self.state {
            Selection::Uninitialized => None,
            Selection::Ready(y) => Some(y.as_str()),
        }
    }
}

impl Default for SelectionController {
    fn default() -> Self {
        Self::new()
    }
}
