// src/models/enums.rs
//! Closed enumerations. Every ordered enum defines its order once through
//! `rank()`; declaration order carries no meaning.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

// ===== Education =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum EducationLevel {
    None,
    HighSchool,
    Vocational,
    Associate,
    Bachelor,
    Master,
    Doctorate,
}

impl EducationLevel {
    pub const ALL: [EducationLevel; 7] = [
        EducationLevel::None,
        EducationLevel::HighSchool,
        EducationLevel::Vocational,
        EducationLevel::Associate,
        EducationLevel::Bachelor,
        EducationLevel::Master,
        EducationLevel::Doctorate,
    ];

    pub fn rank(self) -> u8 {
        match self {
            EducationLevel::None => 0,
            EducationLevel::HighSchool => 1,
            EducationLevel::Vocational => 2,
            EducationLevel::Associate => 3,
            EducationLevel::Bachelor => 4,
            EducationLevel::Master => 5,
            EducationLevel::Doctorate => 6,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EducationLevel::None => "no formal education",
            EducationLevel::HighSchool => "high school",
            EducationLevel::Vocational => "vocational training",
            EducationLevel::Associate => "associate degree",
            EducationLevel::Bachelor => "bachelor's degree",
            EducationLevel::Master => "master's degree",
            EducationLevel::Doctorate => "doctorate",
        }
    }
}

impl Default for EducationLevel {
    fn default() -> Self {
        EducationLevel::None
    }
}

impl PartialOrd for EducationLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EducationLevel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl FromStr for EducationLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "" | "none" => Ok(EducationLevel::None),
            "high_school" | "highschool" => Ok(EducationLevel::HighSchool),
            "vocational" => Ok(EducationLevel::Vocational),
            "associate" => Ok(EducationLevel::Associate),
            "bachelor" => Ok(EducationLevel::Bachelor),
            "master" => Ok(EducationLevel::Master),
            "doctorate" | "phd" => Ok(EducationLevel::Doctorate),
            other => Err(format!("unknown education level: {}", other)),
        }
    }
}

// ===== Importance tier =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Importance {
    Required,
    Preferred,
    Optional,
}

impl Importance {
    /// Required outranks Preferred outranks Optional.
    pub fn rank(self) -> u8 {
        match self {
            Importance::Optional => 0,
            Importance::Preferred => 1,
            Importance::Required => 2,
        }
    }
}

impl PartialOrd for Importance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Importance {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

// ===== Match status =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum MatchStatus {
    Matched,
    PartialMatch,
    NoMatch,
}

impl MatchStatus {
    pub fn rank(self) -> u8 {
        match self {
            MatchStatus::NoMatch => 0,
            MatchStatus::PartialMatch => 1,
            MatchStatus::Matched => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MatchStatus::Matched => "matched",
            MatchStatus::PartialMatch => "partial_match",
            MatchStatus::NoMatch => "no_match",
        }
    }
}

impl PartialOrd for MatchStatus {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MatchStatus {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "matched" => Ok(MatchStatus::Matched),
            "partial_match" | "partial" => Ok(MatchStatus::PartialMatch),
            "no_match" | "none" => Ok(MatchStatus::NoMatch),
            other => Err(format!("unknown match status: {}", other)),
        }
    }
}

// ===== Leave status =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum LeaveStatus {
    Pending,
    Approved,
    InProgress,
    Completed,
    Rejected,
    Cancelled,
}

impl LeaveStatus {
    /// Days of a leave in this status are reserved against the balance.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            LeaveStatus::Pending | LeaveStatus::Approved | LeaveStatus::InProgress
        )
    }

    /// Days of a leave in this status are counted in `used_days`.
    pub fn counts_as_used(self) -> bool {
        matches!(
            self,
            LeaveStatus::Approved | LeaveStatus::InProgress | LeaveStatus::Completed
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LeaveStatus::Pending => "pending",
            LeaveStatus::Approved => "approved",
            LeaveStatus::InProgress => "in_progress",
            LeaveStatus::Completed => "completed",
            LeaveStatus::Rejected => "rejected",
            LeaveStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ===== Recruitment =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum PostingStatus {
    Open,
    Closed,
}

impl PostingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PostingStatus::Open => "open",
            PostingStatus::Closed => "closed",
        }
    }
}

/// Applications move forward through the pipeline one stage at a time;
/// `Rejected` and `Withdrawn` end it from any open stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Submitted,
    Screening,
    Interview,
    Offered,
    Hired,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub fn is_final(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Hired | ApplicationStatus::Rejected | ApplicationStatus::Withdrawn
        )
    }

    pub fn can_move_to(self, next: ApplicationStatus) -> bool {
        use ApplicationStatus::*;
        match (self, next) {
            (from, Rejected | Withdrawn) => !from.is_final(),
            (Submitted, Screening) | (Screening, Interview) | (Interview, Offered) => true,
            (Offered, Hired) => true,
            _ => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::Screening => "screening",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Offered => "offered",
            ApplicationStatus::Hired => "hired",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ===== Roles =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    HrManager,
    Recruiter,
    Employee,
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "admin" => Ok(Role::Admin),
            "hr_manager" | "hr" => Ok(Role::HrManager),
            "recruiter" => Ok(Role::Recruiter),
            "employee" => Ok(Role::Employee),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}
