// src/repository/mod.rs
//! SQLite repositories returning fully materialized records

pub mod job_definitions;
pub mod leaves;
pub mod match_results;
pub mod organization;
pub mod persons;
pub mod recruitment;
pub mod skills;
pub mod staff;

pub use job_definitions::JobDefinitionRepository;
pub use leaves::{LeaveRepository, LeaveTypeRepository};
pub use match_results::MatchResultRepository;
pub use organization::OrganizationRepository;
pub use persons::PersonRepository;
pub use recruitment::RecruitmentRepository;
pub use skills::SkillRepository;
pub use staff::StaffRecordRepository;
