// src/models/mod.rs
//! Domain records shared by repositories, services and the web layer

pub mod enums;
pub mod job;
pub mod leave;
pub mod matching;
pub mod organization;
pub mod person;
pub mod recruitment;
pub mod staff;

pub use enums::{
    ApplicationStatus, EducationLevel, Importance, LeaveStatus, MatchStatus, PostingStatus, Role,
};
pub use job::{JobDefinition, JobDefinitionProfile, JobDefinitionQualification, JobRequiredSkill};
pub use leave::{Leave, LeaveBalance, LeaveType};
pub use matching::QualificationMatchingResult;
pub use organization::{Department, Position};
pub use person::{Person, PersonProfile, PersonSkill, Qualification, SkillTemplate};
pub use recruitment::{Application, JobPosting, RankedApplication};
pub use staff::{PayrollRecord, PerformanceReview};
