//! Project engine handlers - membership, answers, finalization and release.

mod add_respondent;
mod create_project;
mod estimate;
mod finalize_assessment;
mod queries;
mod question_sheet;
mod record_response;
mod release_project;
mod statistics;
mod update_project;

pub use add_respondent::{
    AddRespondentCommand, AddRespondentHandler, RemoveRespondentCommand, RemoveRespondentHandler,
};
pub use create_project::{CreateProjectCommand, CreateProjectHandler, CreateProjectResult};
pub use estimate::{
    BindingEstimate, Contribution, ProjectEstimate, ProjectEstimateHandler, ProjectEstimateQuery,
};
pub use finalize_assessment::{FinalizeAssessmentCommand, FinalizeAssessmentHandler};
pub use queries::{MemberView, ProjectListing, ProjectQueries};
pub use question_sheet::{
    QuestionSheet, QuestionSheetHandler, QuestionSheetQuery, SheetDomain, SheetQuestion,
};
pub use record_response::{RecordResponseCommand, RecordResponseHandler, RecordResponseResult};
pub use release_project::{ReleaseProjectCommand, ReleaseProjectHandler, ReleaseProjectResult};
pub use statistics::{
    BindingStatistics, DomainStatistics, ProjectStatistics, ProjectStatisticsHandler,
    ProjectStatisticsQuery,
};
pub use update_project::{UpdateProjectCommand, UpdateProjectHandler};
