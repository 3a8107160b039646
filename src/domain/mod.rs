pub mod access_log;
pub mod action;
pub mod attribute;
pub mod condition;
pub mod policy;
pub mod resource;
pub mod resource_attribute;
pub mod schema;
pub mod subject;
pub mod subject_attribute;

pub use access_log::{AccessLog, DecisionResult};
pub use action::Action;
pub use attribute::{AttributeCategory, AttributeType, AttributeValue};
pub use condition::{ConditionOperator, PolicyCondition};
pub use policy::{Effect, Policy, PolicyAction};
pub use resource::Resource;
pub use resource_attribute::ResourceAttribute;
pub use schema::AttributeSchema;
pub use subject::Subject;
pub use subject_attribute::SubjectAttribute;
