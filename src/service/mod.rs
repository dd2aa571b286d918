pub mod assistant;
pub mod chat_rules;
pub mod dates;
pub mod donations;
pub mod eligibility;
pub mod export;
