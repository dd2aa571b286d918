pub mod forms;
pub mod inference;
