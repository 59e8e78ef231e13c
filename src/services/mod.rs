pub mod ai;
pub mod calendar;
pub mod committer;
pub mod gap_filling;
pub mod language;
pub mod operator;
pub mod records;
pub mod resolver;
pub mod scheduler;
pub mod validation;
