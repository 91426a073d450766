pub mod delete;
pub mod dispatch;
pub mod list;
pub mod resolve;
pub mod run;
pub mod serve;
pub mod show;
pub mod stage;
pub mod summary;
