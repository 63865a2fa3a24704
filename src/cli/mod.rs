pub mod input;
pub mod message;
pub mod radio_task;
