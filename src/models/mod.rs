pub mod activity_log;
pub mod bag;
pub mod event;
pub mod event_bag;
pub mod item;
