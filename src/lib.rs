pub mod config;
pub mod error;
pub mod homework;
pub mod notifier;
pub mod poller;
pub mod review_api;
