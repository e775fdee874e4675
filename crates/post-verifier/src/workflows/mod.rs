pub mod content;
pub mod moderation;
pub mod registration;
pub mod sentiment;
pub mod submission;

pub mod repository;
