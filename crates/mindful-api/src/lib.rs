pub mod achievements;
pub mod appointments;
pub mod auth;
pub mod chat;
pub mod convert;
pub mod counselors;
pub mod error;
pub mod mailer;
pub mod middleware;
pub mod mood;
pub mod resources;
pub mod routes;
