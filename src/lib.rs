//! A shared task tracker: users authenticate with a cookie-backed session,
//! any authenticated user can list tasks and toggle completion, and admins
//! can create and delete tasks. Task status (Completed / Overdue / Due Today /
//! Pending) is derived from the deadline and completion flag at listing time,
//! never stored.
//!
//! The binary (`main.rs`) wires the collaborators (Postgres pool, session
//! keys) and runs the server.

pub mod auth;
pub mod config;
pub mod error;
pub mod flash;
pub mod models;
pub mod routes;
