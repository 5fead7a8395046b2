//! Back up a GitHub user’s repositories and gists to local disk.
//!
//! [`remote::RemoteClient`] wraps the API and the clone operation;
//! [`mirror::run()`] drives a whole backup.

pub mod config;
pub mod mirror;
pub mod remote;

#[cfg(test)]
pub mod test;
