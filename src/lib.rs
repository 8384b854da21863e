//! A minimal comment-hosting backend: visitors submit comments against a
//! target (e.g. a blog post slug), a moderator accepts each comment through
//! a single-use mailed link, and accepted comments are served publicly as
//! JSON or an Atom feed.

pub mod comment;
pub mod config;
pub mod error;
pub mod feed;
pub mod notify;
pub mod sanitize;
pub mod serve;
pub mod store;
