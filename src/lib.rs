//! # Submissions Admin Bot
//!
//! A Telegram bot that lets a single operator browse form submissions
//! stored in Supabase and download the identity documents attached to them.

pub mod bot;
pub mod config;
pub mod db;
pub mod dialogue;
pub mod download;
pub mod errors;
