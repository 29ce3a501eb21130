//! ward-bot - A Discord moderation bot focused on raid protection.
//!
//! This crate provides a Discord bot implementation with features including:
//! - Join-rate raid detection with per-guild lockdown state
//! - Raid alerts posted to a configured channel
//! - Admin commands for inspecting and lifting lockdowns

pub mod bot;
pub mod config;
pub mod error;
pub mod event;
pub mod logging;
pub mod service;
pub mod subscriber;
pub mod task;
