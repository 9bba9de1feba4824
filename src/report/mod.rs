//! Markdown report composition.

pub mod composer;

pub use composer::{
    compose_full_report, compose_karma_table, compose_target_report, compose_user_report,
};
