pub mod app_config;
pub mod catalog;
pub mod comments;
pub mod db;
pub mod error;
pub mod filter;
pub mod forms;
pub mod lists;
pub mod messages;
pub mod middleware;
pub mod orm;
pub mod rating;
pub mod session;
pub mod template;
pub mod typed_api;
pub mod user;
pub mod web;
