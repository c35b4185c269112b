pub(crate) mod analytics;
pub(crate) mod attempts;
pub(crate) mod categories;
pub(crate) mod courses;
pub(crate) mod health;
pub(crate) mod lesson_tests;
pub(crate) mod lessons;
pub(crate) mod modules;
pub(crate) mod participations;
pub(crate) mod progress;
pub(crate) mod questions;
pub(crate) mod removal;
pub(crate) mod users;
pub(crate) mod wishlist;
