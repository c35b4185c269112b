pub(crate) mod analytics;
pub(crate) mod categories;
pub(crate) mod courses;
pub(crate) mod errors;
pub(crate) mod guards;
pub(crate) mod handlers;
pub(crate) mod lesson_tests;
pub(crate) mod lessons;
pub(crate) mod loaders;
pub(crate) mod modules;
pub(crate) mod questions;
pub(crate) mod router;
pub(crate) mod users;
pub(crate) mod validation;
