mod auth;
mod generation;
mod history;
