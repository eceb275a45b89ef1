pub mod comment;
pub mod interaction;
pub mod menu;
pub mod post;
pub mod settings;
pub mod taxonomy;
pub mod user;
