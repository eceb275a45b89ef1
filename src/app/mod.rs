pub mod admin;
pub mod comments;
pub mod engagement;
pub mod feed;
pub mod media;
pub mod menus;
pub mod posts;
pub mod taxonomy;
pub mod users;
