pub mod extract;
pub mod handlers;
pub mod keywords;
pub mod matcher;
