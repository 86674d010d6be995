pub mod get;
pub mod head;
pub mod list;
pub mod post;

// Re-export handler functions for use in routing
pub use get::get as configuration_get;
pub use head::head as configuration_head;
pub use list::list as configuration_list;
pub use post::post as configuration_post;
