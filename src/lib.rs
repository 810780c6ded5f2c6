pub mod config;
pub mod contact;
pub mod content;
pub mod datalog;
pub mod format;
pub mod integrity;
pub mod logger;
pub mod paginator;
pub mod query_string;
pub mod render_cache;
pub mod server;
pub mod site;
pub mod systems;
pub mod taxonomy;
pub mod tech_usage;
pub mod text_utils;
pub mod theme;
pub mod util;
pub mod view;

#[cfg(test)]
mod test_data;
