pub mod core_api;
pub mod fs;
pub mod id;
pub mod layout;
pub mod options;
pub mod record;
pub mod rewrite;
pub mod scanner;
pub mod table;
pub mod thumbs;
