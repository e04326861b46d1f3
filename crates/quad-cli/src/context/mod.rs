mod app_context;
mod cache_lock;
mod project_root;

pub use app_context::AppContext;
pub use project_root::{QUAD_DIR, find_project_root};
