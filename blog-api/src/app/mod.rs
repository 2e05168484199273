mod docs;
mod error;
mod form;
mod handlers;
mod middleware;
mod pagination;
mod rate_limit;
mod router;
mod state;
#[cfg(test)]
mod tests;

pub use router::app_router;
pub use state::AppState;
