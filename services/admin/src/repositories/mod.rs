//! PostgreSQL repositories for the admin gateway

pub mod activity;
pub mod session;
pub mod user;

pub use activity::ActivityLogRepository;
pub use session::SessionRepository;
pub use user::UserRepository;
