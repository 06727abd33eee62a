pub mod classifier;
pub mod config;
pub mod conflict;
pub mod dates;
pub mod engine;
pub mod error;
pub mod hasher;
pub mod logging;
pub mod mailer;
pub mod permissions;
pub mod scheduler;
pub mod transfer;

pub use config::AppConfig;
pub use engine::{FailureRecord, Organizer, PassReport};
pub use error::Error;
pub use mailer::{FailureNotifier, NoopMailer, SmtpMailer};
pub use scheduler::Schedule;
