//! Service seams

pub mod mailer;

pub use mailer::{LogMailer, Mailer};
