//! Entity scrubbers
//!
//! One scrubber per PKP entity family. Large tables are streamed with a
//! [`chunk::KeysetPager`]; localized attributes are rewritten through the
//! versioned field tables of [`settings`].

pub mod authors;
pub mod chunk;
pub mod email_log;
pub mod publications;
pub mod reviews;
pub mod settings;
pub mod users;

pub use authors::AuthorScrubber;
pub use email_log::EmailLogScrubber;
pub use publications::PublicationScrubber;
pub use reviews::ReviewScrubber;
pub use users::UserScrubber;
