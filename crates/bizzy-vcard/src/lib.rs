//! vCard 3.0 serializer for BizzyCard.
//!
//! Converts a [`bizzy_core::sharing::PublicCard`] into `.vcf` text.
//! Pure synchronous; no HTTP or database dependencies. Serialization
//! cannot fail, so the API returns plain `String`s.
//!
//! # Quick start
//!
//! ```no_run
//! let card = bizzy_core::sharing::PublicCard {
//!   name: "Alice Smith".into(),
//!   title: None,
//!   email: "alice@example.com".into(),
//!   phone_number: None,
//!   company: None,
//!   role: None,
//!   bio: None,
//!   tags: vec![],
//!   profile_photo_url: None,
//!   resume_file_url: None,
//!   social_links: vec![],
//! };
//! let vcf = bizzy_vcard::serialize(&card);
//! assert!(vcf.starts_with("BEGIN:VCARD\r\n"));
//! ```

mod serialize;

pub use serialize::{serialize, vcf_filename};
