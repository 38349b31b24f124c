//! A small client for two Firebase REST surfaces:
//!
//! * [`firestore`]: structured queries built through a staged builder, the
//!   Firestore value codec and plain document reads and writes;
//! * [`auth`]: email/password and anonymous sign-in, token refresh and
//!   account management, with pluggable credential persistence.
//!
//! ```no_run
//! use firebase_rest_lite::firestore::{FieldFilter, Firestore};
//!
//! # async fn run() -> firebase_rest_lite::firestore::FirestoreResult<()> {
//! let firestore = Firestore::builder("my-project")
//!     .with_bearer_token("id-token")
//!     .build()?;
//! let adults = firestore
//!     .query()
//!     .add_field("name")
//!     .from("users")
//!     .filter(FieldFilter::new().greater_than_or_equal("age", 18))?
//!     .limit(10)
//!     .run()
//!     .await?;
//! # let _ = adults;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod firestore;

#[cfg(test)]
pub(crate) mod test_support;
