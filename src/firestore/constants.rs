pub(crate) const DEFAULT_DATABASE_ID: &str = "(default)";

pub(crate) const FIRESTORE_API_HOST: &str = "https://firestore.googleapis.com";
pub(crate) const FIRESTORE_API_VERSION: &str = "v1";
pub(crate) const FIRESTORE_EMULATOR_HOST_ENV: &str = "FIRESTORE_EMULATOR_HOST";

/// Relative endpoint for structured queries, resolved against the database base URL.
pub(crate) const RUN_QUERY_PATH: &str = "documents:runQuery";
