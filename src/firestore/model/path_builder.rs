use crate::firestore::error::FirestoreResult;
use crate::firestore::model::ResourcePath;

/// Composes slash-delimited collection/document paths.
///
/// ```
/// use firebase_rest_lite::firestore::model::PathBuilder;
///
/// let path = PathBuilder::new()
///     .collection("users")
///     .document("alice")
///     .collection("posts")
///     .complete();
/// assert_eq!(path, "users/alice/posts");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathBuilder {
    path: String,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(mut self, segment: impl AsRef<str>) -> Self {
        if self.path.is_empty() {
            self.path = segment.as_ref().to_owned();
        } else {
            self.path.push('/');
            self.path.push_str(segment.as_ref());
        }
        self
    }

    pub fn collection(self, collection_id: impl AsRef<str>) -> Self {
        self.append(collection_id)
    }

    pub fn document(self, document_id: impl AsRef<str>) -> Self {
        self.append(document_id)
    }

    pub fn complete(&self) -> String {
        self.path.clone()
    }

    pub fn to_resource_path(&self) -> FirestoreResult<ResourcePath> {
        ResourcePath::from_string(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_builder_completes_to_empty_string() {
        assert_eq!(PathBuilder::new().complete(), "");
    }

    #[test]
    fn first_segment_has_no_leading_slash() {
        let path = PathBuilder::new().append("users").complete();
        assert_eq!(path, "users");
    }

    #[test]
    fn segments_are_joined_in_order() {
        let builder = PathBuilder::new()
            .collection("rooms")
            .document("lobby")
            .collection("messages")
            .document("m1");
        assert_eq!(builder.complete(), "rooms/lobby/messages/m1");
        assert_eq!(builder.to_resource_path().unwrap().len(), 4);
    }
}
