//! Slots holding the remote data a card has received in the current cycle.

use crate::source::{LatestPostModel, RemoteData};

/// Positional storage for primary results, one slot per declared section.
///
/// Values are held by value and replaced wholesale; readers never observe a
/// half-updated model.
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    slots: Vec<Option<RemoteData>>,
}

impl ResultStore {
    pub fn with_slots(count: usize) -> Self {
        Self {
            slots: vec![None; count],
        }
    }

    pub fn is_data_empty(&self, index: usize) -> bool {
        !matches!(self.slots.get(index), Some(Some(_)))
    }

    pub fn get(&self, index: usize) -> Option<&RemoteData> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Store `data` at `index`, growing the store if needed.
    pub fn set(&mut self, index: usize, data: RemoteData) {
        if index >= self.slots.len() {
            self.slots.resize(index + 1, None);
        }
        self.slots[index] = Some(data);
    }

    /// Empty every slot, keeping the slot count.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    /// The model in the first slot, if it is a latest-post summary.
    pub fn latest_post(&self) -> Option<&LatestPostModel> {
        match self.get(0)? {
            RemoteData::LatestPost(model) => Some(model),
            RemoteData::Other(_) => None,
        }
    }

    /// Swap in a copy of the latest-post model carrying `views`.
    ///
    /// Returns `false`, leaving the store untouched, when there is no
    /// available post to attach the count to.
    pub fn set_latest_post_views(&mut self, views: u64) -> bool {
        let Some(updated) = self.latest_post().and_then(|m| m.with_views(views)) else {
            return false;
        };
        self.set(0, RemoteData::LatestPost(updated));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::LatestPost;

    fn available_model() -> LatestPostModel {
        LatestPostModel::available(
            "site",
            LatestPost {
                post_id: 1,
                title: "T".into(),
                url: "u".into(),
                published: None,
                views: None,
                likes: 2,
                comments: 3,
            },
        )
    }

    #[test]
    fn new_store_is_empty() {
        let store = ResultStore::with_slots(1);
        assert!(store.is_data_empty(0));
        assert!(store.is_data_empty(5), "out of range counts as empty");
        assert!(store.latest_post().is_none());
    }

    #[test]
    fn set_and_clear() {
        let mut store = ResultStore::with_slots(1);
        store.set(0, RemoteData::LatestPost(available_model()));
        assert!(!store.is_data_empty(0));

        store.clear();
        assert!(store.is_data_empty(0));
    }

    #[test]
    fn latest_post_rejects_other_data() {
        let mut store = ResultStore::with_slots(1);
        store.set(0, RemoteData::Other(serde_json::json!({"views": 1})));
        assert!(!store.is_data_empty(0));
        assert!(store.latest_post().is_none());
    }

    #[test]
    fn set_views_replaces_model() {
        let mut store = ResultStore::with_slots(1);
        store.set(0, RemoteData::LatestPost(available_model()));

        assert!(store.set_latest_post_views(9));
        let post = store.latest_post().unwrap().post.as_ref().unwrap();
        assert_eq!(post.views, Some(9));
        assert_eq!(post.likes, 2);
    }

    #[test]
    fn set_views_without_post_is_rejected() {
        let mut store = ResultStore::with_slots(1);
        assert!(!store.set_latest_post_views(9));

        store.set(0, RemoteData::LatestPost(LatestPostModel::unavailable("site")));
        assert!(!store.set_latest_post_views(9));
        assert!(!store.latest_post().unwrap().is_latest_post_available());
    }
}
