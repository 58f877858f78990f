//! The latest-post summary as the card stores it.
//!
//! A site with no published posts is represented by a model whose `post` is
//! `None`, so post fields simply do not exist when there is nothing to show.
//! A view count that has not been fetched yet is `None` rather than a magic
//! number.

use chrono::{DateTime, Utc};

/// Summary of a site's most recent published post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestPostModel {
    /// Identifier of the site that owns the post.
    pub blog_id: String,
    pub post: Option<LatestPost>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestPost {
    pub post_id: u64,
    pub title: String,
    pub url: String,
    pub published: Option<DateTime<Utc>>,
    /// `None` until the views section has been fetched.
    pub views: Option<u64>,
    pub likes: u64,
    pub comments: u64,
}

impl LatestPostModel {
    pub fn available(blog_id: impl Into<String>, post: LatestPost) -> Self {
        Self {
            blog_id: blog_id.into(),
            post: Some(post),
        }
    }

    pub fn unavailable(blog_id: impl Into<String>) -> Self {
        Self {
            blog_id: blog_id.into(),
            post: None,
        }
    }

    pub fn is_latest_post_available(&self) -> bool {
        self.post.is_some()
    }

    /// Copy of this model with the view count filled in.
    ///
    /// Returns `None` when there is no post to attach the count to.
    pub fn with_views(&self, views: u64) -> Option<Self> {
        let post = self.post.as_ref()?;
        Some(Self {
            blog_id: self.blog_id.clone(),
            post: Some(LatestPost {
                views: Some(views),
                ..post.clone()
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_post(views: Option<u64>) -> LatestPost {
        LatestPost {
            post_id: 7,
            title: "Hello".into(),
            url: "https://example.blog/hello".into(),
            published: None,
            views,
            likes: 4,
            comments: 1,
        }
    }

    #[test]
    fn with_views_only_touches_views() {
        let model = LatestPostModel::available("123", sample_post(None));
        let updated = model.with_views(42).unwrap();

        let post = updated.post.as_ref().unwrap();
        assert_eq!(post.views, Some(42));
        assert_eq!(post.likes, 4);
        assert_eq!(post.comments, 1);
        assert_eq!(post.post_id, 7);
        assert_eq!(updated.blog_id, "123");
    }

    #[test]
    fn with_views_on_unavailable_model_is_none() {
        let model = LatestPostModel::unavailable("123");
        assert!(!model.is_latest_post_available());
        assert!(model.with_views(5).is_none());
    }

    #[test]
    fn with_views_is_idempotent() {
        let model = LatestPostModel::available("123", sample_post(None));
        let once = model.with_views(42).unwrap();
        let twice = once.with_views(42).unwrap();
        assert_eq!(once, twice);
    }
}
