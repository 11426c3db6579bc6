//! Simulated data source for profiles, posts, and comments.
//!
//! Every call parks on a timer before resolving, so many fetches can be in
//! flight at once without burning CPU. Only the comment leg can fail, and
//! whether it does is decided by an injectable [`FailurePolicy`].

use crate::error::FetchError;
use crate::models::{Comment, Post, UserProfile};
use anyhow::{Result, bail};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

/// Default probability that a comment fetch fails.
pub const DEFAULT_FAILURE_RATE: f64 = 0.3;

/// Number of posts every user has.
pub const POSTS_PER_USER: u32 = 3;

const POST_WORDS: [&str; POSTS_PER_USER as usize] = ["one", "two", "three"];

const COMMENTERS: [(&str, &str); 3] = [
    ("alex", "Nice post!"),
    ("sam", "Good info."),
    ("mia", "Thanks for sharing!"),
];

/// Anything that can serve the three fetch legs.
///
/// The strategies in [`crate::aggregate`] are generic over this so tests can
/// swap in sources that fail on demand.
pub trait DataSource {
    /// Fetch the profile for `user_id`.
    async fn fetch_user_profile(&self, user_id: u32) -> Result<UserProfile, FetchError>;

    /// Fetch all posts written by `user_id`.
    async fn fetch_user_posts(&self, user_id: u32) -> Result<Vec<Post>, FetchError>;

    /// Fetch the comments on `post_id`.
    async fn fetch_post_comments(&self, post_id: u32) -> Result<Vec<Comment>, FetchError>;
}

/// Decides whether a given comment fetch should fail.
pub trait FailurePolicy {
    fn should_fail(&self, post_id: u32) -> bool;
}

/// Fails each call independently with a fixed probability.
pub struct RandomFailure {
    rate: f64,
    rng: Mutex<StdRng>,
}

impl RandomFailure {
    /// Create a policy failing with probability `rate`.
    ///
    /// A `seed` makes the sequence of outcomes reproducible.
    pub fn new(rate: f64, seed: Option<u64>) -> Result<Self> {
        if !(0.0..=1.0).contains(&rate) {
            bail!("Failure rate must be between 0 and 1, got {}", rate);
        }

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            rate,
            rng: Mutex::new(rng),
        })
    }
}

impl FailurePolicy for RandomFailure {
    fn should_fail(&self, _post_id: u32) -> bool {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.gen_bool(self.rate)
    }
}

impl<P: FailurePolicy + ?Sized> FailurePolicy for Box<P> {
    fn should_fail(&self, post_id: u32) -> bool {
        (**self).should_fail(post_id)
    }
}

/// Pick a policy for a configured failure rate.
///
/// The extremes skip the RNG entirely.
pub fn failure_policy(rate: f64, seed: Option<u64>) -> Result<Box<dyn FailurePolicy>> {
    if rate == 0.0 {
        Ok(Box::new(NeverFail))
    } else if rate == 1.0 {
        Ok(Box::new(AlwaysFail))
    } else {
        Ok(Box::new(RandomFailure::new(rate, seed)?))
    }
}

/// Every comment fetch fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysFail;

impl FailurePolicy for AlwaysFail {
    fn should_fail(&self, _post_id: u32) -> bool {
        true
    }
}

/// No comment fetch fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverFail;

impl FailurePolicy for NeverFail {
    fn should_fail(&self, _post_id: u32) -> bool {
        false
    }
}

/// Artificial latency of each leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceDelays {
    pub profile: Duration,
    pub posts: Duration,
    pub comments: Duration,
}

impl Default for SourceDelays {
    fn default() -> Self {
        Self {
            profile: Duration::from_millis(1000),
            posts: Duration::from_millis(1500),
            comments: Duration::from_millis(2000),
        }
    }
}

/// In-process stand-in for a remote API.
pub struct SimulatedSource<P = Box<dyn FailurePolicy>> {
    delays: SourceDelays,
    failures: P,
}

impl<P: FailurePolicy> SimulatedSource<P> {
    pub fn new(delays: SourceDelays, failures: P) -> Self {
        Self { delays, failures }
    }
}

impl<P: FailurePolicy> DataSource for SimulatedSource<P> {
    async fn fetch_user_profile(&self, user_id: u32) -> Result<UserProfile, FetchError> {
        tokio::time::sleep(self.delays.profile).await;

        Ok(UserProfile {
            id: user_id,
            name: "Jordan Lee".to_string(),
            email: "jordan.lee@example.com".to_string(),
            username: "jlee".to_string(),
        })
    }

    async fn fetch_user_posts(&self, user_id: u32) -> Result<Vec<Post>, FetchError> {
        tokio::time::sleep(self.delays.posts).await;

        let posts = (1..=POSTS_PER_USER)
            .zip(POST_WORDS)
            .map(|(post_id, word)| Post {
                post_id,
                user_id,
                title: format!("Post {}", post_id),
                content: format!("This is post {}.", word),
            })
            .collect();

        Ok(posts)
    }

    async fn fetch_post_comments(&self, post_id: u32) -> Result<Vec<Comment>, FetchError> {
        tokio::time::sleep(self.delays.comments).await;

        if self.failures.should_fail(post_id) {
            debug!(post_id, "Simulated comment failure");
            return Err(FetchError::Comments);
        }

        let comments = (1..)
            .zip(COMMENTERS)
            .map(|(comment_id, (username, text))| Comment {
                comment_id,
                post_id,
                username: username.to_string(),
                comment: text.to_string(),
            })
            .collect();

        Ok(comments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_profile_echoes_user_id() {
        let source = SimulatedSource::new(SourceDelays::default(), NeverFail);
        let start = Instant::now();

        let user = source.fetch_user_profile(42).await.unwrap();

        assert_eq!(user.id, 42);
        assert!(start.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_posts_are_deterministic() {
        let source = SimulatedSource::new(SourceDelays::default(), NeverFail);

        let posts = source.fetch_user_posts(7).await.unwrap();

        assert_eq!(posts.len(), 3);
        assert_eq!(
            posts.iter().map(|p| p.post_id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert!(posts.iter().all(|p| p.user_id == 7));
        assert_eq!(posts[0].title, "Post 1");
        assert_eq!(posts[2].content, "This is post three.");
    }

    #[tokio::test(start_paused = true)]
    async fn test_comments_succeed_with_never_fail() {
        let source = SimulatedSource::new(SourceDelays::default(), NeverFail);

        let comments = source.fetch_post_comments(2).await.unwrap();

        assert_eq!(comments.len(), 3);
        assert!(comments.iter().all(|c| c.post_id == 2));
        assert_eq!(comments[0].username, "alex");
        assert_eq!(comments[2].comment, "Thanks for sharing!");
    }

    #[tokio::test(start_paused = true)]
    async fn test_comments_fail_with_always_fail() {
        let source = SimulatedSource::new(SourceDelays::default(), AlwaysFail);

        let err = source.fetch_post_comments(1).await.unwrap_err();

        assert_eq!(err, FetchError::Comments);
        assert_eq!(err.to_string(), "Failed to fetch comments");
    }

    #[test]
    fn test_random_failure_rejects_out_of_range_rate() {
        assert!(RandomFailure::new(1.5, None).is_err());
        assert!(RandomFailure::new(-0.1, None).is_err());
        assert!(RandomFailure::new(0.0, None).is_ok());
        assert!(RandomFailure::new(1.0, None).is_ok());
    }

    #[test]
    fn test_random_failure_extremes() {
        let never = RandomFailure::new(0.0, Some(1)).unwrap();
        let always = RandomFailure::new(1.0, Some(1)).unwrap();

        assert!((1..=50).all(|id| !never.should_fail(id)));
        assert!((1..=50).all(|id| always.should_fail(id)));
    }

    #[test]
    fn test_failure_policy_for_rate() {
        assert!(!failure_policy(0.0, None).unwrap().should_fail(1));
        assert!(failure_policy(1.0, None).unwrap().should_fail(1));
        assert!(failure_policy(0.5, Some(3)).is_ok());
        assert!(failure_policy(7.0, None).is_err());
    }

    #[test]
    fn test_seeded_random_failure_is_reproducible() {
        let a = RandomFailure::new(0.3, Some(99)).unwrap();
        let b = RandomFailure::new(0.3, Some(99)).unwrap();

        let first: Vec<bool> = (1..=20).map(|id| a.should_fail(id)).collect();
        let second: Vec<bool> = (1..=20).map(|id| b.should_fail(id)).collect();

        assert_eq!(first, second);
    }
}
