//! Aggregation strategies over a [`DataSource`].
//!
//! All three walk the same profile → posts → comments fan-out. The sequential
//! and parallel strategies never fail: leg errors are caught into the report's
//! `errors`. The combined fetch hands leg errors back to the caller.

use crate::api::DataSource;
use crate::error::FetchError;
use crate::join::settle_all;
use crate::models::{Comment, EnrichedPost, FetchMode, FetchReport, Post, UserContent};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Fetch everything one step at a time, awaiting each call before the next.
pub async fn fetch_sequential<S: DataSource>(source: &S, user_id: u32) -> FetchReport {
    info!(user_id, "Starting sequential fetch");
    let start = Instant::now();
    let mut report = FetchReport::new(FetchMode::Sequential);

    if let Err(e) = sequential_steps(source, user_id, &mut report).await {
        error!("Error in sequential fetch: {}", e);
        report.errors.push(e.to_string());
    }

    report.time_ms = elapsed_ms(start);
    info!("Sequential fetch took {}ms", report.time_ms);
    report
}

async fn sequential_steps<S: DataSource>(
    source: &S,
    user_id: u32,
    report: &mut FetchReport,
) -> Result<(), FetchError> {
    let user = source.fetch_user_profile(user_id).await?;
    info!("User profile retrieved");
    report.user = Some(user);

    let posts = source.fetch_user_posts(user_id).await?;
    info!(count = posts.len(), "Posts retrieved");

    for post in posts {
        match source.fetch_post_comments(post.post_id).await {
            Ok(comments) => {
                debug!(post_id = post.post_id, "Comments retrieved");
                report.posts.push(EnrichedPost::with_comments(post, comments));
            }
            Err(e) => {
                warn!(post_id = post.post_id, "Comments failed: {}", e);
                report.push_comment_failure(post, e.to_string());
            }
        }
    }

    Ok(())
}

/// Fetch profile and posts together, then every post's comments together.
pub async fn fetch_parallel<S: DataSource>(source: &S, user_id: u32) -> FetchReport {
    info!(user_id, "Starting parallel fetch");
    let start = Instant::now();
    let mut report = FetchReport::new(FetchMode::Parallel);

    if let Err(e) = parallel_steps(source, user_id, &mut report).await {
        error!("Error in parallel fetch: {}", e);
        report.errors.push(e.to_string());
    }

    report.time_ms = elapsed_ms(start);
    info!("Parallel fetch took {}ms", report.time_ms);
    report
}

async fn parallel_steps<S: DataSource>(
    source: &S,
    user_id: u32,
    report: &mut FetchReport,
) -> Result<(), FetchError> {
    let (user, posts) = futures::join!(
        source.fetch_user_profile(user_id),
        source.fetch_user_posts(user_id)
    );
    // Both legs have settled here; the profile error wins when both failed.
    let (user, posts) = match (user, posts) {
        (Ok(user), Ok(posts)) => (user, posts),
        (Err(e), _) | (Ok(_), Err(e)) => return Err(e),
    };
    info!(count = posts.len(), "User and posts retrieved together");
    report.user = Some(user);

    for (post, outcome) in fan_out_comments(source, posts).await {
        match outcome {
            Ok(comments) => {
                debug!(post_id = post.post_id, "Comments retrieved");
                report.posts.push(EnrichedPost::with_comments(post, comments));
            }
            Err(e) => {
                warn!(post_id = post.post_id, "Comments failed: {}", e);
                report.push_comment_failure(post, e.to_string());
            }
        }
    }

    Ok(())
}

/// Fetch profile, then posts, then all comments concurrently.
///
/// Profile and posts failures are returned as `Err`. Comment failures are
/// absorbed into each post's `comment_error`.
pub async fn fetch_combined<S: DataSource>(
    source: &S,
    user_id: u32,
) -> Result<UserContent, FetchError> {
    info!(user_id, "Fetching all user content");

    let result = combined_steps(source, user_id).await;
    if let Err(ref e) = result {
        error!("Failed to fetch user content: {}", e);
    }
    result
}

async fn combined_steps<S: DataSource>(
    source: &S,
    user_id: u32,
) -> Result<UserContent, FetchError> {
    let user = source.fetch_user_profile(user_id).await?;
    info!("Step 1: user profile retrieved ({})", user.name);

    let posts = source.fetch_user_posts(user_id).await?;
    info!("Step 2: {} posts retrieved", posts.len());

    let posts: Vec<EnrichedPost> = fan_out_comments(source, posts)
        .await
        .into_iter()
        .map(|(post, outcome)| match outcome {
            Ok(comments) => EnrichedPost::with_comments(post, comments),
            Err(e) => EnrichedPost::with_error(post, e.to_string()),
        })
        .collect();
    info!("Step 3: comments retrieved");

    Ok(UserContent { user, posts })
}

/// Launch one comment fetch per post and pair each post with its outcome.
async fn fan_out_comments<S: DataSource>(
    source: &S,
    posts: Vec<Post>,
) -> Vec<(Post, Result<Vec<Comment>, FetchError>)> {
    let outcomes = settle_all(posts.iter().map(|p| source.fetch_post_comments(p.post_id))).await;
    posts.into_iter().zip(outcomes).collect()
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
