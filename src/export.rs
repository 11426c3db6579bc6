//! Plain text and JSON rendering of run outcomes.
//!
//! Text output is what batch mode prints; JSON is for piping into other tools.

use crate::app::Outcome;
use crate::cli::ExportFormat;
use crate::models::{EnrichedPost, UserProfile};
use anyhow::{Context, Result};
use num_format::{Locale, ToFormattedString};
use serde_json::json;

/// Export an outcome in the specified format.
pub fn export_outcome(outcome: &Outcome, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Text => Ok(export_text(outcome)),
        ExportFormat::Json => export_json(outcome),
    }
}

/// Elapsed milliseconds with digit grouping.
pub fn format_time_ms(time_ms: u64) -> String {
    format!("{}ms", time_ms.to_formatted_string(&Locale::en))
}

/// Export as plain text.
fn export_text(outcome: &Outcome) -> String {
    let mut output = format!(
        "Mode: {} | Time: {}\n",
        outcome.mode_label(),
        format_time_ms(outcome.time_ms())
    );

    match outcome {
        Outcome::Report(report) => {
            match &report.user {
                Some(user) => {
                    push_user(&mut output, user);
                    push_posts(&mut output, &report.posts);
                }
                None => output.push_str("No user data returned.\n"),
            }

            if !report.errors.is_empty() {
                output.push_str("\nSome comments failed to load. Try again.\n");
                output.push_str("Errors (handled)\n");
                for error in &report.errors {
                    output.push_str(&format!("  - {}\n", error));
                }
            }
        }
        Outcome::Combined { content, .. } => {
            push_user(&mut output, &content.user);
            push_posts(&mut output, &content.posts);
        }
        Outcome::Failed { message, .. } => {
            output.push_str(&format!("Error: {}\n", message));
        }
    }

    output
}

fn push_user(output: &mut String, user: &UserProfile) {
    output.push_str("\nUser\n");
    output.push_str(&format!("  Name: {}\n", user.name));
    output.push_str(&format!("  Username: {}\n", user.username));
    output.push_str(&format!("  Email: {}\n", user.email));
}

fn push_posts(output: &mut String, posts: &[EnrichedPost]) {
    output.push_str("\nPosts\n");

    for post in posts {
        output.push_str(&format!("\n  {}\n", post.post.title));
        output.push_str(&format!("  {}\n", post.post.content));

        if let Some(error) = &post.comment_error {
            output.push_str(&format!("    Comments error: {}\n", error));
        }

        if post.comments.is_empty() {
            output.push_str("    (No comments returned)\n");
        } else {
            for comment in &post.comments {
                output.push_str(&format!("    @{}: {}\n", comment.username, comment.comment));
            }
        }
    }
}

/// Export as JSON.
fn export_json(outcome: &Outcome) -> Result<String> {
    let value = match outcome {
        Outcome::Report(report) => serde_json::to_value(report),
        Outcome::Combined { content, time_ms } => serde_json::to_value(content).map(|mut v| {
            v["mode"] = json!("combined");
            v["timeMs"] = json!(time_ms);
            v
        }),
        Outcome::Failed { time_ms, message } => Ok(json!({
            "mode": "combined",
            "timeMs": time_ms,
            "error": message,
        })),
    }
    .context("Failed to serialize outcome")?;

    serde_json::to_string_pretty(&value).context("Failed to serialize outcome")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Comment, FetchMode, FetchReport, Post, UserContent};

    fn user() -> UserProfile {
        UserProfile {
            id: 1,
            name: "Jordan Lee".to_string(),
            email: "jordan.lee@example.com".to_string(),
            username: "jlee".to_string(),
        }
    }

    fn post(post_id: u32) -> Post {
        Post {
            post_id,
            user_id: 1,
            title: format!("Post {}", post_id),
            content: format!("Body {}", post_id),
        }
    }

    fn report_with_one_failure() -> FetchReport {
        let mut report = FetchReport::new(FetchMode::Parallel);
        report.time_ms = 3504;
        report.user = Some(user());
        report.posts.push(EnrichedPost::with_comments(
            post(1),
            vec![Comment {
                comment_id: 1,
                post_id: 1,
                username: "alex".to_string(),
                comment: "Nice post!".to_string(),
            }],
        ));
        report.push_comment_failure(post(2), "Failed to fetch comments".to_string());
        report
    }

    #[test]
    fn test_text_renders_report() {
        let text = export_text(&Outcome::Report(report_with_one_failure()));

        assert!(text.starts_with("Mode: parallel | Time: 3,504ms"));
        assert!(text.contains("Name: Jordan Lee"));
        assert!(text.contains("Username: jlee"));
        assert!(text.contains("Email: jordan.lee@example.com"));
        assert!(text.contains("@alex: Nice post!"));
        assert!(text.contains("Comments error: Failed to fetch comments"));
        assert!(text.contains("(No comments returned)"));
        assert!(text.contains("Errors (handled)"));
        assert!(text.contains("- Post 2: Failed to fetch comments"));
    }

    #[test]
    fn test_text_without_user() {
        let mut report = FetchReport::new(FetchMode::Sequential);
        report.errors.push("Failed to fetch user profile".to_string());

        let text = export_text(&Outcome::Report(report));

        assert!(text.contains("No user data returned."));
        assert!(!text.contains("Posts"));
        assert!(text.contains("- Failed to fetch user profile"));
    }

    #[test]
    fn test_text_for_failed_combined() {
        let text = export_text(&Outcome::Failed {
            time_ms: 1000,
            message: "Failed to fetch user profile".to_string(),
        });

        assert!(text.starts_with("Mode: combined | Time: 1,000ms"));
        assert!(text.contains("Error: Failed to fetch user profile"));
    }

    #[test]
    fn test_json_report_shape() {
        let json = export_json(&Outcome::Report(report_with_one_failure())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["mode"], "parallel");
        assert_eq!(value["timeMs"], 3504);
        assert_eq!(value["posts"][1]["postId"], 2);
        assert_eq!(value["posts"][1]["commentError"], "Failed to fetch comments");
        assert_eq!(value["errors"][0], "Post 2: Failed to fetch comments");
    }

    #[test]
    fn test_json_combined_shape() {
        let outcome = Outcome::Combined {
            content: UserContent {
                user: user(),
                posts: vec![EnrichedPost::with_comments(post(1), Vec::new())],
            },
            time_ms: 4500,
        };

        let value: serde_json::Value =
            serde_json::from_str(&export_json(&outcome).unwrap()).unwrap();

        assert_eq!(value["mode"], "combined");
        assert_eq!(value["timeMs"], 4500);
        assert_eq!(value["user"]["username"], "jlee");
        assert!(value.get("errors").is_none());
    }

    #[test]
    fn test_format_time_ms() {
        assert_eq!(format_time_ms(0), "0ms");
        assert_eq!(format_time_ms(8500), "8,500ms");
    }
}
