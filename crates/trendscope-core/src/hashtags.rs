use std::sync::LazyLock;

use regex::Regex;

/// Maximum number of hashtags kept per record.
pub const MAX_HASHTAGS: usize = 10;

static HASHTAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(\w+)").expect("valid hashtag regex"));

/// Extracts `#tags` from free text: lowercased, without the `#`, in order of
/// first appearance, capped at [`MAX_HASHTAGS`].
#[must_use]
pub fn extract_hashtags(text: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for cap in HASHTAG_RE.captures_iter(text) {
        let tag = cap[1].to_lowercase();
        if !tags.contains(&tag) {
            tags.push(tag);
        }
        if tags.len() == MAX_HASHTAGS {
            break;
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_lowercase_tags_without_hash() {
        assert_eq!(
            extract_hashtags("Top 10 Dance Moves #Viral #dance"),
            vec!["viral", "dance"]
        );
    }

    #[test]
    fn duplicates_collapse() {
        assert_eq!(extract_hashtags("#viral #VIRAL #viral"), vec!["viral"]);
    }

    #[test]
    fn caps_at_ten() {
        let text = (0..15).map(|i| format!("#t{i}")).collect::<Vec<_>>().join(" ");
        let tags = extract_hashtags(&text);
        assert_eq!(tags.len(), MAX_HASHTAGS);
        assert_eq!(tags[0], "t0");
        assert_eq!(tags[9], "t9");
    }

    #[test]
    fn no_tags_in_plain_text() {
        assert!(extract_hashtags("nothing to see # here").is_empty());
    }
}
