//! Render extracted commits into the text handed to the synthesizer.
use crate::git::Commit;

/// Text returned when there is nothing to render.
pub const NO_COMMITS_SENTINEL: &str = "No commits found in the specified range.";

const MAX_LISTED_FILES: usize = 5;

/// Render commits in input order, one entry per commit separated by a
/// blank line.
pub fn format_commits(commits: &[Commit]) -> String {
    if commits.is_empty() {
        return NO_COMMITS_SENTINEL.to_string();
    }

    commits
        .iter()
        .map(format_commit)
        .collect::<Vec<String>>()
        .join("\n\n")
}

fn format_commit(commit: &Commit) -> String {
    format!(
        "- [{}] {}\n  Author: {}\n  Files: {}",
        commit.short_id,
        commit.message,
        commit.author_name,
        format_files(&commit.files)
    )
}

fn format_files(files: &[String]) -> String {
    if files.is_empty() {
        return "N/A".to_string();
    }

    let mut listed = files
        .iter()
        .take(MAX_LISTED_FILES)
        .map(String::as_str)
        .collect::<Vec<&str>>()
        .join(", ");

    if files.len() > MAX_LISTED_FILES {
        listed.push_str(&format!(
            " (+{} more)",
            files.len() - MAX_LISTED_FILES
        ));
    }

    listed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::create_test_commit;

    #[test]
    fn empty_input_renders_sentinel() {
        assert_eq!(format_commits(&[]), NO_COMMITS_SENTINEL);
    }

    #[test]
    fn renders_single_entry() {
        let commit =
            create_test_commit("abc1234", "feat: add login", &["src/auth.rs"]);

        assert_eq!(
            format_commits(&[commit]),
            "- [abc1234] feat: add login\n  Author: Test Author\n  Files: src/auth.rs"
        );
    }

    #[test]
    fn files_without_changes_render_na() {
        let commit = create_test_commit("abc1234", "initial", &[]);
        assert!(format_commits(&[commit]).ends_with("Files: N/A"));
    }

    #[test]
    fn long_file_lists_are_capped_at_five() {
        let commit = create_test_commit(
            "abc1234",
            "chore: many files",
            &["a", "b", "c", "d", "e", "f", "g"],
        );

        assert!(
            format_commits(&[commit])
                .ends_with("Files: a, b, c, d, e (+2 more)")
        );
    }

    #[test]
    fn exactly_five_files_has_no_suffix() {
        let commit =
            create_test_commit("abc1234", "five", &["a", "b", "c", "d", "e"]);
        assert!(format_commits(&[commit]).ends_with("Files: a, b, c, d, e"));
    }

    #[test]
    fn entries_keep_input_order_separated_by_blank_line() {
        let commits = vec![
            create_test_commit("bbbbbbb", "second", &["b.rs"]),
            create_test_commit("aaaaaaa", "first", &["a.rs"]),
        ];

        let text = format_commits(&commits);
        let entries: Vec<&str> = text.split("\n\n").collect();

        assert_eq!(entries.len(), 2);
        assert!(entries[0].starts_with("- [bbbbbbb] second"));
        assert!(entries[1].starts_with("- [aaaaaaa] first"));
    }
}
