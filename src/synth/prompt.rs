/// Build the generation prompt for one window of commits.
pub fn build_prompt(
    commits_text: &str,
    project: &str,
    version: Option<&str>,
) -> String {
    let version = version.unwrap_or("Latest");

    format!(
        r#"You are a technical writer preparing release notes for the people who use a developer tool.

Read the git commits below and write a changelog that explains what changed for END USERS. Leave out internal implementation details.

PROJECT: {project}
VERSION: {version}

COMMITS:
{commits_text}

Respond with JSON in exactly this shape:
{{
    "title": "Short headline for the release, e.g. 'Faster Sync & Bug Fixes'",
    "summary": "One or two sentences describing the release as a whole",
    "changes": {{
        "features": ["New capabilities users can now use"],
        "bugfixes": ["Problems that are now fixed, described by the fix"],
        "improvements": ["Enhancements to existing behaviour"],
        "breaking": ["Changes users must act on when upgrading"]
    }}
}}

RULES:
1. Write for END USERS and describe the benefit to them, not the code change.
2. Merge related commits into a single entry.
3. Skip refactoring, test and documentation commits unless users would notice the change.
4. Keep every entry to one clear sentence.
5. Use an empty array for any category without entries.
6. Start entries with an action verb such as "Added", "Fixed", "Improved" or "Removed".

Return ONLY raw JSON with no markdown fences and no commentary."#
    )
}
