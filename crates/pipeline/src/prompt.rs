//! Prompt builder.
//!
//! Turns a draft and the author profile into a [`GenerationRequest`]. The
//! output is a pure function of its inputs: no timestamps, no randomness.

use draftpress_core::{AuthorProfile, Draft, GenerationRequest};

/// Fixed instructions sent with every request.
///
/// The frontmatter contract here is what the normalizer relies on.
pub const SYSTEM_INSTRUCTION: &str = "\
You are an expert technical blog writer. Expand the author's draft into a complete, \
publication-ready markdown blog post.

Output format:
- The first line of your response must be `---`. Write the frontmatter block next and close it with another `---` line.
- Inside the block write exactly these keys, one per line:
  title: \"a specific headline\"
  summary: \"one short sentence describing the post\"
  date: YYYY-MM-DD
  tags: [lowercase, short, tags]
  draft_source: the draft file name
- After the closing `---` write the markdown body.
- Do not wrap the response in a code fence. Do not add commentary before or after the post.

Content rules:
- Keep every fact, number and claim from the draft. Do not invent results.
- Copy every image and video link from the draft into the body verbatim, with the same URL and markdown syntax.
- Use `##` section headings and short paragraphs.

Tone:
- Write in the voice described by the author profile and follow its tone when one is given.
- Without a tone, write in a clear, conversational technical voice.";

const NO_PROFILE: &str = "(no author profile provided)";

/// Build the request for one draft.
pub fn build(draft: &Draft, profile: &AuthorProfile) -> GenerationRequest {
    let mut prompt = String::new();

    prompt.push_str("## Author profile\n\n");
    if profile.is_empty() {
        prompt.push_str(NO_PROFILE);
        prompt.push('\n');
    } else {
        for (key, value) in profile.ordered_fields() {
            if value.contains('\n') {
                prompt.push_str(&format!("{key}:\n{value}\n"));
            } else {
                prompt.push_str(&format!("{key}: {value}\n"));
            }
        }
    }

    prompt.push_str(&format!("\n## Draft `{}`\n\n", draft.file_name()));
    prompt.push_str(draft.text());
    if !draft.text().ends_with('\n') {
        prompt.push('\n');
    }

    GenerationRequest::new(SYSTEM_INSTRUCTION, prompt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use draftpress_core::frontmatter::DELIMITER;

    fn draft() -> Draft {
        Draft::new(
            "drafts/ipl-final.md",
            "# IPL Final\n\nTeam A 168/7 vs Team B 169/6\n\n![scorecard](https://img.example.com/s.png)\n\
             Highlights: https://youtu.be/abc123\n",
        )
    }

    fn profile() -> AuthorProfile {
        AuthorProfile::from_pairs([("name", "Nitin"), ("tone", "analytical"), ("links", "https://example.com")])
    }

    #[test]
    fn build_is_deterministic() {
        assert_eq!(build(&draft(), &profile()), build(&draft(), &profile()));
        assert_eq!(build(&draft(), &profile()).text(), build(&draft(), &profile()).text());
    }

    #[test]
    fn system_declares_delimiter_contract() {
        let request = build(&draft(), &profile());
        assert!(request.system.contains(&format!("first line of your response must be `{DELIMITER}`")));
        for field in draftpress_core::post::REQUIRED_FIELDS {
            assert!(request.system.contains(&format!("{field}:")), "missing {field}");
        }
    }

    #[test]
    fn prompt_carries_profile_fields_in_order() {
        let request = build(&draft(), &profile());
        let name = request.prompt.find("name: Nitin").unwrap();
        let tone = request.prompt.find("tone: analytical").unwrap();
        let links = request.prompt.find("links: https://example.com").unwrap();
        assert!(name < tone && tone < links);
    }

    #[test]
    fn draft_and_media_links_pass_through_verbatim() {
        let d = draft();
        let request = build(&d, &profile());
        assert!(request.prompt.contains(d.text()));
        assert!(request.prompt.contains("![scorecard](https://img.example.com/s.png)"));
        assert!(request.prompt.contains("https://youtu.be/abc123"));
        assert!(request.prompt.contains("## Draft `ipl-final.md`"));
    }

    #[test]
    fn empty_profile_is_stated() {
        let request = build(&draft(), &AuthorProfile::default());
        assert!(request.prompt.contains(NO_PROFILE));
    }

    #[test]
    fn multiline_profile_field_starts_on_its_own_line() {
        let profile = AuthorProfile::from_pairs([("projects", "- scorecard-bot\n- draftpress")]);
        let request = build(&draft(), &profile);
        assert!(request.prompt.contains("projects:\n- scorecard-bot\n- draftpress\n"));
    }
}
