//! `draftpress generate` — Expand one draft into a post.

use chrono::Utc;
use clap::Args;
use draftpress_config::AppConfig;
use draftpress_core::{AuthorProfile, Draft, GeneratedPost, Result};
use draftpress_pipeline::Pipeline;
use draftpress_providers::{ProviderClient, RetryPolicy, RetryingProvider};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Draft file to expand (markdown or plain text)
    #[arg(long)]
    pub draft: PathBuf,

    /// Author profile (defaults to `paths.profile` from the settings file)
    #[arg(long)]
    pub profile: Option<PathBuf>,

    /// Output directory (defaults to `paths.output_dir` from the settings file)
    #[arg(long)]
    pub outdir: Option<PathBuf>,

    /// Provider to use instead of AI_PROVIDER or the first available key
    #[arg(long)]
    pub provider: Option<String>,

    /// Print the generated post instead of writing it
    #[arg(long)]
    pub dry_run: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: GenerateArgs, config: &AppConfig) -> Result<ExitCode> {
    let draft = Draft::load(&args.draft)?;
    let profile = AuthorProfile::load(profile_path(&args, config))?;

    let provider_config = config.resolve_provider(args.provider.as_deref())?;
    let client = ProviderClient::from_config(
        &provider_config,
        Duration::from_secs(config.generation.timeout_secs),
    )?;
    let provider = RetryingProvider::new(client, RetryPolicy::from_config(&config.generation));

    let mut pipeline = Pipeline::from_config(provider, config);
    if let Some(outdir) = &args.outdir {
        pipeline = pipeline.with_output_dir(outdir);
    }

    let now = Utc::now();
    if args.dry_run {
        let post = pipeline.draft_post(&draft, &profile, now).await?;
        print!("{}", render_dry_run(&post, args.json));
        return Ok(ExitCode::SUCCESS);
    }

    let path = pipeline.run(&draft, &profile, now).await?;
    println!("{}", render_written(&path, args.json));
    Ok(ExitCode::SUCCESS)
}

fn profile_path<'a>(args: &'a GenerateArgs, config: &'a AppConfig) -> &'a Path {
    args.profile.as_deref().unwrap_or(&config.paths.profile)
}

fn render_written(path: &Path, json: bool) -> String {
    if json {
        serde_json::json!({ "generated_post": path.display().to_string() }).to_string()
    } else {
        path.display().to_string()
    }
}

fn render_dry_run(post: &GeneratedPost, json: bool) -> String {
    if json {
        let value = serde_json::json!({
            "frontmatter": post.frontmatter,
            "body": post.body,
            "document": post.to_markdown(),
        });
        format!("{value}\n")
    } else {
        post.to_markdown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use draftpress_core::Frontmatter;

    fn args(profile: Option<&str>) -> GenerateArgs {
        GenerateArgs {
            draft: PathBuf::from("drafts/final.md"),
            profile: profile.map(PathBuf::from),
            outdir: None,
            provider: None,
            dry_run: false,
            json: false,
        }
    }

    fn post() -> GeneratedPost {
        GeneratedPost {
            frontmatter: Frontmatter {
                title: "Chasing 169".into(),
                summary: "Team B chased it down.".into(),
                date: NaiveDate::from_ymd_opt(2024, 5, 26).unwrap(),
                tags: Default::default(),
                draft_source: "drafts/final.md".into(),
                extra: Default::default(),
            },
            body: "Team B won.".into(),
        }
    }

    #[test]
    fn profile_flag_overrides_config() {
        let config = AppConfig::default();
        assert_eq!(
            profile_path(&args(None), &config),
            Path::new("config/author_profile.md")
        );
        assert_eq!(
            profile_path(&args(Some("me.md")), &config),
            Path::new("me.md")
        );
    }

    #[test]
    fn written_path_as_json() {
        let path = Path::new("generated_posts/2024-05-26-chasing-169.md");
        let out = render_written(path, true);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["generated_post"], "generated_posts/2024-05-26-chasing-169.md");
        assert_eq!(render_written(path, false), "generated_posts/2024-05-26-chasing-169.md");
    }

    #[test]
    fn dry_run_prints_document() {
        let text = render_dry_run(&post(), false);
        assert!(text.starts_with("---\ntitle: \"Chasing 169\"\n"));

        let value: serde_json::Value = serde_json::from_str(&render_dry_run(&post(), true)).unwrap();
        assert_eq!(value["frontmatter"]["date"], "2024-05-26");
        assert_eq!(value["body"], "Team B won.");
        assert_eq!(value["document"], post().to_markdown());
    }

    #[tokio::test]
    async fn missing_draft_is_reported_before_any_provider_call() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = args(None);
        a.draft = dir.path().join("missing.md");

        let err = run(a, &AppConfig::default()).await.unwrap_err();
        assert!(err.to_string().starts_with("Draft error:"));
    }

    #[tokio::test]
    async fn unknown_provider_flag_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let draft = dir.path().join("final.md");
        let profile = dir.path().join("profile.md");
        std::fs::write(&draft, "Team A 168/7 vs Team B 169/6").unwrap();
        std::fs::write(&profile, "- **Tone:** analytical").unwrap();

        let a = GenerateArgs {
            draft,
            profile: Some(profile),
            outdir: Some(dir.path().join("out")),
            provider: Some("mystery".into()),
            dry_run: false,
            json: false,
        };

        let err = run(a, &AppConfig::default()).await.unwrap_err();
        assert!(err.to_string().starts_with("Configuration error:"));
        assert!(!dir.path().join("out").exists());
    }
}
