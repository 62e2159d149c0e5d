use crate::domain::model::{BlogPost, GenerationRequest, KeywordSet};
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::OnceLock;

const FALLBACK_SLUG: &str = "post";

fn non_word() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\p{L}\p{N}]+").expect("slug pattern is valid"))
}

fn slug(text: &str) -> Option<String> {
    let lowered = text.to_lowercase();
    let slug = non_word().replace_all(&lowered, "-");
    let slug = slug.trim_matches('-');
    (!slug.is_empty()).then(|| slug.to_string())
}

/// Lowercased letters and digits from any script, joined by `-`.
pub fn slugify(title: &str) -> String {
    slug(title).unwrap_or_else(|| FALLBACK_SLUG.to_string())
}

/// Markdown with a YAML front-matter block. JSON string/array literals are valid YAML.
pub fn render_markdown(
    request: &GenerationRequest,
    keywords: &KeywordSet,
    post: &BlogPost,
    generated_at: DateTime<Utc>,
) -> Result<String> {
    Ok(format!(
        "---\ntitle: {}\nproduct: {}\ndate: {}\nkeywords: {}\n---\n\n# {}\n\n{}\n",
        serde_json::to_string(&post.title)?,
        serde_json::to_string(&request.subject_name)?,
        generated_at.format("%Y-%m-%d"),
        serde_json::to_string(keywords)?,
        post.title,
        post.body.trim_end()
    ))
}

/// Write the post as `<slug>.md` and return the file name. The slug comes
/// from the title, then the product name. An existing file is never
/// overwritten; `-2`, `-3`, ... is appended instead.
pub async fn export_markdown<S: Storage>(
    storage: &S,
    request: &GenerationRequest,
    keywords: &KeywordSet,
    post: &BlogPost,
) -> Result<String> {
    let stem = slug(&post.title)
        .or_else(|| slug(&request.subject_name))
        .unwrap_or_else(|| FALLBACK_SLUG.to_string());
    let file_name = free_file_name(storage, &stem).await;
    let document = render_markdown(request, keywords, post, Utc::now())?;

    tracing::debug!("Writing {} ({} bytes)", file_name, document.len());
    storage.write_file(&file_name, document.as_bytes()).await?;
    Ok(file_name)
}

async fn free_file_name<S: Storage>(storage: &S, stem: &str) -> String {
    let mut file_name = format!("{}.md", stem);
    let mut suffix = 2;
    while storage.read_file(&file_name).await.is_ok() {
        tracing::debug!("{} already exists", file_name);
        file_name = format!("{}-{}.md", stem, suffix);
        suffix += 1;
    }
    file_name
}
