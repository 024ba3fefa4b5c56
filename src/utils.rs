const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
const TITLE_LIMIT: usize = 50;

/// Generates a unique ID for resolved media
pub fn generate_media_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Size label for downloaded media, e.g. "1.50 MB"
pub fn format_size_mb(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / BYTES_PER_MB)
}

/// One-decimal megabyte count used in progress messages
pub fn format_progress_mb(bytes: u64) -> String {
    format!("{:.1}MB", bytes as f64 / BYTES_PER_MB)
}

/// Cuts text to 50 characters, marking the cut with "...".
pub fn truncate_title(text: &str) -> String {
    if text.chars().count() > TITLE_LIMIT {
        let head: String = text.chars().take(TITLE_LIMIT).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

/// Last path segment of a URL, or `None` when it is empty
pub fn filename_from_url(url: &str) -> Option<String> {
    url.rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.to_string())
}

/// Sanitizes a filename by removing invalid characters
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
