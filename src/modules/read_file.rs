use log::debug;
use std::path::Path;

use super::{Context, Sample};
use crate::color::ColorTag;
use crate::placeholders::Placeholder;
use crate::utils::truncate_chars;

pub const PLACEHOLDERS: &[&str] = &["title", "content", "errno", "error"];

const DEFAULT_FORMAT: &str = "%title: %content";
const DEFAULT_FORMAT_BAD: &str = "%title - %errno: %error";
const DEFAULT_MAX_CHARACTERS: i64 = 255;

/// Contents of a file, newlines removed and cut at `max_characters`.
///
/// `%content` is untrusted.
pub fn collect<'a>(ctx: &Context<'a>) -> Sample<'a> {
    let path = ctx.option("path", ctx.title());
    let max_chars = usize::try_from(ctx.config.i64_or("max_characters", DEFAULT_MAX_CHARACTERS))
        .unwrap_or(0);

    // A UTF-8 character is at most 4 bytes
    match ctx.system.read_file(Path::new(path), max_chars.saturating_mul(4)) {
        Ok(raw) => {
            let content: String = raw.chars().filter(|c| *c != '\n').collect();
            let content = truncate_chars(&content, max_chars).to_string();
            Sample::new(
                ctx.option("format", DEFAULT_FORMAT),
                vec![
                    ctx.title_placeholder(),
                    Placeholder::untrusted("content", content),
                    Placeholder::new("errno", "0"),
                    Placeholder::new("error", ""),
                ],
            )
            .with_color(ColorTag::Good)
        }
        Err(e) => {
            debug!("Cannot read {}: {}", path, e);
            let errno = e.raw_os_error().unwrap_or(0);
            let error = e.to_string();
            let error = error
                .split(" (os error")
                .next()
                .unwrap_or_default()
                .to_string();
            Sample::new(
                ctx.option("format_bad", DEFAULT_FORMAT_BAD),
                vec![
                    ctx.title_placeholder(),
                    Placeholder::new("content", ""),
                    Placeholder::new("errno", errno.to_string()),
                    Placeholder::new("error", error),
                ],
            )
            .with_color(ColorTag::Bad)
        }
    }
}
