use crate::escape::escape_html;
use crate::types::Emoji;

/// Replace `:shortcode:` tokens in post HTML with inline emoji images.
///
/// Emojis are applied in list order and only the first occurrence of each
/// shortcode is replaced; later repeats of the same token stay literal text.
pub fn substitute_emojis(content: &str, emojis: &[Emoji]) -> String {
    emojis
        .iter()
        .filter(|emoji| !emoji.shortcode.is_empty())
        .fold(content.to_string(), |text, emoji| {
            let token = format!(":{}:", emoji.shortcode);
            text.replacen(&token, &emoji_img(emoji), 1)
        })
}

fn emoji_img(emoji: &Emoji) -> String {
    format!(
        "<img src=\"{}\" alt=\":{}:\" class=\"feditag-emoji\">",
        escape_html(emoji.url.as_str()),
        escape_html(emoji.shortcode.as_str())
    )
}
