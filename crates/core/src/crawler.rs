/// User-Agent substrings of social, search and link-preview crawlers.
///
/// Stored lower-case; matching lower-cases the User-Agent instead.
pub const CRAWLER_SIGNATURES: &[&str] = &[
    "facebookexternalhit",
    "linkedinbot",
    "twitterbot",
    "whatsapp",
    "skypeuripreview",
    "slackbot",
    "telegrambot",
    "googlebot",
    "bingbot",
    "yahoo! slurp",
    "discordbot",
    "embedly",
    "showyoubot",
    "outbrain",
    "pinterest/0.",
    "developers.google.com/+/web/snippet",
    "www.google.com/webmasters/tools/richsnippets",
    "tumblr",
    "bitlybot",
    "nuzzel",
    "vkshare",
    "w3c_validator",
    "redditbot",
    "applebot",
    "flipboard",
    "yandexbot",
    "duckduckbot",
];

/// Whether a User-Agent belongs to a crawler that should get the static
/// document.
///
/// An empty User-Agent is treated as a browser.
pub fn is_crawler(user_agent: &str) -> bool {
    if user_agent.is_empty() {
        return false;
    }

    let ua = user_agent.to_lowercase();
    CRAWLER_SIGNATURES.iter().any(|sig| ua.contains(sig))
}
