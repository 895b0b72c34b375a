//! User-Agent parsing.
//!
//! Signature matching over the lowercased User-Agent string, first rule
//! wins. Rule order matters: Chrome advertises Safari, Edge and Opera
//! advertise Chrome, iOS advertises Mac OS X, Android advertises Linux.
//!
//! The version is the first `\d[.\da-z]+` run after the matched signature,
//! allowing only `/`, whitespace, letters and `(` in between.

use serde::Serialize;

/// Components extracted from a User-Agent header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserAgent {
    /// The raw header value (empty if the header was absent).
    pub string: String,
    pub browser: Option<String>,
    pub version: Option<String>,
    pub language: Option<String>,
    pub platform: Option<String>,
}

const PLATFORMS: &[(&[&str], &str)] = &[
    (&[" cros "], "chromeos"),
    (&["iphone"], "iphone"),
    (&["ipad"], "ipad"),
    (&["darwin", "macintosh", "mac os", "os x"], "macos"),
    (&["win"], "windows"),
    (&["android"], "android"),
    (&["netbsd"], "netbsd"),
    (&["openbsd"], "openbsd"),
    (&["freebsd"], "freebsd"),
    (&["dragonfly"], "dragonflybsd"),
    (&["sunos", "i86os"], "solaris"),
    (&["x11", "linux"], "linux"),
    (&["nintendo wii"], "wii"),
    (&["irix"], "irix"),
    (&["hp-ux", "hpux"], "hpux"),
    (&["aix"], "aix"),
    (&["unix_sv"], "sco"),
    (&["bsd"], "bsd"),
    (&["amiga"], "amiga"),
    (&["blackberry", "playbook"], "blackberry"),
    (&["symbian"], "symbian"),
];

const BROWSERS: &[(&[&str], &str)] = &[
    (&["googlebot"], "google"),
    (&["msnbot"], "msn"),
    (&["yahoo"], "yahoo"),
    (&["ask jeeves"], "ask"),
    (&["aol", "america online browser"], "aol"),
    (&["opera", "opr"], "opera"),
    (&["edge", "edg"], "edge"),
    (&["chrome", "crios"], "chrome"),
    (&["seamonkey"], "seamonkey"),
    (&["firefox", "firebird", "phoenix", "iceweasel"], "firefox"),
    (&["galeon"], "galeon"),
    (&["safari", "version"], "safari"),
    (&["webkit"], "webkit"),
    (&["camino"], "camino"),
    (&["konqueror"], "konqueror"),
    (&["k-meleon"], "kmeleon"),
    (&["netscape"], "netscape"),
    (&["msie", "microsoft internet explorer", "trident/"], "msie"),
    (&["lynx"], "lynx"),
    (&["links"], "links"),
    (&["baiduspider"], "baidu"),
    (&["bingbot"], "bing"),
    (&["mozilla"], "mozilla"),
];

impl UserAgent {
    /// Parse a User-Agent header value.
    pub fn parse(raw: &str) -> Self {
        let lower = raw.to_ascii_lowercase();

        let platform = PLATFORMS
            .iter()
            .find(|(needles, _)| needles.iter().any(|n| lower.contains(n)))
            .map(|(_, name)| name.to_string());

        let (browser, version) = match BROWSERS
            .iter()
            .find_map(|(needles, name)| leftmost_match(&lower, needles).map(|end| (*name, end)))
        {
            Some((name, end)) => (Some(name.to_string()), version_after(raw, end)),
            None => (None, None),
        };

        Self {
            string: raw.to_string(),
            browser,
            version,
            language: language(raw),
            platform,
        }
    }
}

/// End offset of the leftmost occurrence of any needle.
fn leftmost_match(haystack: &str, needles: &[&str]) -> Option<usize> {
    needles
        .iter()
        .filter_map(|n| haystack.find(n).map(|start| (start, start + n.len())))
        .min_by_key(|(start, _)| *start)
        .map(|(_, end)| end)
}

fn version_after(raw: &str, offset: usize) -> Option<String> {
    let rest = raw.get(offset..)?;
    let start = rest.find(|c: char| !(c == '/' || c == '(' || c.is_whitespace() || c.is_ascii_alphabetic()))?;
    let candidate = &rest[start..];
    if !candidate.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    let len = candidate
        .find(|c: char| !(c == '.' || c.is_ascii_alphanumeric()))
        .unwrap_or(candidate.len());
    let version = &candidate[..len];
    // A single digit does not count as a version.
    (version.len() > 1).then(|| version.to_string())
}

/// Locale token such as `en` or `en-US` from the parenthesised section.
fn language(raw: &str) -> Option<String> {
    let open = raw.find('(')?;
    let close = raw[open..].find(')').map(|i| open + i)?;
    raw[open + 1..close]
        .split(';')
        .map(str::trim)
        .find(|token| is_locale(token))
        .map(str::to_string)
}

fn is_locale(token: &str) -> bool {
    let two_letters = |s: &str| s.len() == 2 && s.chars().all(|c| c.is_ascii_alphabetic());
    match token.split_once('-') {
        Some((lang, region)) => two_letters(lang) && two_letters(region),
        None => two_letters(token),
    }
}
