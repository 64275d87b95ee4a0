//! App credential extraction from the public web player bundle.
//!
//! Qobuz does not document its app id / app secret; both are recovered by
//! scraping the web player. The pipeline:
//!
//! 1. Fetch `https://play.qobuz.com/login` and locate the versioned
//!    `/resources/<ver>/bundle.js` script reference.
//! 2. Fetch the bundle as text.
//! 3. Match the 9-digit app id inside the production config object. The
//!    pattern also matches an adjacent 32-character `appSecret` literal,
//!    which anchors the match but is **discarded**: the real secret comes
//!    from the seed pipeline below, mirroring the upstream bundle layout.
//! 4. Collect `(seed, timezone)` pairs from `initialSeed` declarations into
//!    insertion-ordered buckets.
//! 5. Swap the first two buckets ([`swap_leading_pair`]). The bundle's
//!    obfuscation encodes the candidates in this order, and the final
//!    secret is read from the *last* bucket, so the swap is load-bearing.
//! 6. Match `(timezone, info, extras)` triples against the capitalized
//!    bucket names and append `info` then `extras` to each bucket.
//! 7. Per bucket: concatenate, drop the trailing 44 characters,
//!    base64-decode. Candidates that fail to decode are dropped silently.
//! 8. The last surviving candidate is the secret.

use crate::error::{QobuzError, Result};
use base64::{Engine, engine::general_purpose::STANDARD as B64};
use indexmap::IndexMap;
use regex::Regex;
use reqwest::blocking::Client;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Web player origin the credentials are scraped from.
pub const PORTAL_BASE: &str = "https://play.qobuz.com";

static BUNDLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<script src="(/resources/\d+\.\d+\.\d+-[a-z]\d{3}/bundle\.js)"></script>"#)
        .unwrap()
});
static APP_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"production:\{api:\{appId:"(\d{9})",appSecret:"(\w{32})"#).unwrap());
static SEED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[a-z]\.initialSeed\("([\w=]+)",window\.utimezone\.([a-z]+)\)"#).unwrap()
});

/// Template for the info/extras pattern; `{timezones}` is replaced with an
/// alternation of the capitalized bucket names.
const INFO_EXTRAS_TEMPLATE: &str = r#"name:"\w+/({timezones})",info:"([\w=]+)",extras:"([\w=]+)""#;

/// Concatenated buckets carry this many trailing characters of filler that
/// must be stripped before base64 decoding.
const CANDIDATE_TAIL_LEN: usize = 44;

/// The app id / secret pair the API backend validates requests against.
///
/// Treated as valid for the process lifetime; there is no re-extraction or
/// expiry handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppCredentials {
    /// 9-digit application identifier.
    pub app_id: String,
    /// Signing secret for sensitive endpoints.
    pub secret: String,
}

/// Scrape the web player and return the active app credentials.
///
/// Issues two GETs against `portal_base` (the login page, then the bundle).
///
/// # Errors
///
/// [`QobuzError::Extraction`] if either fetch returns a non-2xx status, the
/// bundle reference or app id pattern is absent, or no secret candidate
/// survives decoding. Network-level failures surface as
/// [`QobuzError::Http`].
pub fn fetch_app_credentials(http: &Client, portal_base: &str) -> Result<AppCredentials> {
    let login_page = fetch_text(http, &format!("{portal_base}/login"))?;
    let bundle_path = find_bundle_path(&login_page)
        .ok_or_else(|| QobuzError::Extraction("bundle reference not found in login page".into()))?;
    debug!("found bundle at {bundle_path}");

    let bundle = fetch_text(http, &format!("{portal_base}{bundle_path}"))?;
    let app_id = extract_app_id(&bundle)?;
    let mut candidates = extract_secrets(&bundle)?;
    debug!("extracted app id {app_id}, {} secret candidate(s)", candidates.len());

    let secret = candidates
        .pop()
        .ok_or_else(|| QobuzError::Extraction("no secret candidate survived decoding".into()))?;
    Ok(AppCredentials { app_id, secret })
}

fn fetch_text(http: &Client, url: &str) -> Result<String> {
    let resp = http.get(url).send()?;
    let status = resp.status();
    if !status.is_success() {
        return Err(QobuzError::Extraction(format!(
            "{url} returned status {}",
            status.as_u16()
        )));
    }
    Ok(resp.text()?)
}

/// Locate the versioned bundle path referenced by the login page.
fn find_bundle_path(login_page: &str) -> Option<&str> {
    BUNDLE_RE
        .captures(login_page)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Extract the 9-digit app id from the bundle's production config.
///
/// The adjacent 32-character secret literal is required for the pattern to
/// match but is never used as the signing secret.
fn extract_app_id(bundle: &str) -> Result<String> {
    APP_ID_RE
        .captures(bundle)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
        .ok_or_else(|| QobuzError::Extraction("app id not found in bundle".into()))
}

/// Run the seed/info/extras pipeline and return every successfully decoded
/// secret candidate, in bucket order. The authoritative secret is the last
/// element; an empty vector means extraction failed upstream.
fn extract_secrets(bundle: &str) -> Result<Vec<String>> {
    let mut buckets = seed_buckets(bundle);
    let order = bucket_order(&buckets);
    append_info_extras(bundle, &order, &mut buckets)?;
    Ok(decode_candidates(&order, &buckets))
}

/// Collect `initialSeed` declarations into insertion-ordered buckets,
/// keyed by timezone name. Each bucket starts with its seed string.
fn seed_buckets(bundle: &str) -> IndexMap<String, Vec<String>> {
    let mut buckets = IndexMap::new();
    for caps in SEED_RE.captures_iter(bundle) {
        let seed = caps[1].to_owned();
        let timezone = caps[2].to_owned();
        buckets.insert(timezone, vec![seed]);
    }
    buckets
}

/// Bucket iteration order: insertion order with the first two entries
/// swapped. Later steps are order-sensitive (the secret is read from the
/// last bucket), so the swap must be replicated exactly.
fn bucket_order(buckets: &IndexMap<String, Vec<String>>) -> Vec<String> {
    let mut order: Vec<String> = buckets.keys().cloned().collect();
    swap_leading_pair(&mut order);
    order
}

/// Swap the first two timezone buckets, when at least two exist.
fn swap_leading_pair(order: &mut [String]) {
    if order.len() >= 2 {
        order.swap(0, 1);
    }
}

/// Match `(timezone, info, extras)` triples against the capitalized bucket
/// names and append both strings to the owning bucket, info first.
fn append_info_extras(
    bundle: &str,
    order: &[String],
    buckets: &mut IndexMap<String, Vec<String>>,
) -> Result<()> {
    let alternation = order
        .iter()
        .map(|tz| capitalize(tz))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = INFO_EXTRAS_TEMPLATE.replace("{timezones}", &alternation);
    let re = Regex::new(&pattern)
        .map_err(|e| QobuzError::Extraction(format!("info/extras pattern: {e}")))?;

    for caps in re.captures_iter(bundle) {
        let timezone = caps[1].to_lowercase();
        if let Some(bucket) = buckets.get_mut(&timezone) {
            bucket.push(caps[2].to_owned());
            bucket.push(caps[3].to_owned());
        }
    }
    Ok(())
}

/// Concatenate each bucket, strip the filler tail, and base64-decode.
/// Candidates that are too short or fail to decode are dropped; that is
/// expected for some buckets and not an error.
fn decode_candidates(order: &[String], buckets: &IndexMap<String, Vec<String>>) -> Vec<String> {
    let mut candidates = Vec::new();
    for timezone in order {
        let Some(parts) = buckets.get(timezone) else {
            continue;
        };
        let joined = parts.concat();
        if joined.len() <= CANDIDATE_TAIL_LEN {
            continue;
        }
        let trimmed = &joined[..joined.len() - CANDIDATE_TAIL_LEN];
        match B64.decode(trimmed).map(String::from_utf8) {
            Ok(Ok(secret)) => candidates.push(secret),
            _ => warn!("dropping undecodable secret candidate for {timezone}"),
        }
    }
    candidates
}

/// ASCII-capitalize the first character, matching how the bundle spells
/// timezone names in its `name:` declarations.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Two timezone buckets; each concatenation is a 44-char base64 payload
    // followed by 44 chars of filler. Insertion order is [berlin, london],
    // swapped to [london, berlin], so berlin supplies the secret.
    const FIXTURE_BUNDLE: &str = concat!(
        r#"production:{api:{appId:"123456789",appSecret:"a1b2c3d4e5f60718293a4b5c6d7e8f90"}},"#,
        r#"h.initialSeed("NGQ4ZjZlMmI5MGExM2M1ZDdlOGY5YT",window.utimezone.berlin),"#,
        r#"g.initialSeed("ZmZlZWRkY2NiYmFhOTk4ODc3NjY1NT",window.utimezone.london),"#,
        r#"{name:"Europe/Berlin",info:"BiMWMyZDNlNGY=AAAAAAAAAAAAAAAA",extras:"AAAAAAAAAAAAAAAAAAAAAAAAAAAA"},"#,
        r#"{name:"Europe/London",info:"Q0MzMyMjExMDA=AAAAAAAAAAAAAAAA",extras:"AAAAAAAAAAAAAAAAAAAAAAAAAAAA"}"#,
    );

    const EXPECTED_SECRET: &str = "4d8f6e2b90a13c5d7e8f9a0b1c2d3e4f";

    #[test]
    fn finds_bundle_path_in_login_page() {
        let html = r#"<html><script src="/resources/7.1.2-b011/bundle.js"></script></html>"#;
        assert_eq!(
            find_bundle_path(html),
            Some("/resources/7.1.2-b011/bundle.js")
        );
        assert_eq!(find_bundle_path("<html></html>"), None);
    }

    #[test]
    fn extracts_nine_digit_app_id() {
        let app_id = extract_app_id(FIXTURE_BUNDLE).unwrap();
        assert_eq!(app_id, "123456789");
    }

    #[test]
    fn missing_app_id_is_an_extraction_error() {
        let err = extract_app_id("no config here").unwrap_err();
        assert!(matches!(err, QobuzError::Extraction(_)));
    }

    #[test]
    fn adjacent_secret_literal_is_not_the_secret() {
        let secrets = extract_secrets(FIXTURE_BUNDLE).unwrap();
        assert!(
            !secrets.contains(&"a1b2c3d4e5f60718293a4b5c6d7e8f90".to_owned()),
            "the appSecret literal next to the app id must be discarded"
        );
    }

    #[test]
    fn swap_leading_pair_reorders_buckets() {
        let mut order = vec!["berlin".to_owned(), "london".to_owned(), "paris".to_owned()];
        swap_leading_pair(&mut order);
        assert_eq!(order, ["london", "berlin", "paris"]);

        let mut single = vec!["berlin".to_owned()];
        swap_leading_pair(&mut single);
        assert_eq!(single, ["berlin"]);
    }

    #[test]
    fn last_bucket_in_swapped_order_supplies_the_secret() {
        let secrets = extract_secrets(FIXTURE_BUNDLE).unwrap();
        assert_eq!(
            secrets,
            [
                "ffeeddccbbaa99887766554433221100".to_owned(),
                EXPECTED_SECRET.to_owned(),
            ]
        );
        assert_eq!(secrets.last().map(String::as_str), Some(EXPECTED_SECRET));
    }

    #[test]
    fn undecodable_candidates_are_dropped_silently() {
        // The london bucket gets a truncated info string: its concatenation
        // is no longer valid base64 after the tail strip, so only berlin
        // survives.
        let bundle = concat!(
            r#"h.initialSeed("NGQ4ZjZlMmI5MGExM2M1ZDdlOGY5YT",window.utimezone.berlin),"#,
            r#"g.initialSeed("ZmZlZWRkY2NiYmFhOTk4ODc3NjY1NT",window.utimezone.london),"#,
            r#"{name:"Europe/Berlin",info:"BiMWMyZDNlNGY=AAAAAAAAAAAAAAAA",extras:"AAAAAAAAAAAAAAAAAAAAAAAAAAAA"},"#,
            r#"{name:"Europe/London",info:"Q0M=AAAAAAAAAAAAAAAA",extras:"AAAAAAAAAAAAAAAAAAAAAAAAAAAA"}"#,
        );
        let secrets = extract_secrets(bundle).unwrap();
        assert_eq!(secrets, [EXPECTED_SECRET.to_owned()]);
    }

    #[test]
    fn bundle_without_seeds_yields_no_candidates() {
        let secrets = extract_secrets("nothing to see").unwrap();
        assert!(secrets.is_empty());
    }

    #[test]
    fn capitalize_is_ascii_title_case() {
        assert_eq!(capitalize("berlin"), "Berlin");
        assert_eq!(capitalize(""), "");
    }
}
