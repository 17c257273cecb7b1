use std::cmp::Ordering;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use reqwest::Url;
use sha2::{Digest, Sha256};

use crate::types::ArtistAggregate;

/// Unreserved characters allowed in a PKCE code verifier (RFC 7636).
const VERIFIER_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";

const BANDCAMP_SEARCH_URL: &str = "https://bandcamp.com/search";

/// Generates a PKCE code verifier.
///
/// 128 characters drawn from the unreserved alphabet of RFC 7636
/// (`A-Z a-z 0-9 - . _ ~`), the maximum length the RFC allows.
///
/// # Example
///
/// ```
/// let verifier = generate_code_verifier();
/// assert_eq!(verifier.len(), 128);
/// ```
pub fn generate_code_verifier() -> String {
    let mut rng = rand::rng();
    (0..128)
        .map(|_| VERIFIER_ALPHABET[rng.random_range(0..VERIFIER_ALPHABET.len())] as char)
        .collect()
}

/// Derives the S256 code challenge for `verifier`.
///
/// The challenge is the SHA-256 digest of the verifier, base64url encoded
/// without padding, which always gives 43 characters.
///
/// # Arguments
///
/// - `verifier` - The code verifier persisted for the token exchange
///
/// # Example
///
/// ```
/// let challenge = generate_code_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk");
/// assert_eq!(challenge, "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM");
/// ```
pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Anti-replay value sent along with the authorization request.
pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect()
}

/// Pulls the authorization code out of user input.
///
/// # Arguments
///
/// - `raw_input` - Either the full redirect URL the browser landed on or the
///   bare code, with surrounding whitespace allowed
///
/// # Behavior
///
/// - A URL with a host yields its `code` query parameter, or `None` when the
///   parameter is missing or empty
/// - Anything else is taken literally after trimming
/// - Blank input yields `None`
///
/// # Example
///
/// ```
/// let code = extract_authorization_code("http://127.0.0.1:8888/callback?code=AQB&state=x");
/// assert_eq!(code.as_deref(), Some("AQB"));
/// assert_eq!(extract_authorization_code(" AQB ").as_deref(), Some("AQB"));
/// ```
pub fn extract_authorization_code(raw_input: &str) -> Option<String> {
    let input = raw_input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(url) = Url::parse(input) {
        if url.has_host() {
            return url
                .query_pairs()
                .find(|(key, _)| key == "code")
                .map(|(_, value)| value.trim().to_string())
                .filter(|code| !code.is_empty());
        }
    }

    Some(input.to_string())
}

/// Builds the Bandcamp artist search for `artist_name`.
///
/// The name is quoted for an exact match and the search is limited to
/// artists and labels (`item_type=b`).
///
/// # Example
///
/// ```
/// assert_eq!(
///     bandcamp_search_url("Sun Kil Moon"),
///     "https://bandcamp.com/search?q=%22Sun+Kil+Moon%22&item_type=b"
/// );
/// ```
pub fn bandcamp_search_url(artist_name: &str) -> String {
    let query = format!("\"{}\"", artist_name);
    match Url::parse_with_params(
        BANDCAMP_SEARCH_URL,
        &[("q", query.as_str()), ("item_type", "b")],
    ) {
        Ok(url) => url.to_string(),
        Err(_) => BANDCAMP_SEARCH_URL.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ArtistSort {
    /// Most saved tracks first
    #[default]
    Count,
    /// Alphabetical
    Name,
}

/// Sorts artists for display.
///
/// [`ArtistSort::Count`] puts the most saved tracks first and breaks ties by
/// name; [`ArtistSort::Name`] sorts alphabetically. Names compare
/// case-insensitively.
pub fn sort_artists(artists: &mut [ArtistAggregate], sort: ArtistSort) {
    artists.sort_by(|a, b| match sort {
        ArtistSort::Count => match b.saved_count.cmp(&a.saved_count) {
            Ordering::Equal => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            other => other,
        },
        ArtistSort::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
    });
}

/// Case-insensitive substring filter on the artist name.
pub fn filter_artists(artists: &mut Vec<ArtistAggregate>, search: &str) {
    let search_term = search.trim().to_lowercase();
    if search_term.is_empty() {
        return;
    }
    artists.retain(|a| a.name.to_lowercase().contains(&search_term));
}
