//! One-shot flash messages carried in a cookie.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use super::dto::FlashMessage;

/// Name of the flash cookie.
pub const FLASH_COOKIE: &str = "eforice_flash";

/// Cookie carrying `category:message`, percent-encoded.
pub fn flash_cookie(category: &str, message: &str) -> Cookie<'static> {
    let value = urlencoding::encode(&format!("{category}:{message}")).into_owned();
    Cookie::build((FLASH_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Decode a flash cookie value.
pub fn decode_flash(value: &str) -> Option<FlashMessage> {
    let decoded = urlencoding::decode(value).ok()?;
    let (category, message) = decoded.split_once(':')?;
    if message.is_empty() {
        return None;
    }
    Some(FlashMessage {
        category: category.to_string(),
        message: message.to_string(),
    })
}

/// Take the pending flash message out of the jar.
///
/// The returned jar removes the cookie from the client.
pub fn take_flash(jar: CookieJar) -> (CookieJar, Option<FlashMessage>) {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return (jar, None);
    };
    let flash = decode_flash(cookie.value());
    let jar = jar.remove(Cookie::build(FLASH_COOKIE).path("/"));
    (jar, flash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_cookie_roundtrip() {
        let cookie = flash_cookie("info", "Please log in: now");
        assert_eq!(cookie.name(), FLASH_COOKIE);
        assert!(!cookie.value().contains(' '));

        let flash = decode_flash(cookie.value()).unwrap();
        assert_eq!(flash.category, "info");
        assert_eq!(flash.message, "Please log in: now");
    }

    #[test]
    fn test_decode_flash_malformed() {
        assert!(decode_flash("no-separator").is_none());
        assert!(decode_flash("info%3A").is_none());
    }

    #[test]
    fn test_take_flash() {
        let jar = CookieJar::new().add(flash_cookie("info", "hello"));
        let (jar, flash) = take_flash(jar);

        assert_eq!(flash.unwrap().message, "hello");
        assert!(jar.get(FLASH_COOKIE).is_none());

        let (_, flash) = take_flash(jar);
        assert!(flash.is_none());
    }
}
