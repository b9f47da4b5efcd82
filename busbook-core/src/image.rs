//! Bus photo loading with fallbacks.
//!
//! Photos hosted on Google Drive often fail to load directly, so a Drive
//! photo is tried through the backend's caching proxy first, then as a direct
//! `uc?export=view` link, then as a thumbnail. Each attempt gets a fixed time
//! budget; a slot ends up [`ImageStatus::Loaded`] or [`ImageStatus::Error`].
use crate::api::IMAGE_PROXY_PATH;
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;

/// Attempts per slot before giving up.
pub const MAX_ATTEMPTS: u8 = 3;

static DRIVE_HOST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://(?:drive|docs)\.google\.com/").expect("valid drive host pattern")
});
static DRIVE_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:/file/d/|/d/|[?&]id=)([A-Za-z0-9_-]{10,})").expect("valid drive id pattern")
});

/// Where a photo lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Drive { file_id: String },
    Direct { url: String },
}

impl ImageSource {
    /// Tag a URL as Drive-hosted (when a file id can be read from it) or direct.
    #[must_use]
    pub fn classify(url: &str) -> Self {
        let url = url.trim();
        if DRIVE_HOST.is_match(url)
            && let Some(caps) = DRIVE_ID.captures(url)
        {
            return Self::Drive {
                file_id: caps[1].to_string(),
            };
        }
        Self::Direct {
            url: url.to_string(),
        }
    }

    /// How many URLs this source can be loaded from.
    #[must_use]
    pub fn candidates(&self) -> u8 {
        match self {
            Self::Drive { .. } => u8::try_from(DRIVE_FALLBACKS.len()).unwrap_or(MAX_ATTEMPTS),
            Self::Direct { .. } => 1,
        }
    }
}

/// How a Drive file id becomes a loadable URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageTransform {
    Proxy,
    DirectLink,
    Thumbnail,
}

/// Drive transforms in the order they are tried.
pub const DRIVE_FALLBACKS: [ImageTransform; 3] = [
    ImageTransform::Proxy,
    ImageTransform::DirectLink,
    ImageTransform::Thumbnail,
];

impl ImageTransform {
    /// URL for `file_id`. `cache_token` busts intermediary caches on the
    /// proxy route.
    #[must_use]
    pub fn drive_url(self, file_id: &str, api_base: &str, cache_token: &str) -> String {
        match self {
            Self::Proxy => format!("{api_base}{IMAGE_PROXY_PATH}?id={file_id}&t={cache_token}"),
            Self::DirectLink => format!("https://drive.google.com/uc?export=view&id={file_id}"),
            Self::Thumbnail => format!("https://drive.google.com/thumbnail?id={file_id}&sz=w1000"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStatus {
    Loading,
    Loaded,
    Error,
}

/// A cache-busting token: the current time in milliseconds followed by six
/// random digits.
#[must_use]
pub fn cache_token(now_ms: u64, rng: &mut impl Rng) -> String {
    format!("{now_ms}{:06}", rng.gen_range(0..1_000_000_u32))
}

/// Load state for one photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSlot {
    source: ImageSource,
    attempt: u8,
    status: ImageStatus,
    fallbacks: u8,
    cache_token: String,
}

impl ImageSlot {
    #[must_use]
    pub fn new(source: ImageSource, cache_token: String) -> Self {
        Self {
            source,
            attempt: 0,
            status: ImageStatus::Loading,
            fallbacks: 0,
            cache_token,
        }
    }

    #[must_use]
    pub const fn source(&self) -> &ImageSource {
        &self.source
    }

    #[must_use]
    pub const fn attempt(&self) -> u8 {
        self.attempt
    }

    #[must_use]
    pub const fn status(&self) -> ImageStatus {
        self.status
    }

    /// How many times the slot moved on to a later transform.
    #[must_use]
    pub const fn fallback_transitions(&self) -> u8 {
        self.fallbacks
    }

    fn attempt_limit(&self) -> u8 {
        self.source.candidates().min(MAX_ATTEMPTS)
    }

    /// The Drive transform in use; `None` for direct photos.
    #[must_use]
    pub fn current_transform(&self) -> Option<ImageTransform> {
        match self.source {
            ImageSource::Drive { .. } => DRIVE_FALLBACKS.get(usize::from(self.attempt)).copied(),
            ImageSource::Direct { .. } => None,
        }
    }

    /// URL for the current attempt; `None` once the slot has failed.
    #[must_use]
    pub fn current_url(&self, api_base: &str) -> Option<String> {
        if self.status == ImageStatus::Error {
            return None;
        }
        match &self.source {
            ImageSource::Drive { file_id } => self
                .current_transform()
                .map(|t| t.drive_url(file_id, api_base, &self.cache_token)),
            ImageSource::Direct { url } => (self.attempt == 0).then(|| url.clone()),
        }
    }

    /// The image for `attempt` finished loading. Events for stale attempts are
    /// ignored; returns whether the event was applied.
    pub fn on_loaded(&mut self, attempt: u8) -> bool {
        if attempt != self.attempt || self.status != ImageStatus::Loading {
            return false;
        }
        self.status = ImageStatus::Loaded;
        true
    }

    /// The image for `attempt` failed or timed out: advance to the next
    /// transform or give up. Stale events leave the slot untouched.
    pub fn on_failed(&mut self, attempt: u8) -> ImageStatus {
        if attempt != self.attempt || self.status != ImageStatus::Loading {
            return self.status;
        }
        if self.attempt + 1 < self.attempt_limit() {
            self.attempt += 1;
            self.fallbacks += 1;
            log::debug!(
                "image fallback to {:?} (attempt {})",
                self.current_transform(),
                self.attempt + 1
            );
        } else {
            log::warn!("image failed after {} attempts", self.attempt + 1);
            self.status = ImageStatus::Error;
        }
        self.status
    }

    /// Manual retry: back to the first transform with a fresh cache token.
    pub fn retry(&mut self, cache_token: String) {
        self.attempt = 0;
        self.fallbacks = 0;
        self.status = ImageStatus::Loading;
        self.cache_token = cache_token;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const DRIVE_URL: &str = "https://drive.google.com/file/d/1AbCdEfGhIjKlMnOp/view?usp=sharing";
    const API: &str = "http://api.test";

    #[test]
    fn classifies_drive_and_direct_urls() {
        assert_eq!(
            ImageSource::classify(DRIVE_URL),
            ImageSource::Drive {
                file_id: "1AbCdEfGhIjKlMnOp".into()
            }
        );
        assert_eq!(
            ImageSource::classify("https://drive.google.com/open?id=1AbCdEfGhIjKlMnOp"),
            ImageSource::Drive {
                file_id: "1AbCdEfGhIjKlMnOp".into()
            }
        );
        assert_eq!(
            ImageSource::classify("https://cdn.test/bus.jpg"),
            ImageSource::Direct {
                url: "https://cdn.test/bus.jpg".into()
            }
        );
    }

    #[test]
    fn drive_transforms_run_proxy_direct_thumbnail() {
        let mut slot = ImageSlot::new(ImageSource::classify(DRIVE_URL), "tok".into());
        assert_eq!(
            slot.current_url(API).unwrap(),
            "http://api.test/api/bus/image-proxy?id=1AbCdEfGhIjKlMnOp&t=tok"
        );
        slot.on_failed(0);
        assert!(slot.current_url(API).unwrap().contains("uc?export=view"));
        slot.on_failed(1);
        assert!(slot.current_url(API).unwrap().contains("thumbnail?id="));
        assert_eq!(slot.current_transform(), Some(ImageTransform::Thumbnail));
    }

    #[test]
    fn thumbnail_success_after_two_fallbacks() {
        let mut slot = ImageSlot::new(ImageSource::classify(DRIVE_URL), "tok".into());
        assert_eq!(slot.on_failed(0), ImageStatus::Loading);
        assert_eq!(slot.on_failed(1), ImageStatus::Loading);
        assert!(slot.on_loaded(2));
        assert_eq!(slot.status(), ImageStatus::Loaded);
        assert_eq!(slot.fallback_transitions(), 2);
    }

    #[test]
    fn gives_up_after_three_attempts_and_retry_resets() {
        let mut slot = ImageSlot::new(ImageSource::classify(DRIVE_URL), "tok".into());
        slot.on_failed(0);
        slot.on_failed(1);
        assert_eq!(slot.on_failed(2), ImageStatus::Error);
        assert_eq!(slot.current_url(API), None);

        slot.retry("fresh".into());
        assert_eq!(slot.attempt(), 0);
        assert_eq!(slot.status(), ImageStatus::Loading);
        assert!(slot.current_url(API).unwrap().ends_with("t=fresh"));
    }

    #[test]
    fn stale_events_are_ignored() {
        let mut slot = ImageSlot::new(ImageSource::classify(DRIVE_URL), "tok".into());
        slot.on_failed(0);
        // A late timeout for the proxy attempt must not skip the direct link.
        assert_eq!(slot.on_failed(0), ImageStatus::Loading);
        assert_eq!(slot.attempt(), 1);
        assert!(!slot.on_loaded(0));
        assert_eq!(slot.status(), ImageStatus::Loading);
    }

    #[test]
    fn direct_images_get_a_single_attempt() {
        let mut slot = ImageSlot::new(ImageSource::classify("https://cdn.test/a.png"), "t".into());
        assert_eq!(slot.current_url(API).as_deref(), Some("https://cdn.test/a.png"));
        assert_eq!(slot.current_transform(), None);
        assert_eq!(slot.source().candidates(), 1);
        assert_eq!(slot.on_failed(0), ImageStatus::Error);
    }

    #[test]
    fn cache_tokens_combine_time_and_randomness() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let token = cache_token(1_700_000_000_000, &mut rng);
        assert!(token.starts_with("1700000000000"));
        assert_eq!(token.len(), 13 + 6);
    }
}
