//! Synthetic value generators backed by the `fake` crate
//!
//! A [`ValueGenerator`] produces structurally valid replacement values for one
//! locale. Generators are created through a [`GeneratorFactory`] so that the
//! scrubbers never depend on a concrete faker and tests can substitute a
//! deterministic one.

use fake::faker::internet::raw::Password;
use fake::faker::lorem::raw::{Paragraph, Sentence, Words};
use fake::faker::name::raw::{FirstName, LastName};
use fake::locales::{AR_SA, EN, FR_FR, JA_JP, PT_BR, ZH_CN, ZH_TW};
use fake::Fake;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha1::{Digest, Sha1};

/// Tag of the generator used for values with no locale dimension
pub const DEFAULT_TAG: &str = "en_US";

/// Source of synthetic replacement values for one locale
pub trait ValueGenerator: Send {
    /// Generator tag, e.g. `fr_FR`
    fn locale_tag(&self) -> &str;

    /// Given name
    fn first_name(&mut self) -> String;

    /// Family name
    fn last_name(&mut self) -> String;

    /// Email address on a reserved domain
    ///
    /// The local part carries a numeric suffix, so a long run of calls keeps
    /// producing fresh addresses instead of cycling through the name list.
    fn email(&mut self) -> String;

    /// One sentence
    fn sentence(&mut self) -> String;

    /// One paragraph
    fn paragraph(&mut self) -> String;

    /// Short multi-word phrase without terminal punctuation
    fn phrase(&mut self) -> String;

    /// Password-like string
    fn password(&mut self) -> String;

    /// Opaque hex token for API keys and client ids
    fn token(&mut self) -> String;

    /// Placeholder external identifier (an ORCID iD with a valid check digit)
    fn identifier(&mut self) -> String;

    /// Display name composed of given and family name
    fn full_name(&mut self) -> String {
        format!("{} {}", self.first_name(), self.last_name())
    }
}

/// Locales with a faker implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakerLocale {
    En,
    FrFr,
    PtBr,
    JaJp,
    ZhCn,
    ZhTw,
    ArSa,
}

impl FakerLocale {
    /// Every supported locale
    pub const ALL: [FakerLocale; 7] = [
        FakerLocale::En,
        FakerLocale::FrFr,
        FakerLocale::PtBr,
        FakerLocale::JaJp,
        FakerLocale::ZhCn,
        FakerLocale::ZhTw,
        FakerLocale::ArSa,
    ];

    /// Generator tag of this locale
    pub fn tag(&self) -> &'static str {
        match self {
            FakerLocale::En => "en_US",
            FakerLocale::FrFr => "fr_FR",
            FakerLocale::PtBr => "pt_BR",
            FakerLocale::JaJp => "ja_JP",
            FakerLocale::ZhCn => "zh_CN",
            FakerLocale::ZhTw => "zh_TW",
            FakerLocale::ArSa => "ar_SA",
        }
    }

    /// Looks a generator tag up, `None` when no faker exists for it
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.tag() == tag)
    }
}

/// Runs `$body` with `$data` bound to the `fake` locale data of `$locale`
macro_rules! with_locale {
    ($locale:expr, $data:ident => $body:expr) => {
        match $locale {
            FakerLocale::En => {
                let $data = EN;
                $body
            }
            FakerLocale::FrFr => {
                let $data = FR_FR;
                $body
            }
            FakerLocale::PtBr => {
                let $data = PT_BR;
                $body
            }
            FakerLocale::JaJp => {
                let $data = JA_JP;
                $body
            }
            FakerLocale::ZhCn => {
                let $data = ZH_CN;
                $body
            }
            FakerLocale::ZhTw => {
                let $data = ZH_TW;
                $body
            }
            FakerLocale::ArSa => {
                let $data = AR_SA;
                $body
            }
        }
    };
}

/// [`ValueGenerator`] drawing from `fake` locale data
pub struct FakerGenerator {
    locale: FakerLocale,
    rng: StdRng,
}

impl FakerGenerator {
    /// Generator seeded from OS entropy
    pub fn new(locale: FakerLocale) -> Self {
        Self {
            locale,
            rng: StdRng::from_entropy(),
        }
    }

    /// Generator with a fixed seed
    pub fn seeded(locale: FakerLocale, seed: u64) -> Self {
        Self {
            locale,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl ValueGenerator for FakerGenerator {
    fn locale_tag(&self) -> &str {
        self.locale.tag()
    }

    fn first_name(&mut self) -> String {
        with_locale!(self.locale, l => FirstName(l).fake_with_rng::<String, _>(&mut self.rng))
    }

    fn last_name(&mut self) -> String {
        with_locale!(self.locale, l => LastName(l).fake_with_rng::<String, _>(&mut self.rng))
    }

    fn email(&mut self) -> String {
        // Non-latin locales would produce non-ASCII local parts.
        let first: String = FirstName(EN).fake_with_rng(&mut self.rng);
        let last: String = LastName(EN).fake_with_rng(&mut self.rng);
        let suffix: u32 = self.rng.gen_range(1..1_000_000);
        let domain = EMAIL_DOMAINS[self.rng.gen_range(0..EMAIL_DOMAINS.len())];

        let names: Vec<String> = [first, last]
            .iter()
            .map(|name| ascii_slug(name))
            .filter(|slug| !slug.is_empty())
            .collect();
        let stem = if names.is_empty() {
            "user".to_string()
        } else {
            names.join(".")
        };
        format!("{stem}{suffix}@{domain}")
    }

    fn sentence(&mut self) -> String {
        with_locale!(self.locale, l => Sentence(l, 4..10).fake_with_rng::<String, _>(&mut self.rng))
    }

    fn paragraph(&mut self) -> String {
        with_locale!(self.locale, l => Paragraph(l, 3..6).fake_with_rng::<String, _>(&mut self.rng))
    }

    fn phrase(&mut self) -> String {
        let words: Vec<String> =
            with_locale!(self.locale, l => Words(l, 2..6).fake_with_rng(&mut self.rng));
        words.join(" ")
    }

    fn password(&mut self) -> String {
        Password(EN, 12..20).fake_with_rng::<String, _>(&mut self.rng)
    }

    fn token(&mut self) -> String {
        (0..32)
            .map(|_| char::from_digit(self.rng.gen_range(0..16), 16).unwrap_or('0'))
            .collect()
    }

    fn identifier(&mut self) -> String {
        let digits: Vec<u32> = (0..15).map(|_| self.rng.gen_range(0..10)).collect();
        orcid_url(&digits)
    }
}

/// Reserved documentation domains (RFC 2606)
const EMAIL_DOMAINS: [&str; 3] = ["example.com", "example.net", "example.org"];

/// Lowercase ASCII letters and digits of `name`
fn ascii_slug(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// ISO 7064 MOD 11-2 check character over the first 15 ORCID digits
fn orcid_check_digit(digits: &[u32]) -> char {
    let total = digits.iter().fold(0, |acc, d| (acc + d) * 2);
    match (12 - total % 11) % 11 {
        10 => 'X',
        n => char::from_digit(n, 10).unwrap_or('0'),
    }
}

fn orcid_url(digits: &[u32]) -> String {
    let mut body: String = digits
        .iter()
        .map(|d| char::from_digit(*d, 10).unwrap_or('0'))
        .collect();
    body.push(orcid_check_digit(digits));
    format!(
        "https://orcid.org/{}-{}-{}-{}",
        &body[0..4],
        &body[4..8],
        &body[8..12],
        &body[12..16]
    )
}

/// Creates locale-bound generators
pub trait GeneratorFactory: Send + Sync {
    /// Generator for `tag`, `None` when the tag has no generator
    fn generator(&self, tag: &str) -> Option<Box<dyn ValueGenerator>>;

    /// Generator for values with no locale dimension
    fn default_generator(&self) -> Box<dyn ValueGenerator>;
}

/// [`GeneratorFactory`] producing [`FakerGenerator`]s
///
/// With a seed, every generator for a given tag draws the same sequence on
/// each run.
#[derive(Debug, Clone, Default)]
pub struct FakerFactory {
    seed: Option<u64>,
}

impl FakerFactory {
    /// Factory with entropy-seeded generators
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory with reproducible generators
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    fn build(&self, locale: FakerLocale) -> Box<dyn ValueGenerator> {
        match self.seed {
            Some(seed) => Box::new(FakerGenerator::seeded(locale, locale_seed(seed, locale.tag()))),
            None => Box::new(FakerGenerator::new(locale)),
        }
    }
}

/// Per-locale seed derived from the run seed
///
/// Taken from a digest rather than `std`'s hasher, whose output is not
/// guaranteed across releases, so a seed keeps reproducing the same values.
fn locale_seed(seed: u64, tag: &str) -> u64 {
    let digest = Sha1::new()
        .chain_update(seed.to_le_bytes())
        .chain_update(tag.as_bytes())
        .finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

impl GeneratorFactory for FakerFactory {
    fn generator(&self, tag: &str) -> Option<Box<dyn ValueGenerator>> {
        FakerLocale::from_tag(tag).map(|locale| self.build(locale))
    }

    fn default_generator(&self) -> Box<dyn ValueGenerator> {
        self.build(FakerLocale::En)
    }
}
