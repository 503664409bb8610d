//! Boundary decoding of opaque host message payloads.
//!
//! Signal and consist messages arrive as free-form strings. They are decoded
//! once, at the edge, into closed sets of variants. Input that matches no
//! known dialect becomes an explicit `Unrecognized`/`Other` value instead of
//! an error: malformed payloads are data.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::constants::{BRAKE_MESSAGE_ID, TRAPDOOR_MESSAGE_ID};
use crate::host::RawConsistMessage;

/// Cab-signal pulse code combination (carrier rates in pulses per minute).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PulseCode {
    /// No code: restricting.
    C0_0,
    /// 75 ppm.
    C75_0,
    /// 75 ppm on both carriers.
    C75_75,
    /// 120 ppm.
    C120_0,
    /// 120 ppm on both carriers.
    C120_120,
    /// 180 ppm.
    C180_0,
    /// 180 ppm on both carriers.
    C180_180,
    /// 270 ppm.
    C270_0,
    /// 270 ppm on both carriers.
    C270_270,
    /// 420 ppm.
    C420_0,
}

/// Decoded custom signal message.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalMessage {
    /// A message carrying a recognised pulse code.
    PulseCode(PulseCode),
    /// Any other payload, kept verbatim.
    Unrecognized(String),
}

impl SignalMessage {
    /// Decodes a raw signal message.
    ///
    /// Recognised dialects, tried in order:
    /// - `sig<d>speed<n>` from third-party signal scripts;
    /// - `sig7stop<n>`;
    /// - `sig<n>` with arbitrary trailing text;
    /// - `M<nn>` / `N<nn>` Metro-North style codes.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rail_frp::messages::{PulseCode, SignalMessage};
    ///
    /// assert_eq!(SignalMessage::parse("sig1speed150"), SignalMessage::PulseCode(PulseCode::C180_180));
    /// assert_eq!(SignalMessage::parse("M12"), SignalMessage::PulseCode(PulseCode::C75_0));
    /// assert_eq!(SignalMessage::parse("hello"), SignalMessage::Unrecognized("hello".into()));
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        pulse_code(raw).map_or_else(
            || {
                warn!("unrecognized signal message {raw:?}");
                Self::Unrecognized(raw.to_owned())
            },
            Self::PulseCode,
        )
    }

    /// The pulse code, if one was recognised.
    #[must_use]
    pub const fn pulse_code(&self) -> Option<PulseCode> {
        match self {
            Self::PulseCode(code) => Some(*code),
            Self::Unrecognized(_) => None,
        }
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// `sig<d>speed<n>`: exactly one digit, then one or more.
fn sig_speed(raw: &str) -> Option<(char, &str)> {
    let rest = raw.strip_prefix("sig")?;
    let mut chars = rest.chars();
    let sig = chars.next().filter(char::is_ascii_digit)?;
    let speed = chars.as_str().strip_prefix("speed")?;
    all_digits(speed).then_some((sig, speed))
}

fn leading_digits(s: &str) -> &str {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.get(..end).unwrap_or_default()
}

fn pulse_code(raw: &str) -> Option<PulseCode> {
    if let Some((sig, speed)) = sig_speed(raw) {
        let code = match (sig, speed) {
            ('1', "150") => Some(PulseCode::C180_180),
            ('1', "100") => Some(PulseCode::C270_270),
            ('1', _) => Some(PulseCode::C180_0),
            ('2', _) => Some(PulseCode::C120_120),
            ('3', _) => Some(PulseCode::C270_0),
            ('4', _) => Some(PulseCode::C120_0),
            ('5', _) => Some(PulseCode::C75_75),
            ('6', _) => Some(PulseCode::C75_0),
            ('7', "60") => Some(PulseCode::C420_0),
            ('7', _) => Some(PulseCode::C0_0),
            _ => None,
        };
        if code.is_some() {
            return code;
        }
    }

    if raw.strip_prefix("sig7stop").is_some_and(all_digits) {
        return Some(PulseCode::C0_0);
    }

    if let Some(rest) = raw.strip_prefix("sig") {
        match leading_digits(rest) {
            "1" => return Some(PulseCode::C180_0),
            "2" => return Some(PulseCode::C120_120),
            "3" => return Some(PulseCode::C270_0),
            "4" => return Some(PulseCode::C120_0),
            "5" => return Some(PulseCode::C75_75),
            "6" => return Some(PulseCode::C75_0),
            "7" => return Some(PulseCode::C0_0),
            _ => {}
        }
    }

    let rest = raw
        .strip_prefix('M')
        .or_else(|| raw.strip_prefix('N'))?;
    match rest.get(..2)? {
        "10" => Some(PulseCode::C180_0),
        "11" => Some(PulseCode::C120_0),
        "12" => Some(PulseCode::C75_0),
        "13" | "14" | "15" => Some(PulseCode::C0_0),
        _ => None,
    }
}

/// Brake state reported by a neighbouring vehicle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrakeReading {
    /// Brake pipe pressure in psi, when the sender encodes it.
    PipePressure(u16),
    /// Only whether the brakes are applied.
    Applied(bool),
}

/// Decoded consist message.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistMessage {
    /// Brake status broadcast.
    BrakeStatus(BrakeReading),
    /// Trapdoor position broadcast.
    Trapdoor {
        /// Trapdoors are lowered.
        down: bool,
    },
    /// Any other message, kept verbatim.
    Other(RawConsistMessage),
}

/// Threshold above which a bare numeric brake payload counts as applied.
const BRAKE_APPLIED_THRESHOLD: f64 = 0.167;

impl ConsistMessage {
    /// Decodes a raw consist message.
    ///
    /// Brake payloads ending in `.<digits>10101<ddd>` carry a pipe pressure;
    /// otherwise a bare number at or above `0.167` means applied and anything
    /// unparseable means released.
    #[must_use]
    pub fn decode(raw: &RawConsistMessage) -> Self {
        match raw.id {
            BRAKE_MESSAGE_ID => Self::BrakeStatus(brake_reading(&raw.content)),
            TRAPDOOR_MESSAGE_ID => Self::Trapdoor {
                down: !raw.content.starts_with('0'),
            },
            _ => Self::Other(raw.clone()),
        }
    }
}

fn pipe_pressure(content: &str) -> Option<u16> {
    let (_, fraction) = content.rsplit_once('.')?;
    if !all_digits(fraction) {
        return None;
    }
    let split = fraction.len().checked_sub(8)?;
    let tail = fraction.get(split..)?;
    let (marker, psi) = tail.split_at(5);
    if marker != "10101" {
        return None;
    }
    psi.parse().ok()
}

fn brake_reading(content: &str) -> BrakeReading {
    pipe_pressure(content).map_or_else(
        || {
            content.trim().parse::<f64>().map_or_else(
                |_| {
                    warn!("unparseable brake payload {content:?}");
                    BrakeReading::Applied(false)
                },
                |level| BrakeReading::Applied(level >= BRAKE_APPLIED_THRESHOLD),
            )
        },
        BrakeReading::PipePressure,
    )
}
