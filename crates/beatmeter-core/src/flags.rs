//! The packed 64-bit event word.
//!
//! Every top-level event and every loop iteration carries one
//! [`EventFlags`] word alongside its timestamp:
//!
//! ```text
//!  63        46 45  44  43   38 37  36  35  34  33  32 31              0
//! +-----------+---+---+-------+---+---+---+---+---+---+-----------------+
//! | reserved  |END|STA|reservd|ENL|REC|UNL|LOO|EXC|INC|     payload     |
//! +-----------+---+---+-------+---+---+---+---+---+---+-----------------+
//! ```
//!
//! The payload is a loop's requested iteration count on LOOP events and
//! the step index of the matching LOOP on UNLOOP events. Reserved bits
//! are always zero in words produced by [`EventFlags::encode`].

use std::fmt;
use std::ops::BitOr;

use crate::error::MeterError;

/// Width of the payload field in bits.
pub const PAYLOAD_BITS: u32 = 32;

/// Mask selecting the payload field.
pub const PAYLOAD_MASK: u64 = (1 << PAYLOAD_BITS) - 1;

/// Set of event kinds, stored in their final word positions.
///
/// INCLUDE and EXCLUDE are inclusion markers and combine freely with the
/// structural kinds (LOOP, RECAP, START).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct EventKind(u64);

impl EventKind {
    /// No kind bits.
    pub const NONE: Self = Self(0);
    /// Time is included in statistics.
    pub const INCLUDE: Self = Self(1 << 32);
    /// Time is excluded from statistics.
    pub const EXCLUDE: Self = Self(1 << 33);
    /// A loop was entered.
    pub const LOOP: Self = Self(1 << 34);
    /// A loop was exited.
    pub const UNLOOP: Self = Self(1 << 35);
    /// One loop iteration finished.
    pub const RECAP: Self = Self(1 << 36);
    /// The run started.
    pub const START: Self = Self(1 << 44);
    /// The run ended.
    pub const END: Self = Self(1 << 45);

    const MASK: u64 = Self::INCLUDE.0
        | Self::EXCLUDE.0
        | Self::LOOP.0
        | Self::UNLOOP.0
        | Self::RECAP.0
        | Self::START.0
        | Self::END.0;

    const NAMES: [(Self, &'static str); 7] = [
        (Self::INCLUDE, "INCLUDE"),
        (Self::EXCLUDE, "EXCLUDE"),
        (Self::LOOP, "LOOP"),
        (Self::UNLOOP, "UNLOOP"),
        (Self::RECAP, "RECAP"),
        (Self::START, "START"),
        (Self::END, "END"),
    ];

    /// Raw bits in word position.
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Whether every kind in `other` is also set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Union of two kind sets.
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether no kind bit is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for EventKind {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "NONE");
        }
        let mut first = true;
        for (kind, name) in Self::NAMES {
            if self.contains(kind) {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{name}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Set of event modifiers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u64);

impl Modifiers {
    /// No modifiers.
    pub const NONE: Self = Self(0);
    /// The loop's iteration count is unknown in advance.
    pub const ENDLESS: Self = Self(1 << 37);

    const MASK: u64 = Self::ENDLESS.0;

    /// Raw bits in word position.
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Whether every modifier in `other` is also set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Modifiers {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// One encoded event word: kind bits, modifier bits, 32-bit payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct EventFlags(u64);

impl EventFlags {
    /// Encode an event, validating that `payload` fits in 32 bits.
    ///
    /// # Errors
    ///
    /// Returns [`MeterError::PrecisionLossPayload`] if `payload >= 2^32`.
    pub fn encode(kind: EventKind, modifiers: Modifiers, payload: u64) -> Result<Self, MeterError> {
        let payload =
            u32::try_from(payload).map_err(|_| MeterError::PrecisionLossPayload { value: payload })?;
        Ok(Self::pack(kind, modifiers, payload))
    }

    /// Encode an event whose payload is already known to fit.
    pub const fn pack(kind: EventKind, modifiers: Modifiers, payload: u32) -> Self {
        Self(kind.0 | modifiers.0 | payload as u64)
    }

    /// Encode a payload-free event of the given kinds.
    pub const fn of(kind: EventKind) -> Self {
        Self::pack(kind, Modifiers::NONE, 0)
    }

    /// Reinterpret a raw word, rejecting bits outside the documented layout.
    ///
    /// # Errors
    ///
    /// Returns [`MeterError::ReservedBits`] if any reserved bit is set.
    pub fn from_bits(word: u64) -> Result<Self, MeterError> {
        let known = EventKind::MASK | Modifiers::MASK | PAYLOAD_MASK;
        if word & !known != 0 {
            return Err(MeterError::ReservedBits { word });
        }
        Ok(Self(word))
    }

    /// Split the word back into its three fields.
    pub const fn decode(self) -> (EventKind, Modifiers, u32) {
        (self.kind(), self.modifiers(), self.payload())
    }

    /// The raw word.
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// The kind bits.
    pub const fn kind(self) -> EventKind {
        EventKind(self.0 & EventKind::MASK)
    }

    /// The modifier bits.
    pub const fn modifiers(self) -> Modifiers {
        Modifiers(self.0 & Modifiers::MASK)
    }

    /// The 32-bit payload.
    pub const fn payload(self) -> u32 {
        (self.0 & PAYLOAD_MASK) as u32
    }

    /// Whether the event's time counts towards statistics.
    pub const fn is_included(self) -> bool {
        self.kind().contains(EventKind::INCLUDE)
    }

    /// Whether the event's time is excluded from statistics.
    pub const fn is_excluded(self) -> bool {
        self.kind().contains(EventKind::EXCLUDE)
    }

    /// Whether the event opened a loop.
    pub const fn is_loop(self) -> bool {
        self.kind().contains(EventKind::LOOP)
    }

    /// Whether the event closed a loop.
    pub const fn is_unloop(self) -> bool {
        self.kind().contains(EventKind::UNLOOP)
    }

    /// Whether the event is a loop iteration.
    pub const fn is_recap(self) -> bool {
        self.kind().contains(EventKind::RECAP)
    }

    /// Whether the event opened a loop of unknown length.
    pub const fn is_endless(self) -> bool {
        self.modifiers().contains(Modifiers::ENDLESS)
    }

    /// Whether the event started a run.
    pub const fn is_start(self) -> bool {
        self.kind().contains(EventKind::START)
    }

    /// Whether the event ended a run.
    pub const fn is_end(self) -> bool {
        self.kind().contains(EventKind::END)
    }
}

impl fmt::Display for EventFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind())?;
        if self.is_endless() {
            write!(f, " ENDLESS")?;
        }
        if self.payload() != 0 {
            write!(f, " payload={}", self.payload())?;
        }
        Ok(())
    }
}
