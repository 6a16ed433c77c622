//! RAM overlay window control.
//!
//! The memory controller can splice a RAM region (word granularity, up to
//! 4 KB) over a window in the low 8 MB of the address space. One control
//! block drives it: a control word with two enable bits and a pair of
//! inclusive bound registers. Size and window placement are not policed
//! here; the hardware's own (sometimes undefined) semantics apply. The one
//! local rule is word alignment of the base address.

use bitflags::bitflags;
use log::debug;

use crate::device::Device;
use crate::error::{Error, Result};
use crate::regs::{poke_bic, poke_orr};

bitflags! {
    /// Enable bits in the overlay control word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OverlayCtl: u32 {
        /// Bit 9: overlay enable.
        const ENABLE = 0x200;
        /// Bit 13: overlay active.
        const ACTIVE = 0x2000;
    }
}

/// Tagged view of the controller state, so calling code never re-derives
/// "is enabled" from sentinel comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    Disabled,
    Enabled { base: u32, words: u32 },
}

/// Register placement of the overlay control block.
///
/// `Default` is the production part; tests and ports override `control`.
#[derive(Clone, Debug)]
pub struct OverlayLayout {
    /// Address of the control word.
    pub control: u32,
}

impl Default for OverlayLayout {
    fn default() -> Self {
        Self { control: Self::CONTROL }
    }
}

impl OverlayLayout {
    /// Control block base on production silicon.
    pub const CONTROL: u32 = 0x0401_1f04;
    /// Offset of the lower bound register.
    pub const LOWER: u32 = 0x0c;
    /// Offset of the upper bound register.
    pub const UPPER: u32 = 0x10;
    /// Bound pair the hardware treats as "no overlay": an inverted, empty
    /// range.
    pub const DISABLED_BOUNDS: (u32, u32) = (0xffff_ffff, 0x0000_0000);

    #[inline]
    fn lower(&self) -> u32 {
        self.control.wrapping_add(Self::LOWER)
    }

    #[inline]
    fn upper(&self) -> u32 {
        self.control.wrapping_add(Self::UPPER)
    }

    /// Reconfigure the overlay.
    ///
    /// `Some((address, words))` maps `words` words of RAM at `address`;
    /// `None` disables the overlay. Both paths clear the enable bits before
    /// the bounds are touched, in a fixed order (ENABLE then ACTIVE): the
    /// hardware must never see a half-written bound range behind live
    /// enables. `words == 0` is not rejected; the inverted range it produces
    /// is hardware-defined behavior.
    pub fn set(&self, dev: &mut dyn Device, mapping: Option<(u32, u32)>) -> Result<()> {
        poke_bic(dev, self.control, OverlayCtl::ENABLE.bits())?;
        poke_bic(dev, self.control, OverlayCtl::ACTIVE.bits())?;
        match mapping {
            None => {
                debug!("overlay: disable");
                let (lo, hi) = Self::DISABLED_BOUNDS;
                dev.poke(self.lower(), lo)?;
                dev.poke(self.upper(), hi)?;
            }
            Some((address, words)) => {
                if address & 3 != 0 {
                    return Err(Error::UnalignedOverlay { address });
                }
                debug!("overlay: map {words} words at {address:#010x}");
                dev.poke(self.lower(), address)?;
                dev.poke(
                    self.upper(),
                    address.wrapping_add(words.wrapping_mul(4)).wrapping_sub(1),
                )?;
                poke_orr(dev, self.control, OverlayCtl::ENABLE.bits())?;
                poke_orr(dev, self.control, OverlayCtl::ACTIVE.bits())?;
            }
        }
        Ok(())
    }

    /// Current `(address, words)` extent, straight from the bound registers.
    ///
    /// Not sentinel-aware: with the overlay disabled this returns
    /// `(0xffff_ffff, 0)`, computed from the sentinel bounds like any other
    /// pair. Use [`state`](Self::state) for the tagged view.
    pub fn get(&self, dev: &mut dyn Device) -> Result<(u32, u32)> {
        let address = dev.peek(self.lower())?;
        let limit = dev.peek(self.upper())?;
        Ok((address, word_count(address, limit)))
    }

    /// Sentinel-aware view of [`get`](Self::get).
    pub fn state(&self, dev: &mut dyn Device) -> Result<OverlayState> {
        let address = dev.peek(self.lower())?;
        let limit = dev.peek(self.upper())?;
        if (address, limit) == Self::DISABLED_BOUNDS {
            return Ok(OverlayState::Disabled);
        }
        Ok(OverlayState::Enabled {
            base: address,
            words: word_count(address, limit),
        })
    }
}

/// Words covered by the inclusive range `[address, limit]`.
///
/// Kept verbatim as `(limit - address + 3) / 4`, the formula the controller
/// has always been read back with. It is a ceiling over the exclusive
/// distance, not an exact inclusive byte-to-word conversion; every range the
/// `set` path writes survives the round trip. The subtraction saturates so
/// the inverted disabled sentinel counts as 0 rather than wrapping.
#[inline]
fn word_count(address: u32, limit: u32) -> u32 {
    limit.saturating_sub(address).wrapping_add(3) / 4
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::testing::{MockDevice, Txn};

    const CTL: u32 = OverlayLayout::CONTROL;
    const LO: u32 = CTL + OverlayLayout::LOWER;
    const HI: u32 = CTL + OverlayLayout::UPPER;

    fn layout() -> OverlayLayout {
        OverlayLayout::default()
    }

    #[test]
    fn map_then_get_round_trips() {
        let mut d = MockDevice::new();
        layout().set(&mut d, Some((0x1000, 2))).unwrap();
        assert_eq!(layout().get(&mut d).unwrap(), (0x1000, 2));
        assert_eq!(d.word(LO), 0x1000);
        assert_eq!(d.word(HI), 0x1007);
    }

    #[test]
    fn single_word_round_trips() {
        let mut d = MockDevice::new();
        layout().set(&mut d, Some((0x0020_0000, 1))).unwrap();
        assert_eq!(layout().get(&mut d).unwrap(), (0x0020_0000, 1));
    }

    #[test]
    fn map_sets_both_enable_bits() {
        let mut d = MockDevice::new();
        layout().set(&mut d, Some((0x1000, 2))).unwrap();
        let ctl = OverlayCtl::from_bits_truncate(d.word(CTL));
        assert_eq!(ctl, OverlayCtl::ENABLE | OverlayCtl::ACTIVE);
    }

    #[test]
    fn disable_writes_the_sentinel_and_clears_enables() {
        let mut d = MockDevice::new();
        d.load(CTL, (OverlayCtl::ENABLE | OverlayCtl::ACTIVE).bits());
        layout().set(&mut d, None).unwrap();
        assert_eq!(d.word(CTL), 0);
        assert_eq!((d.word(LO), d.word(HI)), OverlayLayout::DISABLED_BOUNDS);
        // the sentinel bounds compute to (0xffff_ffff, 0), not a special case
        assert_eq!(layout().get(&mut d).unwrap(), (0xffff_ffff, 0));
        assert_eq!(layout().state(&mut d).unwrap(), OverlayState::Disabled);
    }

    #[test]
    fn state_reports_the_mapped_extent() {
        let mut d = MockDevice::new();
        layout().set(&mut d, Some((0x2000, 4))).unwrap();
        assert_eq!(
            layout().state(&mut d).unwrap(),
            OverlayState::Enabled { base: 0x2000, words: 4 }
        );
    }

    #[test]
    fn unaligned_base_is_rejected_before_any_bound_write() {
        let mut d = MockDevice::new();
        d.load(LO, 0xaaaa_aaaa);
        d.load(HI, 0xbbbb_bbbb);
        let err = layout().set(&mut d, Some((3, 1))).unwrap_err();
        assert!(matches!(err, Error::UnalignedOverlay { address: 3 }));
        // bounds untouched; only the two enable-bit clears ran
        assert_eq!(d.word(LO), 0xaaaa_aaaa);
        assert_eq!(d.word(HI), 0xbbbb_bbbb);
        let pokes = d.pokes();
        assert_eq!(pokes.len(), 2);
        assert!(pokes.iter().all(|&(addr, _)| addr == CTL));
    }

    #[test]
    fn enable_bits_clear_before_and_set_after_the_bound_writes() {
        let mut d = MockDevice::new();
        d.load(CTL, (OverlayCtl::ENABLE | OverlayCtl::ACTIVE).bits());
        layout().set(&mut d, Some((0x1000, 2))).unwrap();
        let writes: Vec<_> = d
            .journal
            .iter()
            .filter_map(|t| match *t {
                Txn::Poke(addr, value) => Some((addr, value)),
                _ => None,
            })
            .collect();
        assert_eq!(
            writes,
            vec![
                (CTL, OverlayCtl::ACTIVE.bits()), // ENABLE cleared
                (CTL, 0),                         // ACTIVE cleared
                (LO, 0x1000),
                (HI, 0x1007),
                (CTL, OverlayCtl::ENABLE.bits()),
                (CTL, (OverlayCtl::ENABLE | OverlayCtl::ACTIVE).bits()),
            ]
        );
    }

    #[test]
    fn reconfiguring_a_live_overlay_drops_the_enables_first() {
        let mut d = MockDevice::new();
        layout().set(&mut d, Some((0x1000, 2))).unwrap();
        d.journal.clear();
        layout().set(&mut d, Some((0x3000, 1))).unwrap();
        let first_writes: Vec<_> = d
            .journal
            .iter()
            .filter_map(|t| match *t {
                Txn::Poke(addr, value) => Some((addr, value)),
                _ => None,
            })
            .take(2)
            .collect();
        assert_eq!(
            first_writes,
            vec![(CTL, OverlayCtl::ACTIVE.bits()), (CTL, 0)]
        );
        assert_eq!(layout().get(&mut d).unwrap(), (0x3000, 1));
    }

    // documented quirk: the read-back count is (limit - base + 3) / 4, a
    // ceiling over the exclusive distance; an inclusive limit landing
    // exactly on the next word boundary still reads back as the lower count
    #[test]
    fn word_count_formula_is_kept_verbatim() {
        let mut d = MockDevice::new();
        d.load(LO, 0x1000);
        d.load(HI, 0x1001); // two bytes into the first word
        assert_eq!(layout().get(&mut d).unwrap(), (0x1000, 1));
        d.load(HI, 0x1004); // five bytes, still counted as one word
        assert_eq!(layout().get(&mut d).unwrap(), (0x1000, 1));
        d.load(HI, 0x1007); // what `set` writes for two words
        assert_eq!(layout().get(&mut d).unwrap(), (0x1000, 2));
    }

    #[test]
    fn zero_words_is_not_rejected() {
        let mut d = MockDevice::new();
        layout().set(&mut d, Some((0x1000, 0))).unwrap();
        // inverted range: limit below base, hardware-defined from here on
        assert_eq!(d.word(LO), 0x1000);
        assert_eq!(d.word(HI), 0x0fff);
        assert_eq!(layout().get(&mut d).unwrap(), (0x1000, 0));
    }

    #[test]
    fn alternate_control_base_is_honored() {
        let alt = OverlayLayout { control: 0x0500_0000 };
        let mut d = MockDevice::new();
        alt.set(&mut d, Some((0x4000, 1))).unwrap();
        assert_eq!(d.word(0x0500_000c), 0x4000);
        assert_eq!(d.word(0x0500_0010), 0x4003);
        assert_eq!(d.word(CTL), 0);
    }
}
