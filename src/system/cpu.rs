use sysinfo::System;

use crate::system::os;

/// Width of the affinity-mask scan. Masks are only examined this far, so
/// a machine reporting more online processors than this bypasses the mask
/// entirely (see [`CpuCensus::take`]).
const MASK_SCAN_BITS: u32 = 32;

/// Processor counts taken once at startup, immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuCensus {
    /// Processors the kernel is configured for.
    pub configured: usize,
    /// Processors currently online.
    pub available: usize,
    /// Processors this process can actually be scheduled onto. The load
    /// math normalizes by this count.
    pub usable: usize,
}

impl CpuCensus {
    /// Query the host. No failure here is fatal: a query that errors or
    /// reports nonsense degrades to a single processor.
    pub fn take() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_all();

        let configured = floor_at_one(os::configured_cpu_count());
        let available = sys.cpus().len().max(1);
        let usable = resolve_usable(available, affinity_usable_count());

        Self {
            configured,
            available,
            usable,
        }
    }
}

/// Floor a possibly-failed processor count at one.
fn floor_at_one(count: Option<usize>) -> usize {
    count.filter(|&n| n >= 1).unwrap_or(1)
}

/// Number of processors this process may run on, per its affinity mask.
/// `None` when the mask cannot be read at all.
fn affinity_usable_count() -> Option<usize> {
    os::affinity_mask().map(leading_set_bits)
}

/// Count the contiguous run of set bits starting at bit 0, stopping at
/// the first clear bit and never looking past [`MASK_SCAN_BITS`].
///
/// Note this is NOT a popcount: a gap in the mask (CPUs 0-1 and 4-7,
/// say) truncates the count at the gap, and a clear bit 0 yields zero no
/// matter what sits above it. A popcount is arguably what "usable" ought
/// to mean, but the target formula has only ever been fed the truncated
/// figure, so the scan stays.
fn leading_set_bits(mask: u64) -> usize {
    let mut count = 0;
    for cpu in 0..MASK_SCAN_BITS {
        if mask & (1 << cpu) != 0 {
            count += 1;
        } else {
            break;
        }
    }
    count
}

/// Pick the final usable count. An online count wider than the mask scan
/// means the mask cannot describe the machine; trust the online count
/// outright. Otherwise the affinity count wins, floored at one.
fn resolve_usable(available: usize, affinity_count: Option<usize>) -> usize {
    if available > MASK_SCAN_BITS as usize {
        available
    } else {
        floor_at_one(affinity_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_queries_floor_at_one() {
        assert_eq!(floor_at_one(None), 1);
        assert_eq!(floor_at_one(Some(0)), 1);
        assert_eq!(floor_at_one(Some(1)), 1);
        assert_eq!(floor_at_one(Some(16)), 16);
    }

    #[test]
    fn leading_run_stops_at_first_gap() {
        assert_eq!(leading_set_bits(0b0000), 0);
        assert_eq!(leading_set_bits(0b0001), 1);
        assert_eq!(leading_set_bits(0b0111), 3);
        // Gap after CPU 1: CPUs 4-7 are set but never counted.
        assert_eq!(leading_set_bits(0b1111_0011), 2);
        // Clear bit 0 truncates immediately.
        assert_eq!(leading_set_bits(0b1111_1110), 0);
    }

    #[test]
    fn leading_run_never_exceeds_scan_width() {
        assert_eq!(leading_set_bits(u64::MAX), MASK_SCAN_BITS as usize);
        // All 40 low bits set: still capped at the scan width.
        assert_eq!(leading_set_bits((1u64 << 40) - 1), MASK_SCAN_BITS as usize);
    }

    #[test]
    fn wide_machines_bypass_the_affinity_mask() {
        // 33+ online processors: the online count wins even when the
        // mask says far fewer are usable.
        assert_eq!(resolve_usable(33, Some(2)), 33);
        assert_eq!(resolve_usable(128, None), 128);
    }

    #[test]
    fn narrow_machines_use_the_affinity_count() {
        assert_eq!(resolve_usable(8, Some(3)), 3);
        assert_eq!(resolve_usable(32, Some(32)), 32);
        // Unreadable or empty masks fall back to a single processor.
        assert_eq!(resolve_usable(8, None), 1);
        assert_eq!(resolve_usable(8, Some(0)), 1);
    }
}
