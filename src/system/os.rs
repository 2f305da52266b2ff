//! Raw OS queries for data not available via sysinfo:
//! - Configured processor count (kernel-known, online or not)
//! - This process's CPU affinity mask
//! - Load averages with a detectable failure mode (sysinfo reports
//!   zeros when the platform cannot say, which is indistinguishable
//!   from an idle machine)
//!
//! Every query returns `None` on failure; callers pick the fallback.

/// Processors the kernel is configured for, including offline ones.
pub fn configured_cpu_count() -> Option<usize> {
    #[cfg(unix)]
    {
        let n = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_CONF) };
        (n > 0).then(|| n as usize)
    }
    #[cfg(windows)]
    {
        use windows::Win32::System::SystemInformation::{GetSystemInfo, SYSTEM_INFO};

        let mut info: SYSTEM_INFO = unsafe { std::mem::zeroed() };
        unsafe { GetSystemInfo(&mut info) };
        (info.dwNumberOfProcessors > 0).then(|| info.dwNumberOfProcessors as usize)
    }
    #[cfg(not(any(unix, windows)))]
    {
        None
    }
}

/// Affinity mask of the current process as a plain bitset, bit 0 = CPU 0.
/// Only the low 64 CPUs are represented, which is more than the census
/// ever scans.
pub fn affinity_mask() -> Option<u64> {
    #[cfg(target_os = "linux")]
    {
        use std::mem;

        unsafe {
            let mut set: libc::cpu_set_t = mem::zeroed();
            if libc::sched_getaffinity(0, mem::size_of::<libc::cpu_set_t>(), &mut set) != 0 {
                return None;
            }
            let mut mask = 0u64;
            for cpu in 0..64 {
                if libc::CPU_ISSET(cpu, &set) {
                    mask |= 1 << cpu;
                }
            }
            Some(mask)
        }
    }
    #[cfg(windows)]
    {
        use windows::Win32::System::Threading::{GetCurrentProcess, GetProcessAffinityMask};

        unsafe {
            let mut process_mask = 0usize;
            let mut system_mask = 0usize;
            GetProcessAffinityMask(GetCurrentProcess(), &mut process_mask, &mut system_mask)
                .ok()?;
            Some(process_mask as u64)
        }
    }
    #[cfg(not(any(target_os = "linux", windows)))]
    {
        // macOS and the BSDs expose no per-process affinity mask.
        None
    }
}

/// The 1, 5 and 15 minute load averages, in that order.
pub fn load_averages() -> Option<[f64; 3]> {
    #[cfg(unix)]
    {
        let mut values = [0.0_f64; 3];
        // SAFETY: `getloadavg` writes at most `nelem` doubles to a valid buffer.
        let n = unsafe { libc::getloadavg(values.as_mut_ptr(), 3) };
        (n == 3).then_some(values)
    }
    #[cfg(not(unix))]
    {
        // No load accounting to read; the poller treats this as nothing
        // to wait for.
        None
    }
}
