//! Accelerator detection
//!
//! The probe runs once per process. Its result is read-only afterwards and
//! shared by every container created with the default [`Dispatch`](super::Dispatch).

use std::fmt;
use std::sync::OnceLock;

/// Environment variable consulted by the probe
///
/// | Value               | Effect                                         |
/// |---------------------|------------------------------------------------|
/// | unset / `auto`      | best available accelerator                     |
/// | `off` / `portable`  | portable loops only                            |
/// | `simd`              | SIMD kernels if the CPU supports them          |
/// | `cblas`             | CBLAS if built with the `openblas` feature     |
pub const ACCEL_ENV: &str = "DENSELA_ACCEL";

/// SIMD capability level detected at runtime
///
/// Higher values indicate more capable instruction sets.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(dead_code)] // Variants may not be constructed on all architectures
pub enum SimdLevel {
    /// AVX2 with FMA support (256-bit vectors, 8 f32s or 4 f64s)
    Avx2Fma = 2,
    /// NEON baseline for AArch64 (128-bit vectors, 4 f32s or 2 f64s)
    Neon = 1,
    /// Scalar fallback (no SIMD)
    Scalar = 0,
}

impl SimdLevel {
    /// Returns the name of this SIMD level as a string
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Avx2Fma => "AVX2+FMA",
            Self::Neon => "NEON",
            Self::Scalar => "Scalar",
        }
    }
}

impl fmt::Display for SimdLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static SIMD_LEVEL: OnceLock<SimdLevel> = OnceLock::new();

/// Detect the best available SIMD level for the current CPU
///
/// The first call performs detection; later calls return the cached value.
#[inline]
pub fn detect_simd() -> SimdLevel {
    *SIMD_LEVEL.get_or_init(detect_simd_uncached)
}

#[cold]
#[allow(unreachable_code)]
fn detect_simd_uncached() -> SimdLevel {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma") {
            return SimdLevel::Avx2Fma;
        }
    }

    // NEON is mandatory for AArch64
    #[cfg(target_arch = "aarch64")]
    {
        return SimdLevel::Neon;
    }

    SimdLevel::Scalar
}

/// The accelerated kernel set a process can route to
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Accelerator {
    /// No accelerated kernels; everything runs on the portable path
    #[default]
    None,
    /// CPU SIMD intrinsics at the given level
    Simd(SimdLevel),
    /// Externally linked CBLAS routines
    Cblas,
}

impl Accelerator {
    /// Human-readable backend name
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "portable",
            Self::Simd(level) => level.as_str(),
            Self::Cblas => "CBLAS",
        }
    }
}

impl fmt::Display for Accelerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Preference {
    Auto,
    Off,
    Simd,
    Cblas,
}

impl Preference {
    fn parse(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return Self::Auto;
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Self::Auto,
            "off" | "portable" | "none" | "0" => Self::Off,
            "simd" => Self::Simd,
            "cblas" | "blas" | "openblas" => Self::Cblas,
            other => {
                log::debug!("ignoring unrecognized {}={:?}, using auto", ACCEL_ENV, other);
                Self::Auto
            }
        }
    }
}

/// Resolve a preference against what this build and CPU actually offer
fn resolve(preference: Preference, simd: SimdLevel, cblas_linked: bool) -> Accelerator {
    let simd_usable = cfg!(feature = "simd") && simd != SimdLevel::Scalar;
    let simd = if simd_usable {
        Accelerator::Simd(simd)
    } else {
        Accelerator::None
    };
    let cblas = if cblas_linked {
        Accelerator::Cblas
    } else {
        Accelerator::None
    };

    match preference {
        Preference::Off => Accelerator::None,
        Preference::Simd => simd,
        Preference::Cblas => cblas,
        Preference::Auto if cblas_linked => cblas,
        Preference::Auto => simd,
    }
}

/// Process-wide accelerator availability
///
/// A plain value: construct it with [`Capabilities::detect`] for the real
/// probe or with [`Capabilities::portable`] / [`Capabilities::with_accelerator`]
/// to pin a path.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Capabilities {
    accelerator: Accelerator,
}

static DETECTED: OnceLock<Capabilities> = OnceLock::new();

impl Capabilities {
    /// Capabilities of this process (probed once, then cached)
    pub fn detect() -> Self {
        *DETECTED.get_or_init(Self::probe)
    }

    #[cold]
    fn probe() -> Self {
        let env = std::env::var(ACCEL_ENV).ok();
        let preference = Preference::parse(env.as_deref());
        let accelerator = resolve(preference, detect_simd(), cfg!(feature = "openblas"));
        if preference != Preference::Auto {
            log::debug!("{}={:?} requested", ACCEL_ENV, preference);
        }
        log::info!("densela kernels: {} path", accelerator);
        Self { accelerator }
    }

    /// Capabilities with no accelerator (portable path only)
    pub const fn portable() -> Self {
        Self {
            accelerator: Accelerator::None,
        }
    }

    /// Capabilities claiming a specific accelerator
    ///
    /// If this build cannot serve it, calls still land on the portable path.
    pub const fn with_accelerator(accelerator: Accelerator) -> Self {
        Self { accelerator }
    }

    /// The selected accelerator
    #[inline]
    pub const fn accelerator(&self) -> Accelerator {
        self.accelerator
    }

    /// Returns true if an accelerator is present
    #[inline]
    pub const fn has_accelerator(&self) -> bool {
        !matches!(self.accelerator, Accelerator::None)
    }
}
