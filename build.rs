use std::cmp::Ordering;
use std::env;
use std::process::Command;

// CPU capabilities that select a blocking-geometry tier at compile time.
// Exactly one cfg flag is emitted: the highest-priority detected tier, or
// `fallback` when nothing is detected (cross builds included).
#[derive(PartialEq, Eq, Debug)]
struct GeometryTier {
    name: &'static str,
    rustc_flag: &'static str,
    cfg_flag: &'static str,
    detected: bool,
}

impl GeometryTier {
    // Lowest number == highest priority.
    fn priority(&self) -> usize {
        match self.name {
            "avx2" => 0,
            "avx" => 1,
            "neon" => 2,
            _ => usize::MAX,
        }
    }

    fn tiers() -> Vec<GeometryTier> {
        vec![
            GeometryTier {
                name: "avx2",
                rustc_flag: "+avx2,+avx,+fma",
                cfg_flag: "avx2",
                detected: false,
            },
            GeometryTier {
                name: "avx",
                rustc_flag: "+avx",
                cfg_flag: "avx",
                detected: false,
            },
            GeometryTier {
                name: "neon",
                rustc_flag: "+neon",
                cfg_flag: "neon",
                detected: false,
            },
        ]
    }
}

impl Ord for GeometryTier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority().cmp(&other.priority())
    }
}

impl PartialOrd for GeometryTier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Feature detection trait to keep per-OS probes modular.
trait TierDetector {
    fn detect(&self, tiers: &mut [GeometryTier]);
    fn is_applicable(&self) -> bool;
}

struct LinuxDetector;
impl TierDetector for LinuxDetector {
    fn detect(&self, tiers: &mut [GeometryTier]) {
        if let Ok(cpuinfo) = std::fs::read_to_string("/proc/cpuinfo") {
            let contents = cpuinfo.to_lowercase();
            for tier in tiers.iter_mut() {
                // `asimd` is how aarch64 kernels report NEON.
                tier.detected = contents.contains(tier.name)
                    || (tier.name == "neon" && contents.contains("asimd"));
            }
        }
    }

    fn is_applicable(&self) -> bool {
        cfg!(target_os = "linux")
    }
}

struct MacOSDetector;
impl TierDetector for MacOSDetector {
    fn detect(&self, tiers: &mut [GeometryTier]) {
        let output = Command::new("sysctl").args(["-a"]).output();

        if let Ok(output) = output {
            let contents = String::from_utf8_lossy(&output.stdout).to_lowercase();

            for tier in tiers.iter_mut() {
                match tier.name {
                    "avx2" => tier.detected = contents.contains("hw.optional.avx2_0: 1"),
                    "avx" => tier.detected = contents.contains("hw.optional.avx1_0: 1"),
                    "neon" => tier.detected = contents.contains("hw.optional.neon: 1"),
                    _ => {}
                }
            }
        }
    }

    fn is_applicable(&self) -> bool {
        cfg!(target_os = "macos")
    }
}

struct PlatformDetector;
impl PlatformDetector {
    fn detectors() -> Vec<Box<dyn TierDetector>> {
        vec![Box::new(LinuxDetector), Box::new(MacOSDetector)]
    }

    fn detect(tiers: &mut [GeometryTier]) {
        for detector in Self::detectors() {
            if detector.is_applicable() {
                detector.detect(tiers);
                break;
            }
        }
    }

    fn apply(tiers: &mut [GeometryTier]) {
        tiers.sort();

        let cfg_flag = tiers
            .iter()
            .find(|tier| tier.detected)
            .map(|tier| {
                println!("cargo:rustc-flag=-C");
                println!("cargo:rustc-flag=target-feature={}", tier.rustc_flag);
                tier.cfg_flag
            })
            .unwrap_or("fallback");

        println!("cargo:rustc-cfg={cfg_flag}");

        println!("cargo::rustc-check-cfg=cfg(avx2)");
        println!("cargo::rustc-check-cfg=cfg(avx)");
        println!("cargo::rustc-check-cfg=cfg(neon)");
        println!("cargo::rustc-check-cfg=cfg(fallback)");
    }
}

fn main() {
    let mut tiers = GeometryTier::tiers();

    // Only probe the host CPU for native builds; cross builds get `fallback`.
    let host = env::var("HOST").unwrap_or_default();
    let target = env::var("TARGET").unwrap_or_default();

    if host == target {
        PlatformDetector::detect(&mut tiers);
    }

    PlatformDetector::apply(&mut tiers);
}
