//! Adapters around the four external scanning tools. Each builds its
//! invocation, runs it through a `CommandRunner` and parses the output.
//! None of them can fail: a tool that crashes or times out yields an empty
//! (or partial) result.

pub mod enumerator;
pub mod port_prober;
pub mod vuln_matcher;
pub mod web_fingerprinter;

use std::sync::Arc;

pub use enumerator::Enumerator;
pub use port_prober::PortProber;
pub use vuln_matcher::VulnMatcher;
pub use web_fingerprinter::WebFingerprinter;

use crate::config::ScanSettings;
use crate::process::CommandRunner;

pub(crate) fn https_url(host: &str) -> String {
    format!("https://{}", host)
}

/// All four adapters sharing one runner.
pub struct Capabilities {
    pub enumerator: Enumerator,
    pub port_prober: PortProber,
    pub vuln_matcher: VulnMatcher,
    pub web_fingerprinter: WebFingerprinter,
}

impl Capabilities {
    pub fn new(runner: Arc<dyn CommandRunner>, settings: &ScanSettings) -> Self {
        Self {
            enumerator: Enumerator::new(runner.clone(), settings.enumerator.clone()),
            port_prober: PortProber::new(runner.clone(), settings.port_prober.clone()),
            vuln_matcher: VulnMatcher::new(runner.clone(), settings.vuln_matcher.clone()),
            web_fingerprinter: WebFingerprinter::new(
                runner,
                settings.web_fingerprinter.clone(),
                settings.web_max_time,
            ),
        }
    }
}
