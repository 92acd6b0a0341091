//! Texture pack requests from maps and servers.

use tracing::info;

/// Fetches texture packs in the background. `request` must not block;
/// completed downloads are picked up by `check_resources`.
pub trait TexturePackFetcher: Send {
    fn request(&mut self, url: &str);

    /// Called on maintenance ticks.
    fn check_resources(&mut self);
}

/// Records requests and logs them once they are checked.
#[derive(Debug, Default)]
pub struct LoggingFetcher {
    pending: Vec<String>,
    seen: Vec<String>,
}

impl LoggingFetcher {
    pub fn seen(&self) -> &[String] {
        &self.seen
    }
}

impl TexturePackFetcher for LoggingFetcher {
    fn request(&mut self, url: &str) {
        if self.seen.iter().chain(&self.pending).any(|u| u == url) {
            return;
        }
        self.pending.push(url.to_owned());
    }

    fn check_resources(&mut self) {
        for url in self.pending.drain(..) {
            info!("Texture pack requested: {url}");
            self.seen.push(url);
        }
    }
}
