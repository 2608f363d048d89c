use std::io::Write;

#[derive(Clone, Debug, PartialEq)]
pub struct AlertConfig {
    pub bell: bool,
    pub notification: bool,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            bell: true,
            notification: true,
        }
    }
}

/// Where completion cues and transient notices go.
pub trait Alerts {
    /// Fired once per phase that ran to the end. Never for skips.
    fn completion(&mut self, message: &str);
    /// Short-lived confirmation text, e.g. after settings change.
    fn notice(&mut self, message: &str);
}

/// Terminal alerts: a bell on the display stream, falling back to the
/// second stream when the first cannot take it.
pub struct TerminalAlerts<P: Write, F: Write> {
    config: AlertConfig,
    primary: P,
    fallback: F,
}

impl<P: Write, F: Write> TerminalAlerts<P, F> {
    pub fn new(config: AlertConfig, primary: P, fallback: F) -> Self {
        Self {
            config,
            primary,
            fallback,
        }
    }

    fn ring(&mut self) {
        let primary = self
            .primary
            .write_all(b"\x07")
            .and_then(|_| self.primary.flush());
        let Err(e) = primary else {
            return;
        };
        log::debug!("Bell failed on display stream, trying fallback: {}", e);
        if let Err(e) = self
            .fallback
            .write_all(b"\x07")
            .and_then(|_| self.fallback.flush())
        {
            log::warn!("Completion bell unavailable: {}", e);
        }
    }

    fn show(&mut self, message: &str) {
        if let Err(e) = writeln!(self.primary, "\n  >> {}", message) {
            log::warn!("Failed to show notice: {}", e);
        }
    }
}

impl<P: Write, F: Write> Alerts for TerminalAlerts<P, F> {
    fn completion(&mut self, message: &str) {
        if self.config.bell {
            self.ring();
        }
        if self.config.notification {
            self.show(message);
        }
    }

    fn notice(&mut self, message: &str) {
        if self.config.notification {
            self.show(message);
        }
    }
}
