//! Process entry points shared by the two binaries.

use clap::error::ErrorKind;
use clap::parser::ValueSource;
use clap::{Command, CommandFactory, FromArgMatches};
use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use subtester_core::render::{EnvelopeRenderer, FrameRenderer, Renderer};
use tracing::{debug, error, info, warn};

use crate::config::{Cli, SubscriberConfig};
use crate::dev_tracing;
use crate::error::Result;
use crate::listener::Listener;
use crate::socket::Subscriber;

/// Which output format a binary produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Every frame printed as it arrives, `...` between frames of a message.
    Frames,
    /// Two-frame messages printed as `[address] content`.
    Envelope,
}

impl Variant {
    pub const fn bin_name(self) -> &'static str {
        match self {
            Self::Frames => "sub-client",
            Self::Envelope => "zmq-sub-client",
        }
    }

    pub const fn about(self) -> &'static str {
        match self {
            Self::Frames => {
                "Subscribe to a ZeroMQ PUB endpoint and print every frame, joining multipart messages with '...'"
            }
            Self::Envelope => {
                "Subscribe to a ZeroMQ PUB endpoint and print two-frame messages as '[address] content'"
            }
        }
    }

    /// The variant's command line. `--on-malformed` is hidden from
    /// `sub-client`, which never sees a malformed message.
    pub fn command(self) -> Command {
        let cmd = Cli::command().name(self.bin_name()).about(self.about());
        match self {
            Self::Frames => cmd.mut_arg("on_malformed", |arg| arg.hide(true)),
            Self::Envelope => cmd,
        }
    }

    pub fn try_parse_from<I, T>(self, args: I) -> std::result::Result<Cli, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut cmd = self.command();
        let matches = cmd.try_get_matches_from_mut(args)?;

        if self == Self::Frames
            && matches.value_source("on_malformed") == Some(ValueSource::CommandLine)
        {
            return Err(cmd.error(
                ErrorKind::ArgumentConflict,
                "--on-malformed only applies to zmq-sub-client",
            ));
        }
        Cli::from_arg_matches(&matches)
    }

    /// Parse the command line, exiting with a usage error if it is invalid.
    pub fn parse_cli(self) -> Cli {
        self.try_parse_from(std::env::args_os())
            .unwrap_or_else(|e| e.exit())
    }
}

/// Full binary lifecycle: parse, log setup, run, map the outcome to an exit code.
pub fn main_with(variant: Variant) -> ExitCode {
    let cli = variant.parse_cli();
    dev_tracing::init_logging(cli.verbose);

    match run(variant, &cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_broken_pipe() => {
            debug!("Output closed, stopping");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Connect and render to stdout until Ctrl-C or a fatal error.
pub fn run(variant: Variant, cli: &Cli) -> Result<()> {
    let config = SubscriberConfig::from(cli);

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Shutdown signal received...");
        r.store(false, Ordering::SeqCst);
    })?;

    info!("Collecting updates from {}", config.endpoint);
    let subscriber = Subscriber::connect(&config)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match variant {
        Variant::Frames => listen(
            Listener::new(subscriber, FrameRenderer::new(), &config),
            &mut out,
            &running,
            &config,
        ),
        Variant::Envelope => listen(
            Listener::new(subscriber, EnvelopeRenderer::new(), &config),
            &mut out,
            &running,
            &config,
        ),
    }
}

/// Run a listener and report its counters, whatever the outcome.
pub fn listen<R: Renderer, W: Write>(
    mut listener: Listener<R>,
    out: &mut W,
    running: &AtomicBool,
    config: &SubscriberConfig,
) -> Result<()> {
    let result = listener.run(out, running);

    info!("Received {}", listener.stats());
    for (topic, count) in listener.stats().topics() {
        debug!(count, "Topic {}", String::from_utf8_lossy(topic));
    }

    if config.print_stats {
        let table = listener.stats().table();
        if let Err(e) = out.write_all(table.as_bytes()).and_then(|()| out.flush()) {
            warn!("Could not write topic table: {}", e);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use subtester_core::endpoint::Endpoint;

    use crate::config::MalformedPolicy;
    use crate::error::Error;

    #[test]
    fn test_variant_commands_are_valid() {
        for variant in [Variant::Frames, Variant::Envelope] {
            variant.command().debug_assert();
        }
    }

    #[test]
    fn test_on_malformed_only_for_envelope() {
        let err = Variant::Frames
            .try_parse_from(["sub-client", "--on-malformed", "reject"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
        assert_eq!(err.exit_code(), 2);

        let cli = Variant::Envelope
            .try_parse_from(["zmq-sub-client", "--on-malformed", "reject"])
            .unwrap();
        assert_eq!(cli.on_malformed, MalformedPolicy::Reject);

        let cli = Variant::Frames.try_parse_from(["sub-client"]).unwrap();
        assert_eq!(cli.on_malformed, MalformedPolicy::Warn);
    }

    #[test]
    fn test_invalid_endpoint_exits_with_usage_code() {
        let err = Variant::Envelope
            .try_parse_from(["zmq-sub-client", "udp://localhost:5501"])
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    struct ClosedOutput;

    impl Write for ClosedOutput {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn unreachable_config() -> SubscriberConfig {
        let port = portpicker::pick_unused_port().expect("no free port");
        SubscriberConfig::new(Endpoint::parse(&format!("127.0.0.1:{port}")).unwrap())
            .with_print_stats(true)
            .with_poll_interval(Duration::from_millis(10))
    }

    #[test]
    fn test_listen_keeps_listener_error_when_table_write_fails() {
        let config = unreachable_config().with_connect_timeout(Duration::ZERO);
        let listener = Listener::new(
            Subscriber::connect(&config).unwrap(),
            EnvelopeRenderer::new(),
            &config,
        );

        let err = listen(listener, &mut ClosedOutput, &AtomicBool::new(true), &config).unwrap_err();
        assert!(matches!(err, Error::Link(_)), "{err:?}");
    }

    #[test]
    fn test_listen_table_write_is_best_effort() {
        let config = unreachable_config();
        let listener = Listener::new(
            Subscriber::connect(&config).unwrap(),
            FrameRenderer::new(),
            &config,
        );

        listen(listener, &mut ClosedOutput, &AtomicBool::new(false), &config).unwrap();
    }
}
