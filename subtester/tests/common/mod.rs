#![allow(dead_code)]

use std::time::{Duration, Instant};
use subtester::prelude::*;

/// Upper bound for anything that waits on the network.
pub const DEADLINE: Duration = Duration::from_secs(10);

/// A libzmq PUB socket bound to a free local port.
pub struct Publisher {
    pub socket: zmq::Socket,
    pub endpoint: String,
    _context: zmq::Context,
}

impl Publisher {
    pub fn bind() -> Self {
        let port = portpicker::pick_unused_port().expect("no free port");
        Self::bind_port(port)
    }

    pub fn bind_port(port: u16) -> Self {
        let context = zmq::Context::new();
        let socket = context.socket(zmq::PUB).unwrap();
        socket.set_linger(0).unwrap();
        let endpoint = format!("tcp://127.0.0.1:{port}");
        socket.bind(&endpoint).unwrap();
        Self {
            socket,
            endpoint,
            _context: context,
        }
    }

    pub fn port(&self) -> u16 {
        self.endpoint.rsplit(':').next().unwrap().parse().unwrap()
    }

    pub fn publish(&self, parts: &[&str]) {
        self.socket.send_multipart(parts.iter().copied(), 0).unwrap();
    }
}

pub fn config_for(publisher: &Publisher) -> SubscriberConfig {
    SubscriberConfig::new(Endpoint::parse(&publisher.endpoint).unwrap())
        .with_poll_interval(Duration::from_millis(20))
}

/// Keep publishing `messages` until the listener has finished `want`
/// messages. PUB drops everything sent before the subscription arrives, so
/// a single send is not enough.
pub fn pump<R: Renderer>(
    publisher: &Publisher,
    listener: &mut Listener<R>,
    messages: &[&[&str]],
    want: usize,
) -> Vec<u8> {
    let mut out = Vec::new();
    let mut handled = 0;
    let start = Instant::now();

    while handled < want {
        assert!(start.elapsed() < DEADLINE, "timed out waiting for messages");
        for parts in messages {
            publisher.publish(parts);
        }
        handled += listener.step(&mut out).unwrap();
    }
    out
}

/// Step until `done` holds, failing the test after [`DEADLINE`].
pub fn step_until<R: Renderer>(
    listener: &mut Listener<R>,
    mut done: impl FnMut(&Listener<R>) -> bool,
) {
    let mut sink = Vec::new();
    let start = Instant::now();
    while !done(listener) {
        assert!(start.elapsed() < DEADLINE, "condition not reached in time");
        listener.step(&mut sink).unwrap();
    }
}

/// Step until the listener fails, returning the error.
pub fn step_until_err<R: Renderer>(listener: &mut Listener<R>) -> Error {
    let mut sink = Vec::new();
    let start = Instant::now();
    loop {
        assert!(start.elapsed() < DEADLINE, "listener never failed");
        if let Err(e) = listener.step(&mut sink) {
            return e;
        }
    }
}

pub fn lines(out: &[u8]) -> Vec<String> {
    String::from_utf8(out.to_vec())
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}
