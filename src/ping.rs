use std::io::{self, Result, Write};
use std::net::{IpAddr, SocketAddr};
use std::thread;
use std::time::Duration;

use socket2::{Socket, Domain, Protocol, SockAddr};

use crate::packet;
use crate::report::{Event, EventSender};
use crate::util;

/// One-shot ICMP delivery. The raw-socket implementation is swapped out
/// for in-memory ones in the loop tests.
pub trait Transport {
    fn send(&self, wire: &[u8], source: IpAddr, destination: IpAddr) -> Result<()>;
}

/// Opens a fresh raw ICMPv4 socket per send. No pooling; the socket is
/// scope-local, so every exit path releases it.
pub struct RawIcmp;

impl Transport for RawIcmp {
    fn send(&self, wire: &[u8], source: IpAddr, destination: IpAddr) -> Result<()> {
        let stype = socket2::Type::raw().cloexec();
        let socket = Socket::new(Domain::ipv4(), stype, Some(Protocol::icmpv4()))?;

        socket.bind(&SockAddr::from(SocketAddr::from((source, 0))))?;
        socket.send_to(wire, &SockAddr::from(SocketAddr::from((destination, 0))))?;
        Ok(())
    }
}

/// One echo request, addressed. Built fresh for every loop cycle and
/// discarded after the send.
pub struct PingRequest {
    pub wire: Vec<u8>,
    pub source: IpAddr,
    pub destination: IpAddr,
}

pub struct LoopConfig {
    pub source: String,
    pub destination: String,
    pub count: u64, // 0 = unbounded
    pub resolve_once: bool,
    pub interval: Duration,
}

pub struct PingLoop<T: Transport> {
    config: LoopConfig,
    transport: T,
    events: EventSender,
    coder: bincode::Config,
    // Per-send diagnostics land here, one line per failed iteration.
    // Stderr in the tool, a capturing sink in the loop tests.
    diag: Box<dyn Write>,
}

impl<T: Transport> PingLoop<T> {
    pub fn new(config: LoopConfig, transport: T, events: EventSender) -> PingLoop<T> {
        let mut coder = bincode::config();
        coder.big_endian(); // ICMP Packet Header uses big endian

        PingLoop { config, transport, events, coder, diag: Box::new(io::stderr()) }
    }

    /// Run `count` send cycles, or forever when the count is 0, sleeping the
    /// configured interval after every cycle. With `resolve_once` the
    /// addresses are pinned up front and an unparseable one is fatal;
    /// otherwise they are resolved anew each cycle and a parse failure only
    /// costs that cycle.
    pub fn run(&mut self) -> Result<()> {
        let pinned = if self.config.resolve_once {
            Some((util::resolve(&self.config.source)?, util::resolve(&self.config.destination)?))
        } else {
            None
        };

        let mut cycles = 0u64;
        while self.config.count == 0 || cycles < self.config.count {
            cycles += 1;
            self.cycle(pinned);
            thread::sleep(self.config.interval);
        }

        Ok(())
    }

    fn cycle(&mut self, pinned: Option<(IpAddr, IpAddr)>) {
        let (source, destination) = match pinned {
            Some(pair) => pair,
            None => {
                let source = match util::resolve(&self.config.source) {
                    Ok(addr) => addr,
                    Err(e) => {
                        let _ = writeln!(self.diag, "Resolve src error: {}", e);
                        return;
                    }
                };
                let destination = match util::resolve(&self.config.destination) {
                    Ok(addr) => addr,
                    Err(e) => {
                        let _ = writeln!(self.diag, "Resolve dst error: {}", e);
                        return;
                    }
                };
                (source, destination)
            }
        };

        let request = PingRequest {
            wire: packet::build_echo_request(&self.coder),
            source,
            destination,
        };
        self.send(&request);
    }

    /// Failures stay at this boundary: one diagnostic line, no event, and
    /// the loop carries on at its usual cadence.
    fn send(&mut self, request: &PingRequest) {
        match self.transport.send(&request.wire, request.source, request.destination) {
            Ok(()) => {
                // Rendezvous with the reporter; an Err only means the
                // reporter is gone and the process is already on its way out.
                let _ = self.events.send(Event::Sent);
            }
            Err(e) => {
                let _ = writeln!(self.diag, "Send {} -> {} error: {}",
                    request.source, request.destination, e);
            }
        }
    }
}
