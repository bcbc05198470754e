mod util;
mod ping;
mod packet;
mod report;

use colored::*;

use clap::{App, AppSettings, Arg};

use std::process;
use std::thread;
use std::time::Duration;

use ping::{LoopConfig, PingLoop, RawIcmp};
use report::{Event, Outcome, Reporter};

const SEND_INTERVAL: Duration = Duration::from_millis(500);

fn main() {
    let matches = App::new("cping")
        .setting(AppSettings::ColoredHelp)
        .version("v1.0")
        .about("Fire-and-forget ICMPv4 echo-request sender.\nBuilds raw echo requests, optionally from a random source address,\nand reports each send. No replies are read.")
        .arg(Arg::with_name("source")
            .help("Source address, or `rand` for a random one (Default 0.0.0.0)")
            .short("s")
            .takes_value(true))
        .arg(Arg::with_name("destination")
            .help("Destination address, or `rand` for a random one")
            .short("d")
            .takes_value(true)
            .required(true))
        .arg(Arg::with_name("count")
            .help("Number of requests to send, 0 for unbounded (Default 0)")
            .short("c")
            .takes_value(true))
        .arg(Arg::with_name("resolve-once")
            .help("Resolve source/destination once at startup instead of before every send")
            .long("resolve-once"))
        .get_matches();

    let source = matches.value_of("source").unwrap_or("0.0.0.0").to_string();
    let destination = matches.value_of("destination").unwrap().to_string();
    let count = matches.value_of("count").unwrap_or("0")
        .parse::<u64>().expect("Invalid count: (ex: 4) : ");

    let (events, inbox) = report::event_channel();

    let interrupts = events.clone();
    ctrlc::set_handler(move || {
        let _ = interrupts.send(Event::Interrupt);
    }).expect("Error setting Ctrl-C handler");

    thread::spawn(move || {
        let mut reporter = Reporter::new();
        if reporter.run(&inbox) == Outcome::Interrupted {
            eprintln!("{} after {} sends", "Interrupted".red(), reporter.sent());
            process::exit(1);
        }
    });

    let config = LoopConfig {
        source,
        destination,
        count,
        resolve_once: matches.is_present("resolve-once"),
        interval: SEND_INTERVAL,
    };

    let mut ping_loop = PingLoop::new(config, RawIcmp, events);
    if let Err(e) = ping_loop.run() {
        eprintln!("cping: {}", e);
        process::exit(2);
    }
}
