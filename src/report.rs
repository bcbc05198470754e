use std::sync::mpsc;

use colored::*;

/// Everything the reporter can be woken up by. Sends and the interrupt
/// share one channel so they are handled in arrival order.
pub enum Event {
    Sent,
    Interrupt,
}

#[derive(Debug, PartialEq)]
pub enum Outcome {
    Interrupted,
    Disconnected,
}

pub type EventSender = mpsc::SyncSender<Event>;
pub type EventReceiver = mpsc::Receiver<Event>;

/// Zero-capacity channel: every send rendezvouses with the reporter, so the
/// printed counter always reflects true send order.
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::sync_channel(0)
}

pub struct Reporter {
    sent: u64,
}

impl Reporter {
    pub fn new() -> Reporter {
        Reporter { sent: 0 }
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }

    fn record_send(&mut self) -> u64 {
        self.sent += 1;
        self.sent
    }

    /// Consume events until interrupted or every sender is gone. The latter
    /// never happens in the running tool (the interrupt handler holds a
    /// sender for the life of the process), only in tests.
    pub fn run(&mut self, events: &EventReceiver) -> Outcome {
        loop {
            match events.recv() {
                Ok(Event::Sent) => {
                    let number = self.record_send();
                    println!("{} {}", "send number".cyan(), number.to_string().bold());
                }
                Ok(Event::Interrupt) => return Outcome::Interrupted,
                Err(_) => return Outcome::Disconnected,
            }
        }
    }
}
