//
// transport.rs
//
// Copyright (C) 2026 Posit Software, PBC. All rights reserved.
//
//

use std::io::BufRead;
use std::io::Write;
use std::thread::JoinHandle;

use crossbeam::channel::Receiver;
use crossbeam::channel::Select;
use thebe::comm::comm_channel::CommMsg;
use thebe::socket::comm::CommSocket;
use thebe::wire::envelope::WireMessage;

/// The line-delimited stdio transport.
///
/// One thread reads lines from the front end and dispatches them to the
/// comms' incoming channels; another drains the comms' outgoing channels
/// back to the front end. Reaching end of input closes every comm.
pub struct Transport {
    pub read_handle: JoinHandle<()>,
    pub write_handle: JoinHandle<()>,
}

impl Transport {
    /// Serve the given comms over stdin and stdout.
    pub fn start(comms: Vec<CommSocket>) -> Self {
        // The write side holds receivers only. Holding full sockets would
        // keep the outgoing senders alive and the writer could never detect
        // that the comms have shut down.
        let channels: Vec<(String, Receiver<CommMsg>)> = comms
            .iter()
            .map(|comm| (comm.comm_name.clone(), comm.outgoing_rx.clone()))
            .collect();

        let read_handle = crate::spawn!("tutor-transport-read", move || {
            let stdin = std::io::stdin();
            read_loop(stdin.lock(), &comms);
        });

        let write_handle = crate::spawn!("tutor-transport-write", move || {
            let stdout = std::io::stdout();
            write_loop(stdout.lock(), channels);
        });

        Self {
            read_handle,
            write_handle,
        }
    }
}

/// Dispatch lines from the front end until the stream ends, then close
/// every comm so their services exit.
fn read_loop<R: BufRead>(reader: R, comms: &[CommSocket]) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                log::error!("Transport: Can't read from the front end: {err}");
                break;
            },
        };

        if line.trim().is_empty() {
            continue;
        }

        if let Err(err) = dispatch_line(&line, comms) {
            log::warn!("Transport: Discarding line: {err}");
        }
    }

    log::info!("Transport: Front end hung up, closing comms");

    for comm in comms {
        let _ = comm.incoming_tx.send(CommMsg::Close);
    }
}

/// Route one line of the transport to the comm it names.
fn dispatch_line(line: &str, comms: &[CommSocket]) -> anyhow::Result<()> {
    let message = WireMessage::from_line(line)?;

    let Some(comm) = comms.iter().find(|comm| comm.comm_name == message.comm) else {
        return Err(thebe::Error::UnknownComm(message.comm).into());
    };

    // A send failure means the comm's service already exited; the message
    // can only be dropped
    let _ = comm.incoming_tx.send(message.into_comm_msg());
    Ok(())
}

/// Forward outgoing comm messages to the front end, one line each, until
/// every channel has disconnected.
fn write_loop<W: Write>(mut writer: W, channels: Vec<(String, Receiver<CommMsg>)>) {
    let mut sel = Select::new();
    for (_, outgoing_rx) in &channels {
        sel.recv(outgoing_rx);
    }

    let mut live = channels.len();
    while live > 0 {
        let oper = sel.select();
        let index = oper.index();
        let (name, outgoing_rx) = &channels[index];

        let msg = match oper.recv(outgoing_rx) {
            Ok(msg) => msg,
            Err(_) => {
                // This comm's last sender is gone. Indexes of the remaining
                // operations are unaffected by the removal.
                sel.remove(index);
                live -= 1;
                continue;
            },
        };

        if let Err(err) = write_message(&mut writer, name, msg) {
            log::error!("Transport: Can't write to the front end: {err}");
            break;
        }
    }
}

fn write_message<W: Write>(writer: &mut W, comm: &str, msg: CommMsg) -> anyhow::Result<()> {
    let line = WireMessage::from_comm_msg(String::from(comm), msg).to_line()?;
    writeln!(writer, "{line}")?;
    writer.flush()?;
    Ok(())
}
