//! Minimal in-process FTP server for integration tests.
//!
//! Speaks just enough of the protocol for the engine: USER/PASS, PWD, TYPE,
//! PASV, SIZE, REST, RETR, QUIT. Options inject faults: SIZE disabled, or a
//! cap on how far into the file the data channel gets before the server
//! closes it while still claiming success.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct FtpServerOptions {
    /// If false, SIZE gets "502 Command not implemented".
    pub size_supported: bool,
    /// Never serve a byte at or past this absolute offset; the data channel
    /// closes early and the reply still claims success. Every retrieval is
    /// affected, so resumed attempts stall at the same point.
    pub serve_cap: Option<u64>,
    /// Like `serve_cap` but only for the first retrieval; later ones serve
    /// everything. Exercises retry-then-resume recovery.
    pub cut_first_retr_at: Option<u64>,
}

impl Default for FtpServerOptions {
    fn default() -> Self {
        Self {
            size_supported: true,
            serve_cap: None,
            cut_first_retr_at: None,
        }
    }
}

/// Observed server-side activity, for asserting protocol behavior.
#[derive(Default)]
pub struct Counters {
    /// Control connections accepted.
    pub sessions: AtomicU32,
    /// RETR commands received.
    pub retrs: AtomicU32,
    /// Every REST offset received, in order.
    pub rest_offsets: Mutex<Vec<u64>>,
}

pub struct FtpServer {
    pub host: String,
    pub port: u16,
    pub counters: Arc<Counters>,
}

/// Starts a server in a background thread serving `files` (remote path ->
/// content). Runs until the process exits.
pub fn start(files: HashMap<String, Vec<u8>>) -> FtpServer {
    start_with_options(files, FtpServerOptions::default())
}

pub fn start_with_options(files: HashMap<String, Vec<u8>>, opts: FtpServerOptions) -> FtpServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind control port");
    let port = listener.local_addr().unwrap().port();
    let counters = Arc::new(Counters::default());
    let files = Arc::new(files);
    let first_cut_pending = Arc::new(AtomicBool::new(true));

    let thread_counters = Arc::clone(&counters);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            thread_counters.sessions.fetch_add(1, Ordering::SeqCst);
            let files = Arc::clone(&files);
            let counters = Arc::clone(&thread_counters);
            let first_cut = Arc::clone(&first_cut_pending);
            thread::spawn(move || handle_session(stream, &files, opts, &counters, &first_cut));
        }
    });

    FtpServer {
        host: "127.0.0.1".to_string(),
        port,
        counters,
    }
}

fn handle_session(
    stream: TcpStream,
    files: &HashMap<String, Vec<u8>>,
    opts: FtpServerOptions,
    counters: &Counters,
    first_cut_pending: &AtomicBool,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(10)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(10)));
    let mut writer = match stream.try_clone() {
        Ok(w) => w,
        Err(_) => return,
    };
    let mut reader = BufReader::new(stream);
    if writer.write_all(b"220 test server ready\r\n").is_err() {
        return;
    }

    let mut rest: u64 = 0;
    let mut data_listener: Option<TcpListener> = None;

    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) | Err(_) => return,
            Ok(_) => {}
        }
        let line = line.trim_end();
        let (cmd, arg) = match line.split_once(' ') {
            Some((c, a)) => (c.to_ascii_uppercase(), a.trim()),
            None => (line.to_ascii_uppercase(), ""),
        };

        let reply: String = match cmd.as_str() {
            "USER" => "331 Password required\r\n".into(),
            "PASS" => "230 Logged in\r\n".into(),
            "PWD" | "XPWD" => "257 \"/\" is the current directory\r\n".into(),
            "TYPE" => "200 Type set\r\n".into(),
            "PASV" => {
                let listener = TcpListener::bind("127.0.0.1:0").expect("bind data port");
                let port = listener.local_addr().unwrap().port();
                data_listener = Some(listener);
                format!(
                    "227 Entering Passive Mode (127,0,0,1,{},{})\r\n",
                    port >> 8,
                    port & 0xff
                )
            }
            "SIZE" => {
                if !opts.size_supported {
                    "502 Command not implemented\r\n".into()
                } else {
                    match files.get(arg) {
                        Some(body) => format!("213 {}\r\n", body.len()),
                        None => "550 File not found\r\n".into(),
                    }
                }
            }
            "REST" => {
                rest = arg.parse().unwrap_or(0);
                counters.rest_offsets.lock().unwrap().push(rest);
                format!("350 Restarting at {}\r\n", rest)
            }
            "RETR" => {
                counters.retrs.fetch_add(1, Ordering::SeqCst);
                match files.get(arg) {
                    None => {
                        rest = 0;
                        "550 File not found\r\n".into()
                    }
                    Some(body) => match data_listener.take() {
                        None => {
                            rest = 0;
                            "425 Use PASV first\r\n".into()
                        }
                        Some(listener) => {
                            if writer.write_all(b"150 Opening data connection\r\n").is_err() {
                                return;
                            }
                            let start = (rest as usize).min(body.len());
                            rest = 0;
                            let mut end = body.len();
                            if let Some(cap) = opts.serve_cap {
                                end = end.min(cap as usize);
                            }
                            if let Some(cut) = opts.cut_first_retr_at {
                                if first_cut_pending.swap(false, Ordering::SeqCst) {
                                    end = end.min(cut as usize);
                                }
                            }
                            if let Ok((mut data, _addr)) = listener.accept() {
                                let _ = data.set_write_timeout(Some(Duration::from_secs(10)));
                                if start < end {
                                    let _ = data.write_all(&body[start..end]);
                                }
                            }
                            // data socket closed; claim success regardless so a
                            // short stream looks like a silent truncation
                            "226 Transfer complete\r\n".into()
                        }
                    },
                }
            }
            "QUIT" => {
                let _ = writer.write_all(b"221 Bye\r\n");
                return;
            }
            _ => "502 Command not implemented\r\n".into(),
        };
        if writer.write_all(reply.as_bytes()).is_err() {
            return;
        }
    }
}
