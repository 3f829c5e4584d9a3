//! Shared test infrastructure for integration tests.
//!
//! Each test gets a scratch environments root plus a stub `uv` and `git`
//! on PATH, so a whole activation run executes for real without touching
//! the network or a Python toolchain. Stubs log their argv so tests can
//! assert which external commands ran.

use assert_cmd::Command;
use std::fs;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use tempfile::TempDir;

pub struct Fixture {
    pub bin_dir: TempDir,
    pub root: TempDir,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            bin_dir: TempDir::new().expect("create stub dir"),
            root: TempDir::new().expect("create envs root"),
        }
    }

    /// Install a stub tool under `name`. Every invocation appends its
    /// argv to `<name>.log` before the body runs.
    pub fn write_stub(&self, name: &str, body: &str) {
        let log = self.stub_log_path(name);
        let path = self.bin_dir.path().join(name);
        let script = format!("#!/bin/sh\necho \"$@\" >> \"{}\"\n{body}\n", log.display());
        fs::write(&path, script).expect("write stub");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod stub");
    }

    pub fn stub_log_path(&self, name: &str) -> PathBuf {
        self.bin_dir.path().join(format!("{name}.log"))
    }

    /// Recorded invocations of a stub, one line per call. Empty when the
    /// stub never ran.
    pub fn stub_log(&self, name: &str) -> String {
        fs::read_to_string(self.stub_log_path(name)).unwrap_or_default()
    }

    pub fn env_dir(&self, env_name: &str) -> PathBuf {
        self.root.path().join(env_name)
    }

    /// The binary under test with a clean environment: stub dir first on
    /// PATH, required configuration pointed at the scratch root.
    pub fn command(&self, notify_endpoint: &str) -> Command {
        let path_var = match std::env::var("PATH") {
            Ok(existing) => format!("{}:{existing}", self.bin_dir.path().display()),
            Err(_) => self.bin_dir.path().display().to_string(),
        };
        let mut cmd = Command::cargo_bin("vsw").expect("binary builds");
        cmd.env_clear()
            .env("PATH", path_var)
            .env("VSW_ENVS_ROOT", self.root.path())
            .env("VSW_MARKER_PACKAGE", "corelib")
            .env("VSW_PREREQS_REPO", "https://example.invalid/prereqs.git")
            .env("VSW_NOTIFY_ENDPOINT", notify_endpoint)
            .env("VSW_NOTIFY_TIMEOUT_SECS", "2");
        cmd
    }
}

/// An endpoint nothing is listening on; connecting fails immediately.
pub fn closed_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind probe port");
    let port = listener.local_addr().expect("probe addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}/set-interpreter")
}

/// Serve one activation request and answer 200 with the given JSON body.
/// The join handle yields the request body that was received.
pub fn notify_server(response_body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind notify port");
    let port = listener.local_addr().expect("notify addr").port();
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{response_body}",
        response_body.len()
    );
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept notify request");
        let mut raw = Vec::new();
        let mut buf = [0_u8; 1024];
        let body_start = loop {
            let read = stream.read(&mut buf).expect("read notify request");
            raw.extend_from_slice(&buf[..read]);
            if let Some(pos) = raw.windows(4).position(|window| window == b"\r\n\r\n") {
                break pos + 4;
            }
        };
        let headers = String::from_utf8_lossy(&raw[..body_start]).into_owned();
        let content_length = headers
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                if name.eq_ignore_ascii_case("content-length") {
                    value.trim().parse::<usize>().ok()
                } else {
                    None
                }
            })
            .unwrap_or(0);
        while raw.len() < body_start + content_length {
            let read = stream.read(&mut buf).expect("read notify body");
            raw.extend_from_slice(&buf[..read]);
        }
        stream.write_all(response.as_bytes()).expect("write notify response");
        stream.flush().expect("flush notify response");
        String::from_utf8_lossy(&raw[body_start..]).into_owned()
    });
    (format!("http://127.0.0.1:{port}/set-interpreter"), handle)
}
